use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender};
use download::DownloadOutcome;
use eframe::egui;
use loader_core::{Mount, SystemClock};
use shared::{
    domain::{IndicatorKind, ShowRequest},
    markers::{
        ElementData, FormSubmission, LinkActivation, ATTR_LOADER, ATTR_LOADER_TEXT,
        ATTR_LOADER_TYPE,
    },
    settings::LoaderSettings,
};
use url::Url;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{LoaderRequest, UiEvent},
        orchestration::dispatch_backend_command,
        page::PageSession,
    },
    media::lottie::{AnimationState, LottiePlayer},
    ui::overlay::{self, SharedOverlay},
};

const IDLE_REPAINT: Duration = Duration::from_millis(100);
const ANIMATION_REPAINT: Duration = Duration::from_millis(16);
const MAX_LOG_LINES: usize = 50;

pub struct LoaderDemoApp {
    page: PageSession,
    overlay: SharedOverlay,
    animation: AnimationState,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    download_dir: PathBuf,
    download_url: String,
    form_text: String,
    form_check: bool,
    status: String,
    log: Vec<String>,
}

impl LoaderDemoApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &LoaderSettings,
        download_dir: PathBuf,
    ) -> Self {
        let overlay = SharedOverlay::default();
        let animation = AnimationState::default();
        let mount = Mount::new(overlay.clone(), settings.mount())
            .with_player(LottiePlayer::new(animation.clone()));
        let page = PageSession::new(Some(mount), Arc::new(SystemClock), settings);

        Self {
            page,
            overlay,
            animation,
            cmd_tx,
            ui_rx,
            download_dir,
            download_url: "http://127.0.0.1:8000/creditos/1/documentos/".to_string(),
            form_text: String::new(),
            form_check: false,
            status: String::new(),
            log: Vec::new(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Loader(request) => self.page.apply(request),
                UiEvent::Navigated(url) => self.push_log(format!("fell back to opening {url}")),
                UiEvent::DownloadFinished(DownloadOutcome::Saved { path, filename }) => {
                    self.push_log(format!("saved {filename} to {}", path.display()));
                }
                UiEvent::DownloadFinished(DownloadOutcome::FellBack) => {
                    self.push_log("download failed".to_string());
                }
                UiEvent::Error(message) => {
                    tracing::error!("{message}");
                    self.status = message;
                }
            }
        }
    }

    fn push_log(&mut self, line: String) {
        tracing::info!("{line}");
        self.log.push(line);
        if self.log.len() > MAX_LOG_LINES {
            self.log.remove(0);
        }
    }

    fn click(&mut self, link: LinkActivation) {
        let href = link.href.clone();
        let disposition = self.page.click_link(link);
        self.push_log(format!("click {href}: {disposition:?}"));
    }

    fn start_download(&mut self) {
        let url = match Url::parse(self.download_url.trim()) {
            Ok(url) => url,
            Err(err) => {
                self.status = format!("invalid download URL: {err}");
                return;
            }
        };

        self.click(LinkActivation::new(url.as_str()).download());
        let cmd = BackendCommand::Download {
            url,
            dir: self.download_dir.clone(),
        };
        if dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status) {
            self.status.clear();
        }
    }

    fn submit(&mut self, ajax: bool) {
        let mut form = ElementData::new();
        if !self.form_text.trim().is_empty() {
            form.set(ATTR_LOADER_TEXT, self.form_text.trim());
        }
        if self.form_check {
            form.set(ATTR_LOADER_TYPE, IndicatorKind::Check.as_str());
        }
        if ajax {
            form.set(ATTR_LOADER, "ajax");
        }
        self.page
            .submit_form(FormSubmission::new(form), "/simulador/resultado/");
        self.push_log(format!("submit form (ajax: {ajax})"));
    }

    fn show(&mut self, request: ShowRequest) {
        self.page.apply(LoaderRequest::Show(request));
    }

    fn links_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Links");
        ui.horizontal_wrapped(|ui| {
            if ui.button("Créditos").clicked() {
                self.click(LinkActivation::new("/creditos/"));
            }
            if ui.button("New tab").clicked() {
                self.click(LinkActivation::new("/creditos/").target("_blank"));
            }
            if ui.button("#detalle").clicked() {
                self.click(LinkActivation::new("#detalle"));
            }
            if ui.button("data-loader=off").clicked() {
                let data = ElementData::new().with(ATTR_LOADER, "off");
                self.click(LinkActivation::new("/perfil/").data(data));
            }
            if ui.button("javascript:").clicked() {
                self.click(LinkActivation::new("javascript:void(0)"));
            }
        });
    }

    fn download_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Download");
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.download_url);
            if ui.button("Download").clicked() {
                self.start_download();
            }
        });
        ui.small(format!("Saving into {}", self.download_dir.display()));
    }

    fn form_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Form");
        ui.horizontal(|ui| {
            ui.label("data-loader-text");
            ui.text_edit_singleline(&mut self.form_text);
            ui.checkbox(&mut self.form_check, "check");
        });
        ui.horizontal(|ui| {
            if ui.button("Submit").clicked() {
                self.submit(false);
            }
            if ui.button("Submit (ajax)").clicked() {
                self.submit(true);
            }
        });
    }

    fn manual_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Direct control");
        ui.horizontal(|ui| {
            if ui.button("show").clicked() {
                self.show(ShowRequest::new("Procesando..."));
            }
            if ui.button("show immediate").clicked() {
                self.show(ShowRequest::new("Procesando...").immediate());
            }
            if ui.button("show check").clicked() {
                self.show(ShowRequest::new("Listo").kind(IndicatorKind::Check));
            }
            if ui.button("hide").clicked() {
                self.page.apply(LoaderRequest::Hide);
            }
            if ui.button("Back (cache restore)").clicked() {
                self.page.restore_from_cache();
                self.push_log("pageshow persisted".to_string());
            }
        });

        let mut latency_ms = self.page.latency().as_millis() as u64;
        if ui
            .add(egui::Slider::new(&mut latency_ms, 0..=3_000).text("page latency (ms)"))
            .changed()
        {
            self.page.set_latency(Duration::from_millis(latency_ms));
        }
    }
}

impl eframe::App for LoaderDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let next_tick = self.page.tick();

        egui::TopBottomPanel::top("location_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(format!("Location: {}", self.page.location()));
                if self.page.is_navigating() {
                    ui.label("(loading)");
                }
            });
        });

        egui::TopBottomPanel::bottom("state_bar").show(ctx, |ui| {
            ui.monospace(format!("{:?}", self.page.snapshot()));
            if !self.status.is_empty() {
                ui.colored_label(egui::Color32::LIGHT_RED, &self.status);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.links_section(ui);
            ui.separator();
            self.download_section(ui);
            ui.separator();
            self.form_section(ui);
            ui.separator();
            self.manual_section(ui);
            ui.separator();
            egui::ScrollArea::vertical().show(ui, |ui| {
                for line in &self.log {
                    ui.monospace(line);
                }
            });
        });

        let now = Instant::now();
        let overlay_state = self.overlay.get();
        let playing = self
            .animation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        overlay::draw(ctx, &overlay_state, playing.as_ref(), now);

        let mut wait = next_tick
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(IDLE_REPAINT)
            .min(IDLE_REPAINT);
        if overlay_state.visible {
            wait = wait.min(ANIMATION_REPAINT);
        }
        ctx.request_repaint_after(wait);
    }
}
