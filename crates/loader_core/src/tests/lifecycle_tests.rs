use super::*;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use shared::markers::ElementData;

use crate::testing::SimulatedLoader;

fn link(href: &str) -> LinkActivation {
    LinkActivation::new(href)
}

#[test]
fn same_tab_links_navigate() {
    assert_eq!(
        classify_link(&link("https://app.example/libranza/mi-credito/7/")),
        LinkDisposition::Navigate
    );
    assert_eq!(classify_link(&link("/dashboard/")), LinkDisposition::Navigate);
}

#[test]
fn fragments_scripts_new_tabs_and_empty_hrefs_are_ignored() {
    for href in [
        "https://app.example/faq#pagos",
        "https://app.example/faq#",
        "/faq#pagos",
        "javascript:void(0)",
        "",
    ] {
        assert_eq!(classify_link(&link(href)), LinkDisposition::Ignore, "{href}");
    }
    assert_eq!(
        classify_link(&link("https://app.example/ayuda").target("_blank")),
        LinkDisposition::Ignore
    );
    assert_eq!(
        classify_link(&link("/pagos/").data(ElementData::new().with("loader", "ajax"))),
        LinkDisposition::Ignore
    );
}

#[test]
fn download_and_opted_out_links_suppress_next_unload() {
    assert_eq!(
        classify_link(&link("/documentos/7.zip").download()),
        LinkDisposition::SuppressUnload
    );
    assert_eq!(
        classify_link(&link("/documentos/7.zip").data(ElementData::new().with("data-download", "true"))),
        LinkDisposition::SuppressUnload
    );
    assert_eq!(
        classify_link(&link("/salir/").data(ElementData::new().with("loader", "off"))),
        LinkDisposition::SuppressUnload
    );
}

#[test]
fn submission_uses_submitter_then_form_then_defaults() {
    let form = ElementData::new()
        .with("data-loader-text", "Enviando solicitud...")
        .with("data-loader-type", "check");
    let submitter = ElementData::new().with("data-loader-text", "Pagando...");

    let request = submission_request(
        &FormSubmission::new(form.clone()).submitted_by(submitter),
        "Procesando...",
    )
    .expect("form triggers loader");
    assert_eq!(request.text.as_deref(), Some("Pagando..."));
    assert_eq!(request.kind, IndicatorKind::Check);
    assert!(!request.immediate);

    let request = submission_request(&FormSubmission::new(ElementData::new()), "Procesando...")
        .expect("plain form triggers loader");
    assert_eq!(request.text.as_deref(), Some("Procesando..."));
    assert_eq!(request.kind, IndicatorKind::Loading);
}

#[test]
fn opted_out_forms_do_not_trigger() {
    for marker in ["off", "ajax"] {
        let form = ElementData::new().with("loader", marker);
        assert!(submission_request(&FormSubmission::new(form), "Procesando...").is_none());
    }
}

#[test]
fn unload_shows_immediately() {
    let mut sim = SimulatedLoader::new();
    sim.page(PageEvent::BeforeUnload);

    assert!(sim.is_visible());
    assert_eq!(sim.indicator.last_text().as_deref(), Some("Cargando..."));
}

#[test]
fn download_link_suppresses_exactly_one_unload() {
    let mut sim = SimulatedLoader::new();
    sim.page(PageEvent::LinkActivated(link("/documentos/7.zip").download()));
    assert!(sim.controller.snapshot().skip_next_unload);

    sim.advance_to(200);
    sim.page(PageEvent::BeforeUnload);
    assert!(!sim.is_visible());
    assert!(!sim.controller.snapshot().skip_next_unload);
    assert_eq!(sim.timeline.pending(), 0);

    sim.page(PageEvent::BeforeUnload);
    assert!(sim.is_visible());
}

#[test]
fn link_click_debounces_show() {
    let mut sim = SimulatedLoader::new();
    sim.page(PageEvent::LinkActivated(link("/libranza/")));
    assert!(!sim.is_visible());

    sim.advance_to(150);
    assert!(sim.is_visible());
}

#[test]
fn load_hides_after_minimum_duration() {
    let mut sim = SimulatedLoader::new();
    sim.page(PageEvent::BeforeUnload);
    sim.advance_to(100);
    sim.page(PageEvent::Load);
    assert!(sim.is_visible());

    sim.advance_to(350);
    assert!(!sim.is_visible());
}

#[test]
fn restore_from_cache_force_clears_indicator() {
    let mut sim = SimulatedLoader::new();
    sim.page(PageEvent::BeforeUnload);
    sim.advance_to(20);
    sim.page(PageEvent::Load);

    sim.page(PageEvent::PageShow { persisted: false });
    assert!(sim.is_visible());

    sim.page(PageEvent::PageShow { persisted: true });
    let snapshot = sim.controller.snapshot();
    assert!(!sim.is_visible());
    assert!(!snapshot.active && !snapshot.show_pending && !snapshot.hide_pending);
}

#[test]
fn form_submission_shows_configured_label() {
    let mut sim = SimulatedLoader::new();
    let form = ElementData::new().with("data-loader-text", "Calculando cuota...");
    sim.page(PageEvent::FormSubmitted(FormSubmission::new(form)));

    sim.advance_to(150);
    assert!(sim.is_visible());
    assert_eq!(
        sim.indicator.last_text().as_deref(),
        Some("Calculando cuota...")
    );
}

struct RecordingSink {
    seen: Mutex<Vec<PageEvent>>,
    open: AtomicBool,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            open: AtomicBool::new(true),
        })
    }

    fn seen(&self) -> Vec<PageEvent> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl PageEventSink for RecordingSink {
    fn deliver(&self, event: PageEvent) -> bool {
        if !self.open.load(Ordering::SeqCst) {
            return false;
        }
        self.seen.lock().expect("seen lock").push(event);
        true
    }
}

#[test]
fn page_events_deliver_in_order_and_drop_closed_sinks() {
    let events = PageEvents::new();
    let first = RecordingSink::new();
    let second = RecordingSink::new();
    events.attach(first.clone());
    events.attach(second.clone());

    assert_eq!(events.emit(PageEvent::BeforeUnload), 2);
    assert_eq!(events.emit(PageEvent::Load), 2);
    assert_eq!(first.seen(), vec![PageEvent::BeforeUnload, PageEvent::Load]);
    assert_eq!(second.seen(), first.seen());

    second.open.store(false, Ordering::SeqCst);
    assert_eq!(events.emit(PageEvent::Load), 1);
    second.open.store(true, Ordering::SeqCst);
    assert_eq!(events.emit(PageEvent::Load), 1);
    assert_eq!(second.seen().len(), 2);
    assert_eq!(first.seen().len(), 4);
}
