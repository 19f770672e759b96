//! The loading overlay: an [`Indicator`] writing into shared state that the
//! frame loop draws as a modal.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use eframe::egui;
use loader_core::Indicator;

use crate::media::lottie::PlayingAnimation;

#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    pub visible: bool,
    pub text: String,
    pub shown_at: Option<Instant>,
}

impl OverlayState {
    pub fn visible_for(&self, now: Instant) -> Option<Duration> {
        self.shown_at
            .filter(|_| self.visible)
            .map(|shown_at| now.saturating_duration_since(shown_at))
    }
}

#[derive(Clone, Default)]
pub struct SharedOverlay(Arc<Mutex<OverlayState>>);

impl SharedOverlay {
    pub fn get(&self) -> OverlayState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, OverlayState> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Indicator for SharedOverlay {
    fn set_text(&mut self, text: &str) {
        self.lock().text = text.to_string();
    }

    fn set_active(&mut self, active: bool) {
        let mut state = self.lock();
        if active && !state.visible {
            state.shown_at = Some(Instant::now());
        } else if !active {
            state.shown_at = None;
        }
        state.visible = active;
    }
}

pub fn draw(
    ctx: &egui::Context,
    overlay: &OverlayState,
    animation: Option<&PlayingAnimation>,
    now: Instant,
) {
    if !overlay.visible {
        return;
    }

    egui::Modal::new(egui::Id::new("loader_overlay")).show(ctx, |ui| {
        ui.set_min_width(220.0);
        ui.vertical_centered(|ui| {
            match animation {
                Some(animation) if !animation.looping && animation.progress(now) >= 1.0 => {
                    ui.label(egui::RichText::new("✔").size(40.0));
                }
                Some(animation) => {
                    ui.add(egui::Spinner::new().size(40.0));
                    ui.add(
                        egui::ProgressBar::new(animation.progress(now))
                            .desired_width(160.0),
                    );
                    ui.small(animation.label());
                }
                None => {
                    ui.add(egui::Spinner::new().size(40.0));
                }
            }
            ui.add_space(8.0);
            ui.label(egui::RichText::new(&overlay.text).strong());
            if let Some(visible_for) = overlay.visible_for(now) {
                ui.small(format!("{:.1} s", visible_for.as_secs_f32()));
            }
        });
    });
}
