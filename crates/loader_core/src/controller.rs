//! The page-wide loading indicator state machine.
//!
//! Showing is debounced by `show_delay` so near-instant navigations never
//! flash the overlay; once visible, the overlay stays up for at least
//! `min_visible` even if `hide` arrives earlier.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use shared::domain::{IndicatorKind, LoaderSnapshot, LoaderTiming, ShowRequest, TriggerTexts};
use tracing::debug;

use crate::{
    clock::Clock,
    indicator::Mount,
    scheduler::{Scheduler, TimerFired, TimerId, TimerKind},
};

#[derive(Debug, Default)]
struct LoaderState {
    active: bool,
    pending_text: Option<String>,
    pending_kind: IndicatorKind,
    active_since: Option<Instant>,
    show_timer: Option<TimerId>,
    hide_timer: Option<TimerId>,
    skip_next_unload: bool,
    skip_timer: Option<TimerId>,
}

impl LoaderState {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Show => &mut self.show_timer,
            TimerKind::Hide => &mut self.hide_timer,
            TimerKind::SkipUnload => &mut self.skip_timer,
        }
    }
}

pub struct LoaderController {
    state: LoaderState,
    mount: Option<Mount>,
    clock: Arc<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    timing: LoaderTiming,
    texts: TriggerTexts,
}

impl LoaderController {
    pub fn new(mount: Option<Mount>, clock: Arc<dyn Clock>, scheduler: Box<dyn Scheduler>) -> Self {
        if mount.is_none() {
            debug!("loader mount point missing; controller is inert");
        }
        Self {
            state: LoaderState::default(),
            mount,
            clock,
            scheduler,
            timing: LoaderTiming::default(),
            texts: TriggerTexts::default(),
        }
    }

    pub fn with_timing(mut self, timing: LoaderTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_texts(mut self, texts: TriggerTexts) -> Self {
        self.texts = texts;
        self
    }

    pub fn timing(&self) -> LoaderTiming {
        self.timing
    }

    pub fn texts(&self) -> &TriggerTexts {
        &self.texts
    }

    pub fn is_inert(&self) -> bool {
        self.mount.is_none()
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn active_since(&self) -> Option<Instant> {
        self.state.active_since
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        LoaderSnapshot {
            active: self.state.active,
            text: self.state.pending_text.clone(),
            kind: self.state.pending_kind,
            show_pending: self.state.show_timer.is_some(),
            hide_pending: self.state.hide_timer.is_some(),
            skip_next_unload: self.state.skip_next_unload,
        }
    }

    pub fn show(&mut self, request: ShowRequest) {
        if self.is_inert() {
            return;
        }

        if let Some(text) = request.text.filter(|text| !text.is_empty()) {
            self.state.pending_text = Some(text);
        }
        self.state.pending_kind = request.kind;
        self.cancel(TimerKind::Hide);

        if request.immediate {
            self.cancel(TimerKind::Show);
            self.perform_show();
        } else if self.state.active {
            self.render();
        } else if self.state.show_timer.is_none() {
            let id = self.scheduler.schedule(TimerKind::Show, self.timing.show_delay);
            self.state.show_timer = Some(id);
            debug!(timer = id.0, delay_ms = self.timing.show_delay.as_millis() as u64, "loader show armed");
        }
    }

    pub fn hide(&mut self) {
        if self.is_inert() {
            return;
        }

        self.cancel(TimerKind::Show);
        if !self.state.active || self.state.hide_timer.is_some() {
            return;
        }

        let remaining = self.remaining_visible();
        if remaining.is_zero() {
            self.perform_hide();
        } else {
            let id = self.scheduler.schedule(TimerKind::Hide, remaining);
            self.state.hide_timer = Some(id);
            debug!(timer = id.0, remaining_ms = remaining.as_millis() as u64, "loader hide deferred");
        }
    }

    /// Delivers a timer armed earlier. Timers that were cancelled or replaced
    /// since are ignored.
    pub fn on_timer(&mut self, fired: TimerFired) {
        if *self.state.slot(fired.kind) != Some(fired.id) {
            debug!(kind = ?fired.kind, timer = fired.id.0, "ignoring stale loader timer");
            return;
        }
        *self.state.slot(fired.kind) = None;

        match fired.kind {
            TimerKind::Show => self.perform_show(),
            TimerKind::Hide => {
                if self.state.active {
                    self.perform_hide();
                }
            }
            TimerKind::SkipUnload => {
                self.state.skip_next_unload = false;
                debug!("skip-next-unload window elapsed");
            }
        }
    }

    /// Clears visibility and both display timers at once, ignoring the
    /// minimum visible duration.
    pub fn force_reset(&mut self) {
        if self.is_inert() {
            return;
        }
        self.cancel(TimerKind::Show);
        self.cancel(TimerKind::Hide);
        self.state.active = false;
        self.state.active_since = None;
        if let Some(mount) = self.mount.as_mut() {
            mount.indicator.set_active(false);
        }
        debug!("loader force reset");
    }

    /// Suppresses the next unload-triggered show for the skip window.
    pub fn arm_skip_unload(&mut self) {
        if self.is_inert() {
            return;
        }
        self.cancel(TimerKind::SkipUnload);
        self.state.skip_next_unload = true;
        let id = self
            .scheduler
            .schedule(TimerKind::SkipUnload, self.timing.skip_unload_window);
        self.state.skip_timer = Some(id);
    }

    /// Consumes the skip flag, returning whether it was set.
    pub fn take_skip_unload(&mut self) -> bool {
        if !self.state.skip_next_unload {
            return false;
        }
        self.state.skip_next_unload = false;
        self.cancel(TimerKind::SkipUnload);
        true
    }

    fn remaining_visible(&self) -> Duration {
        let Some(since) = self.state.active_since else {
            return Duration::ZERO;
        };
        let elapsed = self.clock.now().saturating_duration_since(since);
        self.timing.min_visible.saturating_sub(elapsed)
    }

    fn cancel(&mut self, kind: TimerKind) {
        if let Some(id) = self.state.slot(kind).take() {
            self.scheduler.cancel(id);
        }
    }

    fn perform_show(&mut self) {
        self.state.active = true;
        self.state.active_since = Some(self.clock.now());
        self.render();
        debug!(kind = %self.state.pending_kind, text = ?self.state.pending_text, "loader shown");
    }

    fn perform_hide(&mut self) {
        self.cancel(TimerKind::Hide);
        self.state.active = false;
        self.state.active_since = None;
        if let Some(mount) = self.mount.as_mut() {
            mount.indicator.set_active(false);
        }
        debug!("loader hidden");
    }

    fn render(&mut self) {
        let Some(mount) = self.mount.as_mut() else {
            return;
        };
        let kind = self.state.pending_kind;
        mount.animation.play(
            mount.config.animation_for(kind),
            mount.config.loops_for(kind),
        );
        if let Some(text) = self.state.pending_text.as_deref() {
            mount.indicator.set_text(text);
        }
        mount.indicator.set_active(true);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
