//! Deterministic test doubles: a virtual timeline plus recording indicator and
//! animation player.

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use shared::{
    domain::{LoaderTiming, ShowRequest},
    markers::MountConfig,
};

use crate::{
    clock::Clock,
    controller::LoaderController,
    indicator::{AnimationError, AnimationPlayer, Indicator, Mount},
    lifecycle::PageEvent,
    scheduler::{lock, DeadlineQueue, Scheduler, TimerFired, TimerId, TimerKind},
};

struct TimelineInner {
    origin: Instant,
    elapsed: Duration,
    queue: DeadlineQueue,
}

/// Virtual clock and scheduler sharing one notion of time.
#[derive(Clone)]
pub struct ManualTimeline {
    inner: Arc<Mutex<TimelineInner>>,
}

impl ManualTimeline {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimelineInner {
                origin: Instant::now(),
                elapsed: Duration::ZERO,
                queue: DeadlineQueue::new(),
            })),
        }
    }

    pub fn elapsed(&self) -> Duration {
        lock(&self.inner).elapsed
    }

    pub fn pending(&self) -> usize {
        lock(&self.inner).queue.len()
    }

    /// Pops the earliest timer due by `until` (measured from the origin) and
    /// moves the clock to its deadline.
    pub fn pop_due(&self, until: Duration) -> Option<TimerFired> {
        let mut inner = lock(&self.inner);
        let limit = inner.origin + until;
        let (deadline, fired) = inner.queue.take_due(limit)?;
        inner.elapsed = deadline.saturating_duration_since(inner.origin);
        Some(fired)
    }

    pub fn set_elapsed(&self, elapsed: Duration) {
        let mut inner = lock(&self.inner);
        if elapsed > inner.elapsed {
            inner.elapsed = elapsed;
        }
    }
}

impl Default for ManualTimeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualTimeline {
    fn now(&self) -> Instant {
        let inner = lock(&self.inner);
        inner.origin + inner.elapsed
    }
}

impl Scheduler for ManualTimeline {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        let mut inner = lock(&self.inner);
        let deadline = inner.origin + inner.elapsed + delay;
        inner.queue.push(deadline, kind)
    }

    fn cancel(&mut self, id: TimerId) {
        lock(&self.inner).queue.remove(id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorEvent {
    Text(String),
    Shown,
    Hidden,
}

/// Records what the controller rendered, stamped with timeline time.
#[derive(Clone)]
pub struct RecordingIndicator {
    timeline: ManualTimeline,
    visible: Arc<Mutex<bool>>,
    events: Arc<Mutex<Vec<(Duration, IndicatorEvent)>>>,
}

impl RecordingIndicator {
    pub fn new(timeline: ManualTimeline) -> Self {
        Self {
            timeline,
            visible: Arc::new(Mutex::new(false)),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_visible(&self) -> bool {
        *lock(&self.visible)
    }

    pub fn events(&self) -> Vec<(Duration, IndicatorEvent)> {
        lock(&self.events).clone()
    }

    /// Times at which visibility actually flipped on or off.
    pub fn transitions(&self) -> Vec<(Duration, bool)> {
        let mut visible = false;
        let mut out = Vec::new();
        for (at, event) in self.events() {
            let next = match event {
                IndicatorEvent::Shown => true,
                IndicatorEvent::Hidden => false,
                IndicatorEvent::Text(_) => continue,
            };
            if next != visible {
                out.push((at, next));
                visible = next;
            }
        }
        out
    }

    pub fn last_text(&self) -> Option<String> {
        lock(&self.events)
            .iter()
            .rev()
            .find_map(|(_, event)| match event {
                IndicatorEvent::Text(text) => Some(text.clone()),
                _ => None,
            })
    }

    fn record(&self, event: IndicatorEvent) {
        let at = self.timeline.elapsed();
        lock(&self.events).push((at, event));
    }
}

impl Indicator for RecordingIndicator {
    fn set_text(&mut self, text: &str) {
        self.record(IndicatorEvent::Text(text.to_owned()));
    }

    fn set_active(&mut self, active: bool) {
        *lock(&self.visible) = active;
        self.record(if active {
            IndicatorEvent::Shown
        } else {
            IndicatorEvent::Hidden
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationCall {
    Load { path: String, looping: bool },
    Destroy,
}

#[derive(Clone, Default)]
pub struct RecordingAnimation {
    calls: Arc<Mutex<Vec<AnimationCall>>>,
    failing_paths: Arc<Mutex<Vec<String>>>,
}

impl RecordingAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every load of `path` fail.
    pub fn fail_on(&self, path: impl Into<String>) {
        lock(&self.failing_paths).push(path.into());
    }

    pub fn calls(&self) -> Vec<AnimationCall> {
        lock(&self.calls).clone()
    }
}

impl AnimationPlayer for RecordingAnimation {
    fn load(&mut self, path: &str, looping: bool) -> Result<(), AnimationError> {
        if lock(&self.failing_paths).iter().any(|p| p == path) {
            return Err(AnimationError::Asset {
                path: path.to_owned(),
                reason: "not found".into(),
            });
        }
        lock(&self.calls).push(AnimationCall::Load {
            path: path.to_owned(),
            looping,
        });
        Ok(())
    }

    fn destroy(&mut self) {
        lock(&self.calls).push(AnimationCall::Destroy);
    }
}

/// A controller wired to a [`ManualTimeline`], with helpers to step time.
pub struct SimulatedLoader {
    pub controller: LoaderController,
    pub timeline: ManualTimeline,
    pub indicator: RecordingIndicator,
    pub animation: RecordingAnimation,
}

impl SimulatedLoader {
    pub fn new() -> Self {
        Self::with_mount_config(MountConfig::default())
    }

    pub fn with_mount_config(config: MountConfig) -> Self {
        let timeline = ManualTimeline::new();
        let indicator = RecordingIndicator::new(timeline.clone());
        let animation = RecordingAnimation::new();
        let mount = Mount::new(indicator.clone(), config).with_player(animation.clone());
        let controller = LoaderController::new(
            Some(mount),
            Arc::new(timeline.clone()),
            Box::new(timeline.clone()),
        );
        Self {
            controller,
            timeline,
            indicator,
            animation,
        }
    }

    pub fn with_timing(mut self, timing: LoaderTiming) -> Self {
        self.controller = self.controller.with_timing(timing);
        self
    }

    pub fn show(&mut self, request: ShowRequest) {
        self.controller.show(request);
    }

    pub fn hide(&mut self) {
        self.controller.hide();
    }

    pub fn page(&mut self, event: PageEvent) {
        self.controller.handle_page_event(event);
    }

    /// Runs every timer due up to `ms` after the origin, in deadline order,
    /// then parks the clock at `ms`.
    pub fn advance_to(&mut self, ms: u64) {
        let until = Duration::from_millis(ms);
        while let Some(fired) = self.timeline.pop_due(until) {
            self.controller.on_timer(fired);
        }
        self.timeline.set_elapsed(until);
    }

    pub fn now_ms(&self) -> u64 {
        self.timeline.elapsed().as_millis() as u64
    }

    pub fn is_visible(&self) -> bool {
        self.indicator.is_visible()
    }
}

impl Default for SimulatedLoader {
    fn default() -> Self {
        Self::new()
    }
}
