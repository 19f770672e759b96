//! Page-lifetime loading indicator: a debounced show / minimum-duration hide
//! state machine, plus the hosts that drive it.

pub mod animation;
pub mod clock;
pub mod controller;
pub mod indicator;
pub mod lifecycle;
pub mod runtime;
pub mod scheduler;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use animation::AnimationSlot;
pub use clock::{Clock, SystemClock, TokioClock};
pub use controller::LoaderController;
pub use indicator::{AnimationError, AnimationPlayer, Indicator, Mount};
pub use lifecycle::{
    classify_link, submission_request, LifecycleNotifier, LinkDisposition, PageEvent, PageEventSink,
    PageEvents,
};
pub use runtime::{LoaderControl, LoaderHandle, LoaderRuntime, RuntimeConfig, TokioScheduler};
pub use scheduler::{DeadlineQueue, PollingScheduler, Scheduler, TimerFired, TimerId, TimerKind};
