//! Tokio host for the controller.
//!
//! The controller lives inside a single task and is never shared; everything
//! else talks to it through a [`LoaderHandle`]. Handle calls and notifier
//! events share one command queue, so the controller sees them in send order.

use std::{collections::HashMap, sync::Arc, time::Duration};

use shared::{
    domain::{LoaderSnapshot, LoaderTiming, ShowRequest, TriggerTexts},
    settings::LoaderSettings,
};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, warn};

use crate::{
    clock::TokioClock,
    controller::LoaderController,
    indicator::Mount,
    lifecycle::{LifecycleNotifier, PageEvent, PageEventSink},
    scheduler::{Scheduler, TimerFired, TimerId, TimerKind},
};

/// What collaborators need to drive the indicator.
pub trait LoaderControl: Send + Sync {
    fn show(&self, request: ShowRequest);
    fn hide(&self);
}

enum LoaderCommand {
    Show(ShowRequest),
    Hide,
    Page(PageEvent),
    Snapshot(oneshot::Sender<LoaderSnapshot>),
}

#[derive(Clone)]
pub struct LoaderHandle {
    tx: mpsc::UnboundedSender<LoaderCommand>,
}

impl LoaderHandle {
    pub fn show(&self, request: ShowRequest) {
        self.send(LoaderCommand::Show(request));
    }

    pub fn hide(&self) {
        self.send(LoaderCommand::Hide);
    }

    /// Feeds a page event directly, bypassing any notifier.
    pub fn page_event(&self, event: PageEvent) {
        self.send(LoaderCommand::Page(event));
    }

    /// Current controller state, or `None` once the runtime has stopped.
    pub async fn snapshot(&self) -> Option<LoaderSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(LoaderCommand::Snapshot(tx));
        rx.await.ok()
    }

    fn send(&self, cmd: LoaderCommand) {
        if self.tx.send(cmd).is_err() {
            debug!("loader runtime stopped; dropping command");
        }
    }
}

/// Notifier-side entry into the command queue. Holds a weak sender so an
/// attached notifier does not keep the runtime alive.
struct PageEventForwarder {
    tx: mpsc::WeakUnboundedSender<LoaderCommand>,
}

impl PageEventSink for PageEventForwarder {
    fn deliver(&self, event: PageEvent) -> bool {
        match self.tx.upgrade() {
            Some(tx) => tx.send(LoaderCommand::Page(event)).is_ok(),
            None => false,
        }
    }
}

impl LoaderControl for LoaderHandle {
    fn show(&self, request: ShowRequest) {
        LoaderHandle::show(self, request);
    }

    fn hide(&self) {
        LoaderHandle::hide(self);
    }
}

/// One `tokio::time::sleep` task per armed timer; cancelling aborts it.
pub struct TokioScheduler {
    fired_tx: mpsc::UnboundedSender<TimerFired>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl TokioScheduler {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<TimerFired>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            fired_tx,
            tasks: HashMap::new(),
            next_id: 0,
        };
        (scheduler, fired_rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, kind: TimerKind, delay: Duration) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        self.next_id += 1;
        let id = TimerId(self.next_id);
        let fired_tx = self.fired_tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired_tx.send(TimerFired { kind, id });
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}

#[derive(Default)]
pub struct RuntimeConfig {
    pub mount: Option<Mount>,
    pub timing: LoaderTiming,
    pub texts: TriggerTexts,
}

impl RuntimeConfig {
    pub fn from_settings(mount: Option<Mount>, settings: &LoaderSettings) -> Self {
        Self {
            mount,
            timing: settings.timing(),
            texts: settings.texts(),
        }
    }
}

pub struct LoaderRuntime {
    handle: LoaderHandle,
    task: JoinHandle<()>,
}

impl LoaderRuntime {
    /// Builds the controller and moves it into its own task. Must be called
    /// from within a tokio runtime.
    pub fn spawn(config: RuntimeConfig, notifier: Option<&dyn LifecycleNotifier>) -> Self {
        let (scheduler, fired_rx) = TokioScheduler::channel();
        let controller =
            LoaderController::new(config.mount, Arc::new(TokioClock), Box::new(scheduler))
                .with_timing(config.timing)
                .with_texts(config.texts);

        let (tx, rx) = mpsc::unbounded_channel();
        if let Some(notifier) = notifier {
            notifier.attach(Arc::new(PageEventForwarder { tx: tx.downgrade() }));
        }
        let task = tokio::spawn(run_loader(controller, rx, fired_rx));

        Self {
            handle: LoaderHandle { tx },
            task,
        }
    }

    pub fn handle(&self) -> LoaderHandle {
        self.handle.clone()
    }

    /// Stops accepting commands and waits for the loop to exit. Outstanding
    /// handles keep the loop alive until they are dropped too.
    pub async fn shutdown(self) {
        drop(self.handle);
        if let Err(error) = self.task.await {
            warn!(%error, "loader runtime task ended abnormally");
        }
    }
}

async fn run_loader(
    mut controller: LoaderController,
    mut commands: mpsc::UnboundedReceiver<LoaderCommand>,
    mut fired: mpsc::UnboundedReceiver<TimerFired>,
) {
    loop {
        tokio::select! {
            cmd = commands.recv() => {
                let Some(cmd) = cmd else {
                    break;
                };
                match cmd {
                    LoaderCommand::Show(request) => controller.show(request),
                    LoaderCommand::Hide => controller.hide(),
                    LoaderCommand::Page(event) => controller.handle_page_event(event),
                    LoaderCommand::Snapshot(reply) => {
                        let _ = reply.send(controller.snapshot());
                    }
                }
            }
            Some(timer) = fired.recv() => controller.on_timer(timer),
        }
    }
    debug!("loader runtime stopped");
}

#[cfg(test)]
#[path = "tests/runtime_tests.rs"]
mod tests;
