//! Backend worker: owns a tokio runtime and runs downloads off the UI thread.
//! Loader requests travel back to the UI as events; the UI thread owns the
//! controller.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use download::{DirectorySink, DownloadFlow, HttpFetcher, Navigator};
use loader_core::LoaderControl;
use shared::domain::ShowRequest;
use url::Url;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::events::{LoaderRequest, UiEvent},
};

/// Forwards show/hide to the UI thread.
struct UiLoader {
    ui_tx: Sender<UiEvent>,
}

impl LoaderControl for UiLoader {
    fn show(&self, request: ShowRequest) {
        send(&self.ui_tx, UiEvent::Loader(LoaderRequest::Show(request)));
    }

    fn hide(&self) {
        send(&self.ui_tx, UiEvent::Loader(LoaderRequest::Hide));
    }
}

struct UiNavigator {
    ui_tx: Sender<UiEvent>,
}

impl Navigator for UiNavigator {
    fn navigate(&self, url: &Url) {
        send(&self.ui_tx, UiEvent::Navigated(url.clone()));
    }
}

/// Never blocks: runs on tokio workers, and the UI drains once per frame.
fn send(ui_tx: &Sender<UiEvent>, event: UiEvent) -> bool {
    match ui_tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(event)) => {
            tracing::warn!(?event, "ui event queue is full; dropping event");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event receiver gone");
            false
        }
    }
}

pub fn spawn_backend_thread(
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
    download_text: String,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                send(
                    &ui_tx,
                    UiEvent::Error(format!("backend worker startup failure: {err}")),
                );
                return;
            }
        };

        let loader: Arc<dyn LoaderControl> = Arc::new(UiLoader {
            ui_tx: ui_tx.clone(),
        });
        let navigator: Arc<dyn Navigator> = Arc::new(UiNavigator {
            ui_tx: ui_tx.clone(),
        });
        let fetcher = Arc::new(HttpFetcher::default());

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                BackendCommand::Download { url, dir } => {
                    let flow = DownloadFlow::new(
                        loader.clone(),
                        fetcher.clone(),
                        Arc::new(DirectorySink::new(dir)),
                        navigator.clone(),
                    )
                    .with_text(download_text.clone());
                    let ui_tx = ui_tx.clone();
                    runtime.spawn(async move {
                        let outcome = flow.run(&url).await;
                        send(&ui_tx, UiEvent::DownloadFinished(outcome));
                    });
                }
            }
        }
        tracing::info!("backend command channel closed; worker exiting");
    });
}
