//! Page navigation events and how they drive the controller.

use std::sync::{Arc, Mutex};

use shared::{
    domain::{IndicatorKind, ShowRequest},
    markers::{FormSubmission, LinkActivation, LoaderMarker, ATTR_DOWNLOAD},
};
use tracing::debug;
use url::Url;

use crate::{controller::LoaderController, scheduler::lock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// The page is about to navigate away.
    BeforeUnload,
    /// The page finished loading.
    Load,
    /// The page was shown; `persisted` is set when served from the history cache.
    PageShow { persisted: bool },
    LinkActivated(LinkActivation),
    FormSubmitted(FormSubmission),
}

/// Receives page events synchronously, in the order they were emitted.
pub trait PageEventSink: Send + Sync {
    /// Returns `false` once the receiving side is gone.
    fn deliver(&self, event: PageEvent) -> bool;
}

/// Source of page lifecycle events the controller attaches to.
pub trait LifecycleNotifier: Send + Sync {
    fn attach(&self, sink: Arc<dyn PageEventSink>);
}

/// In-process fan-out of page events. Delivery happens inside `emit`, so an
/// event is queued behind everything sent to the same sink before it.
#[derive(Clone, Default)]
pub struct PageEvents {
    sinks: Arc<Mutex<Vec<Arc<dyn PageEventSink>>>>,
}

impl PageEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of sinks that accepted the event. Closed sinks are
    /// dropped.
    pub fn emit(&self, event: PageEvent) -> usize {
        let mut sinks = lock(&self.sinks);
        sinks.retain(|sink| sink.deliver(event.clone()));
        sinks.len()
    }
}

impl LifecycleNotifier for PageEvents {
    fn attach(&self, sink: Arc<dyn PageEventSink>) {
        lock(&self.sinks).push(sink);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDisposition {
    /// Same-tab navigation: announce it.
    Navigate,
    /// Download or opted-out link: the coming unload is not a navigation.
    SuppressUnload,
    Ignore,
}

pub fn classify_link(link: &LinkActivation) -> LinkDisposition {
    let href = link.href.trim();
    if href.is_empty() {
        return LinkDisposition::Ignore;
    }

    let marker = link.data.marker();
    if marker == LoaderMarker::Off
        || link.data.get(ATTR_DOWNLOAD) == Some("true")
        || link.download_attr
    {
        return LinkDisposition::SuppressUnload;
    }
    if marker == LoaderMarker::Ajax {
        return LinkDisposition::Ignore;
    }

    if link.target.as_deref() == Some("_blank") || !is_same_document_navigation(href) {
        return LinkDisposition::Ignore;
    }

    LinkDisposition::Navigate
}

/// False for fragment jumps and script URLs, which never leave the page.
fn is_same_document_navigation(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => url.fragment().is_none() && url.scheme() != "javascript",
        Err(_) => {
            !href.contains('#') && !href.to_ascii_lowercase().contains("javascript:")
        }
    }
}

/// The show request for a form submission, or `None` when the form opted out.
/// The submitter's overrides win over the form's.
pub fn submission_request(submission: &FormSubmission, default_text: &str) -> Option<ShowRequest> {
    if submission.form.marker().suppresses_trigger() {
        return None;
    }

    let submitter = submission.submitter.as_ref();
    let kind = submitter
        .and_then(|data| data.loader_kind())
        .or_else(|| submission.form.loader_kind())
        .unwrap_or(IndicatorKind::Loading);
    let text = submitter
        .and_then(|data| data.loader_text())
        .or_else(|| submission.form.loader_text())
        .unwrap_or(default_text);

    Some(ShowRequest::new(text).kind(kind))
}

impl LoaderController {
    pub fn handle_page_event(&mut self, event: PageEvent) {
        match event {
            PageEvent::BeforeUnload => {
                if self.take_skip_unload() {
                    debug!("unload announcement skipped");
                    return;
                }
                let text = self.texts().navigation.clone();
                self.show(ShowRequest::new(text).immediate());
            }
            PageEvent::Load => self.hide(),
            PageEvent::PageShow { persisted } => {
                if persisted {
                    self.force_reset();
                }
            }
            PageEvent::LinkActivated(link) => match classify_link(&link) {
                LinkDisposition::Navigate => {
                    let text = self.texts().navigation.clone();
                    self.show(ShowRequest::new(text));
                }
                LinkDisposition::SuppressUnload => self.arm_skip_unload(),
                LinkDisposition::Ignore => {}
            },
            PageEvent::FormSubmitted(submission) => {
                if let Some(request) = submission_request(&submission, &self.texts().submit) {
                    self.show(request);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
