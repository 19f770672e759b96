//! A simulated page hosting the loader: link clicks, form posts and history
//! restores are turned into the page events a browser would fire, and page
//! loads complete after a configurable latency.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use loader_core::{
    classify_link, Clock, LinkDisposition, LoaderController, Mount, PageEvent, PollingScheduler,
};
use shared::{
    domain::LoaderSnapshot,
    markers::{FormSubmission, LinkActivation, LoaderMarker},
    settings::LoaderSettings,
};
use tracing::debug;

use crate::controller::events::LoaderRequest;

pub struct PageSession {
    controller: LoaderController,
    scheduler: PollingScheduler,
    clock: Arc<dyn Clock>,
    latency: Duration,
    location: String,
    pending_load: Option<(Instant, String)>,
}

impl PageSession {
    pub fn new(mount: Option<Mount>, clock: Arc<dyn Clock>, settings: &LoaderSettings) -> Self {
        let scheduler = PollingScheduler::new(clock.clone());
        let controller = LoaderController::new(mount, clock.clone(), Box::new(scheduler.clone()))
            .with_timing(settings.timing())
            .with_texts(settings.texts());
        Self {
            controller,
            scheduler,
            clock,
            latency: Duration::from_millis(800),
            location: "/".to_string(),
            pending_load: None,
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn set_latency(&mut self, latency: Duration) {
        self.latency = latency;
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_navigating(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        self.controller.snapshot()
    }

    /// Click followed by the `beforeunload` the browser fires for anything
    /// that leaves the page, downloads included.
    pub fn click_link(&mut self, link: LinkActivation) -> LinkDisposition {
        let disposition = classify_link(&link);
        let href = link.href.clone();
        self.controller
            .handle_page_event(PageEvent::LinkActivated(link));

        match disposition {
            LinkDisposition::Navigate => {
                self.controller.handle_page_event(PageEvent::BeforeUnload);
                self.begin_navigation(href);
            }
            LinkDisposition::SuppressUnload => {
                self.controller.handle_page_event(PageEvent::BeforeUnload);
            }
            LinkDisposition::Ignore => {}
        }
        disposition
    }

    /// Ajax forms stay on the page; everything else posts and navigates.
    pub fn submit_form(&mut self, submission: FormSubmission, action: &str) {
        let navigates = submission.form.marker() != LoaderMarker::Ajax;
        self.controller
            .handle_page_event(PageEvent::FormSubmitted(submission));
        if navigates {
            self.controller.handle_page_event(PageEvent::BeforeUnload);
            self.begin_navigation(action.to_string());
        }
    }

    /// Back/forward cache restore of the current page.
    pub fn restore_from_cache(&mut self) {
        self.pending_load = None;
        self.controller
            .handle_page_event(PageEvent::PageShow { persisted: true });
    }

    pub fn apply(&mut self, request: LoaderRequest) {
        match request {
            LoaderRequest::Show(request) => self.controller.show(request),
            LoaderRequest::Hide => self.controller.hide(),
        }
    }

    /// Fires due timers and a finished page load. Returns the next instant
    /// that needs another tick.
    pub fn tick(&mut self) -> Option<Instant> {
        let now = self.clock.now();
        self.fire_due(now);

        if let Some((at, _)) = &self.pending_load {
            if *at <= now {
                if let Some((_, location)) = self.pending_load.take() {
                    debug!(%location, "page loaded");
                    self.location = location;
                }
                self.controller.handle_page_event(PageEvent::Load);
                self.fire_due(now);
            }
        }

        let load_at = self.pending_load.as_ref().map(|(at, _)| *at);
        [self.scheduler.next_deadline(), load_at]
            .into_iter()
            .flatten()
            .min()
    }

    fn fire_due(&mut self, now: Instant) {
        while let Some(fired) = self.scheduler.take_due(now) {
            self.controller.on_timer(fired);
        }
    }

    fn begin_navigation(&mut self, location: String) {
        let at = self.clock.now() + self.latency;
        self.pending_load = Some((at, location));
    }
}

#[cfg(test)]
mod tests {
    use loader_core::testing::{ManualTimeline, RecordingIndicator};
    use shared::{
        domain::{ShowRequest, DOWNLOAD_TEXT},
        markers::{ElementData, MountConfig},
    };

    use super::*;

    fn session() -> (PageSession, ManualTimeline, RecordingIndicator) {
        let timeline = ManualTimeline::new();
        let indicator = RecordingIndicator::new(timeline.clone());
        let mount = Mount::new(indicator.clone(), MountConfig::default());
        let mut page = PageSession::new(
            Some(mount),
            Arc::new(timeline.clone()),
            &LoaderSettings::default(),
        );
        page.set_latency(Duration::from_millis(500));
        (page, timeline, indicator)
    }

    fn at(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn navigation_shows_immediately_and_hides_on_load() {
        let (mut page, timeline, indicator) = session();

        let disposition = page.click_link(LinkActivation::new("/creditos/"));
        assert_eq!(disposition, LinkDisposition::Navigate);
        assert!(indicator.is_visible());
        assert_eq!(indicator.last_text().as_deref(), Some("Cargando..."));

        timeline.set_elapsed(at(500));
        assert_eq!(page.tick(), None);

        assert_eq!(page.location(), "/creditos/");
        assert_eq!(indicator.transitions(), vec![(at(0), true), (at(500), false)]);
    }

    #[test]
    fn download_link_skips_unload_and_flow_drives_loader() {
        let (mut page, timeline, indicator) = session();

        let disposition = page.click_link(LinkActivation::new("/documentos/7/").download());
        assert_eq!(disposition, LinkDisposition::SuppressUnload);
        assert!(!indicator.is_visible());
        assert!(!page.snapshot().skip_next_unload);
        assert!(!page.is_navigating());

        page.apply(LoaderRequest::Show(ShowRequest::new(DOWNLOAD_TEXT)));
        timeline.set_elapsed(at(150));
        page.tick();
        assert!(indicator.is_visible());

        timeline.set_elapsed(at(200));
        page.apply(LoaderRequest::Hide);
        let next = page.tick();
        assert!(next.is_some());
        assert!(indicator.is_visible());

        timeline.set_elapsed(at(500));
        page.tick();
        assert_eq!(
            indicator.transitions(),
            vec![(at(150), true), (at(500), false)]
        );
    }

    #[test]
    fn ajax_form_stays_on_page() {
        let (mut page, timeline, indicator) = session();
        let form = ElementData::new().with("data-loader", "ajax");

        page.submit_form(FormSubmission::new(form), "/simulador/");

        assert!(!page.is_navigating());
        timeline.set_elapsed(at(1_000));
        page.tick();
        assert!(indicator.transitions().is_empty());
    }

    #[test]
    fn form_post_shows_submit_text_then_navigation_overrides() {
        let (mut page, _timeline, indicator) = session();
        let form = ElementData::new().with("data-loader-text", "Calculando cuota...");

        page.submit_form(FormSubmission::new(form), "/simulador/");

        assert!(page.is_navigating());
        assert!(indicator.is_visible());
        assert_eq!(indicator.last_text().as_deref(), Some("Cargando..."));
    }

    #[test]
    fn restore_cancels_pending_load_and_hides() {
        let (mut page, timeline, indicator) = session();
        page.click_link(LinkActivation::new("/libranza/"));

        timeline.set_elapsed(at(100));
        page.restore_from_cache();

        assert!(!indicator.is_visible());
        assert!(!page.is_navigating());
        assert_eq!(page.tick(), None);
        assert_eq!(page.location(), "/");
    }
}
