//! Page host.
//! Owns the document, timer queue, binding table and overlay registry, and drives the
//! boot → batch load → render sequence. Events enter through `dispatch` (or the
//! `click`/`scroll_to`/image helpers); browser side effects are collected as `Effect`s.
//! Time only moves when the host calls `advance`.

use crate::config::SiteConfig;
use crate::data::SiteData;
use crate::dom::{Document, El, NodeId};
use crate::fetch::{DocumentSource, LoadError, load_all};
use crate::interact::{Binding, EventKind, Flow, Overlay, OverlayRegistry, default_bindings};
use crate::placeholder::is_placeholder;
use crate::render::{render_all, stagger_pending_reveals};
use crate::timers::{Task, TimerId, TimerQueue};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64)";
const DEFAULT_VIEWPORT_HEIGHT: f64 = 800.0;

/// Something the browser would do on the page's behalf.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Blocking prompt shown to the user.
    Alert(String),
    /// URL opened in a new window.
    OpenWindow(String),
    /// Smooth scroll of the window to `top`.
    ScrollTo { top: f64 },
    /// Scroll the node into the nearest visible position.
    ScrollIntoView(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    Loaded,
    Failed,
}

/// Result of the delayed activity-photo diagnostic sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhotoReport {
    pub loaded: usize,
    pub failed: usize,
}

pub struct Page {
    pub(crate) config: SiteConfig,
    pub(crate) doc: Document,
    pub(crate) timers: TimerQueue,
    pub(crate) bindings: Vec<Binding>,
    pub(crate) overlays: OverlayRegistry,
    pub(crate) user_agent: String,
    pub(crate) scroll_y: f64,
    pub(crate) viewport_height: f64,
    pub(crate) snapshot: Option<Arc<SiteData>>,
    pub(crate) effects: Vec<Effect>,
    pub(crate) images: HashMap<NodeId, ImageStatus>,
    pub(crate) carousel_paused: bool,
    pub(crate) spy_timer: Option<TimerId>,
    pub(crate) photo_report: Option<PhotoReport>,
}

impl Page {
    /// Boots the page over `doc`: handlers, overlays, carousel and deferred checks.
    /// Data is not loaded yet; call `load`.
    pub fn boot(config: SiteConfig, doc: Document, user_agent: &str) -> Self {
        let mut page = Page {
            config,
            doc,
            timers: TimerQueue::new(),
            bindings: default_bindings(),
            overlays: OverlayRegistry::default(),
            user_agent: user_agent.to_string(),
            scroll_y: 0.0,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            snapshot: None,
            effects: Vec::new(),
            images: HashMap::new(),
            carousel_paused: false,
            spy_timer: None,
            photo_report: None,
        };
        page.setup_scroll_animations();
        page.setup_overlays();
        page.setup_carousel();
        page.timers
            .schedule(page.config.timings.photo_check_ms, Task::PhotoCheck);
        page
    }

    fn setup_scroll_animations(&mut self) {
        let hero_items: Vec<NodeId> = self
            .doc
            .by_class("hero-section")
            .into_iter()
            .flat_map(|hero| self.doc.descendants(hero))
            .filter(|&n| self.doc.has_class(n, "fade-in"))
            .collect();
        for node in hero_items {
            self.timers
                .schedule(self.config.timings.hero_reveal_ms, Task::Reveal(node));
        }
    }

    fn setup_overlays(&mut self) {
        if let Some(panel) = self.doc.by_id("chatBot") {
            self.overlays.register(Overlay {
                panel,
                toggle: self.doc.by_id("openChatBot"),
                open_class: "show",
            });
        }
    }

    fn setup_carousel(&mut self) {
        let Some(inner) = self.doc.by_id("carouselItems") else {
            return;
        };
        self.doc.clear_children(inner);
        let slides: Vec<El> = self
            .config
            .carousel_slides
            .iter()
            .enumerate()
            .map(|(i, slide)| {
                El::new("div")
                    .class("carousel-item")
                    .class(if i == 0 { "active" } else { "" })
                    .child(
                        El::new("div")
                            .class("photo-placeholder")
                            .child(El::new("i").class(&format!("bi {} carousel-icon-lg", slide.icon)))
                            .child(El::new("h3").text(&slide.title))
                            .child(El::new("p").class("text-center").text(&slide.description)),
                    )
            })
            .collect();
        for slide in slides {
            self.doc.append(inner, slide);
        }
        if self.doc.by_id("campCarousel").is_some() {
            self.timers
                .schedule(self.config.timings.carousel_interval_ms, Task::CarouselAdvance);
        }
    }

    // *************** Batch load ***************

    /// Runs the batch load and renders on success; on failure shows the error banner.
    /// The page stays interactive either way; the result is returned for the host.
    pub async fn load(&mut self, source: &impl DocumentSource) -> Result<Arc<SiteData>, LoadError> {
        match load_all(source).await {
            Ok(data) => {
                let snapshot = Arc::new(data);
                render_all(&mut self.doc, &snapshot, &self.config, &mut self.timers);
                self.snapshot = Some(Arc::clone(&snapshot));
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!("Failed to load site data: {}", e);
                self.show_error_banner();
                Err(e)
            }
        }
    }

    fn show_error_banner(&mut self) {
        let banner = El::new("div")
            .class("alert alert-warning alert-dismissible fade show position-fixed top-0 start-50 translate-middle-x mt-3 z-3")
            .attr("role", "alert")
            .attr("style", "max-width: 500px")
            .child(El::new("i").class("bi bi-exclamation-triangle me-2"))
            .child(El::new("strong").text("Ошибка загрузки данных"))
            .text(" Пожалуйста, проверьте подключение и перезагрузите страницу.")
            .child(
                El::new("button")
                    .attr("type", "button")
                    .class("btn-close")
                    .attr("data-bs-dismiss", "alert")
                    .attr("aria-label", "Закрыть"),
            );
        let body = self.doc.body();
        let node = self.doc.append(body, banner);
        self.timers
            .schedule(self.config.timings.banner_dismiss_ms, Task::DismissBanner(node));
    }

    // *************** Events ***************

    /// Delivers an event to matching bindings on `target` (and its ancestors for
    /// bubbling events), then applies outside-click dismissal for unstopped clicks.
    pub fn dispatch(&mut self, event: EventKind, target: Option<NodeId>) -> Flow {
        let path: Vec<Option<NodeId>> = match target {
            None => vec![None],
            Some(node) if event.bubbles() => {
                let mut path = Vec::new();
                let mut current = Some(node);
                while let Some(n) = current {
                    path.push(Some(n));
                    current = self.doc.parent(n);
                }
                path
            }
            Some(node) => vec![Some(node)],
        };

        let mut flow = Flow::NONE;
        for node in path {
            let handlers: Vec<_> = self
                .bindings
                .iter()
                .filter(|b| b.event == event && b.selector.matches(&self.doc, node))
                .map(|b| b.handler)
                .collect();
            for handler in handlers {
                flow = flow.merge(self.run_handler(handler, node));
            }
            if flow.propagation_stopped {
                break;
            }
        }

        if let (EventKind::Click, Some(node), false) = (event, target, flow.propagation_stopped) {
            self.overlays.dismiss_outside(&mut self.doc, node);
        }
        flow
    }

    pub fn click(&mut self, target: NodeId) -> Flow {
        self.dispatch(EventKind::Click, Some(target))
    }

    pub fn scroll_to(&mut self, y: f64) -> Flow {
        self.set_scroll(y);
        self.dispatch(EventKind::Scroll, None)
    }

    pub fn image_loaded(&mut self, img: NodeId) -> Flow {
        self.dispatch(EventKind::ImageLoad, Some(img))
    }

    pub fn image_failed(&mut self, img: NodeId) -> Flow {
        self.dispatch(EventKind::ImageError, Some(img))
    }

    /// Fires a load or error event for every image. Inline placeholders always load;
    /// remote sources are left alone; anything else loads when `exists` finds it.
    pub fn verify_images(&mut self, exists: impl Fn(&str) -> bool) {
        for img in self.doc.by_tag("img") {
            let src = self.doc.attr(img, "src").unwrap_or_default().to_string();
            if src.is_empty() || src.contains("://") {
                continue;
            }
            if is_placeholder(&src) || exists(&src) {
                self.image_loaded(img);
            } else {
                self.image_failed(img);
            }
        }
    }

    pub fn hover(&mut self, node: NodeId, entered: bool) -> Flow {
        let event = if entered {
            EventKind::MouseEnter
        } else {
            EventKind::MouseLeave
        };
        self.dispatch(event, Some(node))
    }

    pub(crate) fn set_scroll(&mut self, y: f64) {
        self.scroll_y = y.max(0.0);
    }

    // *************** Timers ***************

    /// Advances virtual time by `ms`, running every task that falls due.
    pub fn advance(&mut self, ms: u64) {
        let deadline = self.timers.now() + ms;
        while let Some(task) = self.timers.pop_due(deadline) {
            self.run_task(task);
        }
        self.timers.settle_at(deadline);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::RevealPending => stagger_pending_reveals(&self.doc, &self.config, &mut self.timers),
            Task::Reveal(node) => self.doc.add_class(node, "visible"),
            Task::ScrollSpy => {
                self.spy_timer = None;
                self.update_active_nav_on_scroll();
            }
            Task::ScrollIntoView(node) => {
                if self.doc.is_attached(node) {
                    self.effects.push(Effect::ScrollIntoView(node));
                }
            }
            Task::DismissBanner(node) => self.doc.remove(node),
            Task::CarouselAdvance => {
                if !self.carousel_paused {
                    self.advance_carousel();
                }
                self.timers
                    .schedule(self.config.timings.carousel_interval_ms, Task::CarouselAdvance);
            }
            Task::PhotoCheck => {
                tracing::info!("Checking activity photos");
                self.timers
                    .schedule(self.config.timings.photo_sweep_ms, Task::PhotoSweep);
            }
            Task::PhotoSweep => {
                self.photo_report = Some(self.sweep_photos());
            }
        }
    }

    fn advance_carousel(&mut self) {
        let Some(inner) = self.doc.by_id("carouselItems") else {
            return;
        };
        let slides = self.doc.child_elements(inner);
        if slides.is_empty() {
            return;
        }
        let current = slides
            .iter()
            .position(|&s| self.doc.has_class(s, "active"))
            .unwrap_or(0);
        let next = (current + 1) % slides.len();
        self.doc.remove_class(slides[current], "active");
        self.doc.add_class(slides[next], "active");
    }

    /// Read-only: counts activity images by their last load event.
    fn sweep_photos(&self) -> PhotoReport {
        let mut report = PhotoReport::default();
        for (i, img) in self.doc.by_class("activity-image").into_iter().enumerate() {
            let src = self.doc.attr(img, "src").unwrap_or_default();
            if self.images.get(&img) == Some(&ImageStatus::Loaded) {
                report.loaded += 1;
                tracing::info!("Activity photo {} loaded: {}", i + 1, src);
            } else {
                report.failed += 1;
                tracing::warn!("Activity photo {} not loaded: {}", i + 1, src);
            }
        }
        tracing::info!("Photo check: {} loaded, {} failed", report.loaded, report.failed);
        report
    }

    // *************** Accessors ***************

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&Arc<SiteData>> {
        self.snapshot.as_ref()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn now(&self) -> u64 {
        self.timers.now()
    }

    pub fn photo_report(&self) -> Option<&PhotoReport> {
        self.photo_report.as_ref()
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    /// Drains effects raised since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}
