//! Interaction layer.
//! Handlers are wired through an explicit binding table built once at boot: each row is an
//! (event, selector, handler) triple matched against the event target and its ancestors,
//! so rows also cover nodes rendered after boot. Handlers can be invoked directly with
//! `Page::run_handler` without synthesizing an event.
//! Outside-click dismissal goes through an overlay registry instead of a document listener.

use crate::dom::{Document, LayoutBox, NodeId};
use crate::page::{Effect, ImageStatus, Page};
use crate::placeholder::{activity_placeholder, is_placeholder, logo_placeholder};
use crate::render::{ACTIVITY_INDEX_ATTR, FAQ_INDEX_ATTR, answer_block};
use crate::timers::Task;
use regex::Regex;
use std::sync::LazyLock;

static MOBILE_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("mobile user agent pattern is valid")
});

pub fn is_mobile(user_agent: &str) -> bool {
    MOBILE_AGENT.is_match(user_agent)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Scroll,
    ImageLoad,
    ImageError,
    MouseEnter,
    MouseLeave,
}

impl EventKind {
    /// Whether the event travels up through ancestors.
    pub fn bubbles(self) -> bool {
        matches!(self, EventKind::Click)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector {
    /// The window itself (scroll).
    Window,
    Id(&'static str),
    Class(&'static str),
    /// `tag[attr^="prefix"]`
    AttrPrefix(&'static str, &'static str, &'static str),
    /// `[attr="value"]`
    AttrEquals(&'static str, &'static str),
}

impl Selector {
    pub fn matches(&self, doc: &Document, node: Option<NodeId>) -> bool {
        let Some(node) = node else {
            return matches!(self, Selector::Window);
        };
        match *self {
            Selector::Window => false,
            Selector::Id(id) => doc.attr(node, "id") == Some(id),
            Selector::Class(class) => doc.has_class(node, class),
            Selector::AttrPrefix(tag, attr, prefix) => {
                doc.tag(node) == Some(tag) && doc.attr(node, attr).is_some_and(|v| v.starts_with(prefix))
            }
            Selector::AttrEquals(attr, value) => doc.attr(node, attr) == Some(value),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    AnchorScroll,
    SocialIcon,
    PhoneLink,
    ChatToggle,
    ChatClose,
    FaqQuestion,
    DismissAlert,
    ActivityImageError,
    ActivityImageLoad,
    LogoError { height_px: u32 },
    CarouselPause,
    CarouselResume,
    WindowScroll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub event: EventKind,
    pub selector: Selector,
    pub handler: Handler,
}

const fn bind(event: EventKind, selector: Selector, handler: Handler) -> Binding {
    Binding {
        event,
        selector,
        handler,
    }
}

/// The page's complete handler table.
pub fn default_bindings() -> Vec<Binding> {
    use EventKind::*;
    vec![
        bind(Click, Selector::AttrPrefix("a", "href", "#"), Handler::AnchorScroll),
        bind(Click, Selector::Class("social-icon"), Handler::SocialIcon),
        bind(Click, Selector::AttrPrefix("a", "href", "tel:"), Handler::PhoneLink),
        bind(Click, Selector::Id("openChatBot"), Handler::ChatToggle),
        bind(Click, Selector::Id("closeChatBot"), Handler::ChatClose),
        bind(Click, Selector::Class("chat-question"), Handler::FaqQuestion),
        bind(Click, Selector::AttrEquals("data-bs-dismiss", "alert"), Handler::DismissAlert),
        bind(ImageError, Selector::Class("activity-image"), Handler::ActivityImageError),
        bind(ImageLoad, Selector::Class("activity-image"), Handler::ActivityImageLoad),
        bind(ImageError, Selector::Class("header-logo"), Handler::LogoError { height_px: 60 }),
        bind(ImageError, Selector::Class("footer-logo"), Handler::LogoError { height_px: 40 }),
        bind(MouseEnter, Selector::Id("campCarousel"), Handler::CarouselPause),
        bind(MouseLeave, Selector::Id("campCarousel"), Handler::CarouselResume),
        bind(Scroll, Selector::Window, Handler::WindowScroll),
    ]
}

/// Outcome flags a handler sets on the event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flow {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl Flow {
    pub const NONE: Flow = Flow {
        default_prevented: false,
        propagation_stopped: false,
    };
    pub const PREVENT: Flow = Flow {
        default_prevented: true,
        propagation_stopped: false,
    };
    pub const STOP: Flow = Flow {
        default_prevented: false,
        propagation_stopped: true,
    };

    pub fn merge(self, other: Flow) -> Flow {
        Flow {
            default_prevented: self.default_prevented || other.default_prevented,
            propagation_stopped: self.propagation_stopped || other.propagation_stopped,
        }
    }
}

// *************** Overlay registry ***************

/// A panel that closes when the user clicks anywhere outside it (and its toggle).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overlay {
    pub panel: NodeId,
    pub toggle: Option<NodeId>,
    pub open_class: &'static str,
}

#[derive(Clone, Debug, Default)]
pub struct OverlayRegistry {
    overlays: Vec<Overlay>,
}

impl OverlayRegistry {
    pub fn register(&mut self, overlay: Overlay) {
        self.overlays.push(overlay);
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn open(&self, doc: &Document) -> Vec<NodeId> {
        self.overlays
            .iter()
            .filter(|o| doc.has_class(o.panel, o.open_class))
            .map(|o| o.panel)
            .collect()
    }

    /// Closes every open overlay that does not contain `target`; returns how many closed.
    pub fn dismiss_outside(&self, doc: &mut Document, target: NodeId) -> usize {
        let mut closed = 0;
        for overlay in &self.overlays {
            if !doc.has_class(overlay.panel, overlay.open_class) {
                continue;
            }
            let inside = doc.contains(overlay.panel, target);
            let on_toggle = overlay.toggle.is_some_and(|t| doc.contains(t, target));
            if !inside && !on_toggle {
                doc.remove_class(overlay.panel, overlay.open_class);
                closed += 1;
            }
        }
        closed
    }
}

// *************** Scroll-spy ***************

/// The section whose bounds hold `reference`. When bounds overlap, the last one wins.
pub fn active_section<'a>(sections: &'a [(String, LayoutBox)], reference: f64) -> Option<&'a str> {
    sections
        .iter()
        .filter(|(_, layout)| layout.contains(reference))
        .last()
        .map(|(id, _)| id.as_str())
}

/// Marks the `.navbar-nav .nav-link` pointing at `href` active and clears the others.
pub fn update_active_nav(doc: &mut Document, href: &str) {
    let links: Vec<NodeId> = doc
        .by_class("navbar-nav")
        .into_iter()
        .flat_map(|nav| doc.descendants(nav))
        .filter(|&n| doc.has_class(n, "nav-link"))
        .collect();
    for link in links {
        doc.remove_class(link, "active");
        if doc.attr(link, "href") == Some(href) {
            doc.add_class(link, "active");
        }
    }
}

fn index_attr(doc: &Document, node: NodeId, attr: &str) -> Option<usize> {
    doc.attr(node, attr)?.parse().ok()
}

// *************** Handlers ***************

impl Page {
    /// Runs one handler against `node` as if its event had fired there.
    pub fn run_handler(&mut self, handler: Handler, node: Option<NodeId>) -> Flow {
        match (handler, node) {
            (Handler::WindowScroll, _) => self.on_window_scroll(),
            (Handler::AnchorScroll, Some(n)) => self.on_anchor_click(n),
            (Handler::SocialIcon, Some(n)) => self.on_social_click(n),
            (Handler::PhoneLink, Some(n)) => self.on_phone_click(n),
            (Handler::ChatToggle, _) => self.on_chat_toggle(),
            (Handler::ChatClose, _) => self.on_chat_close(),
            (Handler::FaqQuestion, Some(n)) => self.on_faq_question(n),
            (Handler::DismissAlert, Some(n)) => self.on_dismiss_alert(n),
            (Handler::ActivityImageError, Some(n)) => self.on_activity_image_error(n),
            (Handler::ActivityImageLoad, Some(n)) => self.on_activity_image_load(n),
            (Handler::LogoError { height_px }, Some(n)) => self.on_logo_error(n, height_px),
            (Handler::CarouselPause, _) => {
                self.carousel_paused = true;
                Flow::NONE
            }
            (Handler::CarouselResume, _) => {
                self.carousel_paused = false;
                Flow::NONE
            }
            (_, None) => Flow::NONE,
        }
    }

    fn on_anchor_click(&mut self, link: NodeId) -> Flow {
        let Some(href) = self.doc.attr(link, "href").map(str::to_string) else {
            return Flow::NONE;
        };
        if href == "#" {
            return Flow::NONE;
        }
        let Some(target) = self.doc.by_id(href.trim_start_matches('#')) else {
            return Flow::NONE;
        };

        let top = self.doc.layout(target).map_or(0.0, |l| l.top);
        let destination = (top - self.config.timings.header_offset_px).max(0.0);
        self.effects.push(Effect::ScrollTo { top: destination });
        self.set_scroll(destination);
        update_active_nav(&mut self.doc, &href);

        for collapse in self.doc.by_class("navbar-collapse") {
            if self.doc.has_class(collapse, "show") {
                self.doc.remove_class(collapse, "show");
            }
        }
        Flow::PREVENT
    }

    fn on_social_click(&mut self, icon: NodeId) -> Flow {
        match self.doc.attr(icon, "href") {
            Some(href) if !href.is_empty() && href != "#" => {
                self.effects.push(Effect::OpenWindow(href.to_string()));
                Flow::PREVENT
            }
            _ => Flow::NONE,
        }
    }

    fn on_phone_click(&mut self, link: NodeId) -> Flow {
        if is_mobile(&self.user_agent) {
            return Flow::NONE;
        }
        let number = self
            .doc
            .attr(link, "href")
            .unwrap_or_default()
            .trim_start_matches("tel:")
            .to_string();
        self.effects.push(Effect::Alert(format!("Позвонить по номеру: {number}")));
        Flow::PREVENT
    }

    fn on_chat_toggle(&mut self) -> Flow {
        if let Some(panel) = self.doc.by_id("chatBot") {
            self.doc.toggle_class(panel, "show");
        }
        Flow::STOP
    }

    fn on_chat_close(&mut self) -> Flow {
        if let Some(panel) = self.doc.by_id("chatBot") {
            self.doc.remove_class(panel, "show");
        }
        Flow::STOP
    }

    /// Single-open accordion: at most one answer panel exists at a time.
    fn on_faq_question(&mut self, question: NodeId) -> Flow {
        let doc = &mut self.doc;
        let already_open = doc
            .next_sibling(question)
            .is_some_and(|n| doc.has_class(n, "chat-answer"));

        for answer in doc.by_class("chat-answer") {
            doc.remove(answer);
        }
        for other in doc.by_class("chat-question") {
            doc.remove_class(other, "active");
        }
        if already_open {
            return Flow::STOP;
        }

        let item = index_attr(doc, question, FAQ_INDEX_ATTR)
            .and_then(|i| self.snapshot.as_ref()?.faq().get(i).cloned());
        let Some(item) = item else {
            return Flow::STOP;
        };

        doc.add_class(question, "active");
        let answer = doc.build(answer_block(&item));
        doc.insert_after(question, answer);
        self.timers
            .schedule(self.config.timings.scroll_into_view_ms, Task::ScrollIntoView(answer));
        Flow::STOP
    }

    fn on_dismiss_alert(&mut self, button: NodeId) -> Flow {
        if let Some(alert) = self.doc.closest_with_class(button, "alert") {
            self.doc.remove(alert);
        }
        Flow::NONE
    }

    fn on_activity_image_error(&mut self, img: NodeId) -> Flow {
        self.images.insert(img, ImageStatus::Failed);
        let src = self.doc.attr(img, "src").unwrap_or_default().to_string();
        if is_placeholder(&src) {
            return Flow::NONE;
        }
        tracing::warn!("Activity photo failed to load: {}", src);
        let index = index_attr(&self.doc, img, ACTIVITY_INDEX_ATTR).unwrap_or(usize::MAX);
        let fallback = activity_placeholder(&self.config, index);
        self.doc.set_attr(img, "src", &fallback);
        Flow::NONE
    }

    fn on_activity_image_load(&mut self, img: NodeId) -> Flow {
        self.images.insert(img, ImageStatus::Loaded);
        tracing::debug!("Activity photo loaded: {}", self.doc.attr(img, "src").unwrap_or_default());
        Flow::NONE
    }

    fn on_logo_error(&mut self, img: NodeId, height_px: u32) -> Flow {
        if self.doc.attr(img, "src").is_some_and(is_placeholder) {
            return Flow::NONE;
        }
        tracing::warn!("Logo failed to load, using placeholder");
        self.doc.set_attr(img, "src", logo_placeholder());
        self.doc.set_style(img, "height", &format!("{height_px}px"));
        Flow::NONE
    }

    /// Debounced: only the last scroll within the interval runs the nav check.
    fn on_window_scroll(&mut self) -> Flow {
        if let Some(pending) = self.spy_timer.take() {
            self.timers.cancel(pending);
        }
        self.spy_timer = Some(
            self.timers
                .schedule(self.config.timings.scroll_debounce_ms, Task::ScrollSpy),
        );
        self.reveal_in_viewport();
        Flow::NONE
    }

    pub(crate) fn update_active_nav_on_scroll(&mut self) {
        let sections: Vec<(String, LayoutBox)> = self
            .doc
            .by_tag("section")
            .into_iter()
            .filter_map(|s| Some((self.doc.attr(s, "id")?.to_string(), self.doc.layout(s)?)))
            .collect();
        let reference = self.scroll_y + self.config.timings.spy_offset_px;
        if let Some(id) = active_section(&sections, reference) {
            update_active_nav(&mut self.doc, &format!("#{id}"));
        }
    }

    /// Reveals `.fade-in` elements whose nearest laid-out box is at least 10% on screen.
    fn reveal_in_viewport(&mut self) {
        let top = self.scroll_y;
        let bottom = self.scroll_y + self.viewport_height;
        let hidden: Vec<NodeId> = self
            .doc
            .by_class("fade-in")
            .into_iter()
            .filter(|&n| !self.doc.has_class(n, "visible"))
            .collect();
        for node in hidden {
            let Some(layout) = self.nearest_layout(node) else {
                continue;
            };
            if layout.height <= 0.0 {
                continue;
            }
            let overlap = (bottom.min(layout.top + layout.height) - top.max(layout.top)).max(0.0);
            if overlap / layout.height >= 0.1 {
                self.doc.add_class(node, "visible");
            }
        }
    }

    fn nearest_layout(&self, node: NodeId) -> Option<LayoutBox> {
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(layout) = self.doc.layout(n) {
                return Some(layout);
            }
            current = self.doc.parent(n);
        }
        None
    }
}
