//! Page skeleton.
//! The static markup the render routines and handlers expect: named info fields, the
//! card/review/FAQ containers with their loading placeholders, navigation, carousel,
//! contact links, footer and the chat widget. Sections carry fixed layout boxes.

use crate::dom::{Document, El};

/// Section ids with their layout (top, height), in document order.
pub const SECTIONS: &[(&str, f64, f64)] = &[
    ("home", 0.0, 700.0),
    ("about", 700.0, 600.0),
    ("activities", 1300.0, 900.0),
    ("reviews", 2200.0, 600.0),
    ("contacts", 2800.0, 500.0),
];

fn loading_placeholder() -> El {
    El::new("div")
        .class("text-center")
        .child(El::new("div").class("loader"))
        .child(El::new("p").text("Загрузка..."))
}

fn nav() -> El {
    let links = SECTIONS.iter().map(|(id, _, _)| {
        El::new("li").class("nav-item").child(
            El::new("a")
                .class("nav-link")
                .attr("href", &format!("#{id}"))
                .text(id),
        )
    });
    El::new("nav")
        .class("navbar navbar-expand-lg fixed-top")
        .child(
            El::new("a")
                .class("navbar-brand")
                .attr("href", "#home")
                .child(El::new("img").class("header-logo").attr("src", "assets/logo.png").attr("alt", "EnglishTopia")),
        )
        .child(El::new("button").class("navbar-toggler").attr("type", "button"))
        .child(
            El::new("div")
                .class("collapse navbar-collapse")
                .child(El::new("ul").class("navbar-nav").children(links)),
        )
}

fn section(id: &str) -> El {
    let (top, height) = SECTIONS
        .iter()
        .find(|(s, _, _)| *s == id)
        .map_or((0.0, 0.0), |&(_, top, height)| (top, height));
    El::new("section").id(id).layout(top, height)
}

fn social_link(id: &str, icon: &str) -> El {
    El::new("a")
        .id(id)
        .class("social-icon")
        .attr("href", "#")
        .child(El::new("i").class(&format!("bi {icon}")))
}

/// Builds the full page skeleton.
pub fn page_skeleton() -> Document {
    let mut doc = Document::new();
    let head = doc.head();
    doc.append(head, El::new("meta").attr("charset", "utf-8"));
    doc.append(head, El::new("title").text("EnglishTopia"));

    let body = doc.body();
    doc.append(body, nav());

    doc.append(
        body,
        section("home").class("hero-section").children(vec![
            El::new("h1").id("campName").class("fade-in"),
            El::new("p").id("campTagline").class("fade-in"),
            El::new("p").id("campSubtitle").class("fade-in"),
            El::new("p").id("nextSession").class("fade-in badge"),
            El::new("div")
                .id("campCarousel")
                .class("carousel slide")
                .child(El::new("div").id("carouselItems").class("carousel-inner")),
        ]),
    );

    doc.append(
        body,
        section("about").children(vec![
            El::new("p").id("campDescription"),
            El::new("div").id("whyUsContainer").class("row").child(loading_placeholder()),
        ]),
    );

    doc.append(
        body,
        section("activities").child(
            El::new("div").id("activitiesContainer").class("row").child(loading_placeholder()),
        ),
    );

    doc.append(
        body,
        section("reviews").child(
            El::new("div").id("reviewsContainer").class("row").child(loading_placeholder()),
        ),
    );

    doc.append(
        body,
        section("contacts").children(vec![
            El::new("a").id("phone1").attr("href", "tel:"),
            El::new("a").id("phone2").attr("href", "tel:"),
            El::new("p").id("address"),
            El::new("p").id("email"),
            El::new("p").id("socialText"),
            social_link("vkLink", "bi-chat"),
            social_link("whatsappLink", "bi-whatsapp"),
            social_link("telegramLink", "bi-telegram"),
        ]),
    );

    doc.append(
        body,
        El::new("footer").children(vec![
            El::new("img").class("footer-logo").attr("src", "assets/logo.png").attr("alt", "EnglishTopia"),
            social_link("footerVkLink", "bi-chat"),
            social_link("footerWhatsappLink", "bi-whatsapp"),
            social_link("footerTelegramLink", "bi-telegram"),
        ]),
    );

    doc.append(
        body,
        El::new("button")
            .id("openChatBot")
            .class("chat-bot-toggle")
            .child(El::new("i").class("bi bi-chat-dots")),
    );
    doc.append(
        body,
        El::new("div").id("chatBot").class("chat-bot").children(vec![
            El::new("div")
                .class("chat-bot-header")
                .child(El::new("span").text("Вопросы и ответы"))
                .child(El::new("button").id("closeChatBot").class("btn-close")),
            El::new("div").id("chatBotBody").class("chat-bot-body"),
        ]),
    );

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skeleton_has_render_targets() {
        let doc = page_skeleton();
        for id in [
            "campName",
            "whyUsContainer",
            "activitiesContainer",
            "reviewsContainer",
            "chatBotBody",
            "carouselItems",
            "footerTelegramLink",
            "openChatBot",
        ] {
            assert!(doc.by_id(id).is_some(), "missing #{id}");
        }
        assert_eq!(doc.by_class("loader").len(), 3);
    }

    #[test]
    fn test_sections_carry_layout() {
        let doc = page_skeleton();
        let sections = doc.by_tag("section");
        assert_eq!(sections.len(), SECTIONS.len());
        let about = doc.by_id("about").unwrap();
        assert_eq!(doc.layout(about).map(|l| l.top), Some(700.0));
    }
}
