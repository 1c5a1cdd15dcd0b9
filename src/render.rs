//! Render dispatcher.
//! Maps a loaded `SiteData` snapshot onto the page: info fields, feature cards, activity
//! cards, reviews, chat FAQ and footer links, then hides the loading placeholders.
//! Every routine looks up its own container and quietly does nothing if the container or
//! its data fragment is missing. List routines clear their container first, so calling
//! them again replaces the previous items instead of duplicating them.

use crate::config::SiteConfig;
use crate::data::{Activity, FaqItem, FeatureCard, Info, Review, SiteData};
use crate::dom::{Document, El, NodeId};
use crate::placeholder::activity_placeholder;
use crate::timers::{Task, TimerQueue};

pub const WHY_US_CONTAINER: &str = "whyUsContainer";
pub const ACTIVITIES_CONTAINER: &str = "activitiesContainer";
pub const REVIEWS_CONTAINER: &str = "reviewsContainer";
pub const CHAT_BODY: &str = "chatBotBody";

/// Attribute carrying an activity's position, read back by the image error handler.
pub const ACTIVITY_INDEX_ATTR: &str = "data-activity-index";
/// Attribute carrying a FAQ entry's position, read back by the question handler.
pub const FAQ_INDEX_ATTR: &str = "data-faq-index";

const SOCIAL_HANDLES: [&str; 2] = ["VK: englishtopia", "Telegram: EnglishTopiaproject"];

/// Renders every page region from `data`.
pub fn render_all(doc: &mut Document, data: &SiteData, config: &SiteConfig, timers: &mut TimerQueue) {
    update_main_info(doc, &data.info);
    if let Some(cards) = &data.cards.why_us {
        render_why_us(doc, cards, config, timers);
    }
    if let Some(activities) = &data.cards.activities {
        render_activities(doc, activities, config, timers);
    }
    if let Some(reviews) = &data.reviews.reviews {
        render_reviews(doc, reviews, config, timers);
    }
    if let Some(faq) = &data.schedule.faq {
        render_chat_faq(doc, faq);
    }
    update_footer(doc, &data.info);
    hide_loaders(doc);
}

fn set_text_by_id(doc: &mut Document, id: &str, text: &str) {
    if let Some(node) = doc.by_id(id) {
        doc.set_text(node, text);
    }
}

fn set_href_by_id(doc: &mut Document, id: &str, href: &str) {
    if let Some(node) = doc.by_id(id) {
        doc.set_attr(node, "href", href);
    }
}

/// Dialable form of a phone label: digits and a leading plus.
fn tel_href(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .enumerate()
        .filter(|&(i, c)| c.is_ascii_digit() || (i == 0 && c == '+'))
        .map(|(_, c)| c)
        .collect();
    format!("tel:{digits}")
}

pub fn update_main_info(doc: &mut Document, info: &Info) {
    set_text_by_id(doc, "campName", &info.camp_name);
    set_text_by_id(doc, "campTagline", &info.tagline);
    set_text_by_id(doc, "campSubtitle", &info.subtitle);
    set_text_by_id(doc, "campDescription", &info.description);
    set_text_by_id(doc, "nextSession", &format!("Следующая смена: {}", info.next_session));

    for (id, phone) in [("phone1", &info.phone1), ("phone2", &info.phone2)] {
        set_text_by_id(doc, id, phone);
        set_href_by_id(doc, id, &tel_href(phone));
    }
    set_text_by_id(doc, "address", &info.address);
    set_text_by_id(doc, "email", &format!("Email: {}", info.email));

    if let Some(social) = doc.by_id("socialText") {
        doc.clear_children(social);
        let first = doc.create_text(SOCIAL_HANDLES[0]);
        let br = doc.create_element("br");
        let second = doc.create_text(SOCIAL_HANDLES[1]);
        for node in [first, br, second] {
            doc.append_child(social, node);
        }
    }

    set_href_by_id(doc, "vkLink", &info.vk_link);
    set_href_by_id(doc, "whatsappLink", &info.whatsapp_link);
    set_href_by_id(doc, "telegramLink", &info.telegram_link);
}

/// Footer social links mirror the contact links.
pub fn update_footer(doc: &mut Document, info: &Info) {
    set_href_by_id(doc, "footerVkLink", &info.vk_link);
    set_href_by_id(doc, "footerWhatsappLink", &info.whatsapp_link);
    set_href_by_id(doc, "footerTelegramLink", &info.telegram_link);
}

/// Clears `id` and appends one block per item; returns the inserted blocks.
fn rebuild_container(doc: &mut Document, id: &str, blocks: impl IntoIterator<Item = El>) -> Option<Vec<NodeId>> {
    let container = doc.by_id(id)?;
    doc.clear_children(container);
    Some(blocks.into_iter().map(|block| doc.append(container, block)).collect())
}

fn schedule_reveal(config: &SiteConfig, timers: &mut TimerQueue) {
    timers.schedule(config.timings.settle_ms, Task::RevealPending);
}

fn feature_card_block(card: &FeatureCard) -> El {
    let animation = card.animation.as_deref().unwrap_or_default();
    El::new("div").class("col-md-4 mb-4 fade-in").child(
        El::new("div")
            .class("card border-0 shadow pastel-orange card-hover")
            .class(animation)
            .class("h-100")
            .child(
                El::new("div")
                    .class("card-body text-center p-4")
                    .child(
                        El::new("div")
                            .class("card-icon display-1 mb-3")
                            .child(El::new("i").class(&format!("bi {}", card.icon))),
                    )
                    .child(El::new("h4").class("card-title").text(&card.title))
                    .child(El::new("p").class("card-text").text(&card.description)),
            ),
    )
}

pub fn render_why_us(doc: &mut Document, cards: &[FeatureCard], config: &SiteConfig, timers: &mut TimerQueue) {
    if rebuild_container(doc, WHY_US_CONTAINER, cards.iter().map(feature_card_block)).is_some() {
        schedule_reveal(config, timers);
    }
}

/// Photo for the activity at `index`, or its generated placeholder past the photo list.
pub fn activity_photo(config: &SiteConfig, index: usize) -> String {
    config
        .activity_photo_path(index)
        .unwrap_or_else(|| activity_placeholder(config, index))
}

fn activity_block(config: &SiteConfig, index: usize, activity: &Activity) -> El {
    El::new("div").class("col-md-4 col-sm-6 mb-4 fade-in").child(
        El::new("div")
            .class("card border-0 shadow card-hover h-100 activity-card")
            .child(
                El::new("div").class("activity-image-container").child(
                    El::new("img")
                        .attr("src", &activity_photo(config, index))
                        .attr("alt", &activity.title)
                        .attr(ACTIVITY_INDEX_ATTR, &index.to_string())
                        .class("activity-image"),
                ),
            )
            .child(
                El::new("div")
                    .class("activity-content")
                    .child(
                        El::new("div")
                            .class("card-icon mb-2")
                            .child(El::new("i").class(&format!("bi {} fs-2", activity.icon))),
                    )
                    .child(El::new("h4").class("activity-title").text(&activity.title))
                    .child(El::new("p").class("activity-description").text(&activity.description)),
            ),
    )
}

pub fn render_activities(doc: &mut Document, activities: &[Activity], config: &SiteConfig, timers: &mut TimerQueue) {
    let blocks = activities
        .iter()
        .enumerate()
        .map(|(i, activity)| activity_block(config, i, activity));
    if rebuild_container(doc, ACTIVITIES_CONTAINER, blocks).is_some() {
        schedule_reveal(config, timers);
    }
}

fn review_block(review: &Review) -> El {
    let mut body = El::new("div")
        .class("card-body p-4")
        .child(El::new("p").class("card-text").text(&format!("\"{}\"", review.text)))
        .child(El::new("div").class("mt-3 fw-bold").text(&format!("— {}", review.author)));
    if let Some(date) = review.date.as_deref().filter(|d| !d.is_empty()) {
        body = body.child(El::new("small").class("text-muted").text(date));
    }
    El::new("div").class("col-lg-6 mb-4 fade-in").child(
        El::new("div")
            .class("review-card card pastel-peach border-0 shadow-sm h-100")
            .child(body),
    )
}

pub fn render_reviews(doc: &mut Document, reviews: &[Review], config: &SiteConfig, timers: &mut TimerQueue) {
    if rebuild_container(doc, REVIEWS_CONTAINER, reviews.iter().map(review_block)).is_some() {
        schedule_reveal(config, timers);
    }
}

fn question_block(index: usize, item: &FaqItem) -> El {
    El::new("button")
        .class("chat-question")
        .attr(FAQ_INDEX_ATTR, &index.to_string())
        .child(
            El::new("div")
                .class("d-flex justify-content-between align-items-center")
                .child(El::new("span").text(&item.question))
                .child(El::new("i").class("bi bi-chevron-right")),
        )
}

/// One question button per FAQ entry plus a usage hint; answers appear on click.
pub fn render_chat_faq(doc: &mut Document, faq: &[FaqItem]) {
    let hint = El::new("div")
        .class("chat-bot-hint")
        .child(El::new("i").class("bi bi-info-circle me-1"))
        .text(" Нажмите на вопрос, чтобы увидеть ответ");
    let blocks = faq
        .iter()
        .enumerate()
        .map(|(i, item)| question_block(i, item))
        .chain(std::iter::once(hint));
    rebuild_container(doc, CHAT_BODY, blocks);
}

/// The expanded answer panel for a FAQ entry.
pub fn answer_block(item: &FaqItem) -> El {
    El::new("div")
        .class("chat-answer")
        .child(El::new("h6").text(&item.question))
        .child(El::new("p").text(&item.answer))
}

pub fn hide_loaders(doc: &mut Document) {
    for loader in doc.by_class("loader") {
        doc.set_style(loader, "display", "none");
    }
    for id in [WHY_US_CONTAINER, ACTIVITIES_CONTAINER, REVIEWS_CONTAINER] {
        let Some(container) = doc.by_id(id) else {
            continue;
        };
        for child in doc.child_elements(container) {
            if doc.tag(child) == Some("div") && doc.has_class(child, "text-center") {
                doc.set_style(child, "display", "none");
            }
        }
    }
}

/// Staggers every `.fade-in` element that is not yet `.visible`.
pub fn stagger_pending_reveals(doc: &Document, config: &SiteConfig, timers: &mut TimerQueue) {
    let pending = doc
        .by_class("fade-in")
        .into_iter()
        .filter(|&n| !doc.has_class(n, "visible"));
    for (i, node) in pending.enumerate() {
        timers.schedule(i as u64 * config.timings.stagger_ms, Task::Reveal(node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::page_skeleton;

    fn activities(n: usize) -> Vec<Activity> {
        (0..n)
            .map(|i| Activity {
                icon: "bi-star".to_string(),
                title: format!("Activity {i}"),
                description: "desc".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_info_fields_and_composite_labels() {
        let mut doc = page_skeleton();
        let info = Info {
            camp_name: "EnglishTopia".to_string(),
            next_session: "1 июля".to_string(),
            email: "camp@example.com".to_string(),
            phone1: "+7 (900) 123-45-67".to_string(),
            vk_link: "https://vk.com/englishtopia".to_string(),
            ..Info::default()
        };
        update_main_info(&mut doc, &info);
        update_footer(&mut doc, &info);

        let text = |doc: &Document, id: &str| doc.text_content(doc.by_id(id).unwrap());
        assert_eq!(text(&doc, "campName"), "EnglishTopia");
        assert_eq!(text(&doc, "nextSession"), "Следующая смена: 1 июля");
        assert_eq!(text(&doc, "email"), "Email: camp@example.com");
        let phone = doc.by_id("phone1").unwrap();
        assert_eq!(doc.attr(phone, "href"), Some("tel:+79001234567"));
        let footer_vk = doc.by_id("footerVkLink").unwrap();
        assert_eq!(doc.attr(footer_vk, "href"), Some("https://vk.com/englishtopia"));
        let social = doc.by_id("socialText").unwrap();
        assert_eq!(doc.by_tag("br").iter().filter(|&&b| doc.contains(social, b)).count(), 1);
    }

    #[test]
    fn test_missing_elements_are_skipped() {
        let mut doc = Document::new();
        update_main_info(&mut doc, &Info::default());
        render_chat_faq(&mut doc, &[]);
        let mut timers = TimerQueue::new();
        render_why_us(&mut doc, &[FeatureCard::default()], &SiteConfig::default(), &mut timers);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_activity_past_photo_list_gets_placeholder() {
        let config = SiteConfig::default();
        let mut doc = page_skeleton();
        let mut timers = TimerQueue::new();
        render_activities(&mut doc, &activities(8), &config, &mut timers);

        let images = doc.by_class("activity-image");
        assert_eq!(images.len(), 8);
        assert_eq!(doc.attr(images[5], "src"), Some("assets/photos/activity-team.jpg"));
        let src = doc.attr(images[6], "src").unwrap();
        assert_eq!(src, activity_placeholder(&config, 6));
        assert!(!config.activity_photos.iter().any(|p| src.contains(&p.file)));
    }

    #[test]
    fn test_list_render_is_idempotent() {
        let config = SiteConfig::default();
        let mut doc = page_skeleton();
        let mut timers = TimerQueue::new();
        let reviews = vec![Review::default(), Review::default(), Review::default()];
        render_reviews(&mut doc, &reviews, &config, &mut timers);
        render_reviews(&mut doc, &reviews, &config, &mut timers);
        let container = doc.by_id(REVIEWS_CONTAINER).unwrap();
        assert_eq!(doc.child_elements(container).len(), 3);
        assert_eq!(doc.by_class("review-card").len(), 3);
    }

    #[test]
    fn test_review_date_rendered_only_when_present() {
        let config = SiteConfig::default();
        let mut doc = page_skeleton();
        let mut timers = TimerQueue::new();
        let reviews = vec![
            Review {
                text: "Отлично".to_string(),
                author: "Мария".to_string(),
                date: Some("Июль 2024".to_string()),
            },
            Review {
                text: "Хорошо".to_string(),
                author: "Иван".to_string(),
                date: None,
            },
        ];
        render_reviews(&mut doc, &reviews, &config, &mut timers);
        let dates = doc.by_class("text-muted");
        assert_eq!(dates.len(), 1);
        assert_eq!(doc.text_content(dates[0]), "Июль 2024");
        let cards = doc.by_class("review-card");
        assert!(doc.text_content(cards[1]).contains("— Иван"));
    }

    #[test]
    fn test_chat_faq_renders_questions_without_answers() {
        let mut doc = page_skeleton();
        let faq = vec![
            FaqItem { question: "Q1".to_string(), answer: "A1".to_string() },
            FaqItem { question: "Q2".to_string(), answer: "A2".to_string() },
        ];
        render_chat_faq(&mut doc, &faq);
        render_chat_faq(&mut doc, &faq);
        assert_eq!(doc.by_class("chat-question").len(), 2);
        assert_eq!(doc.by_class("chat-bot-hint").len(), 1);
        assert!(doc.by_class("chat-answer").is_empty());
    }

    #[test]
    fn test_feature_card_animation_class() {
        let config = SiteConfig::default();
        let mut doc = page_skeleton();
        let mut timers = TimerQueue::new();
        let cards = vec![FeatureCard {
            icon: "bi-star".to_string(),
            title: "T".to_string(),
            description: "D".to_string(),
            animation: Some("bounce".to_string()),
        }];
        render_why_us(&mut doc, &cards, &config, &mut timers);
        assert_eq!(doc.by_class("bounce").len(), 1);
        assert!(timers.is_scheduled(&Task::RevealPending));
    }

    #[test]
    fn test_stagger_uses_index_delay() {
        let config = SiteConfig::default();
        let mut doc = page_skeleton();
        let mut timers = TimerQueue::new();
        render_activities(&mut doc, &activities(2), &config, &mut timers);
        let mut timers = TimerQueue::new();
        stagger_pending_reveals(&doc, &config, &mut timers);
        let pending = doc.by_class("fade-in").len();
        assert_eq!(timers.pending(), pending);
        let mut fired = Vec::new();
        while let Some(task) = timers.pop_due(u64::MAX) {
            fired.push((timers.now(), task));
        }
        assert_eq!(fired[0].0, 0);
        assert_eq!(fired[1].0, config.timings.stagger_ms);
    }

    #[test]
    fn test_hide_loaders() {
        let mut doc = page_skeleton();
        hide_loaders(&mut doc);
        for loader in doc.by_class("loader") {
            assert_eq!(doc.style(loader, "display").as_deref(), Some("none"));
        }
    }
}
