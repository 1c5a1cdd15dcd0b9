//! Site documents as loaded from the backend directory.
//! Scalar fields default to empty strings so an entry with a missing field still renders.
//! An explicit `null` in a text field is read as an empty string as well, so one bad entry
//! does not fail the batch.
//! List fragments are optional: an absent fragment turns its render routine into a no-op.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Info {
    #[serde(deserialize_with = "null_as_empty")]
    pub camp_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub tagline: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub subtitle: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub next_session: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone1: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub phone2: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub address: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub vk_link: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub whatsapp_link: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub telegram_link: String,
}

/// A "why us" feature card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureCard {
    #[serde(deserialize_with = "null_as_empty")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    /// Extra animation class, e.g. `bounce`.
    pub animation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    #[serde(deserialize_with = "null_as_empty")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cards {
    #[serde(default)]
    pub why_us: Option<Vec<FeatureCard>>,
    #[serde(default)]
    pub activities: Option<Vec<Activity>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    #[serde(deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub author: String,
    pub date: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reviews {
    #[serde(default)]
    pub reviews: Option<Vec<Review>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqItem {
    #[serde(deserialize_with = "null_as_empty")]
    pub question: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub answer: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub faq: Option<Vec<FaqItem>>,
}

/// Immutable snapshot of one successful batch load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SiteData {
    pub info: Info,
    pub cards: Cards,
    pub reviews: Reviews,
    pub schedule: Schedule,
}

impl SiteData {
    pub fn why_us(&self) -> &[FeatureCard] {
        self.cards.why_us.as_deref().unwrap_or_default()
    }

    pub fn activities(&self) -> &[Activity] {
        self.cards.activities.as_deref().unwrap_or_default()
    }

    pub fn reviews(&self) -> &[Review] {
        self.reviews.reviews.as_deref().unwrap_or_default()
    }

    pub fn faq(&self) -> &[FaqItem] {
        self.schedule.faq.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_uses_camel_case_keys() {
        let info: Info = serde_json::from_str(
            r#"{"campName": "EnglishTopia", "nextSession": "1 июля", "vkLink": "https://vk.com/x"}"#,
        )
        .unwrap();
        assert_eq!(info.camp_name, "EnglishTopia");
        assert_eq!(info.next_session, "1 июля");
        assert_eq!(info.vk_link, "https://vk.com/x");
        assert_eq!(info.phone1, "");
    }

    #[test]
    fn test_missing_fragments_are_none() {
        let cards: Cards = serde_json::from_str(r#"{"whyUs": []}"#).unwrap();
        assert_eq!(cards.why_us, Some(vec![]));
        assert!(cards.activities.is_none());
        let schedule: Schedule = serde_json::from_str("{}").unwrap();
        assert!(schedule.faq.is_none());
    }

    #[test]
    fn test_null_text_fields_read_as_empty() {
        let card: FeatureCard =
            serde_json::from_str(r#"{"icon": "bi-star", "title": null, "description": "D"}"#).unwrap();
        assert_eq!(card.title, "");
        assert_eq!(card.description, "D");
        let info: Info = serde_json::from_str(r#"{"campName": null, "email": "a@b.ru"}"#).unwrap();
        assert_eq!(info.camp_name, "");
        assert_eq!(info.email, "a@b.ru");
    }

    #[test]
    fn test_review_date_is_optional() {
        let reviews: Reviews = serde_json::from_str(
            r#"{"reviews": [{"text": "Супер", "author": "Анна"}, {"text": "Ок", "author": "Олег", "date": "2024"}]}"#,
        )
        .unwrap();
        let list = reviews.reviews.unwrap();
        assert_eq!(list[0].date, None);
        assert_eq!(list[1].date.as_deref(), Some("2024"));
    }
}
