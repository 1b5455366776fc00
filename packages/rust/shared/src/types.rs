//! Core domain types for storyfeed.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// StoryId
// ---------------------------------------------------------------------------

/// Stable identifier of a ranked story (the upstream item id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryId(pub u64);

impl std::fmt::Display for StoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StoryId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<u64> for StoryId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

/// A persisted story record.
///
/// Field names match the on-disk document, so files written by earlier runs
/// load unchanged. Derived fields are only present when the corresponding
/// step succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique key within the record set.
    pub id: StoryId,
    /// Original title.
    #[serde(default)]
    pub title: String,
    /// Link to the story's page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Localized title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewritten_title: Option<String>,
    /// Localized body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewritten_content: Option<String>,
    /// Page text as fetched, before rewriting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_content: Option<String>,
}

// ---------------------------------------------------------------------------
// StoryDetails
// ---------------------------------------------------------------------------

/// Metadata for a ranked story, as reported by the id source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDetails {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl StoryDetails {
    /// The link, if present and not blank.
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }
}

// ---------------------------------------------------------------------------
// CrawledPage
// ---------------------------------------------------------------------------

/// One result of a multi-URL crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledPage {
    /// The URL as requested.
    pub url: String,
    /// Normalized text content; `None` when nothing could be extracted.
    pub content: Option<String>,
}

impl CrawledPage {
    /// Content with surrounding whitespace removed, or `None` if there is none.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_id_roundtrip() {
        let id: StoryId = "42017653".parse().expect("parse StoryId");
        assert_eq!(id, StoryId(42017653));
        assert_eq!(id.to_string(), "42017653");
    }

    #[test]
    fn story_uses_document_field_names() {
        let story = Story {
            id: StoryId(7),
            title: "Show HN: a thing".into(),
            url: Some("https://example.com".into()),
            rewritten_title: Some("展示：一个东西".into()),
            rewritten_content: Some("正文".into()),
            original_content: Some("body".into()),
        };

        let json = serde_json::to_value(&story).expect("serialize");
        assert_eq!(json["id"], 7);
        assert_eq!(json["rewritten_title"], "展示：一个东西");
        assert_eq!(json["original_content"], "body");
    }

    #[test]
    fn story_without_derived_fields_loads() {
        let story: Story = serde_json::from_str(r#"{"id": 1, "title": "Ask HN"}"#)
            .expect("deserialize minimal story");
        assert_eq!(story.id, StoryId(1));
        assert!(story.url.is_none());
        assert!(story.rewritten_content.is_none());

        let json = serde_json::to_string(&story).expect("serialize");
        assert!(!json.contains("rewritten_title"));
    }

    #[test]
    fn details_ignore_unknown_fields() {
        let json = r#"{"by":"pg","id":8863,"kids":[8952],"score":111,"time":1175714200,
            "title":"My YC app: Dropbox","type":"story","url":"http://www.getdropbox.com/u/2/screencast.html"}"#;
        let details: StoryDetails = serde_json::from_str(json).expect("deserialize item");
        assert_eq!(details.id, StoryId(8863));
        assert_eq!(
            details.usable_url(),
            Some("http://www.getdropbox.com/u/2/screencast.html")
        );
    }

    #[test]
    fn blank_url_is_not_usable() {
        let details = StoryDetails {
            id: StoryId(1),
            title: "Ask HN: anything".into(),
            url: Some("   ".into()),
        };
        assert!(details.usable_url().is_none());
    }

    #[test]
    fn crawled_page_text_treats_whitespace_as_empty() {
        let page = CrawledPage {
            url: "https://example.com".into(),
            content: Some("\n  \n".into()),
        };
        assert!(page.text().is_none());
    }
}
