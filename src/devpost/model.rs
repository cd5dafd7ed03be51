use crate::error::{DevpostError, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Schemaless document shape as the backend stores it.
pub type Document = serde_json::Map<String, Value>;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Questions,
    Articles,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Questions => "questions",
            Collection::Articles => "articles",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostType {
    #[default]
    Question,
    Article,
}

impl PostType {
    pub fn collection(&self) -> Collection {
        match self {
            PostType::Question => Collection::Questions,
            PostType::Article => Collection::Articles,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostType::Question => "question",
            PostType::Article => "article",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PostType {
    type Err = DevpostError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "question" => Ok(PostType::Question),
            "article" => Ok(PostType::Article),
            other => Err(DevpostError::Api(format!("Unknown post type: {}", other))),
        }
    }
}

/// Backend-assigned identifier. Only persisted records have one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted document together with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub data: Document,
}

impl Record {
    pub fn new(id: RecordId, data: Document) -> Self {
        Self { id, data }
    }
}

/// Tags as found in stored documents.
///
/// The backend enforces no schema, so a document may carry the free text the
/// user typed (`"css, web"`), a list of strings, or something else entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    Multiple(Vec<String>),
    Single(String),
    Malformed(Value),
}

impl Default for Tags {
    fn default() -> Self {
        Tags::Single(String::new())
    }
}

impl Tags {
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None => Tags::Malformed(Value::Null),
            Some(v) => serde_json::from_value(v.clone())
                .unwrap_or_else(|_| Tags::Malformed(v.clone())),
        }
    }

    /// Collapses the single-string form into a one-element list.
    ///
    /// Substring matching on the lone element is the same as matching on the
    /// whole string, so callers only need to handle `Multiple` and `Malformed`.
    pub fn normalize(self) -> Self {
        match self {
            Tags::Single(s) => Tags::Multiple(vec![s]),
            other => other,
        }
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tags::Multiple(list) => f.write_str(&list.join(", ")),
            Tags::Single(s) => f.write_str(s),
            // Nothing sensible to show for a shape we could not read.
            Tags::Malformed(_) => Ok(()),
        }
    }
}

/// Fields shared by both post variants, used by filtering.
pub trait Post {
    fn id(&self) -> &RecordId;
    fn title(&self) -> &str;
    fn tags(&self) -> &Tags;
    fn date(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: RecordId,
    pub title: String,
    pub description: String,
    pub tags: Tags,
    pub date: String,
}

impl Question {
    pub fn from_record(record: &Record) -> Self {
        let doc = &record.data;
        Self {
            id: record.id.clone(),
            title: text(doc, "title"),
            description: text(doc, "description"),
            tags: Tags::from_value(doc.get("tags")).normalize(),
            date: text(doc, "date"),
        }
    }
}

impl Post for Question {
    fn id(&self) -> &RecordId {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn tags(&self) -> &Tags {
        &self.tags
    }
    fn date(&self) -> &str {
        &self.date
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: RecordId,
    pub title: String,
    pub abstract_text: String,
    pub article_text: String,
    pub tags: Tags,
    pub date: String,
    /// Empty when no image was uploaded.
    pub image_url: String,
    /// Blob path of the uploaded image, used to clean it up on delete.
    pub image_path: Option<String>,
}

impl Article {
    pub fn from_record(record: &Record) -> Self {
        let doc = &record.data;
        let image_path = text(doc, "imagePath");
        Self {
            id: record.id.clone(),
            title: text(doc, "title"),
            abstract_text: text(doc, "abstract"),
            article_text: text(doc, "articleText"),
            tags: Tags::from_value(doc.get("tags")).normalize(),
            date: text(doc, "date"),
            image_url: text(doc, "imageURL"),
            image_path: (!image_path.is_empty()).then_some(image_path),
        }
    }
}

impl Post for Article {
    fn id(&self) -> &RecordId {
        &self.id
    }
    fn title(&self) -> &str {
        &self.title
    }
    fn tags(&self) -> &Tags {
        &self.tags
    }
    fn date(&self) -> &str {
        &self.date
    }
}

// Missing or non-string fields read as empty text.
fn text(doc: &Document, key: &str) -> String {
    doc.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Current UTC calendar date, the date half of an ISO-8601 timestamp.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, data: Value) -> Record {
        match data {
            Value::Object(map) => Record::new(RecordId::new(id), map),
            _ => panic!("record data must be an object"),
        }
    }

    #[test]
    fn tags_decode_each_stored_shape() {
        assert_eq!(
            Tags::from_value(Some(&json!(["Java", "Web"]))),
            Tags::Multiple(vec!["Java".into(), "Web".into()])
        );
        assert_eq!(
            Tags::from_value(Some(&json!("Java, Web"))),
            Tags::Single("Java, Web".into())
        );
        assert_eq!(Tags::from_value(Some(&json!(42))), Tags::Malformed(json!(42)));
        assert_eq!(
            Tags::from_value(Some(&json!(["Java", 7]))),
            Tags::Malformed(json!(["Java", 7]))
        );
        assert_eq!(Tags::from_value(None), Tags::Malformed(Value::Null));
    }

    #[test]
    fn malformed_tags_display_as_empty() {
        assert_eq!(Tags::Malformed(json!(42)).to_string(), "");
        assert_eq!(Tags::Malformed(json!({ "not": "a list" })).to_string(), "");
        assert_eq!(Tags::Malformed(Value::Null).to_string(), "");
        assert_eq!(
            Tags::Multiple(vec!["java".into(), "web".into()]).to_string(),
            "java, web"
        );
    }

    #[test]
    fn normalize_wraps_single_string() {
        let tags = Tags::Single("css,web".into()).normalize();
        assert_eq!(tags, Tags::Multiple(vec!["css,web".into()]));
        assert_eq!(tags.to_string(), "css,web");
    }

    #[test]
    fn question_from_record_tolerates_missing_fields() {
        let q = Question::from_record(&record("q1", json!({ "title": "Only a title" })));
        assert_eq!(q.id.as_str(), "q1");
        assert_eq!(q.title, "Only a title");
        assert_eq!(q.description, "");
        assert_eq!(q.date, "");
        assert_eq!(q.tags, Tags::Malformed(Value::Null));
    }

    #[test]
    fn article_from_record_reads_image_fields() {
        let a = Article::from_record(&record(
            "a1",
            json!({
                "title": "Rust",
                "abstract": "short",
                "articleText": "long",
                "tags": "rust",
                "date": "2024-05-01",
                "imageURL": "https://cdn/articles/images/x",
                "imagePath": "articles/images/x",
            }),
        ));
        assert_eq!(a.abstract_text, "short");
        assert_eq!(a.article_text, "long");
        assert_eq!(a.image_url, "https://cdn/articles/images/x");
        assert_eq!(a.image_path.as_deref(), Some("articles/images/x"));

        let plain = Article::from_record(&record("a2", json!({ "imageURL": "" })));
        assert_eq!(plain.image_url, "");
        assert_eq!(plain.image_path, None);
    }

    #[test]
    fn post_type_parses_case_insensitively() {
        assert_eq!("Article".parse::<PostType>().unwrap(), PostType::Article);
        assert_eq!(
            "question".parse::<PostType>().unwrap().collection(),
            Collection::Questions
        );
        assert!("poll".parse::<PostType>().is_err());
    }

    #[test]
    fn format_date_is_iso_calendar_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(format_date(date), "2024-03-07");
    }
}
