//! Draft state for the creation view.
//!
//! A single draft backs both the question and the article form, so switching
//! the post type keeps whatever was typed. Nothing is validated here: an
//! empty title is a perfectly valid submission.

use super::submit;
use super::CmdResult;
use crate::error::{DevpostError, Result};
use crate::gateway::Gateway;
use crate::model::PostType;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Abstract,
    ArticleText,
    Tags,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Abstract => "abstract",
            Field::ArticleText => "articleText",
            Field::Tags => "tags",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = DevpostError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "title" => Ok(Field::Title),
            "description" => Ok(Field::Description),
            "abstract" => Ok(Field::Abstract),
            "articleText" | "article-text" => Ok(Field::ArticleText),
            "tags" => Ok(Field::Tags),
            other => Err(DevpostError::Api(format!("Unknown form field: {}", other))),
        }
    }
}

/// An image picked for upload with an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageAttachment {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }
}

/// Unpersisted post being edited. Has no id and no date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub abstract_text: String,
    pub article_text: String,
    /// Free text as typed, e.g. `"css, web"`.
    pub tags: String,
    pub image: Option<ImageAttachment>,
}

impl Draft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Description => &self.description,
            Field::Abstract => &self.abstract_text,
            Field::ArticleText => &self.article_text,
            Field::Tags => &self.tags,
        }
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.title,
            Field::Description => &mut self.description,
            Field::Abstract => &mut self.abstract_text,
            Field::ArticleText => &mut self.article_text,
            Field::Tags => &mut self.tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Draft::default()
    }
}

/// The creation form: a post type and the draft behind it.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    post_type: PostType,
    draft: Draft,
}

impl PostForm {
    pub fn new(post_type: PostType) -> Self {
        Self {
            post_type,
            draft: Draft::default(),
        }
    }

    pub fn post_type(&self) -> PostType {
        self.post_type
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn select(&mut self, post_type: PostType) {
        self.post_type = post_type;
    }

    /// Overwrites exactly one field.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        *self.draft.slot(field) = value.into();
    }

    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = name.parse::<Field>()?;
        self.set_field(field, value);
        Ok(())
    }

    pub fn attach_image(&mut self, image: ImageAttachment) {
        self.draft.image = Some(image);
    }

    pub fn reset(&mut self) {
        self.draft = Draft::default();
    }

    /// Submit the draft; it is cleared only when the record was written.
    pub fn submit<G: Gateway>(&mut self, gateway: &G, today: NaiveDate) -> Result<CmdResult> {
        let result = submit::run(gateway, &self.draft, self.post_type, today)?;
        self.reset();
        Ok(result)
    }
}
