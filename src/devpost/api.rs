//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for UI clients.
//!
//! ## Role and Responsibilities
//!
//! - **Owns the gateway**: commands receive it explicitly, never globally.
//! - **Supplies the clock**: submissions are dated here.
//! - **Reports failures**: user actions (submit, delete) never fail outright;
//!   an error becomes an error [`CmdMessage`](crate::commands::CmdMessage)
//!   carrying the cause, and the draft or list is left as it was.
//!
//! Opening a list returns a `Result`: there is no list to show if the fetch
//! failed, and the UI decides how to say so.
//!
//! ## Generic Over Gateway
//!
//! - Production: `DevpostApi<FsGateway>`
//! - Testing: `DevpostApi<MemGateway>`

use crate::commands::articles::ArticleBoard;
use crate::commands::config::{self, ConfigAction};
use crate::commands::form::PostForm;
use crate::commands::questions::QuestionBoard;
use crate::commands::{failure, Action, CmdResult, Confirm};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{today, PostType, RecordId};
use std::path::PathBuf;

pub struct DevpostApi<G: Gateway> {
    gateway: G,
    data_dir: PathBuf,
}

impl<G: Gateway> DevpostApi<G> {
    pub fn new(gateway: G, data_dir: PathBuf) -> Self {
        Self { gateway, data_dir }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Submit the form. The draft is reset only on success.
    pub fn submit(&self, form: &mut PostForm) -> CmdResult {
        let post_type = form.post_type();
        match form.submit(&self.gateway, today()) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, %post_type, "submission failed");
                CmdResult::default().with_message(failure(Action::Submit(post_type), &e))
            }
        }
    }

    pub fn open_questions(&self) -> Result<QuestionBoard> {
        QuestionBoard::activate(&self.gateway)
    }

    pub fn open_articles(&self) -> Result<ArticleBoard> {
        ArticleBoard::activate(&self.gateway)
    }

    pub fn delete_question<C: Confirm + ?Sized>(&self, id: &RecordId, confirm: &mut C) -> CmdResult {
        QuestionBoard::delete(&self.gateway, id, confirm).unwrap_or_else(|e| {
            CmdResult::default().with_message(failure(Action::Delete(PostType::Question), &e))
        })
    }

    pub fn delete_article<C: Confirm + ?Sized>(
        &self,
        board: &mut ArticleBoard,
        id: &RecordId,
        confirm: &mut C,
    ) -> CmdResult {
        board
            .delete_by_id(&self.gateway, id, confirm)
            .unwrap_or_else(|e| {
                CmdResult::default().with_message(failure(Action::Delete(PostType::Article), &e))
            })
    }

    pub fn config(&self, action: ConfigAction) -> Result<CmdResult> {
        config::run(&self.data_dir, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::filter::Criteria;
    use crate::commands::form::{Field, ImageAttachment};
    use crate::commands::{AlwaysConfirm, MessageLevel, NeverConfirm};
    use crate::gateway::memory::{MemGateway, Op};
    use crate::model::{format_date, Collection};
    use serde_json::json;

    fn api() -> DevpostApi<MemGateway> {
        DevpostApi::new(MemGateway::new(), PathBuf::from("/unused"))
    }

    #[test]
    fn submitting_a_question_writes_one_dated_record() {
        let api = api();
        let mut form = PostForm::new(PostType::Question);
        form.set_field(Field::Title, "How to center a div");
        form.set_field(Field::Description, "...");
        form.set_field(Field::Tags, "css,web");

        let result = api.submit(&mut form);
        assert!(!result.has_errors());
        assert!(form.draft().is_empty());

        let records = api.gateway().records(Collection::Questions);
        assert_eq!(records.len(), 1);
        let doc = &records[0].data;
        assert_eq!(doc["title"], json!("How to center a div"));
        assert_eq!(doc["description"], json!("..."));
        assert_eq!(doc["tags"], json!("css,web"));
        assert_eq!(doc["date"], json!(format_date(today())));
    }

    #[test]
    fn failed_upload_reports_once_and_keeps_draft() {
        let api = api();
        api.gateway().set_failing(Op::Upload, true);
        let mut form = PostForm::new(PostType::Article);
        form.set_field(Field::Title, "With picture");
        form.set_field(Field::Abstract, "abs");
        form.attach_image(ImageAttachment::new("p.png", vec![1, 2]));
        let before = form.draft().clone();

        let result = api.submit(&mut form);
        let errors: Vec<_> = result
            .messages
            .iter()
            .filter(|m| m.level == MessageLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].content.starts_with("Error submitting article: Upload failed"));
        assert!(result.created.is_none());
        assert_eq!(form.draft(), &before);
        assert!(api.gateway().records(Collection::Articles).is_empty());
    }

    #[test]
    fn delete_article_failure_becomes_message() {
        let api = api();
        let mut form = PostForm::new(PostType::Article);
        form.set_field(Field::Title, "A");
        let id = api.submit(&mut form).created.unwrap();

        let mut board = api.open_articles().unwrap();
        api.gateway().set_failing(Op::Delete, true);
        let result = api.delete_article(&mut board, &id, &mut AlwaysConfirm);
        assert!(result.has_errors());
        assert!(result.messages[0].content.starts_with("Error deleting article"));
        assert_eq!(board.articles().len(), 1);
    }

    #[test]
    fn delete_question_respects_confirmation() {
        let api = api();
        let mut form = PostForm::new(PostType::Question);
        form.set_field(Field::Title, "Q");
        let id = api.submit(&mut form).created.unwrap();
        let mut board = api.open_questions().unwrap();

        api.delete_question(&id, &mut NeverConfirm);
        board.sync();
        assert_eq!(board.cards(&Criteria::default()).len(), 1);

        api.delete_question(&id, &mut AlwaysConfirm);
        board.sync();
        assert!(board.cards(&Criteria::default()).is_empty());
    }

    #[test]
    fn unknown_question_delete_is_reported() {
        let api = api();
        let result = api.delete_question(&RecordId::new("ghost"), &mut AlwaysConfirm);
        assert!(result.has_errors());
    }

    #[test]
    fn delete_question_opens_no_subscription() {
        let api = api();
        let mut form = PostForm::new(PostType::Question);
        form.set_field(Field::Title, "Q");
        let id = api.submit(&mut form).created.unwrap();

        let result = api.delete_question(&id, &mut AlwaysConfirm);
        assert!(!result.has_errors());
        assert_eq!(api.gateway().subscriber_count(Collection::Questions), 0);
        assert!(api.gateway().records(Collection::Questions).is_empty());
    }
}
