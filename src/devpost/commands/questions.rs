//! Live question list.
//!
//! The board holds a subscription to the `questions` collection for as long
//! as it is active, so every external add or delete shows up on the next
//! [`QuestionBoard::sync`]. Expand/collapse state lives only here and is
//! forgotten for questions that disappear.

use super::filter::{self, Criteria};
use super::{CmdMessage, CmdResult, Confirm};
use crate::error::Result;
use crate::gateway::{Gateway, Snapshot, Subscription};
use crate::model::{Collection, Question, RecordId};
use std::collections::HashSet;
use std::time::Duration;

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this question?";

/// A question as it should be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCard {
    pub question: Question,
    pub expanded: bool,
    /// Full description when expanded, the preview otherwise.
    pub body: String,
}

#[derive(Debug, Default)]
pub struct QuestionBoard {
    subscription: Option<Subscription>,
    questions: Vec<Question>,
    expanded: HashSet<RecordId>,
}

impl QuestionBoard {
    /// Subscribe to `questions` and load the initial snapshot.
    pub fn activate<G: Gateway>(gateway: &G) -> Result<Self> {
        let subscription = gateway.subscribe(Collection::Questions)?;
        let mut board = Self {
            subscription: Some(subscription),
            questions: Vec::new(),
            expanded: HashSet::new(),
        };
        board.sync();
        Ok(board)
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Apply the newest pending snapshot. Returns whether one was pending.
    pub fn sync(&mut self) -> bool {
        let snapshot = self.subscription.as_ref().and_then(Subscription::latest);
        self.apply(snapshot)
    }

    /// Block up to `timeout` for the next snapshot.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let snapshot = self.subscription.as_ref().and_then(|s| s.wait(timeout));
        self.apply(snapshot)
    }

    fn apply(&mut self, snapshot: Option<Snapshot>) -> bool {
        let Some(records) = snapshot else {
            return false;
        };
        self.questions = records.iter().map(Question::from_record).collect();
        let present: HashSet<&RecordId> = self.questions.iter().map(|q| &q.id).collect();
        self.expanded.retain(|id| present.contains(id));
        true
    }

    /// Flip one question between preview and full text.
    ///
    /// Returns the new state; ids not on the board are ignored.
    pub fn toggle(&mut self, id: &RecordId) -> bool {
        if !self.questions.iter().any(|q| &q.id == id) {
            return false;
        }
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
        self.is_expanded(id)
    }

    pub fn is_expanded(&self, id: &RecordId) -> bool {
        self.expanded.contains(id)
    }

    pub fn cards(&self, criteria: &Criteria) -> Vec<QuestionCard> {
        self.questions
            .iter()
            .filter(|q| filter::apply(*q, criteria))
            .map(|q| {
                let expanded = self.is_expanded(&q.id);
                let body = if expanded {
                    q.description.clone()
                } else {
                    filter::short_description(&q.description)
                };
                QuestionCard {
                    question: q.clone(),
                    expanded,
                    body,
                }
            })
            .collect()
    }

    /// Delete a question after confirmation.
    ///
    /// Needs no open board: an active one learns of the removal through its
    /// subscription like any other change.
    pub fn delete<G: Gateway, C: Confirm + ?Sized>(
        gateway: &G,
        id: &RecordId,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(CmdResult::default().with_message(CmdMessage::info("Delete cancelled.")));
        }
        gateway.delete(Collection::Questions, id)?;
        tracing::info!(%id, "question deleted");

        let mut result = CmdResult::default();
        result.deleted.push(id.clone());
        result.add_message(CmdMessage::success("Question deleted successfully!"));
        Ok(result)
    }

    /// Release the subscription. Safe to call more than once.
    pub fn deactivate(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
    }
}

impl Drop for QuestionBoard {
    fn drop(&mut self) {
        self.deactivate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AlwaysConfirm, NeverConfirm};
    use crate::error::DevpostError;
    use crate::gateway::memory::{MemGateway, Op};
    use crate::model::Document;
    use serde_json::json;

    fn doc(title: &str, description: &str, tags: serde_json::Value) -> Document {
        let mut d = Document::new();
        d.insert("title".into(), json!(title));
        d.insert("description".into(), json!(description));
        d.insert("tags".into(), tags);
        d.insert("date".into(), json!("2024-06-01"));
        d
    }

    #[test]
    fn activation_loads_current_questions() {
        let gw = MemGateway::new();
        gw.external_insert(Collection::Questions, "q1", doc("One", "", json!("a")));
        let board = QuestionBoard::activate(&gw).unwrap();
        assert!(board.is_active());
        assert_eq!(board.questions().len(), 1);
        assert_eq!(gw.subscriber_count(Collection::Questions), 1);
    }

    #[test]
    fn external_changes_show_up_on_sync() {
        let gw = MemGateway::new();
        let mut board = QuestionBoard::activate(&gw).unwrap();
        assert!(board.questions().is_empty());

        gw.external_insert(Collection::Questions, "q1", doc("One", "", json!("a")));
        gw.external_insert(Collection::Questions, "q2", doc("Two", "", json!("b")));
        assert!(board.sync());
        assert_eq!(board.questions().len(), 2);
        assert!(!board.sync());
    }

    #[test]
    fn external_delete_of_expanded_question_is_quietly_dropped() {
        let gw = MemGateway::new();
        let id = gw.external_insert(Collection::Questions, "q1", doc("One", "body", json!("a")));
        let mut board = QuestionBoard::activate(&gw).unwrap();
        assert!(board.toggle(&id));

        assert!(gw.external_delete(Collection::Questions, &id));
        assert!(board.sync());
        assert!(board.cards(&Criteria::default()).is_empty());
        assert!(!board.is_expanded(&id));
    }

    #[test]
    fn toggle_is_per_question() {
        let gw = MemGateway::new();
        let a = gw.external_insert(Collection::Questions, "a", doc("A", "", json!("")));
        let b = gw.external_insert(Collection::Questions, "b", doc("B", "", json!("")));
        let mut board = QuestionBoard::activate(&gw).unwrap();

        assert!(board.toggle(&a));
        assert!(board.is_expanded(&a));
        assert!(!board.is_expanded(&b));
        assert!(!board.toggle(&a));
        assert!(!board.toggle(&RecordId::new("missing")));
    }

    #[test]
    fn cards_show_preview_until_expanded() {
        let gw = MemGateway::new();
        let long = "d".repeat(150);
        let id = gw.external_insert(Collection::Questions, "q", doc("Long", &long, json!("")));
        let mut board = QuestionBoard::activate(&gw).unwrap();

        let collapsed = &board.cards(&Criteria::default())[0];
        assert!(!collapsed.expanded);
        assert_eq!(collapsed.body, format!("{}...", "d".repeat(100)));

        board.toggle(&id);
        let expanded = &board.cards(&Criteria::default())[0];
        assert_eq!(expanded.body, long);
    }

    #[test]
    fn cards_apply_filter() {
        let gw = MemGateway::new();
        gw.external_insert(Collection::Questions, "a", doc("Java streams", "", json!(["Java", "Web"])));
        gw.external_insert(Collection::Questions, "b", doc("Rust traits", "", json!("rust")));
        gw.external_insert(Collection::Questions, "c", doc("Odd", "", json!(42)));
        let board = QuestionBoard::activate(&gw).unwrap();

        let web = Criteria {
            tag: "web".into(),
            ..Default::default()
        };
        let cards = board.cards(&web);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].question.title, "Java streams");
        assert_eq!(board.cards(&Criteria::default()).len(), 3);
    }

    #[test]
    fn delete_relies_on_subscription_for_removal() {
        let gw = MemGateway::new();
        let id = gw.external_insert(Collection::Questions, "q", doc("Q", "", json!("")));
        let mut board = QuestionBoard::activate(&gw).unwrap();

        let result = QuestionBoard::delete(&gw, &id, &mut AlwaysConfirm).unwrap();
        assert_eq!(result.deleted, vec![id.clone()]);
        // Still listed until the snapshot is applied.
        assert_eq!(board.questions().len(), 1);
        board.sync();
        assert!(board.questions().is_empty());
    }

    #[test]
    fn declined_delete_is_a_no_op() {
        let gw = MemGateway::new();
        let id = gw.external_insert(Collection::Questions, "q", doc("Q", "", json!("")));
        let mut board = QuestionBoard::activate(&gw).unwrap();

        let result = QuestionBoard::delete(&gw, &id, &mut NeverConfirm).unwrap();
        assert!(result.deleted.is_empty());
        assert!(!result.has_errors());
        assert_eq!(gw.records(Collection::Questions).len(), 1);
        assert!(!board.sync());
    }

    #[test]
    fn failed_delete_reports_and_keeps_list() {
        let gw = MemGateway::new();
        let id = gw.external_insert(Collection::Questions, "q", doc("Q", "", json!("")));
        let mut board = QuestionBoard::activate(&gw).unwrap();
        gw.set_failing(Op::Delete, true);

        let err = QuestionBoard::delete(&gw, &id, &mut AlwaysConfirm).unwrap_err();
        assert!(matches!(err, DevpostError::Delete(_)));
        board.sync();
        assert_eq!(board.questions().len(), 1);
    }

    #[test]
    fn deactivate_releases_exactly_once() {
        let gw = MemGateway::new();
        let mut board = QuestionBoard::activate(&gw).unwrap();
        board.deactivate();
        board.deactivate();
        assert!(!board.is_active());
        assert_eq!(gw.subscriber_count(Collection::Questions), 0);

        // No updates after teardown.
        gw.external_insert(Collection::Questions, "late", doc("Late", "", json!("")));
        assert!(!board.sync());
        assert!(board.questions().is_empty());
    }

    #[test]
    fn dropping_board_releases_subscription() {
        let gw = MemGateway::new();
        {
            let _board = QuestionBoard::activate(&gw).unwrap();
            assert_eq!(gw.subscriber_count(Collection::Questions), 1);
        }
        assert_eq!(gw.subscriber_count(Collection::Questions), 0);
    }

    #[test]
    fn failed_subscribe_is_read_error() {
        let gw = MemGateway::new();
        gw.set_failing(Op::Subscribe, true);
        assert!(matches!(
            QuestionBoard::activate(&gw),
            Err(DevpostError::Read(_))
        ));
    }
}
