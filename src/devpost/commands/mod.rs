//! # Command Layer
//!
//! Business logic for posting and browsing. Nothing in here touches stdout,
//! stdin or the process: commands take a [`Gateway`](crate::gateway::Gateway)
//! plus plain Rust values and return a [`CmdResult`] carrying structured
//! messages that the UI decides how to show.
//!
//! - [`form`]: the draft being edited and its reset rules
//! - [`submit`]: upload → URL → record → write
//! - [`filter`]: the list predicate and description preview
//! - [`questions`]: live question list with expand/collapse
//! - [`articles`]: one-shot article list with image cleanup on delete
//! - [`config`]: reading and writing `config.json`
//!
//! User interaction such as confirming a delete goes through the [`Confirm`]
//! capability so commands stay testable without a terminal.

use crate::config::DevpostConfig;
use crate::error::DevpostError;
use crate::model::{PostType, RecordId};

pub mod articles;
pub mod config;
pub mod filter;
pub mod form;
pub mod questions;
pub mod submit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub created: Option<RecordId>,
    pub deleted: Vec<RecordId>,
    pub config: Option<DevpostConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_created(mut self, id: RecordId) -> Self {
        self.created = Some(id);
        self
    }

    pub fn with_config(mut self, config: DevpostConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// User-triggered actions, named in failure notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit(PostType),
    Fetch(PostType),
    Delete(PostType),
}

/// Turns a failed action into the notification the user sees.
///
/// The original error message is always carried through.
pub fn failure(action: Action, err: &DevpostError) -> CmdMessage {
    let what = match action {
        Action::Submit(PostType::Question) => "adding question".to_string(),
        Action::Submit(PostType::Article) => "submitting article".to_string(),
        Action::Fetch(kind) => format!("fetching {}s", kind),
        Action::Delete(kind) => format!("deleting {}", kind),
    };
    CmdMessage::error(format!("Error {}: {}", what, err))
}

/// Asks the user to approve a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_carries_underlying_message() {
        let err = DevpostError::Upload("bucket unreachable".into());
        let msg = failure(Action::Submit(PostType::Article), &err);
        assert_eq!(msg.level, MessageLevel::Error);
        assert_eq!(
            msg.content,
            "Error submitting article: Upload failed: bucket unreachable"
        );
    }

    #[test]
    fn closures_act_as_confirm() {
        let mut prompts = Vec::new();
        let mut ask = |p: &str| {
            prompts.push(p.to_string());
            false
        };
        assert!(!ask.confirm("Sure?"));
        assert_eq!(prompts, vec!["Sure?".to_string()]);
    }
}
