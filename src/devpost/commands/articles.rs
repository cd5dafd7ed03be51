use super::filter::{self, Criteria};
use super::{CmdMessage, CmdResult, Confirm};
use crate::error::{DevpostError, Result};
use crate::gateway::Gateway;
use crate::model::{Article, Collection, RecordId};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this article?";

/// Article list, fetched once on activation. There are no live updates, so
/// deletions made here are applied to the local list directly.
#[derive(Debug, Default)]
pub struct ArticleBoard {
    articles: Vec<Article>,
}

impl ArticleBoard {
    pub fn activate<G: Gateway>(gateway: &G) -> Result<Self> {
        let records = gateway.read_all(Collection::Articles)?;
        Ok(Self {
            articles: records.iter().map(Article::from_record).collect(),
        })
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: &RecordId) -> Option<&Article> {
        self.articles.iter().find(|a| &a.id == id)
    }

    pub fn cards(&self, criteria: &Criteria) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| filter::apply(*a, criteria))
            .collect()
    }

    /// Delete an article and, when `image_path` is given, its image blob.
    ///
    /// The record goes first; the blob delete is issued once and only after
    /// the record is gone. The local list changes only when both succeed.
    pub fn delete<G: Gateway, C: Confirm + ?Sized>(
        &mut self,
        gateway: &G,
        id: &RecordId,
        image_path: Option<&str>,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        if !confirm.confirm(DELETE_PROMPT) {
            return Ok(CmdResult::default().with_message(CmdMessage::info("Delete cancelled.")));
        }

        gateway.delete(Collection::Articles, id)?;
        let image_path = image_path.filter(|p| !p.is_empty());
        if let Some(path) = image_path {
            gateway.delete_blob(path)?;
        }
        tracing::info!(%id, image = image_path.unwrap_or(""), "article deleted");

        self.articles.retain(|a| &a.id != id);

        let mut result = CmdResult::default();
        result.deleted.push(id.clone());
        result.add_message(CmdMessage::success(if image_path.is_some() {
            "Image and article deleted successfully!"
        } else {
            "Article deleted successfully!"
        }));
        Ok(result)
    }

    /// Delete by id, cleaning up whatever image the stored article points at.
    pub fn delete_by_id<G: Gateway, C: Confirm + ?Sized>(
        &mut self,
        gateway: &G,
        id: &RecordId,
        confirm: &mut C,
    ) -> Result<CmdResult> {
        let image_path = self
            .get(id)
            .ok_or_else(|| DevpostError::Delete(format!("No article {}", id)))?
            .image_path
            .clone();
        self.delete(gateway, id, image_path.as_deref(), confirm)
    }
}
