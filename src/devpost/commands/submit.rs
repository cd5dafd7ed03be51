use super::form::Draft;
use super::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::gateway::{Gateway, IMAGE_NAMESPACE};
use crate::model::{format_date, Document, PostType};
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

/// Turn a draft into a persisted record.
///
/// Runs strictly in order: optional image upload, URL resolution, document
/// construction, write. Any failure stops the sequence and is returned as is;
/// either the complete record is written or nothing is. If the write fails
/// after an image went up, the image is removed again.
pub fn run<G: Gateway>(
    gateway: &G,
    draft: &Draft,
    post_type: PostType,
    today: NaiveDate,
) -> Result<CmdResult> {
    let image = match (post_type, &draft.image) {
        (PostType::Article, Some(image)) => {
            let path = format!("{}/{}", IMAGE_NAMESPACE, Uuid::new_v4());
            let blob = gateway.upload_blob(&path, &image.bytes)?;
            let url = match gateway.resolve_url(&blob) {
                Ok(url) => url,
                Err(e) => {
                    discard_image(gateway, &blob.path);
                    return Err(e);
                }
            };
            Some((blob.path, url))
        }
        _ => None,
    };

    let document = build_document(draft, post_type, today, image.as_ref());
    let collection = post_type.collection();
    let id = match gateway.create(collection, document) {
        Ok(id) => id,
        Err(e) => {
            if let Some((path, _)) = &image {
                discard_image(gateway, path);
            }
            return Err(e);
        }
    };

    tracing::info!(%collection, %id, "post submitted");
    let message = match post_type {
        PostType::Question => "Question added successfully!",
        PostType::Article => "Article submitted successfully!",
    };
    Ok(CmdResult::default()
        .with_created(id)
        .with_message(CmdMessage::success(message)))
}

/// Stored shape of a post. `image` is the uploaded blob path and its URL.
pub fn build_document(
    draft: &Draft,
    post_type: PostType,
    today: NaiveDate,
    image: Option<&(String, String)>,
) -> Document {
    let mut doc = Document::new();
    doc.insert("title".into(), Value::from(draft.title.clone()));
    doc.insert("tags".into(), Value::from(draft.tags.clone()));
    doc.insert("date".into(), Value::from(format_date(today)));

    match post_type {
        PostType::Question => {
            doc.insert("description".into(), Value::from(draft.description.clone()));
        }
        PostType::Article => {
            doc.insert("abstract".into(), Value::from(draft.abstract_text.clone()));
            doc.insert("articleText".into(), Value::from(draft.article_text.clone()));
            let url = image.map(|(_, url)| url.clone()).unwrap_or_default();
            doc.insert("imageURL".into(), Value::from(url));
            if let Some((path, _)) = image {
                doc.insert("imagePath".into(), Value::from(path.clone()));
            }
        }
    }
    doc
}

fn discard_image<G: Gateway>(gateway: &G, path: &str) {
    if let Err(e) = gateway.delete_blob(path) {
        tracing::warn!(path, error = %e, "could not remove uploaded image");
    }
}
