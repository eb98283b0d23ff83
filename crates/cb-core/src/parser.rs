//! Host string → `Document`.
//!
//! The host stores whatever string the canvas last exported, so the decoder
//! must accept anything: garbage, an empty string, JSON of the wrong shape.
//! All of those load as an empty canvas.

use crate::model::{Document, MIN_NODE_HEIGHT, MIN_NODE_WIDTH};
use kurbo::Size;

/// Why a serialized document could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Not JSON, or `nodes`/`edges` missing, or an entry of the wrong shape.
    #[error("malformed canvas document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Valid JSON whose top level is not an object.
    #[error("canvas document must be a JSON object")]
    NotAnObject,
    /// A coordinate or size is not a finite number.
    #[error("card {id} has a non-finite {field}")]
    NonFinite { id: String, field: &'static str },
}

/// Decode a serialized document, reporting why it failed.
///
/// Cards stored below the minimum size are raised to it so every loaded
/// document satisfies the size floor.
pub fn try_parse_document(raw: &str) -> Result<Document, DocumentError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(DocumentError::NotAnObject);
    }
    let mut doc: Document = serde_json::from_value(value)?;
    let floor = Size::new(MIN_NODE_WIDTH, MIN_NODE_HEIGHT);
    for node in &mut doc.nodes {
        let fields = [
            ("x", node.x),
            ("y", node.y),
            ("width", node.width),
            ("height", node.height),
        ];
        if let Some((field, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DocumentError::NonFinite {
                id: node.id.as_str().to_string(),
                field,
            });
        }
        node.clamp_size(floor);
    }
    Ok(doc)
}

/// Decode a serialized document, falling back to an empty canvas on any
/// failure. Never fails.
pub fn parse_document(raw: &str) -> Document {
    match try_parse_document(raw) {
        Ok(doc) => {
            log::debug!(
                "loaded canvas: {} cards, {} links",
                doc.nodes.len(),
                doc.edges.len()
            );
            doc
        }
        Err(err) => {
            if !raw.trim().is_empty() {
                log::warn!("{err}; starting from an empty canvas");
            }
            Document::default()
        }
    }
}
