//! `Document` → host string.

use crate::model::Document;
use crate::parser::DocumentError;

/// Encode a document for the host.
///
/// Output is deterministic for a given document: cards and links keep their
/// order and keys are always written in declaration order.
pub fn emit_document(doc: &Document) -> Result<String, DocumentError> {
    Ok(serde_json::to_string(doc)?)
}
