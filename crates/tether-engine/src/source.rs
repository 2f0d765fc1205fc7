use tether_core::error::CitationError;
use tether_core::types::SourceItem;

/// The uniform internal view of one source list item.
///
/// `base_offset` is the byte offset of `text` inside the containing
/// document; zero unless the item was a chunk. `document_text` is only
/// present when the chunk carried the full document.
#[derive(Debug, Clone)]
pub(crate) struct SourceEntry {
    pub source_id: String,
    pub source_index: usize,
    pub text: String,
    pub base_offset: usize,
    pub document_text: Option<String>,
}

/// Lift every source item into a `SourceEntry`.
///
/// Bare strings get their list position as id. A chunk that carries
/// `document_text` must slice to exactly its own text; anything else is a
/// contract violation and fails the call.
pub(crate) fn normalize_sources(items: &[SourceItem]) -> Result<Vec<SourceEntry>, CitationError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            SourceItem::Text(text) => Ok(SourceEntry {
                source_id: index.to_string(),
                source_index: index,
                text: text.clone(),
                base_offset: 0,
                document_text: None,
            }),
            SourceItem::Document(doc) => Ok(SourceEntry {
                source_id: doc.id.clone(),
                source_index: index,
                text: doc.text.clone(),
                base_offset: 0,
                document_text: None,
            }),
            SourceItem::Chunk(chunk) => {
                if let Some(document) = &chunk.document_text {
                    let slice = document.get(chunk.doc_char_start..chunk.doc_char_end);
                    if slice != Some(chunk.text.as_str()) {
                        return Err(CitationError::CollaboratorContract {
                            collaborator: "source chunk",
                            index,
                            detail: format!(
                                "document_text[{}..{}] does not equal the chunk text",
                                chunk.doc_char_start, chunk.doc_char_end
                            ),
                        });
                    }
                }
                Ok(SourceEntry {
                    source_id: chunk.source_id.clone(),
                    source_index: chunk.source_index.unwrap_or(index),
                    text: chunk.text.clone(),
                    base_offset: chunk.doc_char_start,
                    document_text: chunk.document_text.clone(),
                })
            }
        })
        .collect()
}

impl SourceEntry {
    /// Exact substring of the containing document at absolute byte offsets.
    ///
    /// When the full document is unavailable the offsets are rebased onto
    /// the chunk's own text.
    pub(crate) fn substring(&self, start: usize, end: usize) -> String {
        match &self.document_text {
            Some(document) => document[start..end].to_string(),
            None => self.text[start - self.base_offset..end - self.base_offset].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::types::{SourceChunk, SourceDocument};

    #[test]
    fn test_normalize_plain_strings_use_position_as_id() {
        let entries =
            normalize_sources(&["first text".into(), "second text".into()]).unwrap();
        assert_eq!(entries[0].source_id, "0");
        assert_eq!(entries[1].source_id, "1");
        assert_eq!(entries[1].source_index, 1);
        assert_eq!(entries[0].base_offset, 0);
    }

    #[test]
    fn test_normalize_document_keeps_id() {
        let entries = normalize_sources(&[SourceDocument::new("report", "Body.").into()]).unwrap();
        assert_eq!(entries[0].source_id, "report");
        assert_eq!(entries[0].text, "Body.");
    }

    #[test]
    fn test_normalize_chunk_with_document_text() {
        let document = "Intro. Core claim here. Outro.";
        let chunk = SourceChunk {
            source_id: "doc".to_string(),
            text: "Core claim here.".to_string(),
            doc_char_start: 7,
            doc_char_end: 23,
            metadata: Default::default(),
            document_text: Some(document.to_string()),
            source_index: None,
        };
        let entries = normalize_sources(&[chunk.into()]).unwrap();
        assert_eq!(entries[0].base_offset, 7);
        assert_eq!(entries[0].substring(7, 11), "Core");
    }

    #[test]
    fn test_normalize_chunk_mismatched_document_text_fails() {
        let chunk = SourceChunk {
            source_id: "doc".to_string(),
            text: "wrong".to_string(),
            doc_char_start: 0,
            doc_char_end: 5,
            metadata: Default::default(),
            document_text: Some("other text entirely".to_string()),
            source_index: None,
        };
        let result = normalize_sources(&[chunk.into()]);
        assert!(matches!(
            result,
            Err(CitationError::CollaboratorContract { index: 0, .. })
        ));
    }

    #[test]
    fn test_normalize_chunk_explicit_source_index_wins() {
        let chunk = SourceChunk {
            source_id: "doc".to_string(),
            text: "text".to_string(),
            doc_char_start: 100,
            doc_char_end: 104,
            metadata: Default::default(),
            document_text: None,
            source_index: Some(9),
        };
        let entries = normalize_sources(&[chunk.into()]).unwrap();
        assert_eq!(entries[0].source_index, 9);
    }

    #[test]
    fn test_substring_without_document_rebases_offsets() {
        let entry = SourceEntry {
            source_id: "chunk".to_string(),
            source_index: 0,
            text: "alpha beta".to_string(),
            base_offset: 50,
            document_text: None,
        };
        assert_eq!(entry.substring(56, 60), "beta");
    }
}
