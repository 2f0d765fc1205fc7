use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A text together with its token ids and per-token byte spans.
///
/// `token_ids` and `token_spans` are parallel; each span is a half-open
/// `(start, end)` byte range into `text`, spans are ordered and disjoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedText {
    pub text: String,
    pub token_ids: Vec<u32>,
    pub token_spans: Vec<(usize, usize)>,
}

impl TokenizedText {
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }

    /// Check the structural invariants a tokenizer must uphold.
    ///
    /// Returns a description of the first violation, if any.
    pub fn validate(&self) -> Result<(), String> {
        if self.token_ids.len() != self.token_spans.len() {
            return Err(format!(
                "{} token ids but {} token spans",
                self.token_ids.len(),
                self.token_spans.len()
            ));
        }
        let mut prev_end = 0usize;
        for (pos, &(start, end)) in self.token_spans.iter().enumerate() {
            if start >= end {
                return Err(format!("token span {pos} is empty ({start}..{end})"));
            }
            if end > self.text.len() {
                return Err(format!(
                    "token span {pos} ends at {end}, past the text length {}",
                    self.text.len()
                ));
            }
            if start < prev_end {
                return Err(format!(
                    "token span {pos} starts at {start}, before the previous span ended at {prev_end}"
                ));
            }
            if !self.text.is_char_boundary(start) || !self.text.is_char_boundary(end) {
                return Err(format!("token span {pos} is not on a character boundary"));
            }
            prev_end = end;
        }
        Ok(())
    }
}

/// A sentence-like unit of a source document, with byte offsets into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub doc_char_start: usize,
    pub doc_char_end: usize,
}

/// Granularity of an answer span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Sentence,
    Clause,
    Paragraph,
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanKind::Sentence => write!(f, "sentence"),
            SpanKind::Clause => write!(f, "clause"),
            SpanKind::Paragraph => write!(f, "paragraph"),
        }
    }
}

/// A sentence-like unit of the answer, with byte offsets into the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSpan {
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
    pub kind: SpanKind,
    #[serde(default)]
    pub paragraph_index: Option<usize>,
    #[serde(default)]
    pub sentence_index: Option<usize>,
}

/// A full source document identified by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl SourceDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: BTreeMap::new(),
        }
    }
}

/// A slice of a larger document, with absolute offsets into the original.
///
/// If `document_text` is present, `document_text[doc_char_start..doc_char_end]`
/// must equal `text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceChunk {
    pub source_id: String,
    pub text: String,
    pub doc_char_start: usize,
    pub doc_char_end: usize,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default)]
    pub source_index: Option<usize>,
}

/// One item of the `sources` argument to `align_citations`.
///
/// Bare strings are lifted to a `SourceDocument` whose id is the item's
/// position in the source list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceItem {
    Chunk(SourceChunk),
    Document(SourceDocument),
    Text(String),
}

impl From<&str> for SourceItem {
    fn from(text: &str) -> Self {
        SourceItem::Text(text.to_string())
    }
}

impl From<String> for SourceItem {
    fn from(text: String) -> Self {
        SourceItem::Text(text)
    }
}

impl From<SourceDocument> for SourceItem {
    fn from(doc: SourceDocument) -> Self {
        SourceItem::Document(doc)
    }
}

impl From<SourceChunk> for SourceItem {
    fn from(chunk: SourceChunk) -> Self {
        SourceItem::Chunk(chunk)
    }
}

/// Result of a local alignment between a query and a candidate token sequence.
///
/// Either all index fields are zero (no alignment) or `query_start < query_end`
/// and `token_start < token_end`. `match_blocks` holds half-open candidate
/// index ranges, each a maximal run of consecutive exact-match diagonal steps;
/// it is only populated when blocks were requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub score: i32,
    pub token_start: usize,
    pub token_end: usize,
    pub query_start: usize,
    pub query_end: usize,
    pub matches: usize,
    #[serde(default)]
    pub match_blocks: Vec<(usize, usize)>,
}

impl Alignment {
    /// The zero alignment returned for empty inputs or an all-zero matrix.
    pub fn none() -> Self {
        Self {
            score: 0,
            token_start: 0,
            token_end: 0,
            query_start: 0,
            query_end: 0,
            matches: 0,
            match_blocks: Vec::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.score == 0
    }
}

/// A contiguous evidence slice in a source document.
///
/// `evidence` is the exact substring `source_text[char_start..char_end]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSpan {
    pub char_start: usize,
    pub char_end: usize,
    pub evidence: String,
}

/// A retained candidate: where the evidence lies and how it scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub score: f64,
    pub source_id: String,
    pub source_index: usize,
    pub candidate_index: usize,
    pub char_start: usize,
    pub char_end: usize,
    pub evidence: String,
    #[serde(default)]
    pub evidence_spans: Vec<EvidenceSpan>,
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

/// Per-span support judgment derived from the retained citations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    Supported,
    Partial,
    Unsupported,
}

impl std::fmt::Display for SupportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportStatus::Supported => write!(f, "supported"),
            SupportStatus::Partial => write!(f, "partial"),
            SupportStatus::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// One answer span with its citations, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanCitations {
    pub answer_span: AnswerSpan,
    pub citations: Vec<Citation>,
    pub status: SupportStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenized_text_validate_ok() {
        let tokenized = TokenizedText {
            text: "one two".to_string(),
            token_ids: vec![1, 2],
            token_spans: vec![(0, 3), (4, 7)],
        };
        assert!(tokenized.validate().is_ok());
    }

    #[test]
    fn test_tokenized_text_validate_rejects_overlap() {
        let tokenized = TokenizedText {
            text: "one two".to_string(),
            token_ids: vec![1, 2],
            token_spans: vec![(0, 4), (3, 7)],
        };
        assert!(tokenized.validate().is_err());
    }

    #[test]
    fn test_tokenized_text_validate_rejects_out_of_bounds() {
        let tokenized = TokenizedText {
            text: "one".to_string(),
            token_ids: vec![1],
            token_spans: vec![(0, 9)],
        };
        assert!(tokenized.validate().is_err());
    }

    #[test]
    fn test_tokenized_text_validate_rejects_length_mismatch() {
        let tokenized = TokenizedText {
            text: "one two".to_string(),
            token_ids: vec![1],
            token_spans: vec![(0, 3), (4, 7)],
        };
        assert!(tokenized.validate().is_err());
    }

    #[test]
    fn test_source_item_from_str() {
        let item: SourceItem = "plain text".into();
        assert_eq!(item, SourceItem::Text("plain text".to_string()));
    }

    #[test]
    fn test_support_status_display() {
        assert_eq!(SupportStatus::Supported.to_string(), "supported");
        assert_eq!(SupportStatus::Partial.to_string(), "partial");
        assert_eq!(SupportStatus::Unsupported.to_string(), "unsupported");
    }

    #[test]
    fn test_alignment_none() {
        let alignment = Alignment::none();
        assert!(alignment.is_none());
        assert_eq!(alignment.token_start, 0);
        assert_eq!(alignment.token_end, 0);
    }

    #[test]
    fn test_span_citations_serde_round_trip() {
        let span = SpanCitations {
            answer_span: AnswerSpan {
                text: "A claim.".to_string(),
                char_start: 0,
                char_end: 8,
                kind: SpanKind::Sentence,
                paragraph_index: Some(0),
                sentence_index: Some(0),
            },
            citations: vec![],
            status: SupportStatus::Unsupported,
        };
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"unsupported\""));
        let back: SpanCitations = serde_json::from_str(&json).unwrap();
        assert_eq!(back, span);
    }
}
