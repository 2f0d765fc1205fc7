use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use tether_core::config::CitationConfig;
use tether_core::error::CitationError;
use tether_core::traits::{AnswerSegmenter, Embedder, Segmenter, TokenAligner, Tokenizer};
use tether_core::types::{
    AnswerSpan, Citation, Segment, SourceItem, SpanCitations, SupportStatus, TokenizedText,
};
use tether_text::{windows_from_segments, ParagraphAnswerSegmenter, Passage, SentenceSegmenter, WordTokenizer};

use crate::candidates::generate_candidates;
use crate::embed::EmbeddingIndex;
use crate::evidence::{passage_evidence, resolve_evidence};
use crate::scoring::{
    compose_score, ANSWER_COVERAGE, EMBEDDING_ONLY, EMBEDDING_SCORE, NUM_EVIDENCE_SPANS,
};
use crate::source::{normalize_sources, SourceEntry};

/// The citation pipeline with its collaborators.
///
/// Defaults to the rule-based segmenters and word tokenizer from
/// `tether-text` and no embedder. A single engine value is reusable across
/// calls; each call is a pure function of its inputs.
pub struct CitationEngine {
    config: CitationConfig,
    answer_segmenter: Box<dyn AnswerSegmenter>,
    source_segmenter: Box<dyn Segmenter>,
    tokenizer: Box<dyn Tokenizer>,
    embedder: Option<Box<dyn Embedder>>,
}

impl Default for CitationEngine {
    fn default() -> Self {
        Self::new(CitationConfig::default())
    }
}

impl CitationEngine {
    pub fn new(config: CitationConfig) -> Self {
        Self {
            config,
            answer_segmenter: Box::new(ParagraphAnswerSegmenter::new()),
            source_segmenter: Box::new(SentenceSegmenter::default()),
            tokenizer: Box::new(WordTokenizer::default()),
            embedder: None,
        }
    }

    pub fn with_answer_segmenter(mut self, segmenter: impl AnswerSegmenter + 'static) -> Self {
        self.answer_segmenter = Box::new(segmenter);
        self
    }

    pub fn with_source_segmenter(mut self, segmenter: impl Segmenter + 'static) -> Self {
        self.source_segmenter = Box::new(segmenter);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: impl Tokenizer + 'static) -> Self {
        self.tokenizer = Box::new(tokenizer);
        self
    }

    pub fn with_embedder(mut self, embedder: impl Embedder + 'static) -> Self {
        self.embedder = Some(Box::new(embedder));
        self
    }

    pub fn config(&self) -> &CitationConfig {
        &self.config
    }

    /// Attribute every answer sentence to source passages.
    ///
    /// Returns one `SpanCitations` per answer span, in answer order. Empty
    /// or whitespace-only answers yield an empty list; an empty source list
    /// yields one unsupported record per span.
    pub fn align(
        &self,
        answer: &str,
        sources: &[SourceItem],
    ) -> Result<Vec<SpanCitations>, CitationError> {
        self.config.validate()?;

        let spans = self.answer_segmenter.segment(answer);
        validate_answer_spans(answer, &spans)?;
        if spans.is_empty() {
            return Ok(Vec::new());
        }

        let entries = normalize_sources(sources)?;
        let flat = self.collect_passages(&entries)?;

        let span_tokens: Vec<TokenizedText> = spans
            .iter()
            .enumerate()
            .map(|(index, span)| {
                let tokens = self.tokenizer.tokenize(&span.text);
                validate_tokenized(&tokens, "tokenizer (answer span)", index)?;
                Ok(tokens)
            })
            .collect::<Result<_, CitationError>>()?;

        let embedding = self.build_embedding(&spans, &flat)?;

        let aligner = self.config.backend.build(
            self.config.match_score,
            self.config.mismatch_score,
            self.config.gap_score,
        );

        // Answer spans are independent; fan out and collect in order. The
        // closure only captures immutable, thread-safe state.
        let config = &self.config;
        let results: Vec<SpanCitations> = spans
            .par_iter()
            .enumerate()
            .map(|(span_index, span)| {
                let query_vector = embedding
                    .as_ref()
                    .map(|(index, vectors)| (index, vectors[span_index].as_slice()));
                process_span(
                    config,
                    span,
                    &span_tokens[span_index],
                    &entries,
                    &flat,
                    query_vector,
                    aligner.as_ref(),
                )
            })
            .collect();

        Ok(results)
    }

    fn collect_passages(
        &self,
        entries: &[SourceEntry],
    ) -> Result<Vec<FlatPassage>, CitationError> {
        let mut flat = Vec::new();
        for (entry_index, entry) in entries.iter().enumerate() {
            let segments = self.source_segmenter.segment(&entry.text);
            validate_segments(&entry.text, &segments, entry_index)?;
            let passages = windows_from_segments(
                &entry.text,
                &segments,
                self.config.window_size_sentences,
                self.config.window_stride_sentences,
            );
            for passage in passages {
                let tokens = self.tokenizer.tokenize(&passage.text);
                validate_tokenized(&tokens, "tokenizer (source passage)", entry_index)?;
                let token_set = tokens.token_ids.iter().copied().collect();
                flat.push(FlatPassage {
                    entry_index,
                    passage,
                    tokens,
                    token_set,
                });
            }
        }
        Ok(flat)
    }

    fn build_embedding(
        &self,
        spans: &[AnswerSpan],
        flat: &[FlatPassage],
    ) -> Result<Option<(EmbeddingIndex, Vec<Vec<f32>>)>, CitationError> {
        let embedder = match &self.embedder {
            Some(embedder)
                if self.config.max_candidates_embedding > 0 || self.config.allow_embedding_only =>
            {
                embedder.as_ref()
            }
            _ => return Ok(None),
        };
        if flat.is_empty() {
            return Ok(None);
        }

        let passage_texts: Vec<&str> = flat.iter().map(|f| f.passage.text.as_str()).collect();
        let index = EmbeddingIndex::build(embedder, &passage_texts);
        if index.len() != flat.len() {
            return Err(CitationError::CollaboratorContract {
                collaborator: "embedder",
                index: 0,
                detail: format!(
                    "returned {} vectors for {} passages",
                    index.len(),
                    flat.len()
                ),
            });
        }

        let span_texts: Vec<&str> = spans.iter().map(|s| s.text.as_str()).collect();
        let span_vectors = embedder.encode(&span_texts);
        if span_vectors.len() != spans.len() {
            return Err(CitationError::CollaboratorContract {
                collaborator: "embedder",
                index: 0,
                detail: format!(
                    "returned {} vectors for {} answer spans",
                    span_vectors.len(),
                    spans.len()
                ),
            });
        }

        Ok(Some((index, span_vectors)))
    }
}

/// The per-span pipeline: candidates, gates, scoring, evidence, ordering.
///
/// A free function over shared immutable state so rayon can fan spans out
/// across threads.
#[allow(clippy::too_many_arguments)]
fn process_span(
    config: &CitationConfig,
    span: &AnswerSpan,
    span_tokens: &TokenizedText,
    entries: &[SourceEntry],
    flat: &[FlatPassage],
    query_vector: Option<(&EmbeddingIndex, &[f32])>,
    aligner: &dyn TokenAligner,
) -> SpanCitations {
    let answer_token_set: HashSet<u32> = span_tokens.token_ids.iter().copied().collect();

    let passage_token_sets: Vec<&HashSet<u32>> =
        flat.iter().map(|f| &f.token_set).collect();
    let candidates =
        generate_candidates(&answer_token_set, &passage_token_sets, query_vector, config);

    let mut citations: Vec<Citation> = Vec::new();
    for (candidate_index, candidate) in candidates.iter().enumerate() {
        let flat_passage = &flat[candidate.flat_index];
        if flat_passage.tokens.is_empty() {
            continue;
        }

        let alignment = if config.multi_span_evidence {
            aligner.align_with_blocks(&span_tokens.token_ids, &flat_passage.tokens.token_ids)
        } else {
            aligner.align(&span_tokens.token_ids, &flat_passage.tokens.token_ids)
        };

        let embedding_score = candidate.embedding_score.unwrap_or(0.0);
        let embedding_only = config.allow_embedding_only
            && alignment.score < config.min_alignment_score
            && candidate
                .embedding_score
                .is_some_and(|similarity| similarity >= config.min_embedding_similarity);

        if alignment.score < config.min_alignment_score && !embedding_only {
            continue;
        }

        let composed = compose_score(
            &alignment,
            span_tokens.len(),
            flat_passage.tokens.len(),
            candidate.lexical_overlap,
            answer_token_set.len(),
            embedding_score,
            &config.weights,
            config.match_score,
        );

        if composed.answer_coverage < config.min_answer_coverage && !embedding_only {
            continue;
        }
        if composed.final_score < config.min_final_score {
            continue;
        }

        let entry = &entries[flat_passage.entry_index];
        let resolved = if embedding_only {
            passage_evidence(entry, &flat_passage.passage)
        } else {
            resolve_evidence(
                entry,
                &flat_passage.passage,
                &flat_passage.tokens,
                &alignment,
                config,
            )
        };

        let mut components = composed.components;
        components.insert(NUM_EVIDENCE_SPANS.to_string(), resolved.num_spans as f64);
        if embedding_only {
            components.insert(EMBEDDING_ONLY.to_string(), 1.0);
        }

        citations.push(Citation {
            score: composed.final_score,
            source_id: entry.source_id.clone(),
            source_index: entry.source_index,
            candidate_index,
            char_start: resolved.char_start,
            char_end: resolved.char_end,
            evidence: resolved.evidence,
            evidence_spans: resolved.spans,
            components,
        });
    }

    finish_span(config, span, citations)
}

/// Order, cap, truncate, and judge the retained citations.
fn finish_span(
    config: &CitationConfig,
    span: &AnswerSpan,
    mut citations: Vec<Citation>,
) -> SpanCitations {
    citations.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.source_index.cmp(&b.source_index))
            .then_with(|| a.candidate_index.cmp(&b.candidate_index))
            .then_with(|| a.char_start.cmp(&b.char_start))
            .then_with(|| a.char_end.cmp(&b.char_end))
    });

    if config.prefer_source_order && !citations.is_empty() {
        // Among effectively-tied top scores, prefer the earliest source.
        let cutoff = citations[0].score - 1e-9;
        let near_top = citations
            .iter()
            .take_while(|citation| citation.score >= cutoff)
            .count();
        citations[..near_top].sort_by_key(|citation| citation.source_index);
    }

    let mut kept: Vec<Citation> = Vec::new();
    let mut per_source: HashMap<usize, usize> = HashMap::new();
    for citation in citations {
        let count = per_source.entry(citation.source_index).or_insert(0);
        if *count < config.max_citations_per_source {
            *count += 1;
            kept.push(citation);
        }
    }
    kept.truncate(config.top_k);

    let supported = kept.iter().any(|citation| {
        if citation.components.get(EMBEDDING_ONLY).copied() == Some(1.0) {
            citation.components.get(EMBEDDING_SCORE).copied().unwrap_or(0.0)
                >= config.supported_embedding_similarity
        } else {
            citation.components.get(ANSWER_COVERAGE).copied().unwrap_or(0.0)
                >= config.supported_answer_coverage
        }
    });
    let status = if supported {
        SupportStatus::Supported
    } else if kept.is_empty() {
        SupportStatus::Unsupported
    } else {
        SupportStatus::Partial
    };

    SpanCitations {
        answer_span: span.clone(),
        citations: kept,
        status,
    }
}

/// One source passage with its tokenization, flattened across all sources.
struct FlatPassage {
    entry_index: usize,
    passage: Passage,
    tokens: TokenizedText,
    token_set: HashSet<u32>,
}

/// Attribute answer sentences to passages of `sources` using the default
/// collaborators.
pub fn align_citations(
    answer: &str,
    sources: &[SourceItem],
    config: &CitationConfig,
) -> Result<Vec<SpanCitations>, CitationError> {
    CitationEngine::new(config.clone()).align(answer, sources)
}

fn validate_answer_spans(answer: &str, spans: &[AnswerSpan]) -> Result<(), CitationError> {
    for (index, span) in spans.iter().enumerate() {
        let slice = answer.get(span.char_start..span.char_end);
        if slice != Some(span.text.as_str()) {
            return Err(CitationError::CollaboratorContract {
                collaborator: "answer segmenter",
                index,
                detail: format!(
                    "span offsets {}..{} do not reproduce the span text",
                    span.char_start, span.char_end
                ),
            });
        }
    }
    Ok(())
}

fn validate_segments(
    text: &str,
    segments: &[Segment],
    source_index: usize,
) -> Result<(), CitationError> {
    for segment in segments {
        let slice = text.get(segment.doc_char_start..segment.doc_char_end);
        if slice != Some(segment.text.as_str()) {
            return Err(CitationError::CollaboratorContract {
                collaborator: "source segmenter",
                index: source_index,
                detail: format!(
                    "segment offsets {}..{} do not reproduce the segment text",
                    segment.doc_char_start, segment.doc_char_end
                ),
            });
        }
    }
    Ok(())
}

fn validate_tokenized(
    tokens: &TokenizedText,
    collaborator: &'static str,
    index: usize,
) -> Result<(), CitationError> {
    tokens
        .validate()
        .map_err(|detail| CitationError::CollaboratorContract {
            collaborator,
            index,
            detail,
        })
}
