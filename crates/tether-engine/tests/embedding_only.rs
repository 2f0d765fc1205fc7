use tether_engine::{
    align_citations, CitationConfig, CitationEngine, CitationWeights, Embedder, SourceDocument,
    SourceItem, SupportStatus,
};

/// Keys off a substring, so the embedding path is fully deterministic.
struct KeywordEmbedder {
    keyword: String,
}

impl KeywordEmbedder {
    fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
        }
    }
}

impl Embedder for KeywordEmbedder {
    fn encode(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts
            .iter()
            .map(|text| {
                if text.to_lowercase().contains(&self.keyword) {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect()
    }
}

fn embedding_only_config() -> CitationConfig {
    CitationConfig {
        top_k: 1,
        max_candidates_lexical: 0,
        max_candidates_embedding: 10,
        max_candidates_total: 10,
        allow_embedding_only: true,
        min_embedding_similarity: 0.5,
        supported_embedding_similarity: 0.5,
        min_alignment_score: 10_000,
        min_answer_coverage: 1.0,
        weights: CitationWeights {
            alignment: 0.0,
            answer_coverage: 0.0,
            evidence_coverage: 0.0,
            lexical: 0.0,
            embedding: 1.0,
        },
        ..CitationConfig::default()
    }
}

#[test]
fn test_embedding_only_admission_populates_evidence_spans() {
    let sources: Vec<SourceItem> = vec![
        SourceDocument::new("noise", "Weather report: storms are likely this weekend.").into(),
        SourceDocument::new(
            "target",
            "We propose LM Assertions, expressed as boolean conditions, and integrate them \
             into DSPy.",
        )
        .into(),
    ];
    let target_text = match &sources[1] {
        SourceItem::Document(doc) => doc.text.clone(),
        _ => unreachable!(),
    };
    let answer = "LM Assertions are boolean conditions that improve reliability.";

    let engine = CitationEngine::new(embedding_only_config())
        .with_embedder(KeywordEmbedder::new("assertions"));
    let results = engine.align(answer, &sources).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, SupportStatus::Supported);
    assert_eq!(results[0].citations.len(), 1);

    let citation = &results[0].citations[0];
    assert_eq!(citation.source_id, "target");
    assert_eq!(citation.source_index, 1);
    assert_eq!(citation.components.get("embedding_only").copied(), Some(1.0));
    assert!(citation.components.get("embedding_score").copied().unwrap_or(0.0) >= 0.5);
    assert_eq!(citation.evidence, target_text);
    assert_eq!(citation.evidence_spans.len(), 1);
    assert_eq!(citation.evidence_spans[0].evidence, citation.evidence);
    assert_eq!(citation.evidence_spans[0].char_start, citation.char_start);
    assert_eq!(citation.evidence_spans[0].char_end, citation.char_end);
}

#[test]
fn test_embedding_prefilter_retrieves_candidate_with_lexical_disabled() {
    let answer = "The assertions improve reliability.";
    let sources: Vec<SourceItem> = vec![
        SourceDocument::new("noise0", "Completely unrelated filler.").into(),
        SourceDocument::new("noise1", "More unrelated text.").into(),
        SourceDocument::new(
            "target",
            "The assertions improve reliability of compiled programs.",
        )
        .into(),
    ];

    let config = CitationConfig {
        top_k: 1,
        max_candidates_lexical: 0,
        max_candidates_embedding: 10,
        max_candidates_total: 10,
        min_alignment_score: 1,
        min_answer_coverage: 0.5,
        supported_answer_coverage: 0.8,
        weights: CitationWeights {
            lexical: 0.0,
            embedding: 0.2,
            ..CitationWeights::default()
        },
        ..CitationConfig::default()
    };

    let engine = CitationEngine::new(config).with_embedder(KeywordEmbedder::new("assertions"));
    let results = engine.align(answer, &sources).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, SupportStatus::Supported);
    assert_eq!(results[0].citations[0].source_id, "target");
}

#[test]
fn test_low_similarity_is_not_admitted() {
    let answer = "LM Assertions are boolean conditions.";
    let sources: Vec<SourceItem> = vec![
        SourceDocument::new("noise", "Weather report: storms are likely this weekend.").into(),
    ];

    // The only source never contains the keyword, so its similarity is 0.
    let engine = CitationEngine::new(embedding_only_config())
        .with_embedder(KeywordEmbedder::new("assertions"));
    let results = engine.align(answer, &sources).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, SupportStatus::Unsupported);
    assert!(results[0].citations.is_empty());
}

#[test]
fn test_missing_embedder_disables_embedding_prefilter() {
    // Lexical off and no embedder: no candidates can be produced at all.
    let answer = "LM Assertions are boolean conditions.";
    let sources: Vec<SourceItem> =
        vec![SourceDocument::new("target", "LM Assertions are boolean conditions.").into()];

    let results = align_citations(answer, &sources, &embedding_only_config()).unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, SupportStatus::Unsupported);
    assert!(results[0].citations.is_empty());
}

#[test]
fn test_aligned_candidate_beats_embedding_only_gate() {
    // With a reachable alignment threshold the citation is not embedding-only
    // and carries token-precise evidence instead of the whole passage.
    let answer = "LM Assertions are boolean conditions.";
    let source_text = "Background sentence. LM Assertions are boolean conditions. Trailing.";
    let sources: Vec<SourceItem> = vec![SourceDocument::new("target", source_text).into()];

    let config = CitationConfig {
        min_alignment_score: 1,
        min_answer_coverage: 0.5,
        supported_answer_coverage: 0.8,
        ..embedding_only_config()
    };
    let engine = CitationEngine::new(config).with_embedder(KeywordEmbedder::new("assertions"));
    let results = engine.align(answer, &sources).unwrap();

    let citation = &results[0].citations[0];
    assert!(citation.components.get("embedding_only").is_none());
    assert_eq!(citation.evidence, "LM Assertions are boolean conditions");
    assert_eq!(
        &source_text[citation.char_start..citation.char_end],
        citation.evidence
    );
}
