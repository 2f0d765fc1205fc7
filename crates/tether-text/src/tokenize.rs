use std::collections::HashMap;
use std::sync::Mutex;

use unicode_normalization::UnicodeNormalization;

use tether_core::traits::Tokenizer;
use tether_core::types::TokenizedText;

/// Normalisation toggles for `WordTokenizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TokenizerOptions {
    /// Strip thousands separators from tokens that start with a digit.
    pub normalize_numbers: bool,
    /// Map `%` to the token `percent`.
    pub normalize_percent: bool,
    /// Map `$`, `€`, `£` to `dollar`, `euro`, `pound`.
    pub normalize_currency: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            normalize_numbers: true,
            normalize_percent: true,
            normalize_currency: true,
        }
    }
}

/// Unicode-aware word tokenizer with a private growing vocabulary.
///
/// Tokens are NFKC-normalised and lowercased before interning, so `34%` and
/// `34 percent` produce the same ids. Numbers keep internal `.`/`,`
/// separators as one token; words keep internal hyphens and apostrophes.
/// The vocabulary is behind a mutex, so one tokenizer may be shared across
/// threads; ids are stable within a tokenizer instance.
#[derive(Debug)]
pub struct WordTokenizer {
    options: TokenizerOptions,
    vocab: Mutex<Vocabulary>,
}

#[derive(Debug)]
struct Vocabulary {
    ids: HashMap<String, u32>,
    next_id: u32,
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new(TokenizerOptions::default())
    }
}

impl WordTokenizer {
    pub fn new(options: TokenizerOptions) -> Self {
        Self {
            options,
            vocab: Mutex::new(Vocabulary {
                ids: HashMap::new(),
                next_id: 1,
            }),
        }
    }

    fn normalize(&self, raw: &str) -> String {
        let mut normalized: String = raw.nfkc().collect::<String>().to_lowercase();
        if normalized.contains('\u{2019}') {
            normalized = normalized.replace('\u{2019}', "'");
        }

        if self.options.normalize_numbers
            && normalized.chars().next().is_some_and(|c| c.is_numeric())
        {
            normalized = normalized.replace(',', "");
        }

        if self.options.normalize_percent && normalized == "%" {
            return "percent".to_string();
        }

        if self.options.normalize_currency {
            match normalized.as_str() {
                "$" => return "dollar".to_string(),
                "€" => return "euro".to_string(),
                "£" => return "pound".to_string(),
                _ => {}
            }
        }

        normalized
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> TokenizedText {
        let mut token_ids = Vec::new();
        let mut token_spans = Vec::new();

        let mut vocab = self.vocab.lock().unwrap_or_else(|poison| poison.into_inner());
        for (start, end) in scan_token_spans(text) {
            let normalized = self.normalize(&text[start..end]);
            if normalized.is_empty() {
                continue;
            }
            let id = match vocab.ids.get(&normalized) {
                Some(&id) => id,
                None => {
                    let id = vocab.next_id;
                    vocab.ids.insert(normalized, id);
                    vocab.next_id += 1;
                    id
                }
            };
            token_ids.push(id);
            token_spans.push((start, end));
        }

        TokenizedText {
            text: text.to_string(),
            token_ids,
            token_spans,
        }
    }
}

/// Raw token byte spans, before normalisation.
///
/// A number token is a digit run with internal `.`/`,` kept when flanked by
/// digits; `%` and currency symbols are single-character tokens; a word
/// token is an alphanumeric run with internal `-`/`'`/`’` kept when flanked
/// by alphanumerics. Everything else separates tokens.
fn scan_token_spans(text: &str) -> Vec<(usize, usize)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let total = chars.len();
    let mut spans = Vec::new();
    let mut i = 0;

    let offset_at =
        |i: usize| -> usize { chars.get(i).map(|&(offset, _)| offset).unwrap_or(text.len()) };

    while i < total {
        let (start, ch) = chars[i];

        if ch.is_numeric() {
            i += 1;
            while i < total {
                let c = chars[i].1;
                if c.is_numeric() {
                    i += 1;
                    continue;
                }
                if (c == '.' || c == ',')
                    && i + 1 < total
                    && chars[i - 1].1.is_numeric()
                    && chars[i + 1].1.is_numeric()
                {
                    i += 1;
                    continue;
                }
                break;
            }
            spans.push((start, offset_at(i)));
            continue;
        }

        if matches!(ch, '%' | '$' | '€' | '£') {
            spans.push((start, start + ch.len_utf8()));
            i += 1;
            continue;
        }

        if ch.is_alphanumeric() {
            i += 1;
            while i < total {
                let c = chars[i].1;
                if c.is_alphanumeric() {
                    i += 1;
                    continue;
                }
                if (c == '\'' || c == '\u{2019}' || c == '-')
                    && i + 1 < total
                    && chars[i - 1].1.is_alphanumeric()
                    && chars[i + 1].1.is_alphanumeric()
                {
                    i += 1;
                    continue;
                }
                break;
            }
            spans.push((start, offset_at(i)));
            continue;
        }

        i += 1;
    }

    spans
}
