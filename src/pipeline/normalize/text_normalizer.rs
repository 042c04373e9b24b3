use std::collections::HashSet;

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::config::pipeline::{CleaningPolicy, NormalizeParams, TokenizerKind};
use crate::data_model::NormalizedText;
use crate::error::Result;
use crate::pipeline::normalize::stopword_set::build_stopword_set;
use crate::utils::prometheus_metrics::TOKENIZER_FALLBACKS_TOTAL;
use crate::utils::text::{is_punctuation_token, split_into_words, split_word_punct};

// Emoji blocks and ASCII emoticons such as ":)" or ";-p".
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}-\x{1F251}]+",
        r"|[:;=][-']?[)(/|dpP]"
    ))
    .expect("Invalid emoji regex")
});

static HTML_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]+>").expect("Invalid HTML tag regex"));

static SPECIAL_KEEP_PERIODS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\.]").expect("Invalid special character regex"));

static SPECIAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid special character regex"));

/// Cleans, tokenizes and filters comment text. Pure per record: the stopword
/// set and regexes are fixed at construction.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    policy: CleaningPolicy,
    keep_periods: bool,
    tokenizer: TokenizerKind,
    stopwords: HashSet<String>,
    drop_punctuation_tokens: bool,
}

impl TextNormalizer {
    pub fn new(params: &NormalizeParams) -> Result<Self> {
        Ok(TextNormalizer {
            policy: params.policy,
            keep_periods: params.keep_periods,
            tokenizer: params.tokenizer,
            stopwords: build_stopword_set(&params.stopwords)?,
            drop_punctuation_tokens: params.drop_punctuation_tokens,
        })
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Step 1: clean and lowercase. `None` stays `None`.
    pub fn clean(&self, text: Option<&str>) -> Option<String> {
        let text = text?;
        match self.policy {
            CleaningPolicy::Simple => Some(text.to_lowercase()),
            CleaningPolicy::Enhanced => {
                let text = EMOJI_RE.replace_all(text, "");
                let text = HTML_TAG_RE.replace_all(&text, "");
                let special = if self.keep_periods {
                    &*SPECIAL_KEEP_PERIODS_RE
                } else {
                    &*SPECIAL_RE
                };
                let text = special.replace_all(&text, " ");
                Some(text.split_whitespace().join(" ").to_lowercase())
            }
        }
    }

    /// Step 2: split cleaned text into tokens. Falls back to whitespace splitting
    /// when the tokenizer fails.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        match self.tokenizer {
            TokenizerKind::WordPunct => tokens_or_whitespace(split_word_punct(text), text),
            TokenizerKind::UnicodeWords => split_into_words(text)
                .into_iter()
                .map(str::to_string)
                .collect(),
            TokenizerKind::Whitespace => whitespace_tokens(text),
        }
    }

    /// Step 3: drop stopwords (and, if configured, punctuation-only tokens).
    pub fn remove_stopwords(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|t| !self.stopwords.contains(t))
            .filter(|t| !(self.drop_punctuation_tokens && is_punctuation_token(t)))
            .collect()
    }

    /// Runs all steps. Missing input gives the empty value for the requested shape.
    pub fn normalize(&self, text: Option<&str>, concatenate: bool) -> NormalizedText {
        let cleaned = match self.clean(text) {
            Some(cleaned) => cleaned,
            None => return NormalizedText::empty(concatenate),
        };
        let tokens = self.remove_stopwords(self.tokenize(&cleaned));
        if concatenate {
            NormalizedText::Joined(tokens.join(" "))
        } else {
            NormalizedText::Tokens(tokens)
        }
    }

    pub fn normalize_tokens(&self, text: Option<&str>) -> Vec<String> {
        match self.normalize(text, false) {
            NormalizedText::Tokens(tokens) => tokens,
            NormalizedText::Joined(joined) => whitespace_tokens(&joined),
        }
    }

    pub fn normalize_joined(&self, text: Option<&str>) -> String {
        match self.normalize(text, true) {
            NormalizedText::Joined(joined) => joined,
            NormalizedText::Tokens(tokens) => tokens.join(" "),
        }
    }
}

fn whitespace_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn tokens_or_whitespace(result: tokenizers::Result<Vec<String>>, text: &str) -> Vec<String> {
    match result {
        Ok(tokens) => tokens,
        Err(e) => {
            warn!(
                error = %e,
                text = %text.chars().take(50).collect::<String>(),
                "Tokenizer failed, falling back to whitespace split"
            );
            TOKENIZER_FALLBACKS_TOTAL.inc();
            whitespace_tokens(text)
        }
    }
}
