// Text utils: tokenizers and punctuation helpers used by the normaliser.

use icu::segmenter::WordSegmenter;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use tokenizers::pre_tokenizers::split::{Split, SplitPattern};
use tokenizers::tokenizer::{
    OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer, SplitDelimiterBehavior,
};

/// The ASCII punctuation characters, each treated as a one-character stopword.
pub const ASCII_PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Wider punctuation set used to decide whether a token carries any word content.
const EXTRA_PUNCTUATION: &str = "—”“„’‘´«»…–―•·¡¿、。，；：？！（）【】《》「」";

pub static PUNCTUATION: Lazy<HashSet<char>> = Lazy::new(|| {
    ASCII_PUNCTUATION
        .chars()
        .chain(EXTRA_PUNCTUATION.chars())
        .collect()
});

/// True when the token is non-empty and made only of punctuation characters.
pub fn is_punctuation_token(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| PUNCTUATION.contains(&c))
}

// Word runs, optionally joined by single periods ("100.000", "x.com"), or punctuation runs.
const WORD_PUNCT_PATTERN: &str = r"\w+(?:\.\w+)*|[^\w\s]+";

static WORD_PUNCT_SPLIT: Lazy<Split> = Lazy::new(|| {
    Split::new(
        SplitPattern::Regex(WORD_PUNCT_PATTERN.to_string()),
        SplitDelimiterBehavior::Removed,
        true,
    )
    .expect("Invalid word/punctuation pattern")
});

fn contains_word_char(segment: &str) -> bool {
    segment
        .chars()
        .any(|ch| !PUNCTUATION.contains(&ch) && !ch.is_whitespace())
}

/// Word runs and punctuation runs become separate tokens. Periods between word
/// characters stay inside the token, so "3.5" is one token and "oke." is two.
pub fn split_word_punct(text: &str) -> tokenizers::Result<Vec<String>> {
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let mut pretokenized = PreTokenizedString::from(text);
    WORD_PUNCT_SPLIT.pre_tokenize(&mut pretokenized)?;
    Ok(pretokenized
        .get_splits(OffsetReferential::Original, OffsetType::Byte)
        .into_iter()
        .map(|(split, _, _)| split.to_string())
        .collect())
}

/// UAX #29 word segmentation. Segments without any word character are dropped.
pub fn split_into_words(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    let segmenter = WordSegmenter::new_auto();
    let mut words = Vec::new();
    let mut prev_break = 0;

    // segment_str() yields break points (byte offsets); a segment lies between two of them.
    for current_break in segmenter.segment_str(text) {
        if current_break > prev_break {
            let segment = text[prev_break..current_break].trim();
            if !segment.is_empty() && contains_word_char(segment) {
                words.push(segment);
            }
        }
        prev_break = current_break;
    }

    if text.len() > prev_break {
        let segment = text[prev_break..].trim();
        if !segment.is_empty() && contains_word_char(segment) {
            words.push(segment);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_word_punct_separates_trailing_punctuation() {
        assert_eq!(
            split_word_punct("bagus sekali.").unwrap(),
            vec!["bagus", "sekali", "."]
        );
        assert_eq!(
            split_word_punct("tunggu... ya").unwrap(),
            vec!["tunggu", "...", "ya"]
        );
        assert_eq!(split_word_punct("snake_case").unwrap(), vec!["snake_case"]);
        assert!(split_word_punct("").unwrap().is_empty());
    }

    #[test]
    fn test_split_word_punct_keeps_period_joined_words() {
        assert_eq!(
            split_word_punct("rp 100.000. skin 3.5 jt").unwrap(),
            vec!["rp", "100.000", ".", "skin", "3.5", "jt"]
        );
        assert_eq!(
            split_word_punct("cek x.com..").unwrap(),
            vec!["cek", "x.com", ".."]
        );
    }

    #[test]
    fn test_split_words_empty_and_simple() {
        assert_eq!(split_into_words(""), Vec::new() as Vec<&str>);
        assert_eq!(split_into_words("halo"), vec!["halo"]);
        assert_eq!(split_into_words("halo dunia"), vec!["halo", "dunia"]);
    }

    #[test]
    fn test_split_words_with_punctuation() {
        assert_eq!(split_into_words("halo, dunia!"), vec!["halo", "dunia"]);
        assert_eq!(split_into_words("trailing..."), vec!["trailing"]);
    }

    #[test]
    fn test_punctuation_tokens() {
        assert!(is_punctuation_token("."));
        assert!(is_punctuation_token("..."));
        assert!(is_punctuation_token("…"));
        assert!(!is_punctuation_token("a."));
        assert!(!is_punctuation_token(""));
        assert_eq!(ASCII_PUNCTUATION.chars().count(), 32);
    }
}
