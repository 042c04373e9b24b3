use std::collections::HashSet;
use std::fs;

use tracing::debug;

use crate::config::pipeline::{StopwordLanguage, StopwordParams};
use crate::error::{PipelineError, Result};
use crate::utils::stopwords::{ENGLISH_STOP_WORDS, INDONESIAN_STOP_WORDS};
use crate::utils::text::ASCII_PUNCTUATION;

/// Parses a stopword file: one word per line, blank lines and `#` comments ignored.
pub fn parse_stopword_lines(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.to_lowercase())
}

/// Built-in list for the language, the ASCII punctuation characters, the
/// configured extras and the words of the optional stopword file.
pub fn build_stopword_set(params: &StopwordParams) -> Result<HashSet<String>> {
    let builtin: &[&str] = match params.language {
        StopwordLanguage::Indonesian => INDONESIAN_STOP_WORDS,
        StopwordLanguage::English => ENGLISH_STOP_WORDS,
        StopwordLanguage::None => &[],
    };

    let mut set: HashSet<String> = builtin.iter().map(|w| w.to_string()).collect();
    set.extend(ASCII_PUNCTUATION.chars().map(String::from));
    set.extend(params.extra.iter().map(|w| w.trim().to_lowercase()));

    if let Some(path) = &params.file {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::ConfigError(format!(
                "Failed to read stopword file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let before = set.len();
        set.extend(parse_stopword_lines(&content));
        debug!(
            path = %path.display(),
            added = set.len() - before,
            "Loaded stopword file"
        );
    }

    set.remove("");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_default_set_has_language_words_and_punctuation() {
        let set = build_stopword_set(&StopwordParams::default()).unwrap();
        assert!(set.contains("yang"));
        assert!(set.contains("."));
        assert!(set.contains("!"));
        assert!(!set.contains("bagus"));
        assert!(!set.contains("the"));
    }

    #[test]
    fn test_none_language_keeps_only_punctuation_and_extras() {
        let params = StopwordParams {
            language: StopwordLanguage::None,
            extra: vec!["  Nya ".to_string()],
            file: None,
        };
        let set = build_stopword_set(&params).unwrap();
        assert!(!set.contains("yang"));
        assert!(set.contains("nya"));
        assert_eq!(set.len(), ASCII_PUNCTUATION.len() + 1);
    }

    #[test]
    fn test_stopword_file_is_merged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# slang").unwrap();
        writeln!(file, "gan").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  Sih ").unwrap();
        file.flush().unwrap();

        let params = StopwordParams {
            language: StopwordLanguage::English,
            extra: vec![],
            file: Some(file.path().to_path_buf()),
        };
        let set = build_stopword_set(&params).unwrap();
        assert!(set.contains("gan"));
        assert!(set.contains("sih"));
        assert!(set.contains("the"));
        assert!(!set.contains("# slang"));
    }

    #[test]
    fn test_unreadable_stopword_file_is_config_error() {
        let params = StopwordParams {
            file: Some(PathBuf::from("no/such/stopwords.txt")),
            ..StopwordParams::default()
        };
        match build_stopword_set(&params) {
            Err(PipelineError::ConfigError(msg)) => assert!(msg.contains("stopwords.txt")),
            other => panic!("Expected ConfigError, got {:?}", other),
        }
    }
}
