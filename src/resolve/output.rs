use serde_json::Value;
use std::path::Path;
use thiserror::Error;

pub const OUTPUT_EXTENSION: &str = ".txt";

/// Why a report could not supply a query hint. Never fatal.
#[derive(Error, Debug)]
pub enum HintError {
    #[error("could not read report: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("report is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("report has no string 'query' field")]
    MissingQuery,
}

/// Reads the top-level `query` string of a JSON report.
pub fn read_query_hint(path: &Path) -> Result<String, HintError> {
    let content = std::fs::read_to_string(path)?;
    parse_query_hint(&content)
}

pub fn parse_query_hint(content: &str) -> Result<String, HintError> {
    let report: Value = serde_json::from_str(content)?;

    report
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(HintError::MissingQuery)
}

/// Keeps ASCII letters, digits and spaces, turns spaces into underscores and
/// truncates to `max_len` characters.
pub fn sanitize_name(hint: &str, max_len: usize) -> String {
    hint.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .take(max_len)
        .collect()
}

/// The output name offered as the prompt default, without extension.
pub fn suggest_output_name(
    hint: Result<&str, &HintError>,
    fallback: &str,
    max_len: usize,
) -> String {
    let suggested = match hint {
        Ok(query) => sanitize_name(query, max_len),
        Err(_) => String::new(),
    };

    if suggested.is_empty() {
        fallback.to_string()
    } else {
        suggested
    }
}

/// Applies the prompt answer: empty accepts the suggestion, anything else is
/// used as typed with `.txt` appended when missing.
pub fn normalize_output_name(answer: &str, suggested: &str) -> String {
    let answer = answer.trim();
    let name = if answer.is_empty() { suggested } else { answer };

    if name.ends_with(OUTPUT_EXTENSION) {
        name.to_string()
    } else {
        format!("{}{}", name, OUTPUT_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FALLBACK: &str = "citations_dois";

    fn suggest(content: &str) -> String {
        let hint = parse_query_hint(content);
        suggest_output_name(hint.as_deref(), FALLBACK, 50)
    }

    #[test]
    fn test_query_hint_sanitized() {
        assert_eq!(suggest(r#"{"query": "Some Title! 2020"}"#), "Some_Title_2020");
        assert_eq!(suggest(r#"{"query": "COVID-19 Variants"}"#), "COVID19_Variants");
    }

    #[test]
    fn test_sanitize_truncates_to_limit() {
        let long = "word ".repeat(20);
        let name = sanitize_name(&long, 50);
        assert_eq!(name.chars().count(), 50);
        assert!(name.starts_with("word_word_"));
    }

    #[test]
    fn test_sanitize_drops_non_ascii() {
        assert_eq!(sanitize_name("Café Über 2021", 50), "Caf_ber_2021");
    }

    #[test]
    fn test_fallback_on_bad_reports() {
        assert_eq!(suggest("not json at all"), FALLBACK);
        assert_eq!(suggest(""), FALLBACK);
        assert_eq!(suggest(r#"{"title": "x"}"#), FALLBACK);
        assert_eq!(suggest(r#"{"query": 42}"#), FALLBACK);
        assert_eq!(suggest(r#"{"query": null}"#), FALLBACK);
        assert_eq!(suggest(r#"["query"]"#), FALLBACK);
    }

    #[test]
    fn test_fallback_when_sanitized_empty() {
        assert_eq!(suggest(r#"{"query": "?!-"}"#), FALLBACK);
        assert_eq!(suggest(r#"{"query": ""}"#), FALLBACK);
    }

    #[test]
    fn test_hint_error_kinds() {
        assert!(matches!(parse_query_hint("{"), Err(HintError::Malformed(_))));
        assert!(matches!(parse_query_hint("{}"), Err(HintError::MissingQuery)));

        let temp_dir = TempDir::new().unwrap();
        let result = read_query_hint(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(HintError::Unreadable(_))));
    }

    #[test]
    fn test_read_query_hint_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("report.json");
        std::fs::write(&path, r#"{"query": "Deep Sea Vents", "sections": []}"#).unwrap();

        assert_eq!(read_query_hint(&path).unwrap(), "Deep Sea Vents");
    }

    #[test]
    fn test_output_name_normalization() {
        assert_eq!(normalize_output_name("", "Some_Title"), "Some_Title.txt");
        assert_eq!(normalize_output_name("   ", "Some_Title"), "Some_Title.txt");
        assert_eq!(normalize_output_name("refs", "Some_Title"), "refs.txt");
        assert_eq!(normalize_output_name("refs.txt", "Some_Title"), "refs.txt");
        assert_eq!(normalize_output_name("refs.md", "Some_Title"), "refs.md.txt");
    }
}
