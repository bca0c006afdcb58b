//! Front-matter splitting and parsing.
//!
//! A note may open with a YAML header delimited by `---` lines:
//!
//! ```text
//! ---
//! title: Redis
//! tags: [databases, cache]
//! ---
//! Body text...
//! ```

use serde_json::{Map, Value};

/// Parsed front-matter: an arbitrary key/value mapping.
pub type FrontMatter = Map<String, Value>;

const DELIMITER: &str = "---";

/// Split raw note text into `(header, body)`.
///
/// Returns `None` when the text does not start with a complete header block.
/// An unclosed header is treated as ordinary body text.
#[must_use]
pub fn split(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == DELIMITER {
            let header = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Some((header, body));
        }
        offset += line.len();
    }

    None
}

/// Parse a YAML header into a mapping.
///
/// An empty header yields an empty mapping. `Ok(None)` means the header parsed
/// but is not a mapping (for example a bare scalar or a list).
///
/// # Errors
///
/// Returns the YAML error if the header is not valid YAML.
pub fn parse(header: &str) -> Result<Option<FrontMatter>, serde_yaml::Error> {
    if header.trim().is_empty() {
        return Ok(Some(FrontMatter::new()));
    }

    match serde_yaml::from_str::<Value>(header)? {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(Some(FrontMatter::new())),
        _ => Ok(None),
    }
}

/// Extract the `title` field, if it holds a usable scalar.
#[must_use]
pub fn title(front_matter: &FrontMatter) -> Option<String> {
    match front_matter.get("title")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract tags from a `tags` list or a comma-separated `tags` string.
#[must_use]
pub fn tags(front_matter: &FrontMatter) -> Vec<String> {
    match front_matter.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract the `date` field as display text.
#[must_use]
pub fn date(front_matter: &FrontMatter) -> Option<String> {
    match front_matter.get("date")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod split_tests {
        use super::*;

        #[test]
        fn splits_header_from_body() {
            let (header, body) = split("---\ntitle: Redis\n---\nBody here").unwrap();
            assert_eq!(header, "title: Redis\n");
            assert_eq!(body, "Body here");
        }

        #[test]
        fn drops_blank_lines_after_header() {
            let (_, body) = split("---\na: 1\n---\n\n\nBody").unwrap();
            assert_eq!(body, "Body");
        }

        #[test]
        fn handles_crlf_line_endings() {
            let (header, body) = split("---\r\ntags: [go]\r\n---\r\nBody").unwrap();
            assert_eq!(header, "tags: [go]\r\n");
            assert_eq!(body, "Body");
        }

        #[test]
        fn empty_header() {
            let (header, body) = split("---\n---\nBody").unwrap();
            assert_eq!(header, "");
            assert_eq!(body, "Body");
        }

        #[test]
        fn header_only() {
            let (header, body) = split("---\ntitle: x\n---").unwrap();
            assert_eq!(header, "title: x\n");
            assert_eq!(body, "");
        }

        #[test]
        fn ignores_byte_order_mark() {
            assert!(split("\u{feff}---\ntitle: x\n---\nBody").is_some());
        }

        #[test]
        fn no_header() {
            assert!(split("# Heading\n\nBody").is_none());
        }

        #[test]
        fn unclosed_header_is_body() {
            assert!(split("---\ntitle: x\nstill body").is_none());
        }

        #[test]
        fn rule_not_on_first_line() {
            assert!(split("Intro\n---\nmore").is_none());
        }

        #[test]
        fn dashes_must_be_alone_on_first_line() {
            assert!(split("--- not a header\ntitle: x\n---\n").is_none());
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn parses_mapping() {
            let fm = parse("title: Redis\ntags: [db, cache]\n").unwrap().unwrap();
            assert_eq!(fm.get("title"), Some(&Value::String("Redis".into())));
            assert_eq!(tags(&fm), vec!["db", "cache"]);
        }

        #[test]
        fn empty_header_is_empty_mapping() {
            assert!(parse("").unwrap().unwrap().is_empty());
            assert!(parse("   \n").unwrap().unwrap().is_empty());
        }

        #[test]
        fn scalar_header_is_not_a_mapping() {
            assert!(parse("just a string").unwrap().is_none());
        }

        #[test]
        fn invalid_yaml_is_an_error() {
            assert!(parse("title: [unclosed").is_err());
        }
    }

    mod field_tests {
        use super::*;

        fn fm(yaml: &str) -> FrontMatter {
            parse(yaml).unwrap().unwrap()
        }

        #[test]
        fn title_from_string() {
            assert_eq!(title(&fm("title: '  Hello  '")), Some("Hello".into()));
        }

        #[test]
        fn blank_title_is_ignored() {
            assert_eq!(title(&fm("title: ''")), None);
            assert_eq!(title(&fm("other: x")), None);
        }

        #[test]
        fn tags_from_comma_string() {
            assert_eq!(tags(&fm("tags: rust, go ,")), vec!["rust", "go"]);
        }

        #[test]
        fn tags_with_scalars() {
            assert_eq!(tags(&fm("tags: [2024, true, x]")), vec!["2024", "true", "x"]);
        }

        #[test]
        fn missing_tags() {
            assert!(tags(&fm("title: x")).is_empty());
        }

        #[test]
        fn date_is_kept_as_text() {
            assert_eq!(date(&fm("date: 2024-03-01")), Some("2024-03-01".into()));
        }
    }
}
