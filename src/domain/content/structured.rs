//! `ExtractStructured`: builds the mentions/links/quotes/formatting index
//! alongside (not instead of) the plain-text rendering.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mention {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub author: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Formatting {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bold: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub italic: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub underline: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strike: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub code: Vec<String>,
}

impl Formatting {
    fn is_empty(&self) -> bool {
        self.bold.is_empty()
            && self.italic.is_empty()
            && self.underline.is_empty()
            && self.strike.is_empty()
            && self.code.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredIndex {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mentions: Vec<Mention>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quotes: Vec<Quote>,
    #[serde(skip_serializing_if = "Formatting::is_empty")]
    pub formatting: Formatting,
}

static AT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?s)<at\s+id="([^"]*)">(.*?)</at>"#).unwrap());
static A_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?s)<a\s+href="([^"]*)">(.*?)</a>"#).unwrap());
static QUOTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<quote(?:\s+author="([^"]*)")?>(.*?)</quote>"#).unwrap());

fn strip_tags(s: &str) -> String {
    Regex::new(r"(?s)<[^>]*>").unwrap().replace_all(s, "").trim().to_string()
}

fn format_captures(tag: &str, body: &str) -> Vec<String> {
    let full = Regex::new(&format!(r"(?si)<{tag}>(.*?)</{tag}>")).unwrap();
    full.captures_iter(body).map(|c| strip_tags(&c[1])).collect()
}

pub fn extract_structured(body: &str) -> StructuredIndex {
    let mentions = AT_RE
        .captures_iter(body)
        .map(|c| Mention { id: c[1].to_string(), name: strip_tags(&c[2]) })
        .collect();

    let links = A_RE
        .captures_iter(body)
        .map(|c| Link { url: c[1].to_string(), text: strip_tags(&c[2]) })
        .collect();

    let quotes = QUOTE_RE
        .captures_iter(body)
        .map(|c| Quote {
            author: c.get(1).map(|m| m.as_str().to_string()).filter(|s| !s.is_empty()),
            text: strip_tags(&c[2]),
        })
        .collect();

    let formatting = Formatting {
        bold: [format_captures("b", body), format_captures("strong", body)].concat(),
        italic: [format_captures("i", body), format_captures("em", body)].concat(),
        underline: format_captures("u", body),
        strike: [format_captures("s", body), format_captures("strike", body), format_captures("del", body)].concat(),
        code: [format_captures("code", body), format_captures("pre", body)].concat(),
    };

    StructuredIndex { mentions, links, quotes, formatting }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_mentions_and_links() {
        let body = r#"<at id="u2">Bob</at> see <a href="https://x.y">here</a>"#;
        let idx = extract_structured(body);
        assert_eq!(idx.mentions, vec![Mention { id: "u2".into(), name: "Bob".into() }]);
        assert_eq!(idx.links, vec![Link { url: "https://x.y".into(), text: "here".into() }]);
    }

    #[test]
    fn empty_tables_omitted_from_json() {
        let idx = extract_structured("plain text");
        let json = serde_json::to_value(&idx).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn quote_without_author() {
        let idx = extract_structured("<quote>hello</quote>");
        assert_eq!(idx.quotes[0].author, None);
        assert_eq!(idx.quotes[0].text, "hello");
    }

    #[test]
    fn bold_formatting_collected() {
        let idx = extract_structured("<b>loud</b> and <strong>clear</strong>");
        assert_eq!(idx.formatting.bold, vec!["loud".to_string(), "clear".to_string()]);
    }
}
