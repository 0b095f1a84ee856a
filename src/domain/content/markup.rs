//! Plain-text rendering of a message body (`FormatMarkup` in the design).
//!
//! A tolerant tokenizer builds a tag tree on well-formed input; any tag
//! imbalance (unclosed `<b>`, a stray `</a>` with no opener, …) falls back
//! to a sequential regex pass that is guaranteed to terminate and strips
//! whatever angle-bracket noise remains. Both paths apply the same
//! whitespace/entity normalization so they agree on well-formed input.

use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)((?:\s+[a-zA-Z_:][-a-zA-Z0-9_:.]*\s*=\s*"[^"]*")*)\s*(/?)>"#).unwrap()
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*"([^"]*)""#).unwrap());
static ANY_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

#[derive(Debug)]
enum Token<'a> {
    Text(&'a str),
    Open { name: String, attrs: Vec<(String, String)> },
    Close { name: String },
    Void { name: String, attrs: Vec<(String, String)> },
}

#[derive(Debug)]
enum Node {
    Text(String),
    Element { name: String, attrs: Vec<(String, String)>, children: Vec<Node> },
}

fn tokenize(body: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in TAG_RE.captures_iter(body) {
        let whole = caps.get(0).unwrap();
        if whole.start() > last {
            tokens.push(Token::Text(&body[last..whole.start()]));
        }
        last = whole.end();

        let closing = &caps[1] == "/";
        let name = caps[2].to_lowercase();
        let self_closing = &caps[4] == "/" || name == "br";
        let attrs = ATTR_RE
            .captures_iter(&caps[3])
            .map(|a| (a[1].to_lowercase(), decode_entities(&a[2])))
            .collect();

        if closing {
            tokens.push(Token::Close { name });
        } else if self_closing {
            tokens.push(Token::Void { name, attrs });
        } else {
            tokens.push(Token::Open { name, attrs });
        }
    }
    if last < body.len() {
        tokens.push(Token::Text(&body[last..]));
    }
    tokens
}

/// Parses tokens into a tree. Returns `None` if any opener is left
/// unclosed or a closer has no matching opener — the signal to fall back
/// to the regex path.
fn parse(tokens: &[Token<'_>]) -> Option<Vec<Node>> {
    fn parse_until<'t>(
        tokens: &[Token<'t>],
        pos: &mut usize,
        stop: Option<&str>,
    ) -> Option<Vec<Node>> {
        let mut nodes = Vec::new();
        while *pos < tokens.len() {
            match &tokens[*pos] {
                Token::Text(t) => {
                    nodes.push(Node::Text(t.to_string()));
                    *pos += 1;
                }
                Token::Void { name, attrs } => {
                    nodes.push(Node::Element { name: name.clone(), attrs: attrs.clone(), children: vec![] });
                    *pos += 1;
                }
                Token::Open { name, attrs } => {
                    let name = name.clone();
                    let attrs = attrs.clone();
                    *pos += 1;
                    let children = parse_until(tokens, pos, Some(&name))?;
                    nodes.push(Node::Element { name, attrs, children });
                }
                Token::Close { name } => {
                    if Some(name.as_str()) == stop {
                        *pos += 1;
                        return Some(nodes);
                    }
                    return None;
                }
            }
        }
        if stop.is_some() {
            return None;
        }
        Some(nodes)
    }

    let mut pos = 0;
    parse_until(tokens, &mut pos, None)
}

fn render(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(&decode_entities(t)),
            Node::Element { name, attrs, children } => render_element(name, attrs, children, out),
        }
    }
}

fn render_element(name: &str, attrs: &[(String, String)], children: &[Node], out: &mut String) {
    let mut inner = String::new();
    render(children, &mut inner);

    match name {
        "at" => {
            let display_name = if inner.trim().is_empty() {
                attrs.iter().find(|(k, _)| k == "id").map(|(_, v)| v.clone()).unwrap_or_default()
            } else {
                inner.trim().to_string()
            };
            out.push('@');
            out.push_str(&display_name);
        }
        "a" => {
            let href = attrs.iter().find(|(k, _)| k == "href").map(|(_, v)| v.as_str()).unwrap_or("");
            let text = inner.trim();
            if text.is_empty() || text == href {
                out.push_str(href);
            } else {
                out.push_str(text);
                out.push_str(" (");
                out.push_str(href);
                out.push(')');
            }
        }
        "b" | "strong" => {
            out.push('*');
            out.push_str(&inner);
            out.push('*');
        }
        "i" | "em" | "u" => {
            out.push('_');
            out.push_str(&inner);
            out.push('_');
        }
        "s" | "strike" | "del" => {
            out.push('~');
            out.push_str(&inner);
            out.push('~');
        }
        "code" | "pre" => {
            out.push('`');
            out.push_str(&inner);
            out.push('`');
        }
        "quote" => {
            let author = attrs.iter().find(|(k, _)| k == "author").map(|(_, v)| v.as_str());
            out.push('\n');
            match author {
                Some(a) if !a.is_empty() => {
                    out.push_str("> ");
                    out.push_str(a);
                    out.push_str(" wrote:\n");
                }
                _ => out.push_str("> wrote:\n"),
            }
            out.push_str("> ");
            out.push_str(inner.trim());
            out.push('\n');
        }
        "br" => out.push('\n'),
        _ => out.push_str(&inner),
    }
}

/// Entry point: renders a message body to plain text, tolerant of
/// malformed markup.
pub fn format_markup(body: &str) -> String {
    let tokens = tokenize(body);
    let rendered = match parse(&tokens) {
        Some(nodes) => {
            let mut out = String::new();
            render(&nodes, &mut out);
            out
        }
        None => format_markup_regex(body),
    };
    normalize_whitespace(&rendered)
}

/// Sequential regex-based fallback for malformed input: applies the same
/// substitutions as the tokenizer path, then strips any remaining tags.
fn format_markup_regex(body: &str) -> String {
    let mut text = decode_entities(body);

    let at_re = Regex::new(r#"(?s)<at\s+id="([^"]*)">(.*?)</at>"#).unwrap();
    text = at_re.replace_all(&text, |c: &regex::Captures| {
        let inner = c[2].trim();
        format!("@{}", if inner.is_empty() { &c[1] } else { inner })
    }).into_owned();

    let a_re = Regex::new(r#"(?s)<a\s+href="([^"]*)">(.*?)</a>"#).unwrap();
    text = a_re.replace_all(&text, |c: &regex::Captures| {
        let href = &c[1];
        let inner = c[2].trim();
        if inner.is_empty() || inner == href {
            href.to_string()
        } else {
            format!("{inner} ({href})")
        }
    }).into_owned();

    let quote_re = Regex::new(r#"(?s)<quote(?:\s+author="([^"]*)")?>(.*?)</quote>"#).unwrap();
    text = quote_re.replace_all(&text, |c: &regex::Captures| {
        let author = c.get(1).map(|m| m.as_str()).unwrap_or("");
        let body = c[2].trim();
        if author.is_empty() {
            format!("\n> wrote:\n> {body}\n")
        } else {
            format!("\n> {author} wrote:\n> {body}\n")
        }
    }).into_owned();

    for (tag, wrap) in [("b", "*"), ("strong", "*"), ("i", "_"), ("em", "_"), ("u", "_"), ("s", "~"), ("strike", "~"), ("del", "~"), ("code", "`"), ("pre", "`")] {
        let re = Regex::new(&format!(r"(?si)<{tag}>(.*?)</{tag}>")).unwrap();
        text = re.replace_all(&text, |c: &regex::Captures| format!("{wrap}{}{wrap}", &c[1])).into_owned();
    }

    text = Regex::new(r"(?i)<br\s*/?>").unwrap().replace_all(&text, "\n").into_owned();

    ANY_TAG_RE.replace_all(&text, "").into_owned()
}

fn normalize_whitespace(text: &str) -> String {
    let collapsed = Regex::new(r"[ \t]+").unwrap().replace_all(text, " ");
    let trimmed_lines = Regex::new(r"[ \t]*\n[ \t]*").unwrap().replace_all(&collapsed, "\n");
    let collapsed_newlines = Regex::new(r"\n{3,}").unwrap().replace_all(&trimmed_lines, "\n\n");
    collapsed_newlines.trim().to_string()
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_and_italic() {
        assert_eq!(format_markup("<b>hi</b> <i>there</i>"), "*hi* _there_");
    }

    #[test]
    fn br_becomes_newline_and_collapses() {
        assert_eq!(format_markup("a<br>b<br><br><br>c"), "a\nb\n\nc");
    }

    #[test]
    fn quote_with_author() {
        let out = format_markup(r#"<quote author="Alice">hello</quote>"#);
        assert_eq!(out, "> Alice wrote:\n> hello");
    }

    #[test]
    fn link_with_identical_text_and_url() {
        assert_eq!(format_markup(r#"<a href="https://x.y">https://x.y</a>"#), "https://x.y");
    }

    #[test]
    fn unclosed_tag_falls_back_to_regex_and_strips_noise() {
        let out = format_markup("<b>unterminated bold");
        assert_eq!(out, "unterminated bold");
    }

    #[test]
    fn entities_decoded() {
        assert_eq!(format_markup("Tom &amp; Jerry"), "Tom & Jerry");
    }

    #[test]
    fn empty_body_yields_empty_string() {
        assert_eq!(format_markup(""), "");
    }
}
