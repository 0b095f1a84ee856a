//! Content Extractor (C2): turns a Skype message body — which may carry a
//! small set of HTML-ish tags — into plain text and a structured index of
//! mentions, links, quotes, and formatting spans.

mod markup;
mod structured;

pub use markup::format_markup;
pub use structured::{extract_structured, StructuredIndex};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_markup_is_idempotent_on_plain_text() {
        let plain = "just some plain text, no tags here";
        assert_eq!(format_markup(plain), format_markup(&format_markup(plain)));
    }

    #[test]
    fn mention_and_link_scenario() {
        let body = r#"<at id="u2">Bob</at> see <a href="https://x.y">here</a>"#;
        assert_eq!(format_markup(body), "@Bob see here (https://x.y)");

        let structured = extract_structured(body);
        assert_eq!(structured.mentions.len(), 1);
        assert_eq!(structured.mentions[0].id, "u2");
        assert_eq!(structured.mentions[0].name, "Bob");
        assert_eq!(structured.links.len(), 1);
        assert_eq!(structured.links[0].url, "https://x.y");
        assert_eq!(structured.links[0].text, "here");
    }
}
