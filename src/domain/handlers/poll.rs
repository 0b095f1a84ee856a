use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::{prop_str, reject_malformed_properties, MessageHandler};
use crate::data::types::RawMessage;

pub struct PollHandler;

// Skype's own clients never populate `properties.question`/`options` for
// polls composed in-thread; they only ever carry the <pollquestion>/
// <polloption> tags in the body, same as <at>/<a> do for mentions/links.
static POLL_QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?si)<pollquestion>(.*?)</pollquestion>").unwrap());
static POLL_OPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?si)<polloption>(.*?)</polloption>").unwrap());

fn strip_tags(s: &str) -> String {
    Regex::new(r"(?s)<[^>]*>").unwrap().replace_all(s, "").trim().to_string()
}

fn question_from_content(content: &str) -> Option<String> {
    POLL_QUESTION_RE.captures(content).map(|c| strip_tags(&c[1]))
}

fn options_from_content(content: &str) -> Vec<String> {
    POLL_OPTION_RE.captures_iter(content).map(|c| strip_tags(&c[1])).collect()
}

impl MessageHandler for PollHandler {
    fn can_handle(&self, message_type: &str) -> bool {
        message_type == "Poll"
    }

    fn extract(&self, message: &RawMessage) -> Result<JsonMap<String, JsonValue>, String> {
        reject_malformed_properties(message)?;

        let mut data = JsonMap::new();

        let question = prop_str(message, "question")
            .filter(|s| !s.is_empty())
            .or_else(|| question_from_content(&message.content))
            .unwrap_or_default();
        data.insert("poll_question".into(), JsonValue::String(question));

        let props_options = message.properties.get("options").and_then(|v| v.as_array()).filter(|a| !a.is_empty()).cloned();
        let options: Vec<JsonValue> = match props_options {
            Some(opts) => opts
                .into_iter()
                .map(|opt| {
                    let mut entry = JsonMap::new();
                    entry.insert("text".into(), opt.get("text").cloned().unwrap_or(JsonValue::String(String::new())));
                    entry.insert(
                        "votes".into(),
                        opt.get("votes").and_then(|v| v.as_array()).map(|a| JsonValue::Number(a.len().into())).unwrap_or(JsonValue::Number(0.into())),
                    );
                    entry.insert("is_selected".into(), opt.get("is_selected").cloned().unwrap_or(JsonValue::Bool(false)));
                    JsonValue::Object(entry)
                })
                .collect(),
            None => options_from_content(&message.content)
                .into_iter()
                .map(|text| {
                    let mut entry = JsonMap::new();
                    entry.insert("text".into(), JsonValue::String(text));
                    entry.insert("votes".into(), JsonValue::Number(0.into()));
                    entry.insert("is_selected".into(), JsonValue::Bool(false));
                    JsonValue::Object(entry)
                })
                .collect(),
        };
        data.insert("poll_options".into(), JsonValue::Array(options));

        let mut metadata = JsonMap::new();
        metadata.insert("status".into(), prop_str(message, "status").map(JsonValue::String).unwrap_or(JsonValue::Null));
        metadata.insert("vote_visibility".into(), prop_str(message, "vote_visibility").map(JsonValue::String).unwrap_or(JsonValue::Null));
        metadata.insert("creator".into(), prop_str(message, "creator").map(JsonValue::String).unwrap_or(JsonValue::Null));
        metadata.insert(
            "total_votes".into(),
            message.properties.get("options").and_then(|v| v.as_array()).map(|opts| {
                let total: usize = opts.iter().filter_map(|o| o.get("votes").and_then(|v| v.as_array()).map(|a| a.len())).sum();
                JsonValue::Number(total.into())
            }).unwrap_or(JsonValue::Number(0.into())),
        );
        metadata.insert("created_at".into(), prop_str(message, "created_at").map(JsonValue::String).unwrap_or(JsonValue::Null));
        data.insert("poll_metadata".into(), JsonValue::Object(metadata));

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_question_and_options() {
        let props = serde_json::json!({
            "question": "Lunch?",
            "options": [{"text": "Pizza", "votes": ["u1", "u2"]}, {"text": "Salad", "votes": []}],
        });
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: String::new(),
            messagetype: "Poll".into(),
            edittime: None,
            properties: props,
            display_name: None,
        };
        let data = PollHandler.extract(&message).unwrap();
        assert_eq!(data["poll_question"], JsonValue::String("Lunch?".into()));
        let options = data["poll_options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["votes"], JsonValue::Number(2.into()));
        assert_eq!(data["poll_metadata"]["total_votes"], JsonValue::Number(2.into()));
    }

    #[test]
    fn parses_poll_tags_from_content_when_properties_absent() {
        let message = RawMessage {
            id: "m1".into(),
            originalarrivaltime: "2023-01-01T00:00:00Z".into(),
            from: "u1".into(),
            content: "<pollquestion>Color?</pollquestion><polloption>Red</polloption><polloption>Blue</polloption>".into(),
            messagetype: "Poll".into(),
            edittime: None,
            properties: JsonValue::Null,
            display_name: None,
        };
        let data = PollHandler.extract(&message).unwrap();
        assert_eq!(data["poll_question"], JsonValue::String("Color?".into()));
        let options = data["poll_options"].as_array().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0]["text"], JsonValue::String("Red".into()));
        assert_eq!(options[1]["text"], JsonValue::String("Blue".into()));
    }
}
