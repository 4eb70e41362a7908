// src/attempt/options.rs

//! Normalization of stored choice options.
//!
//! The question bank has stored options in several encodings over time:
//! a JSON-encoded string, an array of plain strings, an array of
//! `{id, text}` objects or an object keyed by choice id. Each is classified
//! once into [`RawOptions`] and converted into the canonical ordered list of
//! [`ChoiceOption`].

use serde_json::{Map, Value};

use crate::models::question::ChoiceOption;

/// Recognized encodings of a question's `options` value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOptions {
    /// `["Paris", "Rome"]`; ids are the 0-based positions.
    Strings(Vec<String>),
    /// `[{"id": "a", "text": "Paris"}]`
    Pairs(Vec<ChoiceOption>),
    /// `{"a": "Paris", "b": "Rome"}`
    Mapping(Vec<(String, String)>),
    Empty,
}

impl RawOptions {
    /// Inspects the shape of a stored value. Malformed values become `Empty`.
    pub fn classify(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawOptions::Empty,
            Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
                // One level of decoding only; a string inside a string is malformed.
                Ok(Value::String(_)) => {
                    tracing::warn!("Options string decodes to another string, ignoring");
                    RawOptions::Empty
                }
                Ok(parsed) => Self::classify(Some(&parsed)),
                Err(e) => {
                    tracing::warn!("Failed to parse options string: {}", e);
                    RawOptions::Empty
                }
            },
            Some(Value::Array(items)) => Self::classify_array(items),
            Some(Value::Object(map)) => Self::classify_mapping(map),
            Some(other) => {
                tracing::warn!("Unsupported options value: {}", other);
                RawOptions::Empty
            }
        }
    }

    fn classify_array(items: &[Value]) -> Self {
        if items.is_empty() {
            return RawOptions::Empty;
        }

        if items.iter().all(Value::is_string) {
            let texts = items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect();
            return RawOptions::Strings(texts);
        }

        let pairs: Option<Vec<ChoiceOption>> = items.iter().map(pair_from_value).collect();
        match pairs {
            Some(pairs) => RawOptions::Pairs(pairs),
            None => {
                tracing::warn!("Options array mixes unsupported item shapes, ignoring");
                RawOptions::Empty
            }
        }
    }

    fn classify_mapping(map: &Map<String, Value>) -> Self {
        if map.is_empty() {
            return RawOptions::Empty;
        }
        let entries = map
            .iter()
            .map(|(key, value)| (key.clone(), scalar_text(value)))
            .collect();
        RawOptions::Mapping(entries)
    }

    pub fn into_choices(self) -> Vec<ChoiceOption> {
        match self {
            RawOptions::Strings(texts) => texts
                .into_iter()
                .enumerate()
                .map(|(index, text)| ChoiceOption {
                    id: index.to_string(),
                    text,
                })
                .collect(),
            RawOptions::Pairs(pairs) => pairs,
            RawOptions::Mapping(entries) => entries
                .into_iter()
                .map(|(id, text)| ChoiceOption { id, text })
                .collect(),
            RawOptions::Empty => Vec::new(),
        }
    }
}

/// Normalizes a stored `options` value into the canonical ordered list.
pub fn normalize_options(value: Option<&Value>) -> Vec<ChoiceOption> {
    RawOptions::classify(value).into_choices()
}

/// Accepts `{id, text}` where `id` may be a string or a number.
fn pair_from_value(value: &Value) -> Option<ChoiceOption> {
    let obj = value.as_object()?;
    let id = match obj.get("id")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    let text = obj.get("text")?.as_str()?.to_owned();
    Some(ChoiceOption { id, text })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
