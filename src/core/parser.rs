//! Schema-driven extraction of named fields from completion text.

use crate::api::ChainError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// One named field the model is asked to produce.
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub name: String,
    pub description: String,
}

impl ResponseSchema {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Extracts the declared fields from free-form completion text.
///
/// The matching rule: a fenced ```json block is read first (that is what the
/// format instructions ask for); any fields still missing are taken from
/// `label: value` lines, matching labels case-insensitively. Either every
/// declared field is found or the parse fails whole.
#[derive(Debug, Clone)]
pub struct StructuredOutputParser {
    schemas: Vec<ResponseSchema>,
}

impl StructuredOutputParser {
    pub fn from_response_schemas(schemas: Vec<ResponseSchema>) -> Self {
        Self { schemas }
    }

    /// Format directions embedded into the prompt so the model emits a
    /// layout [`parse`](StructuredOutputParser::parse) recognizes.
    pub fn format_instructions(&self) -> String {
        let fields = self
            .schemas
            .iter()
            .map(|s| format!("\t\"{}\": string  // {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "The output should be a markdown code snippet formatted in the following schema, \
             including the leading and trailing \"```json\" and \"```\":\n\n```json\n{{\n{}\n}}\n```",
            fields
        )
    }

    /// Decomposes `text` into exactly the declared fields.
    ///
    /// Fails with [`ChainError::StructureMismatch`] when any field cannot be
    /// found; no partial result is returned. Values are kept as text with no
    /// type validation.
    pub fn parse(&self, text: &str) -> Result<HashMap<String, String>, ChainError> {
        let mut fields = self.parse_json(text).unwrap_or_default();
        if fields.len() < self.schemas.len() {
            for (key, value) in self.parse_labeled_lines(text) {
                fields.entry(key).or_insert(value);
            }
        }

        let mut out = HashMap::new();
        for schema in &self.schemas {
            match fields.get(&schema.name) {
                Some(value) => {
                    out.insert(schema.name.clone(), value.clone());
                }
                None => {
                    log::debug!("structured parse failed on: {}", text);
                    return Err(ChainError::StructureMismatch(format!(
                        "field '{}' not found in completion",
                        schema.name
                    )));
                }
            }
        }
        Ok(out)
    }

    /// Reads fields from a fenced ```json block, or from the whole text if
    /// it is itself a JSON object.
    fn parse_json(&self, text: &str) -> Option<HashMap<String, String>> {
        let re = Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").unwrap();
        let candidate = match re.captures(text) {
            Some(caps) => caps.get(1).map(|m| m.as_str().to_string())?,
            None => {
                let trimmed = text.trim();
                if !trimmed.starts_with('{') {
                    return None;
                }
                trimmed.to_string()
            }
        };

        let value: Value = serde_json::from_str(&candidate).ok()?;
        let object = value.as_object()?;

        let mut fields = HashMap::new();
        for schema in &self.schemas {
            if let Some(found) = object
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&schema.name))
                .and_then(|(_, v)| value_as_text(v))
            {
                fields.insert(schema.name.clone(), found);
            }
        }
        Some(fields)
    }

    /// Fallback for completions laid out as `label: value` lines.
    fn parse_labeled_lines(&self, text: &str) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        for line in text.lines() {
            let line =
                line.trim_start_matches(|c: char| c == '-' || c == '*' || c.is_whitespace());
            let Some((label, value)) = line.split_once(':') else {
                continue;
            };
            let label = label.trim().trim_matches('*').trim_matches('"').trim();
            let value = value
                .trim()
                .trim_end_matches(',')
                .trim_matches('"')
                .trim_matches('*')
                .trim();
            if value.is_empty() {
                continue;
            }
            for schema in &self.schemas {
                if schema.name.eq_ignore_ascii_case(label) {
                    fields
                        .entry(schema.name.clone())
                        .or_insert_with(|| value.to_string());
                }
            }
        }
        fields
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_as_text).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}
