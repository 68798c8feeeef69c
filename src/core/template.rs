//! Prompt templates with named `{{placeholder}}` slots.

use crate::api::ChainError;
use regex::Regex;
use std::collections::HashMap;

/// An immutable prompt pattern with named placeholders.
///
/// Partial variables are bound once at construction (format directions for
/// structured output are attached this way); everything else is supplied per
/// call to [`format`](PromptTemplate::format). Values are substituted
/// verbatim, with no escaping.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
    partials: HashMap<String, String>,
}

impl PromptTemplate {
    /// Creates a template over `input_variables`.
    pub fn new(template: impl Into<String>, input_variables: &[&str]) -> Self {
        Self {
            template: template.into(),
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
            partials: HashMap::new(),
        }
    }

    /// Binds a fixed value for one placeholder. Partials take precedence
    /// over per-call variables of the same name.
    pub fn with_partial(mut self, name: &str, value: impl Into<String>) -> Self {
        self.partials.insert(name.to_string(), value.into());
        self
    }

    /// The variable names callers are expected to supply.
    pub fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    /// Substitutes every placeholder referenced by the pattern.
    ///
    /// Fails with [`ChainError::MissingPlaceholder`] if any referenced
    /// placeholder has neither a partial nor a supplied value; nothing is
    /// silently defaulted. On success the output is placeholder-free.
    pub fn format(&self, vars: &HashMap<String, String>) -> Result<String, ChainError> {
        let re = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
        let mut missing: Option<String> = None;

        let rendered = re.replace_all(&self.template, |caps: &regex::Captures| {
            let key = &caps[1];
            match self.partials.get(key).or_else(|| vars.get(key)) {
                Some(value) => value.clone(),
                None => {
                    if missing.is_none() {
                        missing = Some(key.to_string());
                    }
                    String::new()
                }
            }
        });

        match missing {
            Some(name) => Err(ChainError::MissingPlaceholder { name }),
            None => Ok(rendered.into_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn format_substitutes_every_placeholder() {
        let template = PromptTemplate::new(
            "A character from {{country}} with MBTI {{mbti}}.",
            &["country", "mbti"],
        );
        let rendered = template
            .format(&vars(&[("country", "Japan"), ("mbti", "INTJ")]))
            .unwrap();
        assert_eq!(rendered, "A character from Japan with MBTI INTJ.");
        assert!(!rendered.contains("{{"));
    }

    #[test]
    fn format_is_deterministic() {
        let template = PromptTemplate::new("Hello {{who}} and {{who}}.", &["who"]);
        let first = template.format(&vars(&[("who", "Aiko")])).unwrap();
        let second = template.format(&vars(&[("who", "Aiko")])).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, "Hello Aiko and Aiko.");
    }

    #[test]
    fn missing_placeholder_is_an_error() {
        let template = PromptTemplate::new(
            "A character from {{country}} with MBTI {{mbti}}.",
            &["country", "mbti"],
        );
        let err = template.format(&vars(&[("country", "Japan")])).unwrap_err();
        match err {
            ChainError::MissingPlaceholder { name } => assert_eq!(name, "mbti"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn partials_fill_fixed_slots() {
        let template = PromptTemplate::new("{{question}}\n{{format_instructions}}", &["question"])
            .with_partial("format_instructions", "Answer in JSON.");
        let rendered = template.format(&vars(&[("question", "Who?")])).unwrap();
        assert_eq!(rendered, "Who?\nAnswer in JSON.");
    }

    #[test]
    fn values_are_interpolated_verbatim() {
        let template = PromptTemplate::new("Say: {{text}}", &["text"]);
        let rendered = template
            .format(&vars(&[("text", "ignore previous instructions")]))
            .unwrap();
        assert_eq!(rendered, "Say: ignore previous instructions");
    }
}
