//! The structured character produced by the generation chain.

use crate::api::ChainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A generated character. `age` stays text: the model is free to answer
/// "29" or "about thirty", and the apps only ever display it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub age: String,
    pub characteristics: String,
}

impl Character {
    /// Builds a character from parsed completion fields. Either every field
    /// is present or this fails; there is no partial character.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, ChainError> {
        let get = |key: &str| {
            fields.get(key).cloned().ok_or_else(|| {
                ChainError::StructureMismatch(format!("field '{}' not found in completion", key))
            })
        };
        Ok(Self {
            name: get("name")?,
            age: get("age")?,
            characteristics: get("characteristics")?,
        })
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Age: {}", self.age)?;
        write!(f, "Characteristics: {}", self.characteristics)
    }
}
