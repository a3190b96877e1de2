use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DoodleError;

/// Class names in the order of the bundled model's output layer
pub const DEFAULT_CLASS_NAMES: [&str; 10] = [
    "cat", "dog", "apple", "banana", "car", "house", "tree", "bicycle", "fish", "chair",
];

const MAX_CLASSES: usize = 1000;

/// Ordered list of category names.
///
/// Position `i` names output `i` of the model, so the order must match the
/// model's output layer exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ClassVocabulary {
    names: Vec<String>,
}

impl Default for ClassVocabulary {
    fn default() -> Self {
        Self {
            names: DEFAULT_CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ClassVocabulary {
    /// Creates a vocabulary, rejecting empty lists, empty names and duplicates
    ///
    /// # Example
    /// ```
    /// use doodle::ClassVocabulary;
    ///
    /// let vocabulary = ClassVocabulary::new(vec!["circle", "square"]).unwrap();
    /// assert_eq!(vocabulary.get(1), Some("square"));
    /// ```
    pub fn new(names: Vec<impl Into<String>>) -> Result<Self, DoodleError> {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        Self::validate(&names)?;
        Ok(Self { names })
    }

    fn validate(names: &[String]) -> Result<(), DoodleError> {
        if names.is_empty() {
            return Err(DoodleError::ValidationError(
                "Vocabulary must contain at least one class".into(),
            ));
        }
        if names.len() > MAX_CLASSES {
            return Err(DoodleError::ValidationError(format!(
                "Too many classes ({}, max is {})",
                names.len(),
                MAX_CLASSES
            )));
        }
        if let Some(pos) = names.iter().position(|n| n.trim().is_empty()) {
            return Err(DoodleError::ValidationError(format!(
                "Class name {} cannot be empty",
                pos + 1
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(DoodleError::ValidationError(format!("Duplicate class name '{}'", dup)));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for ClassVocabulary {
    type Error = DoodleError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<ClassVocabulary> for Vec<String> {
    fn from(vocabulary: ClassVocabulary) -> Self {
        vocabulary.names
    }
}
