//! Control inputs of the abstraction
//!
//! Each action is a named commanded acceleration. The names double as PRISM
//! action labels, so they must be valid identifiers.

use crate::error::{AbstractionError, Result};
use serde::{Deserialize, Serialize};

/// A named commanded acceleration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Label used in the IMDP and the controller module
    pub name: String,

    /// Commanded acceleration in m/s^2
    pub acceleration: f64,
}

impl Action {
    pub fn new(name: impl Into<String>, acceleration: f64) -> Self {
        Self {
            name: name.into(),
            acceleration,
        }
    }
}

/// Ordered, validated set of actions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl Default for ActionSet {
    fn default() -> Self {
        Self {
            actions: vec![
                Action::new("coast", 0.0),
                Action::new("brake_warn", -4.0),
                Action::new("brake_full", -9.8),
            ],
        }
    }
}

impl ActionSet {
    /// Validate and wrap a list of actions
    pub fn new(actions: Vec<Action>) -> Result<Self> {
        if actions.is_empty() {
            return Err(AbstractionError::config("Action set must not be empty"));
        }

        for (i, action) in actions.iter().enumerate() {
            if !is_identifier(&action.name) {
                return Err(AbstractionError::config(format!(
                    "Action name '{}' is not a valid identifier",
                    action.name
                )));
            }
            if !action.acceleration.is_finite() {
                return Err(AbstractionError::config(format!(
                    "Action '{}' has non-finite acceleration",
                    action.name
                )));
            }
            if actions[..i].iter().any(|a| a.name == action.name) {
                return Err(AbstractionError::config(format!(
                    "Duplicate action name '{}'",
                    action.name
                )));
            }
        }

        Ok(Self { actions })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Look up an action by name
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name.as_str()).collect()
    }
}

impl<'de> Deserialize<'de> for ActionSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let actions = Vec::<Action>::deserialize(deserializer)?;
        ActionSet::new(actions).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a ActionSet {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

/// PRISM-style identifier: letter or underscore, then alphanumerics/underscores
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
