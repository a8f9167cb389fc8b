#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single entry of the task list.
///
/// `number` is positional: it always equals the task's 1-based index in the
/// owning list and is rewritten by [`TaskManager`](super::manager::TaskManager)
/// after every mutation. It is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub number: usize,
    pub description: String,
    pub done: bool,
}

impl Task {
    #[must_use]
    pub fn new(number: usize, description: impl Into<String>, done: bool) -> Self {
        Self {
            number,
            description: description.into(),
            done,
        }
    }

    #[must_use]
    pub fn checkbox(&self) -> &'static str {
        if self.done { "[x]" } else { "[ ]" }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.number, self.checkbox(), self.description)
    }
}

/// A parsed intent, consumed once by `TaskManager::execute`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { description: String },
    Update { number: usize, done: bool },
    Delete { number: usize },
}

impl Action {
    #[must_use]
    pub fn add(description: impl Into<String>) -> Self {
        Self::Add {
            description: description.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}
