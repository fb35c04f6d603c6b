//! Event identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric event id with an optional name. `id == 0` means unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    pub id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EventId {
    pub const fn new(id: i32) -> Self {
        Self { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        self.id == 0 && self.name.as_deref().map_or(true, str::is_empty)
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::new(id)
    }
}

/// The name when present, otherwise the numeric id. Unspecified ids render
/// empty so they drop out of the list and JSON views.
impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            return Ok(());
        }
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => f.write_str(name),
            _ => write!(f, "{}", self.id),
        }
    }
}
