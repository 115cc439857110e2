//! Calendar handles supplied by providers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a provider calendar plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarHandle {
    pub id: String,
    pub name: String,
}

impl CalendarHandle {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        CalendarHandle {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CalendarHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
