//! Category type.

use serde::{Deserialize, Serialize};

use super::new_id;

/// A node in the category forest. `parent_id` of `None` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub parent_id: Option<String>,
}

impl Category {
    /// A new category under a fresh id.
    pub fn new(name: impl Into<String>, parent_id: Option<String>) -> Self {
        Category { id: new_id(), name: name.into(), parent_id }
    }

    /// Fixed-id constructor used for built-in categories.
    pub(crate) fn builtin(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    /// Whether this category is a root of the forest.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}
