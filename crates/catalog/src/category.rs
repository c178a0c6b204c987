use serde::{Deserialize, Serialize};

use stockledger_core::CategoryId;

use crate::store::CatalogReader;

/// Product category; `parent_id` forms a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn root(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
        }
    }

    pub fn child_of(id: CategoryId, name: impl Into<String>, parent_id: CategoryId) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: Some(parent_id),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Full hierarchical path of a category, e.g. `"Electronics > Computers"`.
///
/// Walks the parent chain through the reader; a dangling parent ends the path
/// and a cycle is cut off rather than looping.
pub fn category_path(reader: &impl CatalogReader, id: CategoryId) -> Option<String> {
    let mut parts = Vec::new();
    let mut seen = Vec::new();
    let mut cursor = Some(id);

    while let Some(current) = cursor {
        if seen.contains(&current) {
            break;
        }
        seen.push(current);

        let Some(category) = reader.category(current) else {
            break;
        };
        parts.push(category.name);
        cursor = category.parent_id;
    }

    if parts.is_empty() {
        return None;
    }
    parts.reverse();
    Some(parts.join(" > "))
}
