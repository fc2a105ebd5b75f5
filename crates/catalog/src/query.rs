//! Path-style catalog query descriptors.

use marquee_core::category::Category;
use marquee_core::types::EntityId;

/// A catalog request: a path relative to the API base plus query
/// parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl CatalogQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// `/search/{category}?query=..`
    pub fn search(category: Category, query: &str) -> Self {
        Self::new(format!("/search/{}", category.as_str()))
            .param("query", query)
            .param("include_adult", "false")
            .param("page", "1")
    }

    /// `/{category}/{id}` with credits appended.
    pub fn details(category: Category, id: EntityId) -> Self {
        Self::new(format!("/{}/{id}", category.as_str())).param("append_to_response", "credits")
    }

    /// `/trending/{category}/week`
    pub fn trending(category: Category) -> Self {
        Self::new(format!("/trending/{}/week", category.as_str()))
    }
}
