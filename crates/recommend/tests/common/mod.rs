//! Shared fakes for pipeline tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use marquee_catalog::{Catalog, CatalogError};
use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::types::EntityId;
use marquee_recommend::{GenerationError, TextGenerator};

/// Generator that returns a fixed reply and records what it was sent.
pub struct ScriptedGenerator {
    reply: Result<String, u16>,
    pub prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(GenerationError::Api {
                status: *status,
                body: "overloaded".into(),
            }),
        }
    }
}

pub fn item(category: Category, id: EntityId, title: &str) -> CatalogItem {
    CatalogItem {
        id,
        category,
        title: title.to_string(),
        year: None,
        release_date: None,
        overview: String::new(),
        poster: None,
        backdrop: None,
        catalog_score: None,
        genres: Vec::new(),
        genre_ids: Vec::new(),
        cast: Vec::new(),
        director: None,
        runtime: None,
        seasons: None,
    }
}

/// Title-keyed catalog. Titles listed in `failing` return an error.
#[derive(Default)]
pub struct TitleCatalog {
    titles: HashMap<String, Vec<CatalogItem>>,
    failing: Vec<String>,
    pub searched: Mutex<Vec<(Category, String)>>,
}

impl TitleCatalog {
    pub fn with(mut self, title: &str, results: Vec<CatalogItem>) -> Self {
        self.titles.insert(title.to_string(), results);
        self
    }

    pub fn failing(mut self, title: &str) -> Self {
        self.failing.push(title.to_string());
        self
    }
}

#[async_trait]
impl Catalog for TitleCatalog {
    async fn search(
        &self,
        category: Category,
        query: &str,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        self.searched
            .lock()
            .unwrap()
            .push((category, query.to_string()));
        if self.failing.iter().any(|t| t == query) {
            return Err(CatalogError::Api {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(self.titles.get(query).cloned().unwrap_or_default())
    }

    async fn details(&self, _category: Category, _id: EntityId) -> Result<CatalogItem, CatalogError> {
        Err(CatalogError::Unusable("not scripted".into()))
    }

    async fn trending(&self, _category: Category) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(Vec::new())
    }
}
