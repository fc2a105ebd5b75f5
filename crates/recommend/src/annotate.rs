//! Library membership, computed at read time.
//!
//! Membership is never stored on a pick or a catalog item. Callers
//! annotate right before rendering so the answer reflects the cache at
//! that moment.

use marquee_core::category::Category;
use marquee_core::entity::CatalogItem;
use marquee_core::types::EntityId;
use marquee_library::EntityCache;
use serde::Serialize;

use crate::pipeline::ResolvedPick;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub in_library: bool,
    pub watched: bool,
}

impl Membership {
    pub fn of(cache: &EntityCache, category: Category, id: EntityId) -> Self {
        cache
            .find(category, id)
            .map_or_else(Self::default, |record| Self {
                in_library: true,
                watched: record.watched,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedPick {
    #[serde(flatten)]
    pub pick: ResolvedPick,
    #[serde(flatten)]
    pub membership: Membership,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedItem {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(flatten)]
    pub membership: Membership,
}

/// Annotate resolved picks. Unresolved picks are never in the library.
pub fn annotate(cache: &EntityCache, category: Category, picks: &[ResolvedPick]) -> Vec<AnnotatedPick> {
    picks
        .iter()
        .map(|pick| AnnotatedPick {
            membership: pick
                .catalog_item
                .as_ref()
                .map(|item| Membership::of(cache, category, item.id))
                .unwrap_or_default(),
            pick: pick.clone(),
        })
        .collect()
}

/// Annotate catalog search or trending results.
pub fn annotate_items(
    cache: &EntityCache,
    category: Category,
    items: Vec<CatalogItem>,
) -> Vec<AnnotatedItem> {
    items
        .into_iter()
        .map(|item| AnnotatedItem {
            membership: Membership::of(cache, category, item.id),
            item,
        })
        .collect()
}
