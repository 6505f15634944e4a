// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
//
// Naming convention: Base* for trait names (e.g., BaseCatalog)

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Human-readable metadata for a catalog title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTitle {
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

/// Title catalog lookup (Infrastructure - external metadata source).
///
/// The engine treats item refs as opaque strings; this trait is the only
/// place a ref is ever interpreted. Lookups are decoration only, so
/// implementations return `Ok(None)` for unknown refs rather than erroring.
#[async_trait]
pub trait BaseCatalog: Send + Sync {
    async fn lookup(&self, item_ref: &str) -> Result<Option<CatalogTitle>>;
}
