//! Catalog implementations: TMDB-backed for production, null for tests and
//! deployments without an API key.

use anyhow::Result;
use async_trait::async_trait;
use tmdb_client::TmdbClient;
use tracing::warn;

use crate::kernel::traits::{BaseCatalog, CatalogTitle};

pub struct TmdbCatalog {
    client: TmdbClient,
}

impl TmdbCatalog {
    pub fn new(api_key: String) -> Self {
        Self {
            client: TmdbClient::new(api_key),
        }
    }
}

#[async_trait]
impl BaseCatalog for TmdbCatalog {
    async fn lookup(&self, item_ref: &str) -> Result<Option<CatalogTitle>> {
        // Catalog outages must not fail a swipe; a match without metadata
        // is still a match.
        let details = match self.client.get_movie(item_ref).await {
            Ok(d) => d,
            Err(e) => {
                warn!(item_ref, error = %e, "Catalog lookup failed, returning no metadata");
                return Ok(None);
            }
        };
        Ok(details.map(|d| CatalogTitle {
            title: d.title,
            overview: d.overview,
            poster_path: d.poster_path,
            release_date: d.release_date,
            vote_average: d.vote_average,
        }))
    }
}

/// Catalog that knows nothing. Used when no TMDB key is configured and in
/// tests that don't care about metadata.
pub struct NullCatalog;

#[async_trait]
impl BaseCatalog for NullCatalog {
    async fn lookup(&self, _item_ref: &str) -> Result<Option<CatalogTitle>> {
        Ok(None)
    }
}
