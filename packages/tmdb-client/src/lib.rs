//! Pure TMDB REST API client.
//!
//! A minimal client for The Movie Database API. Supports looking up movie
//! details by id, which is all the match engine needs to decorate pool items
//! and mutual matches with human-readable metadata.
//!
//! # Example
//!
//! ```rust,ignore
//! use tmdb_client::TmdbClient;
//!
//! let client = TmdbClient::new("your-api-key".into());
//!
//! if let Some(movie) = client.get_movie("603").await? {
//!     println!("{}", movie.title);
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Result, TmdbError};
pub use types::MovieDetails;

const BASE_URL: &str = "https://api.themoviedb.org/3";

pub struct TmdbClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, BASE_URL.to_string())
    }

    /// Mainly for tests pointing at a stub server.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    /// Fetch movie details by TMDB id. Returns `Ok(None)` for unknown ids so
    /// callers can treat stale references as missing metadata rather than
    /// failures.
    pub async fn get_movie(&self, movie_id: &str) -> Result<Option<MovieDetails>> {
        let url = format!("{}/movie/{}", self.base_url, movie_id);
        let resp = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            tracing::debug!(movie_id, "TMDB has no entry for id");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TmdbError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let details: MovieDetails = resp.json().await?;
        Ok(Some(details))
    }
}
