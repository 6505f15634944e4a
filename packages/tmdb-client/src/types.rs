use serde::{Deserialize, Serialize};

/// Movie details from `GET /movie/{id}`.
///
/// Only the fields the watch-list product displays; TMDB returns far more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}
