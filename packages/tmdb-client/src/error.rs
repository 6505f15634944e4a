use thiserror::Error;

pub type Result<T> = std::result::Result<T, TmdbError>;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TMDB API error (status {status}): {message}")]
    Api { status: u16, message: String },
}
