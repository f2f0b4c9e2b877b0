//! Error type for `feed-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] feed_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to save, delete, restore, or purge an unknown activity.
  #[error("activity not found: {0}")]
  ActivityNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
