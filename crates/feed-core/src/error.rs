//! Error types for `feed-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// An activity was submitted without a usable object reference.
  /// Rejected before anything reaches persistence.
  #[error("activity has no usable object reference")]
  MissingObject,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
