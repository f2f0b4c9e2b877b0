//! Grouping — one row per activity family per context.
//!
//! A grouping does not retain a member list. It stores the shared family
//! hash and a pointer to the most recently saved member; "all members of
//! group G" is answered by re-filtering activities on the recomputed hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One cluster of activities sharing a family hash within a context.
///
/// `(family_hash, context)` is unique — at most one row per hash per
/// context. `context` is a namespace discriminator letting parallel
/// grouping schemes coexist; `None` is the default context and the only
/// one the engine assigns to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grouping {
  pub grouping_id: Uuid,
  /// The most recently saved member of the family (last-writer-wins).
  pub activity_id: Uuid,
  pub family_hash: String,
  pub context:     Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}
