//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, the `data` payload as compact JSON. Entity reference slots map
//! to a pair of nullable `*_type` / `*_id` columns.

use chrono::{DateTime, Utc};
use feed_core::{activity::Activity, entity::EntityRef, grouping::Grouping};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_opt_dt(dt: Option<DateTime<Utc>>) -> Option<String> {
  dt.map(encode_dt)
}

pub fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Entity reference slots ──────────────────────────────────────────────────

/// Split an optional ref into its two nullable columns.
pub fn encode_slot(slot: Option<&EntityRef>) -> (Option<String>, Option<String>) {
  match slot {
    Some(r) => (Some(r.entity_type.clone()), Some(r.id.clone())),
    None => (None, None),
  }
}

/// Rebuild a slot from its columns. A row where both halves are NULL is an
/// unset slot; a half-set row (legacy data) decodes with the missing half
/// as an empty string rather than erroring.
pub fn decode_slot(
  entity_type: Option<String>,
  id: Option<String>,
) -> Option<EntityRef> {
  match (entity_type, id) {
    (None, None) => None,
    (entity_type, id) => Some(EntityRef {
      entity_type: entity_type.unwrap_or_default(),
      id:          id.unwrap_or_default(),
    }),
  }
}

// ─── Data payload ────────────────────────────────────────────────────────────

pub fn encode_data(data: Option<&serde_json::Value>) -> Result<Option<String>> {
  data.map(serde_json::to_string).transpose().map_err(Error::Json)
}

pub fn decode_data(s: Option<&str>) -> Result<Option<serde_json::Value>> {
  s.map(serde_json::from_str).transpose().map_err(Error::Json)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `activities` row.
pub struct RawActivity {
  pub activity_id:  String,
  pub actor_type:   Option<String>,
  pub actor_id:     Option<String>,
  pub verb:         String,
  pub object_type:  Option<String>,
  pub object_id:    Option<String>,
  pub target_type:  Option<String>,
  pub target_id:    Option<String>,
  pub data:         Option<String>,
  pub published_at: Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
  pub deleted_at:   Option<String>,
}

impl RawActivity {
  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      activity_id:  decode_uuid(&self.activity_id)?,
      actor:        decode_slot(self.actor_type, self.actor_id),
      verb:         self.verb,
      object:       decode_slot(self.object_type, self.object_id),
      target:       decode_slot(self.target_type, self.target_id),
      data:         decode_data(self.data.as_deref())?,
      published_at: decode_opt_dt(self.published_at.as_deref())?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
      deleted_at:   decode_opt_dt(self.deleted_at.as_deref())?,
    })
  }
}

/// Raw strings read directly from a `groupings` row.
pub struct RawGrouping {
  pub grouping_id: String,
  pub activity_id: String,
  pub family_hash: String,
  pub context:     Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawGrouping {
  pub fn into_grouping(self) -> Result<Grouping> {
    Ok(Grouping {
      grouping_id: decode_uuid(&self.grouping_id)?,
      activity_id: decode_uuid(&self.activity_id)?,
      family_hash: self.family_hash,
      context:     self.context,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}
