//! Activity — the canonical record of "actor performed verb on object,
//! optionally toward target".
//!
//! Activities are mutable rows with audit timestamps and a soft-delete
//! marker. The family hash, summary, headline, and labels are derived on
//! read and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, entity::EntityRef};

// ─── Activity ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
  pub activity_id:  Uuid,
  /// Who performed the action. Optional: an activity recorded without an
  /// actor (and with no principal resolver configured) keeps the slot empty
  /// and rendering falls back gracefully.
  pub actor:        Option<EntityRef>,
  /// Action tag, e.g. `"liked"` or `"commented"`.
  pub verb:         String,
  /// The primary thing acted upon. Required at record time; kept optional
  /// in the model so rows with empty slots remain representable.
  pub object:       Option<EntityRef>,
  /// Optional secondary context ("commented on X *in* Y").
  pub target:       Option<EntityRef>,
  /// Free-form JSON payload for rendering context; stored verbatim.
  pub data:         Option<serde_json::Value>,
  /// `None` means unpublished — excluded from the default visible scope.
  pub published_at: Option<DateTime<Utc>>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
  /// Soft-delete marker. Deleted activities stay retrievable for audit;
  /// physical removal is a separate explicit operation.
  pub deleted_at:   Option<DateTime<Utc>>,
}

impl Activity {
  pub fn is_published(&self) -> bool {
    self.published_at.is_some()
  }

  pub fn is_deleted(&self) -> bool {
    self.deleted_at.is_some()
  }

  /// The deterministic grouping key.
  ///
  /// Colon-joined in fixed order: `actor_id:verb:object_type`, then
  /// `:target_type` and `:target_id` when present, then the `YYYY-MM-DD`
  /// of `published_at` when set. Optional segments are skipped entirely
  /// when absent, so two same-day activities collapse into one group while
  /// unpublished activities hash without a date component.
  pub fn family_hash(&self) -> String {
    let actor_id = self.actor.as_ref().map_or("", |a| a.id.as_str());
    let object_type = self.object.as_ref().map_or("", |o| o.entity_type.as_str());

    let mut hash = format!("{actor_id}:{verb}:{object_type}", verb = self.verb);

    if let Some(target) = &self.target {
      if !target.entity_type.is_empty() {
        hash.push(':');
        hash.push_str(&target.entity_type);
      }
      if !target.id.is_empty() {
        hash.push(':');
        hash.push_str(&target.id);
      }
    }

    if let Some(published) = self.published_at {
      hash.push(':');
      hash.push_str(&published.format("%Y-%m-%d").to_string());
    }

    hash
  }

  /// Plain fallback sentence built from raw slot ids, for callers with no
  /// grammar entry covering this activity.
  pub fn summary(&self) -> String {
    let actor = self.actor.as_ref().map_or("someone", |a| a.id.as_str());
    let object = self
      .object
      .as_ref()
      .map_or_else(|| "something".to_owned(), |o| format!("{} {}", o.entity_type, o.id));

    match &self.target {
      Some(t) => format!("{actor} {} {object} in {} {}", self.verb, t.entity_type, t.id),
      None => format!("{actor} {} {object}", self.verb),
    }
  }
}

// ─── NewActivity ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::FeedStore::record`].
/// Id and audit timestamps are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewActivity {
  /// Defaults from the store's principal resolver when `None`.
  pub actor:        Option<EntityRef>,
  pub verb:         String,
  pub object:       EntityRef,
  pub target:       Option<EntityRef>,
  pub data:         Option<serde_json::Value>,
  /// Defaults to the record time when `None`.
  pub published_at: Option<DateTime<Utc>>,
}

impl NewActivity {
  /// Convenience constructor with all optional fields unset.
  pub fn new(verb: impl Into<String>, object: EntityRef) -> Self {
    Self {
      actor: None,
      verb: verb.into(),
      object,
      target: None,
      data: None,
      published_at: None,
    }
  }

  /// Reject inputs whose object reference is missing either half.
  pub fn validate(&self) -> Result<()> {
    if !self.object.is_usable() {
      return Err(Error::MissingObject);
    }
    Ok(())
  }
}
