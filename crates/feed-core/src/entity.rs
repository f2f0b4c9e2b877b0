//! Entity references — the polymorphic (type, id) pairs that fill an
//! activity's actor, object, and target slots.
//!
//! The feed never holds concrete domain entities. Each slot stores a type
//! tag plus a stringified id; resolution back to the real entity happens
//! lazily through an [`EntityDirectory`] and only when a caller asks for
//! display labels.

use serde::{Deserialize, Serialize};

// ─── Capability trait ────────────────────────────────────────────────────────

/// Implemented by domain entities that can appear in an activity slot.
///
/// `feed_label` is an optional capability: entities that can render a
/// human-readable label for feed display override it. The default `None`
/// makes label resolution fall back to the raw id, never an error.
pub trait FeedEntity {
  /// Stable type tag, e.g. `"post"` or `"user"`.
  fn entity_type(&self) -> &str;

  /// Primary key rendered as a string.
  fn entity_id(&self) -> String;

  /// Display label for feed rendering, if the entity supports one.
  fn feed_label(&self) -> Option<String> {
    None
  }
}

// ─── EntityRef ───────────────────────────────────────────────────────────────

/// A stored reference to a domain entity: type tag plus id.
///
/// Comparison is plain field equality, which is exactly what the exact-match
/// query predicates need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
  pub entity_type: String,
  pub id:          String,
}

impl EntityRef {
  pub fn new(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
    Self {
      entity_type: entity_type.into(),
      id:          id.into(),
    }
  }

  /// Capture a reference to any [`FeedEntity`].
  pub fn of(entity: &impl FeedEntity) -> Self {
    Self {
      entity_type: entity.entity_type().to_owned(),
      id:          entity.entity_id(),
    }
  }

  /// True when both the type tag and the id are non-empty.
  pub fn is_usable(&self) -> bool {
    !self.entity_type.is_empty() && !self.id.is_empty()
  }
}

// ─── Resolution collaborators ────────────────────────────────────────────────

/// Resolves stored references back to concrete entities.
///
/// Lookup is idempotent and side-effect-free. `None` means the referent no
/// longer exists; callers degrade to the raw id rather than failing.
pub trait EntityDirectory: Send + Sync {
  fn lookup(&self, entity: &EntityRef) -> Option<Box<dyn FeedEntity>>;
}

/// Supplies the ambient principal used to default an activity's actor when
/// the caller does not provide one. Passed explicitly to the store at
/// construction — there is no implicit global.
pub trait PrincipalResolver: Send + Sync {
  fn current(&self) -> Option<EntityRef>;
}
