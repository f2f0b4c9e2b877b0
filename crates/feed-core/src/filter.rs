//! Composable retrieval predicates over activities.
//!
//! Clauses chain with logical AND; `contains_object` and `involving` are
//! each an internal three-way OR across the actor/object/target slots.
//! [`ActivityFilter::matches`] is the single evaluation authority — storage
//! backends restrict the deleted scope in SQL and apply `matches` to
//! decoded rows, so core and storage semantics cannot diverge.

use crate::{activity::Activity, entity::EntityRef};

// ─── Clauses ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
  /// Exact match on the actor slot.
  Actor(EntityRef),
  /// Exact match on the object slot.
  Object(EntityRef),
  /// Exact match on the target slot.
  Target(EntityRef),
  /// Exact match against any of the three slots.
  Involving(EntityRef),
  /// Raw (type, id) pair matched against any of the three slots. Unlike
  /// [`Clause::Involving`] the pair is not required to come from a single
  /// entity, so the type may differ per slot in principle.
  ContainsObject { entity_type: String, id: String },
}

// ─── ActivityFilter ──────────────────────────────────────────────────────────

/// A chainable conjunction of predicates.
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
  published_only: bool,
  verb:           Option<String>,
  clauses:        Vec<Clause>,
}

impl ActivityFilter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Restrict to activities with a non-null publish timestamp.
  pub fn published(mut self) -> Self {
    self.published_only = true;
    self
  }

  /// Exact match on the verb.
  pub fn verb(mut self, verb: impl Into<String>) -> Self {
    self.verb = Some(verb.into());
    self
  }

  pub fn actor(mut self, entity: EntityRef) -> Self {
    self.clauses.push(Clause::Actor(entity));
    self
  }

  pub fn object(mut self, entity: EntityRef) -> Self {
    self.clauses.push(Clause::Object(entity));
    self
  }

  pub fn target(mut self, entity: EntityRef) -> Self {
    self.clauses.push(Clause::Target(entity));
    self
  }

  /// Match activities where `entity` fills any of the three slots.
  pub fn involving(mut self, entity: EntityRef) -> Self {
    self.clauses.push(Clause::Involving(entity));
    self
  }

  /// Match activities where the raw `(type, id)` pair fills any slot.
  ///
  /// Empty strings compare by equality, not as wildcards: an unset slot
  /// never matches `("", "")` — only a stored ref whose halves are both
  /// empty would.
  pub fn contains_object(
    mut self,
    entity_type: impl Into<String>,
    id: impl Into<String>,
  ) -> Self {
    self.clauses.push(Clause::ContainsObject {
      entity_type: entity_type.into(),
      id:          id.into(),
    });
    self
  }

  /// Evaluate every clause against `activity`.
  ///
  /// Deleted-scope handling deliberately lives in the store, not here.
  pub fn matches(&self, activity: &Activity) -> bool {
    if self.published_only && !activity.is_published() {
      return false;
    }
    if let Some(verb) = &self.verb {
      if activity.verb != *verb {
        return false;
      }
    }
    self.clauses.iter().all(|c| clause_matches(c, activity))
  }
}

fn clause_matches(clause: &Clause, activity: &Activity) -> bool {
  match clause {
    Clause::Actor(e) => activity.actor.as_ref() == Some(e),
    Clause::Object(e) => activity.object.as_ref() == Some(e),
    Clause::Target(e) => activity.target.as_ref() == Some(e),
    Clause::Involving(e) => {
      activity.actor.as_ref() == Some(e)
        || activity.object.as_ref() == Some(e)
        || activity.target.as_ref() == Some(e)
    }
    Clause::ContainsObject { entity_type, id } => {
      slot_matches(activity.actor.as_ref(), entity_type, id)
        || slot_matches(activity.object.as_ref(), entity_type, id)
        || slot_matches(activity.target.as_ref(), entity_type, id)
    }
  }
}

fn slot_matches(slot: Option<&EntityRef>, entity_type: &str, id: &str) -> bool {
  slot.is_some_and(|r| r.entity_type == entity_type && r.id == id)
}

// ─── DeleteFilter ────────────────────────────────────────────────────────────

/// Criteria for [`crate::store::FeedStore::delete_where`].
///
/// The defaults are literal empty-string sentinels: calling with no fields
/// set matches only rows whose slots hold refs with empty type and id —
/// effectively zero rows in practice. Callers should always supply a real
/// containment target; the sentinel behavior is preserved as-is rather than
/// silently guarded.
#[derive(Debug, Clone)]
pub struct DeleteFilter {
  pub object_type: String,
  pub object_id:   String,
  /// Applied only when set and non-empty, mirroring the containment filter's
  /// truthiness semantics.
  pub verb:        Option<String>,
}

impl Default for DeleteFilter {
  fn default() -> Self {
    Self {
      object_type: String::new(),
      object_id:   String::new(),
      verb:        None,
    }
  }
}

impl DeleteFilter {
  /// The containment + verb predicate this filter expands to.
  pub fn to_filter(&self) -> ActivityFilter {
    let mut filter = ActivityFilter::new()
      .contains_object(self.object_type.clone(), self.object_id.clone());
    if let Some(verb) = self.verb.as_deref().filter(|v| !v.is_empty()) {
      filter = filter.verb(verb);
    }
    filter
  }
}
