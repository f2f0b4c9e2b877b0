//! Grammar-driven headline and label resolution.
//!
//! The grammar table is supplied by the caller, never owned by the core.
//! It maps object types to entries that may be plain strings, template
//! functions of the activity, or verb-keyed sub-maps — and the two levels
//! may mix freely, so resolution has to preserve the invocable-or-map
//! ambiguity at each step.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::Serialize;

use crate::{
  activity::Activity,
  entity::{EntityDirectory, EntityRef},
};

// ─── GrammarEntry ────────────────────────────────────────────────────────────

/// A template function of the activity.
pub type TemplateFn = Arc<dyn Fn(&Activity) -> String + Send + Sync>;

/// One node of the grammar table.
#[derive(Clone)]
pub enum GrammarEntry {
  /// A fully-resolved message string.
  Literal(String),
  /// Invoked with the activity; short-circuits any finer lookup.
  Template(TemplateFn),
  /// A verb-keyed sub-map.
  Nested(HashMap<String, GrammarEntry>),
}

impl GrammarEntry {
  pub fn literal(message: impl Into<String>) -> Self {
    Self::Literal(message.into())
  }

  pub fn template(f: impl Fn(&Activity) -> String + Send + Sync + 'static) -> Self {
    Self::Template(Arc::new(f))
  }

  pub fn nested(entries: impl IntoIterator<Item = (String, GrammarEntry)>) -> Self {
    Self::Nested(entries.into_iter().collect())
  }
}

impl fmt::Debug for GrammarEntry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
      Self::Template(_) => f.debug_tuple("Template").field(&"<fn>").finish(),
      Self::Nested(m) => f.debug_tuple("Nested").field(m).finish(),
    }
  }
}

// ─── Grammar ─────────────────────────────────────────────────────────────────

/// The caller-supplied table mapping object types to grammar entries.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
  entries: HashMap<String, GrammarEntry>,
}

impl Grammar {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, object_type: impl Into<String>, entry: GrammarEntry) {
    self.entries.insert(object_type.into(), entry);
  }

  /// Chainable form of [`Grammar::insert`].
  pub fn with(mut self, object_type: impl Into<String>, entry: GrammarEntry) -> Self {
    self.insert(object_type, entry);
    self
  }

  /// Resolve a headline for `activity`.
  ///
  /// Order: the object-type entry, if a template, is called immediately and
  /// the verb is never consulted. A nested entry is indexed by verb; the
  /// verb-level entry may again be a template (called), a literal
  /// (returned), or one more nested map given a final verb-keyed lookup.
  /// Nothing found resolves to `None`, not an error. Empty strings count as
  /// absent, matching the source system's truthiness check.
  pub fn headline(&self, activity: &Activity) -> Option<String> {
    let object_type = activity.object.as_ref()?.entity_type.as_str();

    let verb_entry = match self.entries.get(object_type)? {
      GrammarEntry::Template(f) => return non_empty(f(activity)),
      GrammarEntry::Nested(map) => map.get(&activity.verb)?,
      // A bare string cannot be indexed by verb.
      GrammarEntry::Literal(_) => return None,
    };

    let message = match verb_entry {
      GrammarEntry::Template(f) => f(activity),
      GrammarEntry::Literal(s) => s.clone(),
      GrammarEntry::Nested(map) => match map.get(&activity.verb)? {
        GrammarEntry::Literal(s) => s.clone(),
        GrammarEntry::Template(f) => f(activity),
        GrammarEntry::Nested(_) => return None,
      },
    };

    non_empty(message)
  }
}

fn non_empty(message: String) -> Option<String> {
  if message.is_empty() { None } else { Some(message) }
}

// ─── Labels ──────────────────────────────────────────────────────────────────

/// Display labels for the three slots. Each is the entity's feed label when
/// the resolved entity provides one, else the raw id; `None` only when the
/// slot itself is unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
  pub actor:  Option<String>,
  pub object: Option<String>,
  pub target: Option<String>,
}

/// Resolve display labels for every slot of `activity` through `directory`.
pub fn labels(activity: &Activity, directory: &dyn EntityDirectory) -> Labels {
  Labels {
    actor:  slot_label(activity.actor.as_ref(), directory),
    object: slot_label(activity.object.as_ref(), directory),
    target: slot_label(activity.target.as_ref(), directory),
  }
}

fn slot_label(
  slot: Option<&EntityRef>,
  directory: &dyn EntityDirectory,
) -> Option<String> {
  let entity_ref = slot?;
  let label = directory
    .lookup(entity_ref)
    .and_then(|entity| entity.feed_label());
  Some(label.unwrap_or_else(|| entity_ref.id.clone()))
}
