//! Unit tests for the pure core: family hash, filters, grammar, labels.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
  activity::{Activity, NewActivity},
  entity::{EntityDirectory, EntityRef, FeedEntity},
  filter::{ActivityFilter, DeleteFilter},
  grammar::{Grammar, GrammarEntry, labels},
};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
  Utc.with_ymd_and_hms(y, m, d, h, 30, 0).unwrap()
}

fn activity(
  actor: Option<EntityRef>,
  verb: &str,
  object: Option<EntityRef>,
  target: Option<EntityRef>,
  published_at: Option<DateTime<Utc>>,
) -> Activity {
  let now = at(2024, 6, 1, 9);
  Activity {
    activity_id: Uuid::new_v4(),
    actor,
    verb: verb.to_owned(),
    object,
    target,
    data: None,
    published_at,
    created_at: now,
    updated_at: now,
    deleted_at: None,
  }
}

fn user(id: &str) -> EntityRef {
  EntityRef::new("user", id)
}

fn post(id: &str) -> EntityRef {
  EntityRef::new("post", id)
}

// ─── Family hash ─────────────────────────────────────────────────────────────

#[test]
fn family_hash_full_shape() {
  let a = activity(
    Some(user("u1")),
    "like",
    Some(post("5")),
    Some(EntityRef::new("thread", "t9")),
    Some(at(2024, 6, 2, 14)),
  );
  assert_eq!(a.family_hash(), "u1:like:post:thread:t9:2024-06-02");
}

#[test]
fn family_hash_skips_absent_target_and_date() {
  let a = activity(Some(user("u1")), "like", Some(post("5")), None, None);
  assert_eq!(a.family_hash(), "u1:like:post");
}

#[test]
fn family_hash_missing_actor_leaves_empty_segment() {
  let a = activity(None, "like", Some(post("5")), None, Some(at(2024, 6, 2, 8)));
  assert_eq!(a.family_hash(), ":like:post:2024-06-02");
}

#[test]
fn family_hash_collapses_time_of_day() {
  let morning = activity(Some(user("u1")), "like", Some(post("5")), None, Some(at(2024, 6, 2, 8)));
  let evening = activity(Some(user("u1")), "like", Some(post("5")), None, Some(at(2024, 6, 2, 22)));
  assert_eq!(morning.family_hash(), evening.family_hash());
}

#[test]
fn family_hash_sensitive_to_each_field() {
  let base = activity(
    Some(user("u1")),
    "like",
    Some(post("5")),
    Some(EntityRef::new("thread", "t9")),
    Some(at(2024, 6, 2, 8)),
  );
  let hash = base.family_hash();

  let mut other = base.clone();
  other.actor = Some(user("u2"));
  assert_ne!(other.family_hash(), hash);

  let mut other = base.clone();
  other.verb = "share".to_owned();
  assert_ne!(other.family_hash(), hash);

  let mut other = base.clone();
  other.object = Some(EntityRef::new("photo", "5"));
  assert_ne!(other.family_hash(), hash);

  let mut other = base.clone();
  other.target = Some(EntityRef::new("thread", "t10"));
  assert_ne!(other.family_hash(), hash);

  let mut other = base.clone();
  other.published_at = Some(at(2024, 6, 3, 8));
  assert_ne!(other.family_hash(), hash);

  // The object *id* is deliberately not part of the hash.
  let mut other = base.clone();
  other.object = Some(post("6"));
  assert_eq!(other.family_hash(), hash);
}

// ─── Validation ──────────────────────────────────────────────────────────────

#[test]
fn new_activity_requires_usable_object() {
  let ok = NewActivity::new("like", post("5"));
  assert!(ok.validate().is_ok());

  let missing_id = NewActivity::new("like", EntityRef::new("post", ""));
  assert!(matches!(missing_id.validate(), Err(crate::Error::MissingObject)));

  let missing_type = NewActivity::new("like", EntityRef::new("", "5"));
  assert!(matches!(missing_type.validate(), Err(crate::Error::MissingObject)));
}

// ─── Filters ─────────────────────────────────────────────────────────────────

#[test]
fn filter_published_excludes_unpublished() {
  let published = activity(Some(user("u1")), "like", Some(post("5")), None, Some(at(2024, 6, 2, 8)));
  let draft = activity(Some(user("u1")), "like", Some(post("5")), None, None);

  let filter = ActivityFilter::new().published();
  assert!(filter.matches(&published));
  assert!(!filter.matches(&draft));
}

#[test]
fn filter_verb_exact_match() {
  let a = activity(Some(user("u1")), "like", Some(post("5")), None, None);
  assert!(ActivityFilter::new().verb("like").matches(&a));
  assert!(!ActivityFilter::new().verb("liked").matches(&a));
}

#[test]
fn filter_slot_exact_matches() {
  let a = activity(
    Some(user("u1")),
    "comment",
    Some(post("5")),
    Some(EntityRef::new("thread", "t9")),
    None,
  );

  assert!(ActivityFilter::new().actor(user("u1")).matches(&a));
  assert!(!ActivityFilter::new().actor(user("u2")).matches(&a));
  assert!(ActivityFilter::new().object(post("5")).matches(&a));
  assert!(!ActivityFilter::new().object(post("6")).matches(&a));
  assert!(ActivityFilter::new().target(EntityRef::new("thread", "t9")).matches(&a));
  // Exact slot match does not fall through to other slots.
  assert!(!ActivityFilter::new().actor(post("5")).matches(&a));
}

#[test]
fn filter_involving_checks_all_slots() {
  let a = activity(Some(user("u1")), "comment", Some(post("5")), Some(user("u2")), None);

  assert!(ActivityFilter::new().involving(user("u1")).matches(&a));
  assert!(ActivityFilter::new().involving(post("5")).matches(&a));
  assert!(ActivityFilter::new().involving(user("u2")).matches(&a));
  assert!(!ActivityFilter::new().involving(user("u3")).matches(&a));
}

#[test]
fn filter_contains_object_matches_any_slot_by_raw_pair() {
  let a = activity(Some(user("u1")), "comment", Some(post("5")), None, None);

  assert!(ActivityFilter::new().contains_object("user", "u1").matches(&a));
  assert!(ActivityFilter::new().contains_object("post", "5").matches(&a));
  assert!(!ActivityFilter::new().contains_object("post", "6").matches(&a));
  assert!(!ActivityFilter::new().contains_object("user", "5").matches(&a));
}

#[test]
fn contains_object_empty_pair_never_matches_unset_slots() {
  let a = activity(Some(user("u1")), "like", Some(post("5")), None, None);
  assert!(!ActivityFilter::new().contains_object("", "").matches(&a));

  // Only a stored ref with empty halves would match — the sentinel rows
  // the bulk-delete defaults rely on.
  let sentinel = activity(Some(EntityRef::new("", "")), "like", Some(post("5")), None, None);
  assert!(ActivityFilter::new().contains_object("", "").matches(&sentinel));
}

#[test]
fn filter_clauses_chain_with_and() {
  let a = activity(Some(user("u1")), "like", Some(post("5")), None, Some(at(2024, 6, 2, 8)));

  let filter = ActivityFilter::new()
    .published()
    .verb("like")
    .actor(user("u1"))
    .object(post("5"));
  assert!(filter.matches(&a));

  let filter = ActivityFilter::new().verb("like").actor(user("u2"));
  assert!(!filter.matches(&a));
}

#[test]
fn delete_filter_skips_empty_verb() {
  let a = activity(Some(user("u1")), "like", Some(post("5")), None, None);

  let by_object = DeleteFilter {
    object_type: "post".to_owned(),
    object_id: "5".to_owned(),
    verb: Some(String::new()),
  };
  // An empty verb is treated as unset, not as a match-nothing condition.
  assert!(by_object.to_filter().matches(&a));

  let by_verb = DeleteFilter {
    object_type: "post".to_owned(),
    object_id: "5".to_owned(),
    verb: Some("share".to_owned()),
  };
  assert!(!by_verb.to_filter().matches(&a));
}

// ─── Grammar ─────────────────────────────────────────────────────────────────

fn like_activity() -> Activity {
  activity(Some(user("u1")), "like", Some(post("5")), None, None)
}

#[test]
fn headline_from_nested_literal() {
  let grammar = Grammar::new().with(
    "post",
    GrammarEntry::nested([("like".to_owned(), GrammarEntry::literal("{actor} liked {object}"))]),
  );
  assert_eq!(
    grammar.headline(&like_activity()).as_deref(),
    Some("{actor} liked {object}")
  );
}

#[test]
fn headline_template_at_type_level_short_circuits_verb() {
  let grammar = Grammar::new().with(
    "post",
    GrammarEntry::template(|a| format!("something happened to post {}", a.object.as_ref().unwrap().id)),
  );
  // The verb has no entry anywhere; the template wins regardless.
  assert_eq!(
    grammar.headline(&like_activity()).as_deref(),
    Some("something happened to post 5")
  );
}

#[test]
fn headline_template_at_verb_level() {
  let grammar = Grammar::new().with(
    "post",
    GrammarEntry::nested([(
      "like".to_owned(),
      GrammarEntry::template(|a| format!("{} liked it", a.actor.as_ref().unwrap().id)),
    )]),
  );
  assert_eq!(grammar.headline(&like_activity()).as_deref(), Some("u1 liked it"));
}

#[test]
fn headline_nested_verb_fallback_lookup() {
  // A nested map at the verb level gets one more verb-keyed lookup.
  let grammar = Grammar::new().with(
    "post",
    GrammarEntry::nested([(
      "like".to_owned(),
      GrammarEntry::nested([("like".to_owned(), GrammarEntry::literal("double nested"))]),
    )]),
  );
  assert_eq!(grammar.headline(&like_activity()).as_deref(), Some("double nested"));
}

#[test]
fn headline_absent_when_nothing_found() {
  let grammar = Grammar::new().with(
    "photo",
    GrammarEntry::nested([("like".to_owned(), GrammarEntry::literal("liked a photo"))]),
  );
  assert_eq!(grammar.headline(&like_activity()), None);

  let grammar = Grammar::new()
    .with("post", GrammarEntry::nested([("share".to_owned(), GrammarEntry::literal("shared"))]));
  assert_eq!(grammar.headline(&like_activity()), None);
}

#[test]
fn headline_empty_literal_counts_as_absent() {
  let grammar = Grammar::new().with(
    "post",
    GrammarEntry::nested([("like".to_owned(), GrammarEntry::literal(""))]),
  );
  assert_eq!(grammar.headline(&like_activity()), None);
}

#[test]
fn headline_bare_literal_at_type_level_is_absent() {
  // A bare string cannot be indexed by verb.
  let grammar = Grammar::new().with("post", GrammarEntry::literal("nope"));
  assert_eq!(grammar.headline(&like_activity()), None);
}

// ─── Labels ──────────────────────────────────────────────────────────────────

struct LabeledUser {
  id:   String,
  name: String,
}

impl FeedEntity for LabeledUser {
  fn entity_type(&self) -> &str {
    "user"
  }

  fn entity_id(&self) -> String {
    self.id.clone()
  }

  fn feed_label(&self) -> Option<String> {
    Some(self.name.clone())
  }
}

struct PlainPost {
  id: String,
}

impl FeedEntity for PlainPost {
  fn entity_type(&self) -> &str {
    "post"
  }

  fn entity_id(&self) -> String {
    self.id.clone()
  }
}

struct TestDirectory;

impl EntityDirectory for TestDirectory {
  fn lookup(&self, entity: &EntityRef) -> Option<Box<dyn FeedEntity>> {
    match entity.entity_type.as_str() {
      "user" if entity.id == "u1" => Some(Box::new(LabeledUser {
        id:   entity.id.clone(),
        name: "Alice".to_owned(),
      })),
      "post" if entity.id == "5" => Some(Box::new(PlainPost { id: entity.id.clone() })),
      _ => None,
    }
  }
}

#[test]
fn labels_use_capability_or_fall_back_to_raw_id() {
  let a = activity(
    Some(user("u1")),
    "comment",
    Some(post("5")),
    Some(EntityRef::new("thread", "gone")),
    None,
  );
  let resolved = labels(&a, &TestDirectory);

  // Capability present: display label.
  assert_eq!(resolved.actor.as_deref(), Some("Alice"));
  // Entity resolves but has no label capability: raw id.
  assert_eq!(resolved.object.as_deref(), Some("5"));
  // Referent vanished entirely: still the raw id, never an error.
  assert_eq!(resolved.target.as_deref(), Some("gone"));
}

#[test]
fn labels_unset_slot_is_none() {
  let a = activity(None, "like", Some(post("5")), None, None);
  let resolved = labels(&a, &TestDirectory);
  assert_eq!(resolved.actor, None);
  assert_eq!(resolved.target, None);
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[test]
fn summary_renders_from_raw_ids() {
  let a = activity(Some(user("u1")), "liked", Some(post("5")), None, None);
  assert_eq!(a.summary(), "u1 liked post 5");

  let with_target = activity(
    Some(user("u1")),
    "commented",
    Some(post("5")),
    Some(EntityRef::new("thread", "t9")),
    None,
  );
  assert_eq!(with_target.summary(), "u1 commented post 5 in thread t9");

  let anonymous = activity(None, "liked", Some(post("5")), None, None);
  assert_eq!(anonymous.summary(), "someone liked post 5");
}
