//! The `FeedStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `feed-store-sqlite`).
//! Consumers depend on this abstraction, not on any concrete backend. The
//! backend owns timestamps and the fixed save pipeline: default actor →
//! default publish time → persist → assign grouping.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  activity::{Activity, NewActivity},
  filter::{ActivityFilter, DeleteFilter},
  grouping::Grouping,
};

/// Abstraction over an activity feed storage backend.
pub trait FeedStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate and persist a new activity, then assign its grouping.
  ///
  /// The actor defaults from the configured principal resolver when unset;
  /// `published_at` defaults to now. Grouping assignment is best-effort
  /// bookkeeping: its failure is reported, never propagated as a failure
  /// of the record itself.
  fn record(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// Persist edits to an existing activity and re-assign its grouping.
  ///
  /// Bumps `updated_at` and defaults `published_at` if still unset. Every
  /// successful save triggers assignment, so the grouping always points at
  /// the most recently saved member of the family.
  fn save(
    &self,
    activity: Activity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Mark an activity deleted. Reversible via [`FeedStore::restore`].
  fn soft_delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Clear the soft-delete marker.
  fn restore(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Physically remove an activity and any grouping row pointing at it.
  fn purge(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Bulk soft-delete by containment + verb criteria. Returns the number
  /// of activities deleted. See [`DeleteFilter`] for the sentinel-default
  /// footgun.
  fn delete_where(
    &self,
    filter: DeleteFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch a single activity. Soft-deleted rows are returned only when
  /// `include_deleted` is set (the explicit audit path).
  fn get(
    &self,
    id: Uuid,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  /// List activities matching `filter`, newest publish time first.
  fn list<'a>(
    &'a self,
    filter: &'a ActivityFilter,
    include_deleted: bool,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + 'a;

  // ── Groupings ─────────────────────────────────────────────────────────

  /// Fetch the grouping row for a family hash within a context, if any.
  fn grouping_for<'a>(
    &'a self,
    family_hash: &'a str,
    context: Option<&'a str>,
  ) -> impl Future<Output = Result<Option<Grouping>, Self::Error>> + Send + 'a;

  /// All non-deleted activities whose recomputed family hash equals
  /// `family_hash`. Groupings store no member list; membership is always
  /// re-derived from the hash.
  fn group_members<'a>(
    &'a self,
    family_hash: &'a str,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + 'a;
}
