//! [`SqliteStore`] — the SQLite implementation of [`FeedStore`].

use std::{path::Path, sync::Arc};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use feed_core::{
  activity::{Activity, NewActivity},
  entity::PrincipalResolver,
  filter::{ActivityFilter, DeleteFilter},
  grouping::Grouping,
  store::FeedStore,
};

use crate::{
  Error, Result,
  encode::{
    RawActivity, RawGrouping, encode_data, encode_dt, encode_opt_dt, encode_slot,
    encode_uuid,
  },
  schema::SCHEMA,
};

const ACTIVITY_COLUMNS: &str = "activity_id, actor_type, actor_id, verb, \
   object_type, object_id, target_type, target_id, data, published_at, \
   created_at, updated_at, deleted_at";

fn read_activity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawActivity> {
  Ok(RawActivity {
    activity_id:  row.get(0)?,
    actor_type:   row.get(1)?,
    actor_id:     row.get(2)?,
    verb:         row.get(3)?,
    object_type:  row.get(4)?,
    object_id:    row.get(5)?,
    target_type:  row.get(6)?,
    target_id:    row.get(7)?,
    data:         row.get(8)?,
    published_at: row.get(9)?,
    created_at:   row.get(10)?,
    updated_at:   row.get(11)?,
    deleted_at:   row.get(12)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An activity feed store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// runs on the connection's dedicated thread, which serializes the grouping
/// upsert's read-then-write.
#[derive(Clone)]
pub struct SqliteStore {
  conn:      tokio_rusqlite::Connection,
  principal: Option<Arc<dyn PrincipalResolver>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, principal: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, principal: None };
    store.init_schema().await?;
    Ok(store)
  }

  /// Configure the resolver consulted to default an activity's actor when
  /// the caller does not supply one.
  #[must_use]
  pub fn with_principal_resolver(
    mut self,
    resolver: Arc<dyn PrincipalResolver>,
  ) -> Self {
    self.principal = Some(resolver);
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("feed store schema initialised");
    Ok(())
  }

  /// Insert a fully-built [`Activity`] into the `activities` table.
  async fn insert_activity(&self, activity: &Activity) -> Result<()> {
    let activity_id = encode_uuid(activity.activity_id);
    let (actor_type, actor_id) = encode_slot(activity.actor.as_ref());
    let verb = activity.verb.clone();
    let (object_type, object_id) = encode_slot(activity.object.as_ref());
    let (target_type, target_id) = encode_slot(activity.target.as_ref());
    let data = encode_data(activity.data.as_ref())?;
    let published_at = encode_opt_dt(activity.published_at);
    let created_at = encode_dt(activity.created_at);
    let updated_at = encode_dt(activity.updated_at);
    let deleted_at = encode_opt_dt(activity.deleted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (
             activity_id, actor_type, actor_id, verb,
             object_type, object_id, target_type, target_id,
             data, published_at, created_at, updated_at, deleted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params![
            activity_id,
            actor_type,
            actor_id,
            verb,
            object_type,
            object_id,
            target_type,
            target_id,
            data,
            published_at,
            created_at,
            updated_at,
            deleted_at,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Overwrite an existing row with the activity's current field values.
  async fn update_activity(&self, activity: &Activity) -> Result<()> {
    let activity_id = encode_uuid(activity.activity_id);
    let (actor_type, actor_id) = encode_slot(activity.actor.as_ref());
    let verb = activity.verb.clone();
    let (object_type, object_id) = encode_slot(activity.object.as_ref());
    let (target_type, target_id) = encode_slot(activity.target.as_ref());
    let data = encode_data(activity.data.as_ref())?;
    let published_at = encode_opt_dt(activity.published_at);
    let updated_at = encode_dt(activity.updated_at);
    let deleted_at = encode_opt_dt(activity.deleted_at);

    let id = activity.activity_id;
    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE activities SET
             actor_type = ?2, actor_id = ?3, verb = ?4,
             object_type = ?5, object_id = ?6, target_type = ?7, target_id = ?8,
             data = ?9, published_at = ?10, updated_at = ?11, deleted_at = ?12
           WHERE activity_id = ?1",
          rusqlite::params![
            activity_id,
            actor_type,
            actor_id,
            verb,
            object_type,
            object_id,
            target_type,
            target_id,
            data,
            published_at,
            updated_at,
            deleted_at,
          ],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ActivityNotFound(id));
    }
    Ok(())
  }

  /// Upsert the default-context grouping row for `family_hash`.
  ///
  /// The select and the insert-or-update run inside one connection call, so
  /// two concurrent saves of the same family cannot interleave here. The
  /// outcome is idempotent: one row per hash, pointing at the activity
  /// saved last.
  async fn assign_grouping(&self, activity_id: Uuid, family_hash: String) -> Result<()> {
    let activity_id_str = encode_uuid(activity_id);
    let now_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let existing: Option<String> = conn
          .query_row(
            "SELECT grouping_id FROM groupings
             WHERE family_hash = ?1 AND context IS NULL",
            rusqlite::params![family_hash],
            |row| row.get(0),
          )
          .optional()?;

        match existing {
          Some(grouping_id) => {
            conn.execute(
              "UPDATE groupings SET activity_id = ?2, updated_at = ?3
               WHERE grouping_id = ?1",
              rusqlite::params![grouping_id, activity_id_str, now_str],
            )?;
          }
          None => {
            conn.execute(
              "INSERT INTO groupings (
                 grouping_id, activity_id, family_hash, context,
                 created_at, updated_at
               ) VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
              rusqlite::params![
                encode_uuid(Uuid::new_v4()),
                activity_id_str,
                family_hash,
                now_str,
              ],
            )?;
          }
        }
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Grouping assignment is bookkeeping, not part of the primary write: a
  /// failure here is logged and swallowed so the save still succeeds.
  async fn assign_grouping_best_effort(&self, activity: &Activity) {
    let family_hash = activity.family_hash();
    if let Err(e) = self.assign_grouping(activity.activity_id, family_hash).await {
      tracing::warn!(
        activity_id = %activity.activity_id,
        error = %e,
        "grouping assignment failed after activity save",
      );
    }
  }

  /// Fetch every activity row, newest publish time first.
  async fn fetch_all(&self, include_deleted: bool) -> Result<Vec<Activity>> {
    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let sql = if include_deleted {
          format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             ORDER BY published_at DESC"
          )
        } else {
          format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities
             WHERE deleted_at IS NULL
             ORDER BY published_at DESC"
          )
        };
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], read_activity_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  /// Mark the given activities deleted; returns how many rows changed.
  async fn soft_delete_ids(&self, ids: Vec<Uuid>) -> Result<u64> {
    let now_str = encode_dt(Utc::now());
    let id_strs: Vec<String> = ids.into_iter().map(encode_uuid).collect();

    let affected = self
      .conn
      .call(move |conn| {
        let mut total = 0usize;
        let mut stmt = conn.prepare(
          "UPDATE activities SET deleted_at = ?2, updated_at = ?2
           WHERE activity_id = ?1 AND deleted_at IS NULL",
        )?;
        for id in &id_strs {
          total += stmt.execute(rusqlite::params![id, now_str])?;
        }
        Ok(total)
      })
      .await?;

    Ok(affected as u64)
  }
}

// ─── FeedStore impl ──────────────────────────────────────────────────────────

impl FeedStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────────

  async fn record(&self, input: NewActivity) -> Result<Activity> {
    input.validate()?;

    // Fixed pipeline: default actor → default timestamp → persist → group.
    let actor = input
      .actor
      .or_else(|| self.principal.as_ref().and_then(|p| p.current()));

    let now = Utc::now();
    let activity = Activity {
      activity_id:  Uuid::new_v4(),
      actor,
      verb:         input.verb,
      object:       Some(input.object),
      target:       input.target,
      data:         input.data,
      published_at: Some(input.published_at.unwrap_or(now)),
      created_at:   now,
      updated_at:   now,
      deleted_at:   None,
    };

    self.insert_activity(&activity).await?;
    self.assign_grouping_best_effort(&activity).await;
    Ok(activity)
  }

  async fn save(&self, mut activity: Activity) -> Result<Activity> {
    let now = Utc::now();
    activity.updated_at = now;
    if activity.published_at.is_none() {
      activity.published_at = Some(now);
    }

    self.update_activity(&activity).await?;
    self.assign_grouping_best_effort(&activity).await;
    Ok(activity)
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  async fn soft_delete(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE activities SET deleted_at = ?2, updated_at = ?2
           WHERE activity_id = ?1",
          rusqlite::params![id_str, now_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ActivityNotFound(id));
    }
    Ok(())
  }

  async fn restore(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let now_str = encode_dt(Utc::now());

    let affected = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE activities SET deleted_at = NULL, updated_at = ?2
           WHERE activity_id = ?1",
          rusqlite::params![id_str, now_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ActivityNotFound(id));
    }
    Ok(())
  }

  async fn purge(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        // Grouping rows reference the activity; drop them first.
        conn.execute(
          "DELETE FROM groupings WHERE activity_id = ?1",
          rusqlite::params![id_str],
        )?;
        let n = conn.execute(
          "DELETE FROM activities WHERE activity_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(n)
      })
      .await?;

    if affected == 0 {
      return Err(Error::ActivityNotFound(id));
    }
    Ok(())
  }

  async fn delete_where(&self, filter: DeleteFilter) -> Result<u64> {
    let predicate = filter.to_filter();
    let candidates = self.fetch_all(false).await?;

    let ids: Vec<Uuid> = candidates
      .iter()
      .filter(|a| predicate.matches(a))
      .map(|a| a.activity_id)
      .collect();

    if ids.is_empty() {
      return Ok(0);
    }
    self.soft_delete_ids(ids).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get(&self, id: Uuid, include_deleted: bool) -> Result<Option<Activity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawActivity> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE activity_id = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], read_activity_row)
            .optional()?,
        )
      })
      .await?;

    let activity = raw.map(RawActivity::into_activity).transpose()?;
    Ok(activity.filter(|a| include_deleted || !a.is_deleted()))
  }

  async fn list(
    &self,
    filter: &ActivityFilter,
    include_deleted: bool,
  ) -> Result<Vec<Activity>> {
    // The deleted scope is restricted in SQL; everything else goes through
    // the core predicate so storage cannot drift from it.
    let mut activities = self.fetch_all(include_deleted).await?;
    activities.retain(|a| filter.matches(a));
    Ok(activities)
  }

  // ── Groupings ─────────────────────────────────────────────────────────────

  async fn grouping_for(
    &self,
    family_hash: &str,
    context: Option<&str>,
  ) -> Result<Option<Grouping>> {
    let hash = family_hash.to_owned();
    let ctx = context.map(str::to_owned);

    let raw: Option<RawGrouping> = self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawGrouping> {
          Ok(RawGrouping {
            grouping_id: row.get(0)?,
            activity_id: row.get(1)?,
            family_hash: row.get(2)?,
            context:     row.get(3)?,
            created_at:  row.get(4)?,
            updated_at:  row.get(5)?,
          })
        };

        let row = match ctx {
          Some(c) => conn
            .query_row(
              "SELECT grouping_id, activity_id, family_hash, context,
                      created_at, updated_at
               FROM groupings WHERE family_hash = ?1 AND context = ?2",
              rusqlite::params![hash, c],
              map,
            )
            .optional()?,
          None => conn
            .query_row(
              "SELECT grouping_id, activity_id, family_hash, context,
                      created_at, updated_at
               FROM groupings WHERE family_hash = ?1 AND context IS NULL",
              rusqlite::params![hash],
              map,
            )
            .optional()?,
        };
        Ok(row)
      })
      .await?;

    raw.map(RawGrouping::into_grouping).transpose()
  }

  async fn group_members(&self, family_hash: &str) -> Result<Vec<Activity>> {
    // The hash is derived, never stored: membership is re-computed per row.
    let mut activities = self.fetch_all(false).await?;
    activities.retain(|a| a.family_hash() == family_hash);
    Ok(activities)
  }
}
