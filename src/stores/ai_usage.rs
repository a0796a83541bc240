use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::db::Db;
use crate::error::{CareTrackError, Result};
use crate::schema::ai_usage;

/// Per-month counter of upstream model calls. One row per "YYYY-MM" key,
/// created lazily on first use.
#[derive(Clone)]
pub struct AiUsageStore {
    db: Db,
}

impl AiUsageStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Atomically reserves one model call for `month`. Returns `false`
    /// without incrementing when the counter has already reached `limit`.
    pub async fn try_consume(&self, month: &str, limit: i64) -> Result<bool> {
        let month = month.to_string();
        let mut conn = self.db.conn().await?;
        let consumed = conn
            .transaction::<bool, diesel::result::Error, _>(|conn| {
                async move {
                    let calls: Option<i64> = ai_usage::table
                        .filter(ai_usage::month.eq(&month))
                        .select(ai_usage::calls)
                        .first(conn)
                        .await
                        .optional()?;
                    match calls {
                        Some(calls) if calls >= limit => Ok(false),
                        None if limit <= 0 => Ok(false),
                        Some(calls) => {
                            diesel::update(ai_usage::table.filter(ai_usage::month.eq(&month)))
                                .set(ai_usage::calls.eq(calls + 1))
                                .execute(conn)
                                .await?;
                            Ok(true)
                        }
                        None => {
                            diesel::insert_into(ai_usage::table)
                                .values((ai_usage::month.eq(&month), ai_usage::calls.eq(1_i64)))
                                .execute(conn)
                                .await?;
                            Ok(true)
                        }
                    }
                }
                .scope_boxed()
            })
            .await?;
        Ok(consumed)
    }

    pub async fn calls_this_month(&self, month: &str) -> Result<i64> {
        let mut conn = self.db.conn().await?;
        let calls: Option<i64> = ai_usage::table
            .filter(ai_usage::month.eq(month))
            .select(ai_usage::calls)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(calls.unwrap_or(0))
    }
}
