use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::{reminders, users};

#[derive(Debug, Clone, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct ReminderItem {
    pub id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    #[serde(rename = "type")]
    pub reminder_type: String,
    pub title: String,
    pub message: String,
    pub scheduled_time: i64,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<String>,
    pub is_completed: bool,
    pub priority: String,
    pub send_email: bool,
    pub email_sent: bool,
    pub email_sent_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = reminders)]
struct NewReminder<'a> {
    user_id: i32,
    reminder_type: &'a str,
    title: &'a str,
    message: &'a str,
    scheduled_time: i64,
    is_recurring: bool,
    recurrence_pattern: Option<&'a str>,
    is_completed: bool,
    priority: &'a str,
    send_email: bool,
    email_sent: bool,
    created_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewReminderInput {
    pub reminder_type: String,
    pub title: String,
    pub message: Option<String>,
    pub scheduled_time: i64,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    pub priority: Option<String>,
    pub send_email: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ReminderUpdate {
    pub title: Option<String>,
    pub message: Option<String>,
    pub scheduled_time: Option<i64>,
    pub is_completed: Option<bool>,
    pub priority: Option<String>,
    pub send_email: Option<bool>,
}

/// A reminder whose e-mail is due, joined with the owner's contact details.
#[derive(Debug, Clone)]
pub struct DueReminder {
    pub reminder: ReminderItem,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Clone)]
pub struct ReminderStore {
    db: Db,
}

impl ReminderStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewReminderInput) -> Result<ReminderItem> {
        let new = NewReminder {
            user_id,
            reminder_type: &input.reminder_type,
            title: &input.title,
            message: input.message.as_deref().unwrap_or(""),
            scheduled_time: input.scheduled_time,
            is_recurring: input.is_recurring.unwrap_or(false),
            recurrence_pattern: input.recurrence_pattern.as_deref(),
            is_completed: false,
            priority: input.priority.as_deref().unwrap_or("medium"),
            send_email: input.send_email.unwrap_or(true),
            email_sent: false,
            created_at: now_ts(),
        };

        let mut conn = self.db.conn().await?;
        diesel::insert_into(reminders::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        reminders::table
            .filter(reminders::user_id.eq(user_id))
            .order(reminders::id.desc())
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    /// Soonest first.
    pub async fn list(&self, user_id: i32) -> Result<Vec<ReminderItem>> {
        let mut conn = self.db.conn().await?;
        reminders::table
            .filter(reminders::user_id.eq(user_id))
            .order(reminders::scheduled_time.asc())
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        update: ReminderUpdate,
    ) -> Result<Option<ReminderItem>> {
        let mut conn = self.db.conn().await?;
        let current: Option<ReminderItem> = reminders::table
            .filter(reminders::user_id.eq(user_id))
            .filter(reminders::id.eq(id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        let Some(current) = current else {
            return Ok(None);
        };

        diesel::update(
            reminders::table
                .filter(reminders::user_id.eq(user_id))
                .filter(reminders::id.eq(id)),
        )
        .set((
            reminders::title.eq(update.title.unwrap_or(current.title)),
            reminders::message.eq(update.message.unwrap_or(current.message)),
            reminders::scheduled_time.eq(update.scheduled_time.unwrap_or(current.scheduled_time)),
            reminders::is_completed.eq(update.is_completed.unwrap_or(current.is_completed)),
            reminders::priority.eq(update.priority.unwrap_or(current.priority)),
            reminders::send_email.eq(update.send_email.unwrap_or(current.send_email)),
        ))
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let reminder = reminders::table
            .filter(reminders::id.eq(id))
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(Some(reminder))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(
            reminders::table
                .filter(reminders::user_id.eq(user_id))
                .filter(reminders::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Incomplete reminders scheduled inside the `[day_start, day_end)`
    /// window, for the daily alert digest.
    pub async fn today_incomplete(
        &self,
        user_id: i32,
        day_start: i64,
        day_end: i64,
    ) -> Result<Vec<ReminderItem>> {
        let mut conn = self.db.conn().await?;
        reminders::table
            .filter(reminders::user_id.eq(user_id))
            .filter(reminders::is_completed.eq(false))
            .filter(reminders::scheduled_time.ge(day_start))
            .filter(reminders::scheduled_time.lt(day_end))
            .order(reminders::scheduled_time.asc())
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    /// Reminders whose scheduled time has passed, with e-mail requested and
    /// not yet sent. Marking `email_sent` after dispatch keeps the sweep
    /// idempotent. The per-reminder `send_email` flag is the only opt-out;
    /// preference toggles do not gate this sweep.
    pub async fn due_unsent(&self, now: i64) -> Result<Vec<DueReminder>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<(ReminderItem, (String, String))> = reminders::table
            .inner_join(users::table)
            .filter(reminders::send_email.eq(true))
            .filter(reminders::email_sent.eq(false))
            .filter(reminders::is_completed.eq(false))
            .filter(reminders::scheduled_time.le(now))
            .select((reminders::all_columns, (users::name, users::email)))
            .order(reminders::scheduled_time.asc())
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|(reminder, (user_name, user_email))| DueReminder {
                reminder,
                user_name,
                user_email,
            })
            .collect())
    }

    pub async fn mark_email_sent(&self, id: i32, ts: i64) -> Result<()> {
        let mut conn = self.db.conn().await?;
        diesel::update(reminders::table.filter(reminders::id.eq(id)))
            .set((
                reminders::email_sent.eq(true),
                reminders::email_sent_at.eq(Some(ts)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(())
    }
}
