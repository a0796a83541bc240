use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::{preferences, users};

/// Full user row, password hash included. Never serialized directly; the API
/// returns [`UserProfile`].
#[derive(Debug, Clone, Queryable)]
pub struct UserRecord {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub condition: String,
    pub last_alert_sent: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub condition: String,
    pub last_alert_sent: Option<i64>,
}

impl From<&UserRecord> for UserProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            age: user.age,
            condition: user.condition.clone(),
            last_alert_sent: user.last_alert_sent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceSet {
    #[serde(skip_serializing)]
    pub id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    pub daily_alerts: bool,
    pub medication_reminders: bool,
    pub appointment_reminders: bool,
    pub symptom_reminders: bool,
    pub goal_updates: bool,
    pub motivational_messages: bool,
    pub email_frequency: String,
    pub preferred_email_time: String,
}

/// Caller-supplied preference toggles; anything unset falls back to the
/// defaults (all notifications on, instant frequency, 09:00 send time).
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceUpdate {
    pub daily_alerts: Option<bool>,
    pub medication_reminders: Option<bool>,
    pub appointment_reminders: Option<bool>,
    pub symptom_reminders: Option<bool>,
    pub goal_updates: Option<bool>,
    pub motivational_messages: Option<bool>,
    pub email_frequency: Option<String>,
    pub preferred_email_time: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser<'a> {
    name: &'a str,
    email: &'a str,
    password_hash: &'a str,
    age: Option<i32>,
    condition: &'a str,
    created_at: i64,
    updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = preferences)]
struct NewPreferences {
    user_id: i32,
    daily_alerts: bool,
    medication_reminders: bool,
    appointment_reminders: bool,
    symptom_reminders: bool,
    goal_updates: bool,
    motivational_messages: bool,
    email_frequency: String,
    preferred_email_time: String,
}

#[derive(Debug, Clone)]
pub struct NewUserInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: Option<i32>,
    pub condition: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub condition: Option<String>,
}

#[derive(Clone)]
pub struct UserStore {
    db: Db,
}

impl UserStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Creates the user and its 1:1 preference row. Fails with `Conflict`
    /// when the e-mail is already registered; the unique index decides, so
    /// concurrent registrations of the same address cannot both succeed.
    pub async fn create_user(
        &self,
        input: NewUserInput,
        prefs: PreferenceUpdate,
    ) -> Result<(UserRecord, PreferenceSet)> {
        let mut conn = self.db.conn().await?;

        let now = now_ts();
        let new_user = NewUser {
            name: &input.name,
            email: &input.email,
            password_hash: &input.password_hash,
            age: input.age,
            condition: &input.condition,
            created_at: now,
            updated_at: now,
        };
        diesel::insert_into(users::table)
            .values(&new_user)
            .execute(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::UniqueViolation,
                    _,
                ) => CareTrackError::Conflict("User with this email already exists".to_string()),
                e => CareTrackError::Database(e.to_string()),
            })?;

        let user: UserRecord = users::table
            .filter(users::email.eq(&input.email))
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let new_prefs = NewPreferences {
            user_id: user.id,
            daily_alerts: prefs.daily_alerts.unwrap_or(true),
            medication_reminders: prefs.medication_reminders.unwrap_or(true),
            appointment_reminders: prefs.appointment_reminders.unwrap_or(true),
            symptom_reminders: prefs.symptom_reminders.unwrap_or(true),
            goal_updates: prefs.goal_updates.unwrap_or(true),
            motivational_messages: prefs.motivational_messages.unwrap_or(true),
            email_frequency: prefs.email_frequency.unwrap_or_else(|| "instant".to_string()),
            preferred_email_time: prefs
                .preferred_email_time
                .unwrap_or_else(|| "09:00".to_string()),
        };
        diesel::insert_into(preferences::table)
            .values(&new_prefs)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let prefs = self.preferences_with_conn(&mut conn, user.id).await?;
        Ok((user, prefs))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let mut conn = self.db.conn().await?;
        users::table
            .filter(users::email.eq(email))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<UserRecord>> {
        let mut conn = self.db.conn().await?;
        users::table
            .filter(users::id.eq(id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    /// Merge-style update: absent fields keep their current values.
    pub async fn update_profile(&self, id: i32, update: ProfileUpdate) -> Result<UserRecord> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| CareTrackError::NotFound("user not found".to_string()))?;

        let mut conn = self.db.conn().await?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set((
                users::name.eq(update.name.unwrap_or(current.name)),
                users::age.eq(update.age.or(current.age)),
                users::condition.eq(update.condition.unwrap_or(current.condition)),
                users::updated_at.eq(now_ts()),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        users::table
            .filter(users::id.eq(id))
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    pub async fn set_last_alert_sent(&self, id: i32, ts: i64) -> Result<()> {
        let mut conn = self.db.conn().await?;
        diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::last_alert_sent.eq(Some(ts)))
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(())
    }

    /// Child rows (preferences, medications, symptoms, goals, reminders,
    /// metrics) go with the user via ON DELETE CASCADE.
    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(users::table.filter(users::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    pub async fn preferences(&self, user_id: i32) -> Result<PreferenceSet> {
        let mut conn = self.db.conn().await?;
        self.preferences_with_conn(&mut conn, user_id).await
    }

    pub async fn update_preferences(
        &self,
        user_id: i32,
        update: PreferenceUpdate,
    ) -> Result<PreferenceSet> {
        let current = self.preferences(user_id).await?;
        let mut conn = self.db.conn().await?;
        diesel::update(preferences::table.filter(preferences::user_id.eq(user_id)))
            .set((
                preferences::daily_alerts.eq(update.daily_alerts.unwrap_or(current.daily_alerts)),
                preferences::medication_reminders
                    .eq(update.medication_reminders.unwrap_or(current.medication_reminders)),
                preferences::appointment_reminders
                    .eq(update.appointment_reminders.unwrap_or(current.appointment_reminders)),
                preferences::symptom_reminders
                    .eq(update.symptom_reminders.unwrap_or(current.symptom_reminders)),
                preferences::goal_updates.eq(update.goal_updates.unwrap_or(current.goal_updates)),
                preferences::motivational_messages.eq(update
                    .motivational_messages
                    .unwrap_or(current.motivational_messages)),
                preferences::email_frequency
                    .eq(update.email_frequency.unwrap_or(current.email_frequency)),
                preferences::preferred_email_time.eq(update
                    .preferred_email_time
                    .unwrap_or(current.preferred_email_time)),
            ))
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        self.preferences_with_conn(&mut conn, user_id).await
    }

    /// Users opted into daily alerts, with their preference rows. The
    /// preferred-hour match happens in the sweep (the send time is stored as
    /// an "HH:MM" string).
    pub async fn daily_alert_candidates(&self) -> Result<Vec<(UserRecord, PreferenceSet)>> {
        let mut conn = self.db.conn().await?;
        users::table
            .inner_join(preferences::table)
            .filter(preferences::daily_alerts.eq(true))
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    async fn preferences_with_conn(
        &self,
        conn: &mut crate::db::SqlitePooledConn<'_>,
        user_id: i32,
    ) -> Result<PreferenceSet> {
        preferences::table
            .filter(preferences::user_id.eq(user_id))
            .first(conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }
}
