use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::{medications, preferences, users};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationItem {
    pub id: i32,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    /// Scheduled intake times as "HH:MM" strings.
    pub times: Vec<String>,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub send_reminders: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Queryable)]
struct MedicationRow {
    id: i32,
    _user_id: i32,
    name: String,
    dosage: String,
    frequency: String,
    times: String,
    instructions: Option<String>,
    is_active: bool,
    send_reminders: bool,
    created_at: i64,
    updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = medications)]
struct NewMedication<'a> {
    user_id: i32,
    name: &'a str,
    dosage: &'a str,
    frequency: &'a str,
    times: String,
    instructions: Option<&'a str>,
    is_active: bool,
    send_reminders: bool,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewMedicationInput {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub times: Vec<String>,
    pub instructions: Option<String>,
    pub send_reminders: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct MedicationUpdate {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub times: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub is_active: Option<bool>,
    pub send_reminders: Option<bool>,
}

/// A medication due for a reminder e-mail together with its owner's contact
/// details.
#[derive(Debug, Clone)]
pub struct MedicationReminderTarget {
    pub medication: MedicationItem,
    pub user_id: i32,
    pub user_name: String,
    pub user_email: String,
}

#[derive(Clone)]
pub struct MedicationStore {
    db: Db,
}

impl MedicationStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewMedicationInput) -> Result<MedicationItem> {
        let now = now_ts();
        let times_json = serde_json::to_string(&input.times)
            .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
        let new = NewMedication {
            user_id,
            name: &input.name,
            dosage: &input.dosage,
            frequency: &input.frequency,
            times: times_json,
            instructions: input.instructions.as_deref(),
            is_active: true,
            send_reminders: input.send_reminders.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.db.conn().await?;
        diesel::insert_into(medications::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let row: MedicationRow = medications::table
            .filter(medications::user_id.eq(user_id))
            .order(medications::id.desc())
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(map_row(row))
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<MedicationItem>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<MedicationRow> = medications::table
            .filter(medications::user_id.eq(user_id))
            .order(medications::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(map_row).collect())
    }

    pub async fn list_active(&self, user_id: i32) -> Result<Vec<MedicationItem>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<MedicationRow> = medications::table
            .filter(medications::user_id.eq(user_id))
            .filter(medications::is_active.eq(true))
            .order(medications::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(map_row).collect())
    }

    /// Returns `None` when the row does not exist or is owned by someone
    /// else.
    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        update: MedicationUpdate,
    ) -> Result<Option<MedicationItem>> {
        let mut conn = self.db.conn().await?;
        let current: Option<MedicationRow> = medications::table
            .filter(medications::user_id.eq(user_id))
            .filter(medications::id.eq(id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        let Some(current) = current else {
            return Ok(None);
        };

        let times_json = match update.times {
            Some(times) => serde_json::to_string(&times)
                .map_err(|e| CareTrackError::Runtime(e.to_string()))?,
            None => current.times,
        };
        diesel::update(
            medications::table
                .filter(medications::user_id.eq(user_id))
                .filter(medications::id.eq(id)),
        )
        .set((
            medications::name.eq(update.name.unwrap_or(current.name)),
            medications::dosage.eq(update.dosage.unwrap_or(current.dosage)),
            medications::frequency.eq(update.frequency.unwrap_or(current.frequency)),
            medications::times.eq(times_json),
            medications::instructions.eq(update.instructions.or(current.instructions)),
            medications::is_active.eq(update.is_active.unwrap_or(current.is_active)),
            medications::send_reminders.eq(update.send_reminders.unwrap_or(current.send_reminders)),
            medications::updated_at.eq(now_ts()),
        ))
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let row: MedicationRow = medications::table
            .filter(medications::id.eq(id))
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(Some(map_row(row)))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(
            medications::table
                .filter(medications::user_id.eq(user_id))
                .filter(medications::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    /// Active medications with reminders enabled whose owner opted into
    /// medication e-mails and whose times list contains `hhmm`. No
    /// idempotency marker: a medication matches on every tick that falls in
    /// its scheduled minute.
    pub async fn due_for_reminder(&self, hhmm: &str) -> Result<Vec<MedicationReminderTarget>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<(MedicationRow, (i32, String, String))> = medications::table
            .inner_join(users::table.inner_join(preferences::table))
            .filter(medications::is_active.eq(true))
            .filter(medications::send_reminders.eq(true))
            .filter(preferences::medication_reminders.eq(true))
            .select((
                medications::all_columns,
                (users::id, users::name, users::email),
            ))
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(row, (user_id, user_name, user_email))| MedicationReminderTarget {
                medication: map_row(row),
                user_id,
                user_name,
                user_email,
            })
            .filter(|target| target.medication.times.iter().any(|t| t == hhmm))
            .collect())
    }
}

fn map_row(row: MedicationRow) -> MedicationItem {
    let times: Vec<String> = serde_json::from_str(&row.times).unwrap_or_default();
    MedicationItem {
        id: row.id,
        name: row.name,
        dosage: row.dosage,
        frequency: row.frequency,
        times,
        instructions: row.instructions,
        is_active: row.is_active,
        send_reminders: row.send_reminders,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
