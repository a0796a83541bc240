use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::symptoms;

/// Append-only symptom log entry. There is no update route; users record new
/// entries and read them most-recent-first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomItem {
    pub id: i32,
    #[serde(rename = "type")]
    pub symptom_type: String,
    pub severity: i32,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub triggers: Option<String>,
    pub recorded_at: i64,
}

#[derive(Queryable)]
struct SymptomRow {
    id: i32,
    _user_id: i32,
    symptom_type: String,
    severity: i32,
    description: Option<String>,
    duration: Option<String>,
    triggers: Option<String>,
    recorded_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = symptoms)]
struct NewSymptom<'a> {
    user_id: i32,
    symptom_type: &'a str,
    severity: i32,
    description: Option<&'a str>,
    duration: Option<&'a str>,
    triggers: Option<&'a str>,
    recorded_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewSymptomInput {
    pub symptom_type: String,
    pub severity: i32,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub triggers: Option<String>,
}

#[derive(Clone)]
pub struct SymptomStore {
    db: Db,
}

impl SymptomStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewSymptomInput) -> Result<SymptomItem> {
        let new = NewSymptom {
            user_id,
            symptom_type: &input.symptom_type,
            severity: input.severity,
            description: input.description.as_deref(),
            duration: input.duration.as_deref(),
            triggers: input.triggers.as_deref(),
            recorded_at: now_ts(),
        };

        let mut conn = self.db.conn().await?;
        diesel::insert_into(symptoms::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let row: SymptomRow = symptoms::table
            .filter(symptoms::user_id.eq(user_id))
            .order(symptoms::id.desc())
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(map_row(row))
    }

    pub async fn recent(&self, user_id: i32, limit: i64) -> Result<Vec<SymptomItem>> {
        let mut conn = self.db.conn().await?;
        let rows: Vec<SymptomRow> = symptoms::table
            .filter(symptoms::user_id.eq(user_id))
            .order(symptoms::recorded_at.desc())
            .then_order_by(symptoms::id.desc())
            .limit(limit.max(1))
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(rows.into_iter().map(map_row).collect())
    }
}

fn map_row(row: SymptomRow) -> SymptomItem {
    SymptomItem {
        id: row.id,
        symptom_type: row.symptom_type,
        severity: row.severity,
        description: row.description,
        duration: row.duration,
        triggers: row.triggers,
        recorded_at: row.recorded_at,
    }
}
