use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::health_goals;

#[derive(Debug, Clone, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct GoalItem {
    pub id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    pub title: String,
    pub description: String,
    pub category: String,
    pub target_value: f64,
    pub current_value: f64,
    pub unit: String,
    pub deadline: Option<i64>,
    pub is_completed: bool,
    pub priority: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Insertable)]
#[diesel(table_name = health_goals)]
struct NewGoal<'a> {
    user_id: i32,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    target_value: f64,
    current_value: f64,
    unit: &'a str,
    deadline: Option<i64>,
    is_completed: bool,
    priority: &'a str,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewGoalInput {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub target_value: f64,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<i64>,
    pub priority: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<i64>,
    pub is_completed: Option<bool>,
    pub priority: Option<String>,
}

/// Completion summary over all of a user's goals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSummary {
    pub total: i64,
    pub completed: i64,
}

impl GoalSummary {
    /// Percentage of goals completed, 0.0 when the user has none.
    pub fn adherence_rate(&self) -> f64 {
        adherence_rate(self.completed, self.total)
    }
}

pub fn adherence_rate(completed: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

#[derive(Clone)]
pub struct GoalStore {
    db: Db,
}

impl GoalStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewGoalInput) -> Result<GoalItem> {
        let now = now_ts();
        let new = NewGoal {
            user_id,
            title: &input.title,
            description: input.description.as_deref().unwrap_or(""),
            category: &input.category,
            target_value: input.target_value,
            current_value: input.current_value.unwrap_or(0.0),
            unit: input.unit.as_deref().unwrap_or(""),
            deadline: input.deadline,
            is_completed: false,
            priority: input.priority.as_deref().unwrap_or("medium"),
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.db.conn().await?;
        diesel::insert_into(health_goals::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        health_goals::table
            .filter(health_goals::user_id.eq(user_id))
            .order(health_goals::id.desc())
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    /// Highest priority first (high, medium, low), then earliest deadline.
    pub async fn list(&self, user_id: i32) -> Result<Vec<GoalItem>> {
        let mut conn = self.db.conn().await?;
        health_goals::table
            .filter(health_goals::user_id.eq(user_id))
            .order((
                diesel::dsl::sql::<diesel::sql_types::Integer>(
                    "CASE priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END",
                )
                .asc(),
                health_goals::deadline.asc(),
            ))
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    pub async fn update(
        &self,
        user_id: i32,
        id: i32,
        update: GoalUpdate,
    ) -> Result<Option<GoalItem>> {
        let mut conn = self.db.conn().await?;
        let current: Option<GoalItem> = health_goals::table
            .filter(health_goals::user_id.eq(user_id))
            .filter(health_goals::id.eq(id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        let Some(current) = current else {
            return Ok(None);
        };

        diesel::update(
            health_goals::table
                .filter(health_goals::user_id.eq(user_id))
                .filter(health_goals::id.eq(id)),
        )
        .set((
            health_goals::title.eq(update.title.unwrap_or(current.title)),
            health_goals::description.eq(update.description.unwrap_or(current.description)),
            health_goals::category.eq(update.category.unwrap_or(current.category)),
            health_goals::target_value.eq(update.target_value.unwrap_or(current.target_value)),
            health_goals::current_value.eq(update.current_value.unwrap_or(current.current_value)),
            health_goals::unit.eq(update.unit.unwrap_or(current.unit)),
            health_goals::deadline.eq(update.deadline.or(current.deadline)),
            health_goals::is_completed.eq(update.is_completed.unwrap_or(current.is_completed)),
            health_goals::priority.eq(update.priority.unwrap_or(current.priority)),
            health_goals::updated_at.eq(now_ts()),
        ))
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;

        let goal = health_goals::table
            .filter(health_goals::id.eq(id))
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(Some(goal))
    }

    pub async fn delete(&self, user_id: i32, id: i32) -> Result<bool> {
        let mut conn = self.db.conn().await?;
        let deleted = diesel::delete(
            health_goals::table
                .filter(health_goals::user_id.eq(user_id))
                .filter(health_goals::id.eq(id)),
        )
        .execute(&mut conn)
        .await
        .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    pub async fn summary(&self, user_id: i32) -> Result<GoalSummary> {
        let mut conn = self.db.conn().await?;
        let total: i64 = health_goals::table
            .filter(health_goals::user_id.eq(user_id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        let completed: i64 = health_goals::table
            .filter(health_goals::user_id.eq(user_id))
            .filter(health_goals::is_completed.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;
        Ok(GoalSummary { total, completed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adherence_rate_handles_empty_set() {
        assert_eq!(adherence_rate(0, 0), 0.0);
    }

    #[test]
    fn adherence_rate_is_a_percentage() {
        assert_eq!(adherence_rate(2, 4), 50.0);
        assert!((adherence_rate(2, 3) - 66.666).abs() < 0.01);
        assert_eq!(adherence_rate(3, 3), 100.0);
    }
}
