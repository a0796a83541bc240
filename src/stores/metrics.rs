use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Serialize;

use crate::db::{now_ts, Db};
use crate::error::{CareTrackError, Result};
use crate::schema::health_metrics;

#[derive(Debug, Clone, Serialize, Queryable)]
#[serde(rename_all = "camelCase")]
pub struct MetricItem {
    pub id: i32,
    #[serde(skip_serializing)]
    pub user_id: i32,
    #[serde(rename = "type")]
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub notes: String,
    pub recorded_at: i64,
    pub is_critical: bool,
    #[serde(skip_serializing)]
    pub alert_sent: bool,
}

#[derive(Insertable)]
#[diesel(table_name = health_metrics)]
struct NewMetric<'a> {
    user_id: i32,
    metric_type: &'a str,
    value: f64,
    unit: &'a str,
    notes: &'a str,
    recorded_at: i64,
    is_critical: bool,
    alert_sent: bool,
}

#[derive(Debug, Clone)]
pub struct NewMetricInput {
    pub metric_type: String,
    pub value: f64,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub is_critical: Option<bool>,
}

#[derive(Clone)]
pub struct MetricStore {
    db: Db,
}

impl MetricStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: i32, input: NewMetricInput) -> Result<MetricItem> {
        let new = NewMetric {
            user_id,
            metric_type: &input.metric_type,
            value: input.value,
            unit: input.unit.as_deref().unwrap_or(""),
            notes: input.notes.as_deref().unwrap_or(""),
            recorded_at: now_ts(),
            is_critical: input.is_critical.unwrap_or(false),
            alert_sent: false,
        };

        let mut conn = self.db.conn().await?;
        diesel::insert_into(health_metrics::table)
            .values(&new)
            .execute(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))?;

        health_metrics::table
            .filter(health_metrics::user_id.eq(user_id))
            .order(health_metrics::id.desc())
            .first(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }

    /// Most recent first, optionally restricted to one metric type.
    pub async fn list(
        &self,
        user_id: i32,
        metric_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<MetricItem>> {
        let mut conn = self.db.conn().await?;
        let mut query = health_metrics::table
            .filter(health_metrics::user_id.eq(user_id))
            .into_boxed();
        if let Some(metric_type) = metric_type {
            query = query.filter(health_metrics::metric_type.eq(metric_type.to_string()));
        }
        query
            .order(health_metrics::recorded_at.desc())
            .then_order_by(health_metrics::id.desc())
            .limit(limit.max(1))
            .load(&mut conn)
            .await
            .map_err(|e| CareTrackError::Database(e.to_string()))
    }
}
