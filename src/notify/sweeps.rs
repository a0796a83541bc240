use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Timelike};
use tracing::{error, info, warn};

use crate::ai::{HealthSnapshot, InsightService, PatientContext, SymptomSummary};
use crate::db::now_ts;
use crate::error::Result;
use crate::interfaces::scheduler::ScheduledJob;
use crate::notify::email::{
    daily_alert_subject, render_daily_alert, render_general_reminder, render_medication_reminder,
    DailyAlertData,
};
use crate::notify::mailer::EmailSender;
use crate::stores::goals::GoalStore;
use crate::stores::medications::MedicationStore;
use crate::stores::reminders::ReminderStore;
use crate::stores::symptoms::SymptomStore;
use crate::stores::users::{UserRecord, UserStore};

/// Inter-send pause so the relay's rate limits are respected.
const SEND_DELAY: Duration = Duration::from_secs(2);

/// Shared plumbing behind the three notification sweeps and the manual
/// test-alert route.
#[derive(Clone)]
pub struct AlertDispatcher {
    pub users: UserStore,
    pub goals: GoalStore,
    pub symptoms: SymptomStore,
    pub medications: MedicationStore,
    pub reminders: ReminderStore,
    pub insights: InsightService,
    pub mailer: Arc<dyn EmailSender>,
}

impl AlertDispatcher {
    /// Builds the digest for one user and sends it. Used by the daily sweep
    /// and by `POST /api/send-test-alert`.
    pub async fn send_daily_alert_to_user(&self, user: &UserRecord) -> Result<()> {
        let summary = self.goals.summary(user.id).await?;
        let adherence_rate = summary.adherence_rate();

        let recent = self.symptoms.recent(user.id, 5).await?;
        let recent_symptoms: Vec<SymptomSummary> = recent
            .iter()
            .map(|s| SymptomSummary {
                symptom_type: s.symptom_type.clone(),
                severity: s.severity,
                recorded_at: s.recorded_at,
            })
            .collect();

        let medications = self.medications.list_active(user.id).await?;
        let (day_start, day_end) = today_bounds();
        let reminders = self.reminders.today_incomplete(user.id, day_start, day_end).await?;

        let snapshot = HealthSnapshot {
            adherence_rate,
            medications_count: medications.len() as i64,
            recent_symptoms_count: recent_symptoms.len() as i64,
            active_goals_count: summary.total - summary.completed,
            completed_goals_count: summary.completed,
            today_reminders_count: reminders.len() as i64,
            recent_symptoms,
            condition: user.condition.clone(),
        };
        let patient = PatientContext {
            name: user.name.clone(),
            age: user.age,
            condition: user.condition.clone(),
            created_at: user.created_at,
        };
        let recommendation = self
            .insights
            .generate_recommendation(&patient, &snapshot)
            .await;

        let html = render_daily_alert(&DailyAlertData {
            user_name: &user.name,
            ai_recommendation: &recommendation,
            adherence_rate,
            medications_count: snapshot.medications_count,
            active_goals_count: snapshot.active_goals_count,
            today_reminders_count: snapshot.today_reminders_count,
            medications: &medications,
            reminders: &reminders,
        });
        self.mailer
            .send_html(&user.email, &daily_alert_subject(), &html)
            .await?;
        self.users.set_last_alert_sent(user.id, now_ts()).await?;
        info!(email = %user.email, "daily alert sent");
        Ok(())
    }

    /// Hourly tick. Fires only for users whose preferred send time falls in
    /// the current clock hour. Per-user failures are counted and do not
    /// abort the rest of the sweep.
    pub async fn run_daily_sweep(&self) -> Result<()> {
        let current_hour = Local::now().hour();
        let candidates = self.users.daily_alert_candidates().await?;

        let mut sent = 0usize;
        let mut failed = 0usize;
        for (user, prefs) in candidates {
            if preferred_hour(&prefs.preferred_email_time) != Some(current_hour) {
                continue;
            }
            match self.send_daily_alert_to_user(&user).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    error!(email = %user.email, error = %err, "daily alert failed");
                    failed += 1;
                }
            }
            tokio::time::sleep(SEND_DELAY).await;
        }
        info!(sent, failed, "daily alert sweep completed");
        Ok(())
    }

    /// Sends one e-mail per medication whose schedule contains the current
    /// minute. There is no sent marker; the sweep interval must stay below
    /// one minute to fire exactly once per scheduled time.
    pub async fn run_medication_sweep(&self) -> Result<()> {
        let hhmm = Local::now().format("%H:%M").to_string();
        let due = self.medications.due_for_reminder(&hhmm).await?;
        for target in due {
            let html =
                render_medication_reminder(&target.user_name, &target.medication, &hhmm);
            let subject = format!("Medication Reminder: {}", target.medication.name);
            if let Err(err) = self
                .mailer
                .send_html(&target.user_email, &subject, &html)
                .await
            {
                warn!(email = %target.user_email, error = %err, "medication reminder failed");
            }
        }
        Ok(())
    }

    /// Sends overdue reminder e-mails exactly once; rows are marked
    /// `email_sent` so re-runs are no-ops.
    pub async fn run_reminder_sweep(&self) -> Result<()> {
        let due = self.reminders.due_unsent(now_ts()).await?;
        for item in due {
            let html = render_general_reminder(&item.user_name, &item.reminder);
            let subject = format!("Reminder: {}", item.reminder.title);
            match self
                .mailer
                .send_html(&item.user_email, &subject, &html)
                .await
            {
                Ok(()) => {
                    self.reminders
                        .mark_email_sent(item.reminder.id, now_ts())
                        .await?;
                }
                Err(err) => {
                    warn!(email = %item.user_email, error = %err, "reminder email failed");
                }
            }
        }
        Ok(())
    }
}

fn today_bounds() -> (i64, i64) {
    let now = Local::now();
    let start = now.timestamp() - i64::from(now.num_seconds_from_midnight());
    (start, start + 86_400)
}

fn preferred_hour(preferred_email_time: &str) -> Option<u32> {
    let hour: u32 = preferred_email_time.split(':').next()?.parse().ok()?;
    (hour < 24).then_some(hour)
}

pub struct DailyAlertJob {
    pub dispatcher: AlertDispatcher,
    pub interval: Duration,
}

#[async_trait]
impl ScheduledJob for DailyAlertJob {
    fn name(&self) -> &str {
        "daily_alerts"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        self.dispatcher.run_daily_sweep().await
    }
}

pub struct MedicationReminderJob {
    pub dispatcher: AlertDispatcher,
    pub interval: Duration,
}

#[async_trait]
impl ScheduledJob for MedicationReminderJob {
    fn name(&self) -> &str {
        "medication_reminders"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        self.dispatcher.run_medication_sweep().await
    }
}

pub struct ReminderSweepJob {
    pub dispatcher: AlertDispatcher,
    pub interval: Duration,
}

#[async_trait]
impl ScheduledJob for ReminderSweepJob {
    fn name(&self) -> &str {
        "reminder_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        self.dispatcher.run_reminder_sweep().await
    }
}
