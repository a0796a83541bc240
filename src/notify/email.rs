//! HTML bodies for outbound alert mail.

use chrono::{Local, TimeZone};

use crate::stores::medications::MedicationItem;
use crate::stores::reminders::ReminderItem;

pub struct DailyAlertData<'a> {
    pub user_name: &'a str,
    pub ai_recommendation: &'a str,
    pub adherence_rate: f64,
    pub medications_count: i64,
    pub active_goals_count: i64,
    pub today_reminders_count: i64,
    pub medications: &'a [MedicationItem],
    pub reminders: &'a [ReminderItem],
}

pub fn daily_alert_subject() -> String {
    format!(
        "Your Daily Health Update - {}",
        Local::now().format("%a %b %-d %Y")
    )
}

/// Greeting header, AI advisor section, four stat tiles, then due-medication
/// and reminder cards.
pub fn render_daily_alert(data: &DailyAlertData<'_>) -> String {
    let mut medication_cards = String::new();
    if !data.medications.is_empty() {
        medication_cards.push_str(
            r#"<div class="card"><h3 style="color:#d32f2f;">Today's Medications</h3>"#,
        );
        for med in data.medications {
            medication_cards.push_str(&format!(
                r#"<div style="margin:10px 0;padding:10px;background:#ffebee;border-radius:5px;"><strong>{}</strong> - {}<br><small>Times: {}</small></div>"#,
                escape(&med.name),
                escape(&med.dosage),
                escape(&med.times.join(", ")),
            ));
        }
        medication_cards.push_str("</div>");
    }

    let mut reminder_cards = String::new();
    if !data.reminders.is_empty() {
        reminder_cards
            .push_str(r#"<div class="card"><h3 style="color:#ff9800;">Today's Reminders</h3>"#);
        for reminder in data.reminders {
            reminder_cards.push_str(&format!(
                r#"<div style="margin:8px 0;padding:8px;background:#fff3e0;border-radius:5px;"><strong>{}</strong><br><small>{} - {}</small></div>"#,
                escape(&reminder.title),
                local_time(reminder.scheduled_time),
                escape(&reminder.message),
            ));
        }
        reminder_cards.push_str("</div>");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; margin: 0; padding: 0; }}
  .container {{ max-width: 600px; margin: 20px auto; background: white; border-radius: 15px; overflow: hidden; }}
  .header {{ background: linear-gradient(135deg, #4CAF50, #45a049); color: white; padding: 30px 20px; text-align: center; }}
  .content {{ padding: 30px; }}
  .ai-section {{ background: #e8f5e8; padding: 20px; margin: 20px 0; border-radius: 10px; border-left: 5px solid #4CAF50; }}
  .card {{ background: white; padding: 15px; margin: 15px 0; border-radius: 8px; border: 1px solid #e0e0e0; }}
  .stats-grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 15px; margin: 20px 0; }}
  .stat-item {{ background: #f8f9fa; padding: 15px; border-radius: 8px; text-align: center; }}
  .stat-number {{ font-size: 24px; font-weight: bold; color: #4CAF50; }}
  .footer {{ text-align: center; padding: 20px; background: #f8f9fa; color: #666; font-size: 12px; }}
</style>
</head>
<body>
<div class="container">
  <div class="header">
    <h1>Good Morning, {name}!</h1>
    <p>Your Personalized Health Update for {date}</p>
  </div>
  <div class="content">
    <div class="ai-section">
      <h3 style="margin-top:0;color:#2e7d32;">AI Health Advisor</h3>
      <div style="white-space: pre-line;">{recommendation}</div>
    </div>
    <div class="stats-grid">
      <div class="stat-item"><div class="stat-number">{adherence:.0}%</div><div>Adherence Rate</div></div>
      <div class="stat-item"><div class="stat-number">{medications}</div><div>Active Medications</div></div>
      <div class="stat-item"><div class="stat-number">{goals}</div><div>Active Goals</div></div>
      <div class="stat-item"><div class="stat-number">{reminders}</div><div>Today's Reminders</div></div>
    </div>
    {medication_cards}
    {reminder_cards}
  </div>
  <div class="footer">
    <p>This is an automated health alert from CareTrack.</p>
    <p>You can adjust your notification preferences in your account settings.</p>
  </div>
</div>
</body>
</html>"#,
        name = escape(data.user_name),
        date = Local::now().format("%a %b %-d %Y"),
        recommendation = escape(data.ai_recommendation),
        adherence = data.adherence_rate,
        medications = data.medications_count,
        goals = data.active_goals_count,
        reminders = data.today_reminders_count,
        medication_cards = medication_cards,
        reminder_cards = reminder_cards,
    )
}

pub fn render_medication_reminder(user_name: &str, med: &MedicationItem, time: &str) -> String {
    let instructions = med
        .instructions
        .as_deref()
        .map(|i| format!("<p><em>{}</em></p>", escape(i)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: 'Segoe UI', sans-serif; color: #333;">
<div style="max-width:600px;margin:20px auto;border:1px solid #e0e0e0;border-radius:8px;overflow:hidden;">
  <div style="background:#d32f2f;color:white;padding:20px;text-align:center;">
    <h2 style="margin:0;">Medication Reminder</h2>
  </div>
  <div style="padding:20px;">
    <p>Hi {name},</p>
    <p>It's {time} - time to take your medication:</p>
    <div style="padding:15px;background:#ffebee;border-radius:5px;">
      <strong>{med_name}</strong> - {dosage}
    </div>
    {instructions}
  </div>
</div>
</body>
</html>"#,
        name = escape(user_name),
        time = escape(time),
        med_name = escape(&med.name),
        dosage = escape(&med.dosage),
        instructions = instructions,
    )
}

pub fn render_general_reminder(user_name: &str, reminder: &ReminderItem) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: 'Segoe UI', sans-serif; color: #333;">
<div style="max-width:600px;margin:20px auto;border:1px solid #e0e0e0;border-radius:8px;overflow:hidden;">
  <div style="background:#ff9800;color:white;padding:20px;text-align:center;">
    <h2 style="margin:0;">{title}</h2>
  </div>
  <div style="padding:20px;">
    <p>Hi {name},</p>
    <p>{message}</p>
    <p><small>Scheduled for {time}</small></p>
  </div>
</div>
</body>
</html>"#,
        title = escape(&reminder.title),
        name = escape(user_name),
        message = escape(&reminder.message),
        time = local_time(reminder.scheduled_time),
    )
}

fn local_time(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%H:%M").to_string(),
        _ => String::new(),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
