use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::interfaces::providers::LlmProvider;
use crate::stores::ai_usage::AiUsageStore;

const SYSTEM_PROMPT: &str = "You are a compassionate, knowledgeable health advisor specializing in chronic disease management. Provide personalized, practical, and motivational health recommendations. Include specific food suggestions to stay healthy. Always maintain a supportive tone and focus on actionable advice. Be specific and relevant to the user's condition.";

/// The patient fields the prompt builder needs.
#[derive(Debug, Clone)]
pub struct PatientContext {
    pub name: String,
    pub age: Option<i32>,
    pub condition: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomSummary {
    #[serde(rename = "type")]
    pub symptom_type: String,
    pub severity: i32,
    pub recorded_at: i64,
}

/// Aggregated health figures for one user, recomputed at every read site so
/// the dashboard, the insights route, and the e-mail all agree.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub adherence_rate: f64,
    pub medications_count: i64,
    pub recent_symptoms_count: i64,
    pub active_goals_count: i64,
    pub completed_goals_count: i64,
    pub today_reminders_count: i64,
    pub recent_symptoms: Vec<SymptomSummary>,
    pub condition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub analysis: String,
    pub risk_level: RiskLevel,
}

/// Local severity classification, always available regardless of the
/// upstream model: any severity of 8 or more is high; two or more in the
/// 5..8 band, or three or more symptoms overall, is medium.
pub fn calculate_risk_level(severities: &[i32]) -> RiskLevel {
    if severities.iter().any(|&s| s >= 8) {
        return RiskLevel::High;
    }
    let elevated = severities.iter().filter(|&&s| (5..8).contains(&s)).count();
    if elevated >= 2 || severities.len() >= 3 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Health recommendation generator. Every failure path degrades to a static
/// fallback string; nothing here ever surfaces an error to the caller.
#[derive(Clone)]
pub struct InsightService {
    provider: Option<Arc<dyn LlmProvider>>,
    usage: AiUsageStore,
    monthly_limit: i64,
}

impl InsightService {
    pub fn new(
        provider: Option<Arc<dyn LlmProvider>>,
        usage: AiUsageStore,
        monthly_limit: i64,
    ) -> Self {
        Self {
            provider,
            usage,
            monthly_limit,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn generate_recommendation(
        &self,
        patient: &PatientContext,
        snapshot: &HealthSnapshot,
    ) -> String {
        let prompt = build_health_prompt(patient, snapshot);
        match self.call_model(&prompt).await {
            Some(text) => text,
            None => fallback_recommendation(snapshot.adherence_rate, &patient.condition),
        }
    }

    /// Risk level is computed locally first; only the prose depends on the
    /// model call.
    pub async fn analyze_symptoms(
        &self,
        condition: &str,
        symptoms: &[SymptomSummary],
    ) -> SymptomAnalysis {
        let severities: Vec<i32> = symptoms.iter().map(|s| s.severity).collect();
        let risk_level = calculate_risk_level(&severities);

        let prompt = build_symptom_prompt(condition, symptoms);
        let analysis = match self.call_model(&prompt).await {
            Some(text) => text,
            None => fallback_symptom_analysis(risk_level, condition),
        };
        SymptomAnalysis {
            analysis,
            risk_level,
        }
    }

    /// `None` means "use the fallback": no credential, monthly ceiling
    /// reached, or the upstream call failed.
    async fn call_model(&self, prompt: &str) -> Option<String> {
        let provider = match &self.provider {
            Some(provider) => provider,
            None => {
                info!("using fallback recommendations, model credential not configured");
                return None;
            }
        };

        let month = chrono::Utc::now().format("%Y-%m").to_string();
        match self.usage.try_consume(&month, self.monthly_limit).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(month, limit = self.monthly_limit, "monthly model call ceiling reached");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "usage counter unavailable, using fallback");
                return None;
            }
        }

        match provider.generate_text(prompt, SYSTEM_PROMPT).await {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!("model returned empty completion, using fallback");
                None
            }
            Err(err) => {
                warn!(error = %err, "model call failed, using fallback");
                None
            }
        }
    }
}

fn build_health_prompt(patient: &PatientContext, snapshot: &HealthSnapshot) -> String {
    let days_registered = ((crate::db::now_ts() - patient.created_at) / 86_400).max(0);
    let symptom_list = if snapshot.recent_symptoms.is_empty() {
        "None".to_string()
    } else {
        snapshot
            .recent_symptoms
            .iter()
            .map(|s| format!("{} (severity {}/10)", s.symptom_type, s.severity))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let age = patient
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "PATIENT HEALTH ANALYSIS REQUEST\n\n\
         Patient Information:\n\
         - Name: {name}\n\
         - Age: {age}\n\
         - Chronic Condition: {condition}\n\
         - Days since registration: {days_registered}\n\n\
         Current Health Status:\n\
         - Medication Adherence: {adherence:.0}%\n\
         - Active Medications: {medications}\n\
         - Recent Symptoms Recorded: {symptom_count}\n\
         - Health Goals: {active_goals} active, {completed_goals} completed\n\
         - Upcoming Reminders: {reminders}\n\n\
         Recent Symptoms: {symptom_list}\n\n\
         Please provide a comprehensive health recommendation including:\n\
         1. A personalized motivational message based on their adherence and progress\n\
         2. 3-4 specific, actionable health tips relevant to their condition\n\
         3. Advice on medication management and symptom monitoring\n\
         4. One positive affirmation about their health journey\n\
         5. Any important reminders or warnings based on their symptoms\n\
         6. Specific foods to eat to stay healthy with {condition}\n\n\
         Keep the response under 300 words, compassionate, and practical. \
         Focus on empowerment and realistic steps.",
        name = patient.name,
        age = age,
        condition = patient.condition,
        days_registered = days_registered,
        adherence = snapshot.adherence_rate,
        medications = snapshot.medications_count,
        symptom_count = snapshot.recent_symptoms_count,
        active_goals = snapshot.active_goals_count,
        completed_goals = snapshot.completed_goals_count,
        reminders = snapshot.today_reminders_count,
        symptom_list = symptom_list,
    )
}

fn build_symptom_prompt(condition: &str, symptoms: &[SymptomSummary]) -> String {
    let symptom_list = if symptoms.is_empty() {
        "None".to_string()
    } else {
        symptoms
            .iter()
            .map(|s| format!("{} (severity {}/10)", s.symptom_type, s.severity))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "A patient managing {condition} recorded these recent symptoms: {symptom_list}.\n\n\
         Provide a short, supportive analysis of what these symptoms may indicate, \
         practical self-care steps, and clear guidance on when to contact a doctor. \
         Keep the response under 150 words. Do not diagnose."
    )
}

/// Selected purely by adherence bucket; one of exactly three fixed texts.
pub fn fallback_recommendation(adherence_rate: f64, condition: &str) -> String {
    let adherence = adherence_rate.round() as i64;
    if adherence_rate >= 80.0 {
        format!(
            "Excellent work! Your {adherence}% adherence rate shows incredible commitment to \
             your health journey with {condition}.\n\n\
             Key Recommendations:\n\
             1. Continue your excellent medication routine - consistency is key\n\
             2. Maintain your symptom tracking - this helps identify patterns early\n\
             3. Consider adding light physical activity if approved by your doctor\n\
             4. Stay hydrated and maintain a balanced diet rich in fruits and vegetables\n\n\
             Healthy Foods to Focus On:\n\
             - Leafy greens and colorful vegetables\n\
             - Lean proteins like fish and chicken\n\
             - Whole grains and fiber-rich foods\n\
             - Plenty of water throughout the day\n\n\
             Remember: \"Your dedication today builds a healthier tomorrow.\" \
             Keep up the amazing work!"
        )
    } else if adherence_rate >= 50.0 {
        format!(
            "You're making good progress with your {adherence}% adherence rate in managing \
             {condition}.\n\n\
             To improve further:\n\
             1. Try setting medication reminders to boost your consistency\n\
             2. Record symptoms daily to better understand your condition patterns\n\
             3. Break down health goals into smaller, achievable steps\n\
             4. Celebrate small victories - each dose taken is a success\n\n\
             Nutrition Tips:\n\
             - Eat regular, balanced meals\n\
             - Include anti-inflammatory foods\n\
             - Stay hydrated with water and herbal teas\n\
             - Limit processed foods and sugars\n\n\
             You're building lasting healthy habits. Every step forward counts!"
        )
    } else {
        format!(
            "We understand managing {condition} can be challenging sometimes. \
             Let's focus on fresh starts:\n\n\
             Today's Simple Steps:\n\
             1. Take your next scheduled medication - set a phone reminder if needed\n\
             2. Drink a glass of water and take 5 deep breaths\n\
             3. Record any symptoms you're experiencing\n\
             4. Remember why you started - your health matters\n\n\
             Quick Healthy Eating:\n\
             - Start with a nutritious breakfast\n\
             - Snack on fruits and nuts\n\
             - Choose whole foods over processed\n\
             - Listen to your body's hunger cues\n\n\
             \"You don't have to be perfect, just persistent.\" \
             Let's take this one step at a time together."
        )
    }
}

fn fallback_symptom_analysis(risk_level: RiskLevel, condition: &str) -> String {
    match risk_level {
        RiskLevel::High => format!(
            "One or more of your recent symptoms is severe. Please contact your healthcare \
             provider promptly to discuss them in the context of {condition}. In the meantime, \
             rest, stay hydrated, and keep your symptom log up to date."
        ),
        RiskLevel::Medium => format!(
            "Your recent symptoms show a pattern worth watching while managing {condition}. \
             Keep recording them daily, stay consistent with your medications, and mention \
             these entries at your next check-in with your doctor."
        ),
        RiskLevel::Low => format!(
            "Your recent symptoms look mild. Keep up your routine for {condition}, continue \
             logging how you feel, and reach out to your doctor if anything worsens."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_risk_on_any_severe_symptom() {
        assert_eq!(calculate_risk_level(&[9]), RiskLevel::High);
        assert_eq!(calculate_risk_level(&[2, 3, 8]), RiskLevel::High);
    }

    #[test]
    fn medium_risk_on_elevated_pair_or_volume() {
        assert_eq!(calculate_risk_level(&[6, 6]), RiskLevel::Medium);
        assert_eq!(calculate_risk_level(&[2, 2, 2]), RiskLevel::Medium);
    }

    #[test]
    fn low_risk_otherwise() {
        assert_eq!(calculate_risk_level(&[2]), RiskLevel::Low);
        assert_eq!(calculate_risk_level(&[]), RiskLevel::Low);
        assert_eq!(calculate_risk_level(&[7, 3]), RiskLevel::Low);
    }

    #[test]
    fn fallback_is_selected_by_adherence_bucket() {
        let high = fallback_recommendation(85.0, "Diabetes");
        let mid = fallback_recommendation(66.7, "Diabetes");
        let low = fallback_recommendation(20.0, "Diabetes");
        assert!(high.starts_with("Excellent work!"));
        assert!(mid.starts_with("You're making good progress"));
        assert!(low.starts_with("We understand managing"));
        assert!(mid.contains("67%"));
    }

    #[test]
    fn prompt_embeds_snapshot_figures() {
        let patient = PatientContext {
            name: "Ada".to_string(),
            age: Some(41),
            condition: "Hypertension".to_string(),
            created_at: crate::db::now_ts() - 10 * 86_400,
        };
        let snapshot = HealthSnapshot {
            adherence_rate: 50.0,
            medications_count: 2,
            recent_symptoms_count: 1,
            active_goals_count: 1,
            completed_goals_count: 1,
            today_reminders_count: 3,
            recent_symptoms: vec![SymptomSummary {
                symptom_type: "Headache".to_string(),
                severity: 4,
                recorded_at: 0,
            }],
            condition: "Hypertension".to_string(),
        };
        let prompt = build_health_prompt(&patient, &snapshot);
        assert!(prompt.contains("Medication Adherence: 50%"));
        assert!(prompt.contains("Headache (severity 4/10)"));
        assert!(prompt.contains("Hypertension"));
        assert!(prompt.contains("Days since registration: 10"));
    }
}
