pub mod insights;

pub use insights::{
    calculate_risk_level, HealthSnapshot, InsightService, PatientContext, RiskLevel,
    SymptomAnalysis, SymptomSummary,
};
