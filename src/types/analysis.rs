// src/types/analysis.rs
//! Analysis records exchanged with `/api/analyze` and kept in local storage

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ===== Analysis Context =====

/// Inputs of the last successful analysis, kept so the chat assistant can
/// reference them after navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContext {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

impl AnalysisContext {
    pub fn new(resume_text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            resume_text: resume_text.into(),
            job_description: job_description.into(),
        }
    }
}

// ===== Analysis Result =====

/// Backend analysis output. Every field is optional: the renderer must cope
/// with whatever subset the backend sends. Unknown fields are carried in
/// `extra` so the record round-trips through storage untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jd_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_skills: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_matched_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_total_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_matched_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_total_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_matched_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_total_count: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_requirement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub improvement_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_explanation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_improvement_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_tips: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_improvement_tips: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Resume tips, preferring `resumeTips` and falling back to the long name.
    pub fn resume_tips(&self) -> &[String] {
        first_non_empty(&self.resume_tips, &self.resume_improvement_tips)
    }

    /// Skill tips, preferring `skillTips` and falling back to the long name.
    pub fn skill_tips(&self) -> &[String] {
        first_non_empty(&self.skill_tips, &self.skill_improvement_tips)
    }
}

fn first_non_empty<'a>(primary: &'a Option<Vec<String>>, alias: &'a Option<Vec<String>>) -> &'a [String] {
    match (primary.as_deref(), alias.as_deref()) {
        (Some(p), _) if !p.is_empty() => p,
        (_, Some(a)) => a,
        (Some(p), None) => p,
        (None, None) => &[],
    }
}
