// src/results.rs
//! Results page: turns the persisted analysis into a render-ready view.
//!
//! Rendering is pure. The page reads `analysisResults` once and never talks
//! to the network; every absent or non-finite field has a fallback.

use std::collections::HashSet;
use std::fmt;
use tracing::{info, warn};

use crate::core::LocalStore;
use crate::types::AnalysisResult;

pub const NO_DATA_MESSAGE: &str = "No analysis data found. Please upload a resume first.";
const NO_MATCHED_SKILLS: &str = "No matched skills detected";
const NO_MISSING_SKILLS: &str = "No gaps identified";
const NO_BREAKDOWN_SKILLS: &str = "No skills identified";
const NO_RESUME_TIPS: &str = "No specific resume tips generated.";
const NO_SKILL_TIPS: &str = "No specific skill recommendations.";
const PILLAR_PENDING: &str = "Analyzing...";
const EDUCATION_UNSPECIFIED: &str = "Not Specified";
const SCORE_PLACEHOLDER: &str = "–";

/// Percentage at or above which a breakdown row is shown as satisfied.
const THRESHOLD_PCT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Strong,
    Medium,
    Weak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    /// `"82%"` or the placeholder dash when there is no usable score.
    pub display: String,
    pub value: Option<u32>,
    pub label: Option<String>,
    pub band: Option<ScoreBand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillTag {
    pub name: String,
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub label: &'static str,
    /// `matched/total (pct%)`, or just `pct%` for the education row.
    pub value: String,
    pub percentage: String,
    pub meets_threshold: bool,
    pub skills: Vec<SkillTag>,
    /// Shown instead of `skills` when there are none.
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pillar {
    pub label: &'static str,
    pub text: String,
}

/// A list section that always has something to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSection {
    Items(Vec<String>),
    Placeholder(&'static str),
}

impl ListSection {
    fn from_items(items: &[String], placeholder: &'static str) -> Self {
        if items.is_empty() {
            ListSection::Placeholder(placeholder)
        } else {
            ListSection::Items(items.to_vec())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub score: ScoreView,
    pub matched_skills: ListSection,
    pub missing_skills: ListSection,
    pub breakdown: Vec<BreakdownRow>,
    pub pillars: Vec<Pillar>,
    pub resume_tips: ListSection,
    pub skill_tips: ListSection,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultsPage {
    NoData,
    Loaded(Box<ResultsView>),
}

impl ResultsPage {
    /// Read the persisted results. Missing or unreadable records render the
    /// "no data" placeholder.
    pub fn load(store: &LocalStore) -> Self {
        match store.analysis_results() {
            Ok(Some(result)) => {
                info!("Analysis data loaded");
                ResultsPage::Loaded(Box::new(ResultsView::from_result(&result)))
            }
            Ok(None) => {
                warn!("No analysis data found in local storage");
                ResultsPage::NoData
            }
            Err(err) => {
                warn!("Unreadable analysis data: {:#}", err);
                ResultsPage::NoData
            }
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `matched / total` as a two-decimal percentage. A zero or absent total
/// means there was nothing to match against, which counts as fully met.
pub fn match_percentage(matched: Option<f64>, total: Option<f64>) -> String {
    match finite(total) {
        Some(total) if total > 0.0 => {
            let matched = finite(matched).unwrap_or(0.0);
            format!("{:.2}", matched / total * 100.0)
        }
        _ => "100.00".to_string(),
    }
}

fn format_count(value: Option<f64>) -> String {
    match finite(value) {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => format!("{}", v),
        None => "0".to_string(),
    }
}

impl ScoreView {
    fn from_result(result: &AnalysisResult) -> Self {
        let score = finite(result.score).filter(|s| *s != 0.0);
        let Some(score) = score else {
            return Self {
                display: SCORE_PLACEHOLDER.to_string(),
                value: None,
                label: None,
                band: None,
            };
        };

        let target = score.trunc().clamp(0.0, u32::MAX as f64) as u32;
        let label = result
            .match_level
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| {
                if target > 70 {
                    "Strong Match".to_string()
                } else {
                    "Match".to_string()
                }
            });
        let band = if target >= 75 {
            ScoreBand::Strong
        } else if target >= 50 {
            ScoreBand::Medium
        } else {
            ScoreBand::Weak
        };

        Self {
            display: format!("{}%", target),
            value: Some(target),
            label: Some(label),
            band: Some(band),
        }
    }
}

impl ResultsView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let matched = result.matched_skills.clone().unwrap_or_default();
        let missing = result.missing_skills.clone().unwrap_or_default();
        let matched_lower: HashSet<String> = matched.iter().map(|s| s.to_lowercase()).collect();

        let tag_list = |skills: &Option<Vec<String>>| -> (Vec<SkillTag>, Option<String>) {
            let skills = skills.as_deref().unwrap_or_default();
            if skills.is_empty() {
                return (Vec::new(), Some(NO_BREAKDOWN_SKILLS.to_string()));
            }
            let tags = skills
                .iter()
                .map(|s| SkillTag {
                    name: s.clone(),
                    matched: matched_lower.contains(&s.to_lowercase()),
                })
                .collect();
            (tags, None)
        };

        let ratio_row = |label: &'static str,
                         matched_count: Option<f64>,
                         total_count: Option<f64>,
                         skills: &Option<Vec<String>>| {
            let percentage = match_percentage(matched_count, total_count);
            let (skills, placeholder) = tag_list(skills);
            BreakdownRow {
                label,
                value: format!(
                    "{}/{} ({}%)",
                    format_count(matched_count),
                    format_count(total_count),
                    percentage
                ),
                meets_threshold: meets_threshold(&percentage),
                percentage,
                skills,
                placeholder,
            }
        };

        let education_pct = format!("{:.2}", finite(result.education_score).unwrap_or(0.0));
        let education_requirement = result
            .education_requirement
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| EDUCATION_UNSPECIFIED.to_string());

        let breakdown = vec![
            ratio_row(
                "Mandatory Skills",
                result.mandatory_matched_count,
                result.mandatory_total_count,
                &result.mandatory_skills,
            ),
            ratio_row(
                "Preferred Skills",
                result.preferred_matched_count,
                result.preferred_total_count,
                &result.preferred_skills,
            ),
            BreakdownRow {
                label: "Education Match (15%)",
                value: format!("{}%", education_pct),
                meets_threshold: meets_threshold(&education_pct),
                percentage: education_pct,
                skills: Vec::new(),
                placeholder: Some(format!("Requirement: {}", education_requirement)),
            },
            ratio_row(
                "Overall Coverage",
                result.overall_matched_count,
                result.overall_total_count,
                &result.jd_skills,
            ),
        ];

        let pillar = |label: &'static str, text: &Option<String>| Pillar {
            label,
            text: text
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| PILLAR_PENDING.to_string()),
        };

        Self {
            score: ScoreView::from_result(result),
            matched_skills: ListSection::from_items(&matched, NO_MATCHED_SKILLS),
            missing_skills: ListSection::from_items(&missing, NO_MISSING_SKILLS),
            breakdown,
            pillars: vec![
                pillar("Overall Summary", &result.summary),
                pillar("Top Strength", &result.strength),
                pillar("Critical Gap", &result.improvement_area),
                pillar("Career Goal", &result.recommendation),
            ],
            resume_tips: ListSection::from_items(result.resume_tips(), NO_RESUME_TIPS),
            skill_tips: ListSection::from_items(result.skill_tips(), NO_SKILL_TIPS),
        }
    }
}

fn meets_threshold(percentage: &str) -> bool {
    percentage
        .parse::<f64>()
        .map(|p| p >= THRESHOLD_PCT)
        .unwrap_or(false)
}

// ===== Plain-text rendering =====

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, section: &ListSection) -> fmt::Result {
    writeln!(f, "{}:", title)?;
    match section {
        ListSection::Items(items) => {
            for item in items {
                writeln!(f, "  - {}", item)?;
            }
        }
        ListSection::Placeholder(text) => writeln!(f, "  {}", text)?,
    }
    Ok(())
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.score.label, self.score.band) {
            (Some(label), Some(band)) => {
                writeln!(f, "Score: {} ({}, {:?})", self.score.display, label, band)?
            }
            _ => writeln!(f, "Score: {}", self.score.display)?,
        }
        writeln!(f)?;

        write_section(f, "Matched skills", &self.matched_skills)?;
        write_section(f, "Missing skills", &self.missing_skills)?;
        writeln!(f)?;

        writeln!(f, "Job Match Breakdown")?;
        for row in &self.breakdown {
            let marker = if row.meets_threshold { "+" } else { "!" };
            writeln!(f, "  [{}] {}: {}", marker, row.label, row.value)?;
            if let Some(placeholder) = &row.placeholder {
                writeln!(f, "      {}", placeholder)?;
            } else {
                let tags: Vec<String> = row
                    .skills
                    .iter()
                    .map(|t| {
                        if t.matched {
                            format!("{} ✓", t.name)
                        } else {
                            format!("{} ✗", t.name)
                        }
                    })
                    .collect();
                writeln!(f, "      {}", tags.join(", "))?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Strategic Analysis")?;
        for pillar in &self.pillars {
            writeln!(f, "  {}: {}", pillar.label, pillar.text)?;
        }
        writeln!(f)?;

        write_section(f, "Resume tips", &self.resume_tips)?;
        write_section(f, "Skill recommendations", &self.skill_tips)
    }
}

impl fmt::Display for ResultsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultsPage::NoData => writeln!(f, "{}", NO_DATA_MESSAGE),
            ResultsPage::Loaded(view) => write!(f, "{}", view),
        }
    }
}
