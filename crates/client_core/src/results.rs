//! Presentation model for a finished analysis.
//!
//! Every field coming back from the service may be missing; this module turns
//! an [`Analysis`] into display-ready values with neutral placeholders instead
//! of failing.

use shared::{
    domain::{GapImportance, ScoreBand},
    protocol::{Analysis, AnalysisSummary, SkillGap},
};

pub const NO_GAPS_TEXT: &str = "Perfect match! No critical gaps found.";
pub const NO_EMAIL_TEXT: &str =
    "No email generated (likely due to AI constraints). Try regenerating.";
pub const NO_DM_TEXT: &str = "No message generated.";
pub const NO_SUGGESTIONS_TEXT: &str = "No specific improvements found.";
pub const NO_RECOMMENDATION_TEXT: &str = "No recommendation provided.";
pub const UNNAMED_SKILL_TEXT: &str = "Unnamed skill";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTab {
    #[default]
    Email,
    LinkedIn,
    Strategy,
}

impl ContentTab {
    pub const ALL: [ContentTab; 3] = [ContentTab::Email, ContentTab::LinkedIn, ContentTab::Strategy];

    pub fn title(self) -> &'static str {
        match self {
            ContentTab::Email => "Cold Email",
            ContentTab::LinkedIn => "LinkedIn Message",
            ContentTab::Strategy => "Improvement Strategy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    pub value: f64,
    pub band: ScoreBand,
}

impl ScoreView {
    pub fn new(raw: Option<f64>) -> Self {
        let value = raw
            .filter(|score| score.is_finite())
            .unwrap_or(0.0)
            .clamp(0.0, 100.0);
        Self {
            value,
            band: ScoreBand::from_score(value),
        }
    }

    pub fn display(&self) -> String {
        format!("{:.0}%", self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapView {
    pub skill: String,
    pub importance: GapImportance,
    pub recommendation: String,
}

impl From<&SkillGap> for GapView {
    fn from(gap: &SkillGap) -> Self {
        let skill = gap.skill.trim();
        Self {
            skill: if skill.is_empty() {
                UNNAMED_SKILL_TEXT.to_string()
            } else {
                skill.to_string()
            },
            importance: gap.importance,
            recommendation: non_blank(gap.recommendation.as_deref())
                .unwrap_or(NO_RECOMMENDATION_TEXT)
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub score: ScoreView,
    pub gaps: Vec<GapView>,
    cold_email: Option<String>,
    linkedin_dm: Option<String>,
    suggestions: Vec<String>,
    interview_questions: Vec<String>,
}

impl From<&Analysis> for AnalysisView {
    fn from(analysis: &Analysis) -> Self {
        Self {
            score: ScoreView::new(analysis.match_score),
            gaps: analysis.skill_gaps.iter().map(GapView::from).collect(),
            cold_email: non_blank(analysis.cold_email.as_deref()).map(str::to_string),
            linkedin_dm: non_blank(analysis.linkedin_dm.as_deref()).map(str::to_string),
            suggestions: non_blank_items(&analysis.suggestions),
            interview_questions: non_blank_items(&analysis.interview_questions),
        }
    }
}

impl AnalysisView {
    /// Placeholder line shown when the gap list is empty.
    pub fn gaps_placeholder(&self) -> Option<&'static str> {
        self.gaps.is_empty().then_some(NO_GAPS_TEXT)
    }

    pub fn email(&self) -> &str {
        self.cold_email.as_deref().unwrap_or(NO_EMAIL_TEXT)
    }

    pub fn linkedin(&self) -> &str {
        self.linkedin_dm.as_deref().unwrap_or(NO_DM_TEXT)
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Questions are only listed when the service produced some.
    pub fn interview_questions(&self) -> &[String] {
        &self.interview_questions
    }

    /// Lines rendered under a tab, placeholders included.
    pub fn tab_lines(&self, tab: ContentTab) -> Vec<String> {
        match tab {
            ContentTab::Email => self.email().lines().map(str::to_string).collect(),
            ContentTab::LinkedIn => self.linkedin().lines().map(str::to_string).collect(),
            ContentTab::Strategy => {
                let mut lines = vec!["Resume Improvements".to_string()];
                if self.suggestions.is_empty() {
                    lines.push(format!("  - {NO_SUGGESTIONS_TEXT}"));
                } else {
                    lines.extend(self.suggestions.iter().map(|s| format!("  - {s}")));
                }
                if !self.interview_questions.is_empty() {
                    lines.push(String::new());
                    lines.push("Interview Prep".to_string());
                    lines.extend(self.interview_questions.iter().map(|q| format!("  - {q}")));
                }
                lines
            }
        }
    }

    /// Raw text for copying out of a tab; empty when nothing was generated.
    ///
    /// Strategy copies the same non-blank suggestions the tab shows, one per line.
    pub fn copy_text(&self, tab: ContentTab) -> String {
        match tab {
            ContentTab::Email => self.cold_email.clone().unwrap_or_default(),
            ContentTab::LinkedIn => self.linkedin_dm.clone().unwrap_or_default(),
            ContentTab::Strategy => self.suggestions.join("\n"),
        }
    }
}

/// One row of the analysis history list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub id: String,
    pub score: ScoreView,
    pub created: String,
}

impl From<&AnalysisSummary> for HistoryRow {
    fn from(summary: &AnalysisSummary) -> Self {
        Self {
            id: summary.id.to_string(),
            score: ScoreView::new(summary.match_score),
            created: summary
                .created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unknown date".to_string()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn non_blank_items(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
