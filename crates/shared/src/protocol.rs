use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::{AnalysisId, GapImportance, ResumeId};

/// Accepts RFC 3339 timestamps as well as naive ISO-8601 ones (read as UTC).
/// Anything else decodes as `None` rather than failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Treats `null` the same as a missing field for collections.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: ResumeId,
    #[serde(default)]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub id: ResumeId,
    #[serde(default)]
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<Value>,
}

impl From<Resume> for ResumeSummary {
    fn from(value: Resume) -> Self {
        Self {
            id: value.id,
            filename: value.filename,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub resume_id: ResumeId,
    pub job_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
}

/// The part of the creation response the client relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisCreated {
    pub id: AnalysisId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillGap {
    #[serde(default)]
    pub skill: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub importance: GapImportance,
    #[serde(default)]
    pub current_level: Option<String>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub id: AnalysisId,
    #[serde(default)]
    pub resume_id: Option<ResumeId>,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skill_gaps: Vec<SkillGap>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub cold_email: Option<String>,
    #[serde(default)]
    pub linkedin_dm: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interview_questions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub id: AnalysisId,
    #[serde(default)]
    pub resume_id: Option<ResumeId>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}
