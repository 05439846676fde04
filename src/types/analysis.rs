// src/types/analysis.rs
//! Payloads exchanged with the remote `analyze-cv` function.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvocationError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCvRequest {
    pub file_url: String,
}

/// Raw function reply. `analysis` is model output that should contain JSON.
#[derive(Debug, Deserialize)]
pub struct AnalyzeCvResponse {
    pub analysis: Option<String>,
    pub error: Option<String>,
}

/// Structured view of a CV analysis. Every section is optional; entries are
/// kept as raw JSON because the model returns either strings or objects.
/// A section sent as a single object or string is turned into a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvAnalysis {
    #[serde(default, deserialize_with = "section", alias = "formation")]
    pub education: Option<Vec<Value>>,
    #[serde(
        default,
        deserialize_with = "section",
        alias = "experience_professionnelle",
        alias = "expérience_professionnelle",
        alias = "expérience professionnelle",
        alias = "professional_experience",
        alias = "work_experience"
    )]
    pub experience: Option<Vec<Value>>,
    #[serde(
        default,
        deserialize_with = "section",
        alias = "competences_techniques",
        alias = "compétences_techniques",
        alias = "compétences techniques",
        alias = "technicalSkills",
        alias = "skills"
    )]
    pub technical_skills: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "section", alias = "langues")]
    pub languages: Option<Vec<Value>>,
}

fn section<'de, D>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Array(items) => Some(items),
        // {"Français": "natif", "Anglais": "courant"} -> one entry per key
        Value::Object(map) => Some(
            map.into_iter()
                .map(|(key, value)| {
                    let mut entry = serde_json::Map::new();
                    entry.insert(key, value);
                    Value::Object(entry)
                })
                .collect(),
        ),
        other => Some(vec![other]),
    })
}

impl CvAnalysis {
    /// Parse model output, tolerating a surrounding ```json fence.
    pub fn parse(raw: &str) -> Result<Self, InvocationError> {
        let body = strip_code_fence(raw);
        serde_json::from_str(body).map_err(|e| InvocationError::MalformedAnalysis(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.education.is_none()
            && self.experience.is_none()
            && self.technical_skills.is_none()
            && self.languages.is_none()
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
