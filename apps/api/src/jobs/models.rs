use serde::{Deserialize, Serialize};

/// Descriptions are cut to this many characters when a posting is ingested.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;
/// Descriptions in summaries sent to clients are cut further.
pub const SUMMARY_DESCRIPTION_CHARS: usize = 500;

/// A job posting normalized across providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub apply_url: Option<String>,
    pub source: String,
    pub date_posted: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
}

/// Client-facing view of a posting.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub salary: Option<(Option<f64>, Option<f64>)>,
    pub apply_url: Option<String>,
    pub source: String,
    pub date_posted: Option<String>,
    pub job_type: Option<String>,
    pub experience_level: Option<String>,
}

impl JobPosting {
    /// Lowercased title, description and company joined for text matching.
    pub fn match_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.company).to_lowercase()
    }

    /// Identity used for de-duplication across providers.
    pub fn dedup_key(&self) -> (String, String) {
        (
            self.title.trim().to_lowercase(),
            self.company.trim().to_lowercase(),
        )
    }

    pub fn summary(&self) -> JobSummary {
        let description = if self.description.chars().count() > SUMMARY_DESCRIPTION_CHARS {
            format!("{}...", truncate_chars(&self.description, SUMMARY_DESCRIPTION_CHARS))
        } else {
            self.description.clone()
        };

        let salary = if self.salary_min.is_some() || self.salary_max.is_some() {
            Some((self.salary_min, self.salary_max))
        } else {
            None
        };

        JobSummary {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            description,
            salary,
            apply_url: self.apply_url.clone(),
            source: self.source.clone(),
            date_posted: self.date_posted.clone(),
            job_type: self.job_type.clone(),
            experience_level: self.experience_level.clone(),
        }
    }
}

/// Cuts `s` to at most `max` characters without splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
