//! Candidate profile extraction.
//!
//! The model is asked for a loose JSON document; everything it returns is
//! validated, clamped and back-filled here before the rest of the service sees it.
//! Extraction never fails the request: on any problem a default profile carrying
//! an `error` reason is returned instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;
use crate::resume::prompts::PROFILE_PROMPT_TEMPLATE;

const MAX_TARGET_ROLES: usize = 10;
const MAX_SKILLS: usize = 50;
const MAX_LOCATIONS: usize = 10;
const MAX_INDUSTRIES: usize = 10;
const MAX_KEYWORDS: usize = 20;
const MAX_CERTIFICATIONS: usize = 20;
const MAX_LANGUAGES: usize = 10;
const MAX_SOFT_SKILLS: usize = 15;
const MAX_EXPERIENCE_MONTHS: f64 = 600.0;
const MAX_INFERRED_ROLES: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Student,
    Intern,
    #[default]
    Junior,
    Mid,
    Senior,
    Executive,
}

impl ExperienceLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Some(Self::Student),
            "intern" => Some(Self::Intern),
            "junior" => Some(Self::Junior),
            "mid" => Some(Self::Mid),
            "senior" => Some(Self::Senior),
            "executive" => Some(Self::Executive),
            _ => None,
        }
    }

    /// Typical months of experience for a level, used when the résumé gives none.
    pub fn typical_months(self) -> u32 {
        match self {
            Self::Student => 0,
            Self::Intern => 6,
            Self::Junior => 24,
            Self::Mid => 60,
            Self::Senior => 120,
            Self::Executive => 180,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Intern => "Intern",
            Self::Junior => "Junior",
            Self::Mid => "Mid",
            Self::Senior => "Senior",
            Self::Executive => "Executive",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Associate,
    #[default]
    Bachelor,
    Master,
    Phd,
}

impl EducationLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "high_school" => Some(Self::HighSchool),
            "associate" => Some(Self::Associate),
            "bachelor" => Some(Self::Bachelor),
            "master" => Some(Self::Master),
            "phd" => Some(Self::Phd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryExpectation {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub target_roles: Vec<String>,
    pub skills: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub total_experience_months: u32,
    pub education_level: EducationLevel,
    pub locations: Vec<String>,
    pub remote_preference: bool,
    pub industries: Vec<String>,
    pub keywords: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub soft_skills: Vec<String>,
    pub salary_expectation: Option<SalaryExpectation>,
    /// Set when extraction fell back to defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CandidateProfile {
    /// Fallback profile used whenever extraction cannot produce a real one.
    pub fn fallback(reason: &str) -> Self {
        Self {
            target_roles: vec![],
            skills: vec![],
            experience_level: ExperienceLevel::Junior,
            total_experience_months: 0,
            education_level: EducationLevel::Bachelor,
            locations: vec![],
            remote_preference: false,
            industries: vec![],
            keywords: vec![],
            certifications: vec![],
            languages: vec!["English".to_string()],
            soft_skills: vec![],
            salary_expectation: None,
            error: Some(format!("Profile extraction failed: {reason}")),
        }
    }
}

/// Asks the LLM for a profile and post-processes it.
pub async fn extract_candidate_profile(resume_text: &str, llm: &LlmClient) -> CandidateProfile {
    if resume_text.trim().is_empty() {
        warn!("Empty resume text provided");
        return CandidateProfile::fallback("Empty resume text");
    }

    let prompt = PROFILE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);
    info!("Sending profile extraction request to Gemini");

    let raw: Value = match llm.call_json(&prompt, JSON_ONLY_SYSTEM).await {
        Ok(v) => v,
        Err(crate::llm_client::LlmError::Parse(e)) => {
            warn!("Failed to parse JSON response: {e}");
            return CandidateProfile::fallback("JSON parsing error");
        }
        Err(e) => {
            warn!("Profile extraction failed: {e}");
            return CandidateProfile::fallback(&format!("Extraction error: {e}"));
        }
    };

    let profile = build_profile(&raw);
    info!(
        "Successfully extracted profile with {} skills",
        profile.skills.len()
    );
    profile
}

/// Validates, infers and normalizes a raw model response into a profile.
pub fn build_profile(raw: &Value) -> CandidateProfile {
    let mut profile = validate_profile(raw);
    infer_missing_data(&mut profile);
    profile.skills = normalize_skills(&profile.skills);
    profile
}

fn validate_profile(raw: &Value) -> CandidateProfile {
    let experience_level = raw
        .get("experience_level")
        .and_then(Value::as_str)
        .and_then(ExperienceLevel::parse)
        .unwrap_or_default();

    let total_experience_months = raw
        .get("total_experience_months")
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
        .clamp(0.0, MAX_EXPERIENCE_MONTHS) as u32;

    let education_level = raw
        .get("education_level")
        .and_then(Value::as_str)
        .and_then(EducationLevel::parse)
        .unwrap_or_default();

    let salary_expectation = raw
        .get("salary_expectation")
        .and_then(Value::as_object)
        .filter(|obj| !obj.is_empty())
        .map(|obj| SalaryExpectation {
            min: obj.get("min").and_then(Value::as_f64),
            max: obj.get("max").and_then(Value::as_f64),
            currency: obj
                .get("currency")
                .and_then(Value::as_str)
                .unwrap_or("USD")
                .to_string(),
        });

    CandidateProfile {
        target_roles: string_list(raw, "target_roles", MAX_TARGET_ROLES),
        skills: string_list(raw, "skills", MAX_SKILLS),
        experience_level,
        total_experience_months,
        education_level,
        locations: string_list(raw, "locations", MAX_LOCATIONS),
        remote_preference: raw
            .get("remote_preference")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        industries: string_list(raw, "industries", MAX_INDUSTRIES),
        keywords: string_list(raw, "keywords", MAX_KEYWORDS),
        certifications: string_list(raw, "certifications", MAX_CERTIFICATIONS),
        languages: string_list(raw, "languages", MAX_LANGUAGES),
        soft_skills: string_list(raw, "soft_skills", MAX_SOFT_SKILLS),
        salary_expectation,
        error: None,
    }
}

fn string_list(raw: &Value, key: &str, limit: usize) -> Vec<String> {
    raw.get(key)
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn infer_missing_data(profile: &mut CandidateProfile) {
    if profile.target_roles.is_empty() && !profile.skills.is_empty() {
        profile.target_roles = infer_roles_from_skills(&profile.skills);
    }

    if profile.total_experience_months == 0 {
        profile.total_experience_months = profile.experience_level.typical_months();
    }

    if profile.keywords.is_empty() {
        let mut keywords: Vec<String> = Vec::new();
        for kw in profile.skills.iter().take(10).chain(profile.target_roles.iter()) {
            if !keywords.contains(kw) {
                keywords.push(kw.clone());
            }
        }
        profile.keywords = keywords;
    }
}

const ROLE_INDICATORS: &[(&str, &[&str])] = &[
    ("Software Engineer", &["python", "java", "javascript", "c++", "programming"]),
    ("Data Scientist", &["python", "machine learning", "tensorflow", "pandas", "statistics"]),
    ("Web Developer", &["html", "css", "javascript", "react", "angular", "node.js"]),
    ("Mobile Developer", &["android", "ios", "react native", "flutter", "kotlin", "swift"]),
    ("Devops Engineer", &["docker", "kubernetes", "aws", "jenkins", "terraform"]),
    ("Data Analyst", &["sql", "excel", "tableau", "power bi", "python", "r"]),
    ("Product Manager", &["product management", "agile", "scrum", "roadmap"]),
    ("Project Manager", &["project management", "pmp", "scrum", "agile"]),
];

/// Roles with at least two indicator skills present, at most five.
pub fn infer_roles_from_skills(skills: &[String]) -> Vec<String> {
    let skill_set: Vec<String> = skills.iter().map(|s| s.trim().to_lowercase()).collect();
    ROLE_INDICATORS
        .iter()
        .filter(|(_, indicators)| {
            indicators
                .iter()
                .filter(|ind| skill_set.iter().any(|s| s == *ind))
                .count()
                >= 2
        })
        .map(|(role, _)| role.to_string())
        .take(MAX_INFERRED_ROLES)
        .collect()
}

pub fn normalize_skill(skill: &str) -> String {
    let lower = skill.trim().to_lowercase();
    let normalized = match lower.as_str() {
        "js" => "javascript",
        "ts" => "typescript",
        "py" => "python",
        "ml" => "machine learning",
        "ai" => "artificial intelligence",
        "db" => "database",
        "html5" => "html",
        "css3" => "css",
        "reactjs" => "react",
        "nodejs" => "node.js",
        "vuejs" => "vue",
        "angularjs" => "angular",
        other => other,
    };
    normalized.to_string()
}

/// Lowercases, aliases and deduplicates skills; drops one-character entries.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        if skill.trim().chars().count() < 2 {
            continue;
        }
        let normalized = normalize_skill(skill);
        if !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

const SKILL_CATEGORIES: &[(&str, &[&str])] = &[
    ("programming", &["python", "java", "javascript", "c++", "c#", "go", "rust", "kotlin", "swift", "php", "ruby", "scala", "r", "matlab", "typescript"]),
    ("web", &["html", "css", "react", "angular", "vue", "node.js", "express", "django", "flask", "spring", "laravel", "bootstrap"]),
    ("mobile", &["android", "ios", "react native", "flutter", "xamarin", "ionic"]),
    ("database", &["sql", "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "cassandra", "oracle", "sqlite"]),
    ("cloud", &["aws", "azure", "gcp", "docker", "kubernetes", "terraform", "ansible", "jenkins", "circleci"]),
    ("data_science", &["machine learning", "deep learning", "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy", "matplotlib", "seaborn", "jupyter", "tableau", "power bi"]),
    ("soft_skills", &["leadership", "communication", "teamwork", "project management", "problem solving", "analytical thinking", "creativity", "adaptability"]),
];

/// Groups skills by category; anything unknown lands in `other`.
pub fn categorize_skills(skills: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut categories: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for skill in skills {
        let lower = skill.to_lowercase();
        let category = SKILL_CATEGORIES
            .iter()
            .find(|(_, members)| members.contains(&lower.as_str()))
            .map(|(name, _)| *name)
            .unwrap_or("other");
        categories
            .entry(category.to_string())
            .or_default()
            .push(skill.clone());
    }
    categories
}

/// One-line readable summary of a profile.
pub fn profile_summary(profile: &CandidateProfile) -> String {
    if let Some(error) = &profile.error {
        return error.clone();
    }

    let mut parts = Vec::new();

    let mut experience = format!("Experience: {} level", profile.experience_level.title());
    if profile.total_experience_months > 0 {
        experience.push_str(&format!(
            " ({:.1} years)",
            profile.total_experience_months as f64 / 12.0
        ));
    }
    parts.push(experience);

    if !profile.skills.is_empty() {
        let top: Vec<&str> = profile.skills.iter().take(5).map(String::as_str).collect();
        parts.push(format!("Top Skills: {}", top.join(", ")));
    }

    if !profile.target_roles.is_empty() {
        let roles: Vec<&str> = profile.target_roles.iter().take(3).map(String::as_str).collect();
        parts.push(format!("Target Roles: {}", roles.join(", ")));
    }

    let location = if profile.remote_preference {
        "Remote preferred".to_string()
    } else {
        profile
            .locations
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !location.is_empty() {
        parts.push(format!("Location: {location}"));
    }

    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_invalid_enums_fall_back_to_defaults() {
        let profile = build_profile(&json!({
            "experience_level": "wizard",
            "education_level": "bootcamp"
        }));
        assert_eq!(profile.experience_level, ExperienceLevel::Junior);
        assert_eq!(profile.education_level, EducationLevel::Bachelor);
    }

    #[test]
    fn test_experience_months_clamped() {
        let profile = build_profile(&json!({"total_experience_months": 9000}));
        assert_eq!(profile.total_experience_months, 600);
        let profile = build_profile(&json!({"total_experience_months": -5}));
        // negative clamps to zero, then gets back-filled from the level
        assert_eq!(profile.total_experience_months, 24);
    }

    #[test]
    fn test_months_inferred_from_level() {
        let profile = build_profile(&json!({"experience_level": "senior"}));
        assert_eq!(profile.total_experience_months, 120);
    }

    #[test]
    fn test_list_limits_applied() {
        let skills: Vec<String> = (0..80).map(|i| format!("skill{i}")).collect();
        let roles: Vec<String> = (0..15).map(|i| format!("role{i}")).collect();
        let profile = build_profile(&json!({"skills": skills, "target_roles": roles}));
        assert_eq!(profile.skills.len(), 50);
        assert_eq!(profile.target_roles.len(), 10);
    }

    #[test]
    fn test_roles_inferred_when_missing() {
        let profile = build_profile(&json!({
            "skills": ["Docker", "Kubernetes", "AWS", "HTML", "CSS"]
        }));
        assert_eq!(profile.target_roles, strings(&["Web Developer", "Devops Engineer"]));
    }

    #[test]
    fn test_single_indicator_does_not_infer_role() {
        assert!(infer_roles_from_skills(&strings(&["docker"])).is_empty());
    }

    #[test]
    fn test_keywords_inferred_from_skills_and_roles() {
        let profile = build_profile(&json!({
            "skills": ["Rust"],
            "target_roles": ["Backend Engineer"]
        }));
        assert_eq!(profile.keywords, strings(&["Rust", "Backend Engineer"]));
    }

    #[test]
    fn test_skills_normalized_and_deduplicated() {
        let out = normalize_skills(&strings(&["JS", "javascript", "ReactJS", "C", " Py "]));
        assert_eq!(out, strings(&["javascript", "react", "python"]));
    }

    #[test]
    fn test_salary_expectation_defaults_currency() {
        let profile = build_profile(&json!({"salary_expectation": {"min": 90000, "max": 120000}}));
        let salary = profile.salary_expectation.unwrap();
        assert_eq!(salary.min, Some(90000.0));
        assert_eq!(salary.currency, "USD");

        let profile = build_profile(&json!({"salary_expectation": {}}));
        assert!(profile.salary_expectation.is_none());
    }

    #[test]
    fn test_categorize_skills() {
        let categories = categorize_skills(&strings(&["python", "docker", "react", "cobol"]));
        assert_eq!(categories["programming"], strings(&["python"]));
        assert_eq!(categories["cloud"], strings(&["docker"]));
        assert_eq!(categories["web"], strings(&["react"]));
        assert_eq!(categories["other"], strings(&["cobol"]));
    }

    #[test]
    fn test_profile_summary() {
        let profile = build_profile(&json!({
            "experience_level": "mid",
            "skills": ["rust", "go"],
            "target_roles": ["Backend Engineer"],
            "locations": ["Berlin", "Paris", "Madrid"]
        }));
        assert_eq!(
            profile_summary(&profile),
            "Experience: Mid level (5.0 years) | Top Skills: rust, go | \
             Target Roles: Backend Engineer | Location: Berlin, Paris"
        );
    }

    #[test]
    fn test_summary_of_fallback_is_error_line() {
        let profile = CandidateProfile::fallback("Empty resume text");
        assert_eq!(
            profile_summary(&profile),
            "Profile extraction failed: Empty resume text"
        );
        assert_eq!(profile.languages, strings(&["English"]));
    }

    #[tokio::test]
    async fn test_extraction_failure_returns_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{"text": "{\"skills\": [oops]}"}]}}]
                }));
            })
            .await;
        let llm = LlmClient::new("k".to_string(), Duration::from_secs(5), 1)
            .unwrap()
            .with_base_url(server.base_url());

        let profile = extract_candidate_profile("Rust engineer", &llm).await;
        assert_eq!(
            profile.error.as_deref(),
            Some("Profile extraction failed: JSON parsing error")
        );
    }

    #[tokio::test]
    async fn test_extraction_success_post_processes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({
                    "candidates": [{"content": {"parts": [{
                        "text": "```json\n{\"skills\": [\"JS\", \"HTML\", \"CSS\"], \"experience_level\": \"mid\"}\n```"
                    }]}}]
                }));
            })
            .await;
        let llm = LlmClient::new("k".to_string(), Duration::from_secs(5), 1)
            .unwrap()
            .with_base_url(server.base_url());

        let profile = extract_candidate_profile("Frontend dev", &llm).await;
        assert!(profile.error.is_none());
        assert_eq!(profile.skills, strings(&["javascript", "html", "css"]));
        assert_eq!(profile.target_roles, strings(&["Web Developer"]));
        assert_eq!(profile.total_experience_months, 60);
    }
}
