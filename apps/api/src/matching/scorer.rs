//! Job scoring: weighted multi-factor match between a candidate and a posting.
//!
//! Default: `WeightedJobScorer` (pure-Rust, deterministic, no network).
//! `AppState` holds an `Arc<dyn JobScorer>` so the backend can be swapped at startup.
//!
//! Algorithm:
//! 1. Extract eight sub-scores (skills, keywords, title, location, experience,
//!    industry, salary, remote) from the job text and the profile.
//! 2. Normalize skills by 10 and keywords by 5, each capped at 1.0.
//! 3. composite = Σ(weight × sub-score), clamped to [0, 1]. Weights sum to 1.0.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::jobs::models::{JobPosting, JobSummary};
use crate::matching::text::{extract_skills, jaccard_similarity};
use crate::resume::profile::{CandidateProfile, ExperienceLevel};

const SKILL_NORMALIZER: f64 = 10.0;
const KEYWORD_NORMALIZER: f64 = 5.0;
const DEFAULT_PROFICIENCY: f64 = 0.5;

const REMOTE_INDICATORS: &[&str] = &["remote", "work from home", "wfh", "telecommute", "distributed"];
/// Checked in this order; the first one present decides the job's level.
const JOB_LEVEL_INDICATORS: &[&str] = &[
    "junior",
    "senior",
    "lead",
    "manager",
    "director",
    "entry",
    "experienced",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchWeights {
    pub skills: f64,
    pub keywords: f64,
    pub title: f64,
    pub location: f64,
    pub experience: f64,
    pub industry: f64,
    pub salary: f64,
    pub remote: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            skills: 0.25,
            keywords: 0.15,
            title: 0.20,
            location: 0.10,
            experience: 0.15,
            industry: 0.05,
            salary: 0.05,
            remote: 0.05,
        }
    }
}

/// Candidate data in the shape the scorer needs.
#[derive(Debug, Clone, Default)]
pub struct MatchProfile {
    pub skills: Vec<String>,
    pub keywords: Vec<String>,
    pub target_roles: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub industries: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub remote_preference: bool,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    /// skill (lowercase) → proficiency in [0, 1]
    pub skill_proficiency: HashMap<String, f64>,
}

impl MatchProfile {
    pub fn from_candidate(profile: &CandidateProfile) -> Self {
        let (salary_min, salary_max) = profile
            .salary_expectation
            .as_ref()
            .map(|s| (s.min, s.max))
            .unwrap_or((None, None));

        Self {
            skills: profile.skills.clone(),
            keywords: profile.keywords.clone(),
            target_roles: profile.target_roles.clone(),
            experience_level: profile.experience_level,
            industries: profile.industries.clone(),
            preferred_locations: profile.locations.clone(),
            remote_preference: profile.remote_preference,
            salary_min,
            salary_max,
            skill_proficiency: HashMap::new(),
        }
    }

    /// Per-skill proficiency; keys are lowercased and values clamped to [0, 1].
    /// Skills without an entry count as 0.5 once any proficiency is set.
    pub fn with_proficiency(mut self, proficiency: &HashMap<String, f64>) -> Self {
        self.skill_proficiency = proficiency
            .iter()
            .filter(|(_, level)| level.is_finite())
            .map(|(skill, level)| (skill.trim().to_lowercase(), level.clamp(0.0, 1.0)))
            .collect();
        self
    }

    /// Text used for the informational token-overlap score.
    fn text(&self) -> String {
        self.skills
            .iter()
            .chain(&self.keywords)
            .chain(&self.target_roles)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchingFeatures {
    /// Matched skill count, or summed proficiency when proficiencies are known.
    pub skill_matches: f64,
    pub matched_skills: Vec<String>,
    pub keyword_matches: usize,
    pub title_relevance: f64,
    pub location_match: f64,
    pub experience_match: f64,
    pub industry_match: f64,
    pub salary_compatibility: f64,
    pub remote_preference: f64,
    /// Token overlap between profile and job; reported, not weighted.
    pub text_similarity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    /// Match percentage, 0 – 100.
    pub score: f64,
    pub job: JobSummary,
    pub features: MatchingFeatures,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    pub top_score: f64,
    pub average_score: f64,
    pub total_matches: usize,
}

/// The job scorer trait. Implement this to swap backends without touching handlers.
pub trait JobScorer: Send + Sync {
    /// Returns the composite score in [0, 1] together with the sub-scores.
    fn score(&self, job: &JobPosting, profile: &MatchProfile) -> (f64, MatchingFeatures);

    fn backend(&self) -> &'static str;
}

#[derive(Debug, Clone, Default)]
pub struct WeightedJobScorer {
    pub weights: MatchWeights,
}

impl JobScorer for WeightedJobScorer {
    fn score(&self, job: &JobPosting, profile: &MatchProfile) -> (f64, MatchingFeatures) {
        let features = extract_features(job, profile);
        let score = composite_score(&features, &self.weights);
        debug!("Job '{}' scored {:.3}", job.title, score);
        (score, features)
    }

    fn backend(&self) -> &'static str {
        "weighted"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobLevel {
    Junior,
    Mid,
    Senior,
    Executive,
}

fn infer_job_level(job_text: &str) -> JobLevel {
    let indicator = JOB_LEVEL_INDICATORS
        .iter()
        .find(|kw| job_text.contains(*kw));
    match indicator.copied() {
        Some("junior" | "entry") => JobLevel::Junior,
        Some("senior" | "lead") => JobLevel::Senior,
        Some("manager" | "director") => JobLevel::Executive,
        _ => JobLevel::Mid,
    }
}

fn experience_compatibility(candidate: ExperienceLevel, job: JobLevel) -> f64 {
    use ExperienceLevel as C;
    match (candidate, job) {
        (C::Junior, JobLevel::Junior) => 1.0,
        (C::Junior, JobLevel::Mid) => 0.8,
        (C::Mid, JobLevel::Junior) => 0.6,
        (C::Mid, JobLevel::Mid) => 1.0,
        (C::Mid, JobLevel::Senior) => 0.8,
        (C::Senior, JobLevel::Mid) => 0.9,
        (C::Senior, JobLevel::Senior) => 1.0,
        (C::Senior, JobLevel::Executive) => 0.7,
        (C::Executive, JobLevel::Senior) => 0.8,
        (C::Executive, JobLevel::Executive) => 1.0,
        _ => 0.5,
    }
}

fn fraction_contained(needles: &[String], haystack: &str) -> f64 {
    if needles.is_empty() {
        return 0.0;
    }
    let hits = needles
        .iter()
        .filter(|n| {
            let n = n.trim().to_lowercase();
            !n.is_empty() && haystack.contains(&n)
        })
        .count();
    (hits as f64 / needles.len() as f64).min(1.0)
}

fn salary_compatibility(job: &JobPosting, profile: &MatchProfile) -> f64 {
    let bounds = (
        job.salary_min.filter(|v| *v > 0.0),
        job.salary_max.filter(|v| *v > 0.0),
        profile.salary_min.filter(|v| *v > 0.0),
        profile.salary_max.filter(|v| *v > 0.0),
    );
    let (Some(job_min), Some(job_max), Some(want_min), Some(want_max)) = bounds else {
        return 0.5;
    };

    if job_min.max(want_min) <= job_max.min(want_max) {
        return 1.0;
    }
    let gap = (job_max - want_min).abs().min((want_max - job_min).abs());
    let ceiling = job_max.max(want_max);
    (1.0 - gap / ceiling).max(0.0)
}

pub fn extract_features(job: &JobPosting, profile: &MatchProfile) -> MatchingFeatures {
    let job_text = job.match_text();
    let job_title = job.title.to_lowercase();
    let job_location = job.location.to_lowercase();

    // 1. skills
    let profile_skills: Vec<String> = profile.skills.iter().map(|s| s.to_lowercase()).collect();
    let matched_skills: Vec<String> = extract_skills(&job_text)
        .into_iter()
        .filter(|skill| profile_skills.iter().any(|p| p == skill))
        .map(String::from)
        .collect();
    let skill_matches = if profile.skill_proficiency.is_empty() {
        matched_skills.len() as f64
    } else {
        matched_skills
            .iter()
            .map(|s| {
                profile
                    .skill_proficiency
                    .get(s)
                    .copied()
                    .unwrap_or(DEFAULT_PROFICIENCY)
            })
            .sum()
    };

    // 2. keywords
    let keyword_matches = profile
        .keywords
        .iter()
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty() && job_text.contains(kw.as_str()))
        .count();

    // 3. title
    let title_hits = profile
        .target_roles
        .iter()
        .filter(|role| {
            let role = role.trim().to_lowercase();
            !role.is_empty() && job_title.contains(&role)
        })
        .count();
    let title_relevance = (title_hits as f64 / profile.target_roles.len().max(1) as f64).min(1.0);

    // 4. location
    let location_match = fraction_contained(&profile.preferred_locations, &job_location);

    // 5. experience
    let experience_match =
        experience_compatibility(profile.experience_level, infer_job_level(&job_text));

    // 6. remote
    let job_is_remote = REMOTE_INDICATORS.iter().any(|ind| job_text.contains(ind));
    let remote_preference = match (profile.remote_preference, job_is_remote) {
        (true, true) => 1.0,
        (false, false) => 0.8,
        (true, false) => 0.3,
        (false, true) => 0.6,
    };

    MatchingFeatures {
        skill_matches,
        matched_skills,
        keyword_matches,
        title_relevance,
        location_match,
        experience_match,
        industry_match: fraction_contained(&profile.industries, &job_text),
        salary_compatibility: salary_compatibility(job, profile),
        remote_preference,
        text_similarity: jaccard_similarity(&profile.text(), &job_text),
    }
}

/// Weighted sum of normalized sub-scores, in [0, 1].
pub fn composite_score(features: &MatchingFeatures, weights: &MatchWeights) -> f64 {
    let skills = (features.skill_matches / SKILL_NORMALIZER).min(1.0);
    let keywords = (features.keyword_matches as f64 / KEYWORD_NORMALIZER).min(1.0);

    let total = skills * weights.skills
        + keywords * weights.keywords
        + features.title_relevance * weights.title
        + features.location_match * weights.location
        + features.experience_match * weights.experience
        + features.industry_match * weights.industry
        + features.salary_compatibility * weights.salary
        + features.remote_preference * weights.remote;

    total.clamp(0.0, 1.0)
}

/// Scores every job and returns the best `top_k`, highest first. Ties keep input order.
pub fn rank_jobs(
    jobs: &[JobPosting],
    profile: &MatchProfile,
    top_k: usize,
    scorer: &dyn JobScorer,
) -> Vec<RankedJob> {
    let mut ranked: Vec<RankedJob> = jobs
        .iter()
        .map(|job| {
            let (score, features) = scorer.score(job, profile);
            RankedJob {
                score: score * 100.0,
                job: job.summary(),
                features,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    info!(
        "Ranked {} jobs with '{}' scorer, returning top {}",
        ranked.len(),
        scorer.backend(),
        top_k.min(ranked.len())
    );
    ranked.truncate(top_k);
    ranked
}

pub fn summarize(ranked: &[RankedJob]) -> MatchSummary {
    let total_matches = ranked.len();
    let top_score = ranked.first().map(|r| r.score).unwrap_or(0.0);
    let average_score = if total_matches == 0 {
        0.0
    } else {
        ranked.iter().map(|r| r.score).sum::<f64>() / total_matches as f64
    };
    MatchSummary {
        top_score,
        average_score,
        total_matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::models::fixtures::posting;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn rust_profile() -> MatchProfile {
        MatchProfile {
            skills: strings(&["rust", "docker", "postgresql"]),
            keywords: strings(&["backend", "api"]),
            target_roles: strings(&["Backend Engineer"]),
            experience_level: ExperienceLevel::Senior,
            preferred_locations: strings(&["Berlin"]),
            remote_preference: true,
            ..Default::default()
        }
    }

    fn job(title: &str, location: &str, description: &str) -> JobPosting {
        let mut job = posting(title, "Acme", description);
        job.location = location.to_string();
        job
    }

    #[test]
    fn test_weights_sum_to_one() {
        let w = MatchWeights::default();
        let sum = w.skills + w.keywords + w.title + w.location + w.experience + w.industry + w.salary + w.remote;
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_features_for_strong_match() {
        let job = job(
            "Senior Backend Engineer",
            "Berlin, Germany",
            "Remote-friendly team building a Rust API on PostgreSQL and Docker",
        );
        let f = extract_features(&job, &rust_profile());
        assert_eq!(f.skill_matches, 3.0);
        assert_eq!(f.keyword_matches, 2);
        assert_eq!(f.title_relevance, 1.0);
        assert_eq!(f.location_match, 1.0);
        assert_eq!(f.experience_match, 1.0);
        assert_eq!(f.remote_preference, 1.0);
        assert_eq!(f.salary_compatibility, 0.5);
        assert_eq!(f.industry_match, 0.0);
    }

    #[test]
    fn test_composite_for_strong_match() {
        let job = job(
            "Senior Backend Engineer",
            "Berlin, Germany",
            "Remote-friendly team building a Rust API on PostgreSQL and Docker",
        );
        let scorer = WeightedJobScorer::default();
        let (score, _) = scorer.score(&job, &rust_profile());
        // .25*.3 + .15*.4 + .20 + .10 + .15 + 0 + .05*.5 + .05
        assert!((score - 0.66).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_score_bounded_and_deterministic() {
        let profile = MatchProfile {
            skills: SKILL_DB_SAMPLE.iter().map(|s| s.to_string()).collect(),
            keywords: strings(&["a", "e", "i", "o", "u", "rust"]),
            target_roles: strings(&["engineer"]),
            industries: strings(&["fintech"]),
            preferred_locations: strings(&["remote"]),
            remote_preference: true,
            experience_level: ExperienceLevel::Senior,
            salary_min: Some(100.0),
            salary_max: Some(200.0),
            ..Default::default()
        };
        let mut job = job(
            "Senior Engineer",
            "Remote",
            &format!("fintech remote {}", SKILL_DB_SAMPLE.join(" ")),
        );
        job.salary_min = Some(150.0);
        job.salary_max = Some(250.0);

        let scorer = WeightedJobScorer::default();
        let (first, _) = scorer.score(&job, &profile);
        let (second, _) = scorer.score(&job, &profile);
        assert_eq!(first, second);
        assert!((0.0..=1.0).contains(&first));
        assert!((first - 1.0).abs() < 1e-9);

        let (empty, _) = scorer.score(&posting("", "", ""), &MatchProfile::default());
        assert!((0.0..=1.0).contains(&empty));
    }

    const SKILL_DB_SAMPLE: &[&str] = &[
        "python", "java", "rust", "docker", "kubernetes", "aws", "sql", "react", "linux", "git", "redis",
    ];

    #[test]
    fn test_job_level_detection_follows_indicator_order() {
        assert_eq!(infer_job_level("entry level, reports to a senior"), JobLevel::Senior);
        assert_eq!(infer_job_level("junior developer"), JobLevel::Junior);
        assert_eq!(infer_job_level("engineering manager"), JobLevel::Executive);
        assert_eq!(infer_job_level("experienced developer"), JobLevel::Mid);
        assert_eq!(infer_job_level("developer"), JobLevel::Mid);
    }

    #[test]
    fn test_experience_table_defaults_to_half() {
        assert_eq!(experience_compatibility(ExperienceLevel::Student, JobLevel::Junior), 0.5);
        assert_eq!(experience_compatibility(ExperienceLevel::Junior, JobLevel::Executive), 0.5);
        assert_eq!(experience_compatibility(ExperienceLevel::Senior, JobLevel::Mid), 0.9);
    }

    #[test]
    fn test_remote_preference_matrix() {
        let mut profile = MatchProfile::default();
        let onsite = job("Engineer", "Paris", "office based");
        let remote = job("Engineer", "Anywhere", "work from home");

        assert_eq!(extract_features(&onsite, &profile).remote_preference, 0.8);
        assert_eq!(extract_features(&remote, &profile).remote_preference, 0.6);
        profile.remote_preference = true;
        assert_eq!(extract_features(&onsite, &profile).remote_preference, 0.3);
        assert_eq!(extract_features(&remote, &profile).remote_preference, 1.0);
    }

    #[test]
    fn test_salary_overlap_and_gap() {
        let profile = MatchProfile {
            salary_min: Some(100_000.0),
            salary_max: Some(120_000.0),
            ..Default::default()
        };
        let mut overlapping = job("Engineer", "", "");
        overlapping.salary_min = Some(110_000.0);
        overlapping.salary_max = Some(130_000.0);
        assert_eq!(salary_compatibility(&overlapping, &profile), 1.0);

        let mut low = job("Engineer", "", "");
        low.salary_min = Some(50_000.0);
        low.salary_max = Some(80_000.0);
        // gap = min(|80k-100k|, |120k-50k|) = 20k, ceiling = 120k
        let expected = 1.0 - 20_000.0 / 120_000.0;
        assert!((salary_compatibility(&low, &profile) - expected).abs() < 1e-9);

        low.salary_max = None;
        assert_eq!(salary_compatibility(&low, &profile), 0.5);
    }

    #[test]
    fn test_skill_proficiency_weights_matches() {
        let mut profile = rust_profile();
        profile.skill_proficiency.insert("rust".to_string(), 0.9);
        let job = job("Engineer", "", "rust and docker");
        let f = extract_features(&job, &profile);
        // rust 0.9 + docker default 0.5
        assert!((f.skill_matches - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_with_proficiency_normalizes_entries() {
        let levels = HashMap::from([
            ("  Rust ".to_string(), 1.5),
            ("Docker".to_string(), 0.2),
            ("Go".to_string(), f64::NAN),
        ]);
        let profile = rust_profile().with_proficiency(&levels);
        assert_eq!(profile.skill_proficiency.get("rust"), Some(&1.0));
        assert_eq!(profile.skill_proficiency.get("docker"), Some(&0.2));
        assert!(!profile.skill_proficiency.contains_key("go"));

        let f = extract_features(&job("Engineer", "", "rust and docker"), &profile);
        assert!((f.skill_matches - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_industry_match_counts_profile_industries() {
        let profile = MatchProfile {
            industries: strings(&["Fintech", "Healthcare"]),
            ..Default::default()
        };
        let f = extract_features(&job("Engineer", "", "a fintech startup"), &profile);
        assert_eq!(f.industry_match, 0.5);
    }

    #[test]
    fn test_rank_jobs_orders_and_truncates() {
        let jobs = vec![
            job("Office Clerk", "Paris", "filing"),
            job("Senior Backend Engineer", "Berlin", "remote rust api"),
            job("Backend Engineer", "Munich", "docker"),
        ];
        let ranked = rank_jobs(&jobs, &rust_profile(), 2, &WeightedJobScorer::default());
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].job.title, "Senior Backend Engineer");
        assert_eq!(ranked[1].job.title, "Backend Engineer");
        assert!(ranked[0].score >= ranked[1].score);
        assert!(ranked[0].score <= 100.0);
    }

    #[test]
    fn test_summarize() {
        let jobs = vec![job("Backend Engineer", "Berlin", "rust"), job("Clerk", "", "")];
        let ranked = rank_jobs(&jobs, &rust_profile(), 10, &WeightedJobScorer::default());
        let summary = summarize(&ranked);
        assert_eq!(summary.total_matches, 2);
        assert_eq!(summary.top_score, ranked[0].score);
        assert!(summary.average_score <= summary.top_score);

        let empty = summarize(&[]);
        assert_eq!(empty.top_score, 0.0);
        assert_eq!(empty.average_score, 0.0);
    }

    #[test]
    fn test_match_profile_from_candidate() {
        let candidate = crate::resume::profile::build_profile(&serde_json::json!({
            "skills": ["Rust"],
            "locations": ["Berlin"],
            "remote_preference": true,
            "salary_expectation": {"min": 1.0, "max": 2.0}
        }));
        let profile = MatchProfile::from_candidate(&candidate);
        assert_eq!(profile.skills, strings(&["rust"]));
        assert_eq!(profile.preferred_locations, strings(&["Berlin"]));
        assert!(profile.remote_preference);
        assert_eq!(profile.salary_max, Some(2.0));
    }
}
