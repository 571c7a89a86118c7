//! AI résumé review.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::HR_REVIEWER_SYSTEM;
use crate::llm_client::LlmClient;
use crate::resume::prompts::{ANALYSIS_PROMPT_TEMPLATE, JOB_FIT_PROMPT_TEMPLATE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    /// Markdown review returned by the model.
    pub analysis: String,
    pub word_count: usize,
    pub character_count: usize,
    pub timestamp: DateTime<Utc>,
    pub job_specific: bool,
}

pub fn build_analysis_prompt(resume_text: &str, job_description: Option<&str>) -> String {
    let mut prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);
    if let Some(jd) = job_description {
        prompt.push_str(&JOB_FIT_PROMPT_TEMPLATE.replace("{job_description}", jd));
    }
    prompt
}

/// Runs the professional review. A blank `job_description` is treated as absent.
pub async fn analyze_resume(
    resume_text: &str,
    job_description: Option<&str>,
    llm: &LlmClient,
) -> Result<ResumeAnalysis, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume text is required for analysis".to_string(),
        ));
    }

    let job_description = job_description.map(str::trim).filter(|jd| !jd.is_empty());
    let prompt = build_analysis_prompt(resume_text, job_description);
    let text = llm.call_text(&prompt, HR_REVIEWER_SYSTEM).await?;

    info!("Resume analysis completed successfully");
    Ok(ResumeAnalysis {
        analysis: text.trim().to_string(),
        word_count: resume_text.split_whitespace().count(),
        character_count: resume_text.chars().count(),
        timestamp: Utc::now(),
        job_specific: job_description.is_some(),
    })
}
