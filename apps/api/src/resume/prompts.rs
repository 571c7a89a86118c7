/// Résumé review prompt. `{resume_text}` is substituted before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Please provide a comprehensive professional evaluation of this resume:

**RESUME:**
{resume_text}

**ANALYSIS REQUIREMENTS:**
1. **Professional Summary**: One-line summary of the candidate's profile
2. **Experience Level**: Classify as Student/Intern/Junior/Mid-level/Senior/Executive
3. **Existing Skills**: List all technical and relevant soft skills found
4. **Skill Gaps**: Identify missing or weak skills for career growth
5. **Course Recommendations**: Suggest 3-5 specific courses/certifications to improve the resume
6. **Strengths**: Key positive aspects of the profile
7. **Areas for Improvement**: Specific recommendations for enhancement
8. **Industry Readiness**: Assessment of readiness for target roles
"#;

/// Appended when the caller supplies a job description. `{job_description}` is substituted.
pub const JOB_FIT_PROMPT_TEMPLATE: &str = r#"
**JOB DESCRIPTION FOR COMPARISON:**
{job_description}

**ADDITIONAL ANALYSIS FOR JOB FIT:**
9. **Job Compatibility Score**: Rate compatibility as a percentage (0-100%)
10. **Job-Specific Strengths**: How the candidate aligns with this specific role
11. **Job-Specific Gaps**: Missing requirements for this specific position
12. **Recommendation**: Whether to proceed with application and next steps
"#;

/// Profile extraction prompt. `{resume_text}` is substituted before sending.
pub const PROFILE_PROMPT_TEMPLATE: &str = r#"Extract a comprehensive candidate profile as pure JSON with the following structure:

{
  "target_roles": ["Software Engineer", "Data Scientist"],
  "skills": ["Python", "JavaScript", "Machine Learning"],
  "experience_level": "junior|mid|senior|executive|student|intern",
  "total_experience_months": 24,
  "education_level": "high_school|associate|bachelor|master|phd",
  "locations": ["New York", "San Francisco", "Remote"],
  "remote_preference": true,
  "industries": ["Technology", "Healthcare"],
  "keywords": ["API", "Database", "Agile", "Team Lead"],
  "salary_expectation": {"min": 80000, "max": 120000, "currency": "USD"},
  "certifications": ["AWS Certified", "PMP"],
  "languages": ["English", "Spanish"],
  "soft_skills": ["Leadership", "Communication"]
}

Guidelines:
- Extract ALL technical skills mentioned
- Infer experience level from work history and skills
- Estimate total experience in months based on work history
- Include both hard and soft skills
- Identify preferred locations from the resume
- Determine remote work preference from experience or statements
- Extract salary information if mentioned
- Include certifications, courses, and relevant training
- Return only valid JSON, no commentary

RESUME:
{resume_text}
"#;
