//! Text helpers for job matching: tokenization, skill spotting and overlap.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Built-in skill vocabulary spotted in job text.
pub const SKILL_DATABASE: &[&str] = &[
    // languages
    "python", "java", "javascript", "c++", "c#", "go", "rust", "kotlin", "swift",
    "php", "ruby", "scala", "r", "matlab", "sql", "html", "css",
    // frameworks and libraries
    "react", "angular", "vue", "django", "flask", "spring", "node.js", "express",
    "tensorflow", "pytorch", "scikit-learn", "pandas", "numpy",
    // tools and platforms
    "aws", "azure", "gcp", "docker", "kubernetes", "git", "jenkins", "terraform",
    "ansible", "linux", "windows", "macos",
    // databases
    "mysql", "postgresql", "mongodb", "redis", "elasticsearch", "cassandra",
    // practices and soft skills
    "leadership", "communication", "teamwork", "problem-solving", "project management",
    "agile", "scrum", "devops", "machine learning", "data analysis", "data science",
    "artificial intelligence", "cybersecurity",
];

fn token_patterns() -> &'static [Regex; 3] {
    static PATTERNS: OnceLock<[Regex; 3]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // technical terms like C++, .NET, Node.js
            Regex::new(r"[A-Za-z0-9+#.]{2,}").expect("valid regex"),
            // acronyms like AWS, SQL
            Regex::new(r"\b[A-Z]{2,}\b").expect("valid regex"),
            // plain and hyphenated words
            Regex::new(r"\b[A-Za-z]+(?:-[A-Za-z]+)*\b").expect("valid regex"),
        ]
    })
}

fn skill_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        SKILL_DATABASE
            .iter()
            .map(|skill| {
                // \b only anchors next to word characters; skills ending in
                // `+` or `#` need a lookaround-free boundary instead.
                let pattern = format!(r"(?:^|[^a-z0-9_]){}(?:$|[^a-z0-9_+#])", regex::escape(skill));
                (*skill, Regex::new(&pattern).expect("escaped skill is a valid regex"))
            })
            .collect()
    })
}

/// Unique tokens, keeping technical spellings such as `c++` and `node.js`.
pub fn tokenize(text: &str) -> HashSet<String> {
    let mut tokens = HashSet::new();
    for pattern in token_patterns() {
        for m in pattern.find_iter(text) {
            tokens.insert(m.as_str().to_lowercase());
        }
    }
    tokens
}

/// Skills from the built-in vocabulary that appear as whole words in `text`.
pub fn extract_skills(text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    skill_patterns()
        .iter()
        .filter(|(_, re)| re.is_match(&lower))
        .map(|(skill, _)| *skill)
        .collect()
}

/// Jaccard index of the token sets of two texts.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left = tokenize(a);
    let right = tokenize(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}
