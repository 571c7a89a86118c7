// Candidate-to-job matching: text helpers and the weighted scorer.

pub mod scorer;
pub mod text;
