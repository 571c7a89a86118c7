// Résumé intake: upload validation, PDF text extraction, AI review and
// candidate profile extraction. Results are kept in `session::SessionStore`.

pub mod analysis;
pub mod handlers;
pub mod pdf;
pub mod profile;
pub mod prompts;
pub mod session;
pub mod upload;
