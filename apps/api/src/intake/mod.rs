// Intake & dispatch: form decoding, naming, validation and the two HTTP
// handlers (submit, download). Rendering itself lives in `crate::render`.

pub mod filename;
pub mod form;
pub mod handlers;

use crate::config::NamePolicy;
use crate::errors::AppError;
use crate::models::submission::SubmissionRecord;

/// Applies the configured name policy to a decoded record.
pub fn validate(record: &SubmissionRecord, policy: NamePolicy) -> Result<(), AppError> {
    if record.personal.name.trim().is_empty() {
        match policy {
            NamePolicy::FailSoft => {
                tracing::warn!("Submission without a name; rendering placeholder");
            }
            NamePolicy::Reject => {
                return Err(AppError::Validation("O campo 'nome' é obrigatório".to_string()));
            }
        }
    }
    Ok(())
}
