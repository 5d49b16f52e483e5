//! Artifact naming: `curriculo_{first name}_{phone digits}.pdf`.
//!
//! Names are only weakly unique. Two people with the same first name and
//! phone overwrite each other's artifact; that is accepted.

use crate::intake::form::{FormFields, FIELD_NAME, FIELD_PHONE};
use crate::models::submission::PLACEHOLDER_NAME;

pub const ARTIFACT_PREFIX: &str = "curriculo_";
pub const ARTIFACT_EXTENSION: &str = ".pdf";

/// Phone value assumed when the form has no phone field at all.
const MISSING_PHONE: &str = "0000";

/// First whitespace token of `name`, reduced to filesystem-safe characters.
pub fn first_name_token(name: Option<&str>) -> String {
    let token: String = name
        .and_then(|n| n.split_whitespace().next())
        .unwrap_or(PLACEHOLDER_NAME)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if token.is_empty() {
        PLACEHOLDER_NAME.to_string()
    } else {
        token
    }
}

pub fn digits_only(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Derives the artifact filename from the raw name and phone values.
///
/// `phone` is `None` when the field was not submitted; a submitted but empty
/// phone yields an empty digit group.
pub fn artifact_filename(name: Option<&str>, phone: Option<&str>) -> String {
    format!(
        "{ARTIFACT_PREFIX}{}_{}{ARTIFACT_EXTENSION}",
        first_name_token(name),
        digits_only(phone.unwrap_or(MISSING_PHONE))
    )
}

/// Derives the artifact filename straight from the submitted form.
pub fn filename_for_form(fields: &FormFields) -> String {
    artifact_filename(fields.first(FIELD_NAME), fields.first(FIELD_PHONE))
}
