//! Typed decoding of the résumé form.
//!
//! The HTML form posts singular fields once and repeated groups (jobs,
//! degrees) as parallel `key[]` lists that line up by index. This module turns
//! that shape into a `SubmissionRecord`, so rendering never sees raw form keys.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::models::submission::{EducationEntry, ExperienceEntry, PersonalInfo, SubmissionRecord};

pub const FIELD_NAME: &str = "nome";
pub const FIELD_PHONE: &str = "telefone";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_ADDRESS: &str = "endereco";
pub const FIELD_BIRTHDATE: &str = "nascimento";
pub const FIELD_OBJECTIVE: &str = "objetivo";
pub const FIELD_QUALIFICATIONS: &str = "qualificacoes";

/// Jobs: company is the primary list; role, start, end, summary follow it.
pub const EXPERIENCE_GROUP: RepeatedGroup<4> = RepeatedGroup {
    name: "experience",
    primary: "exp_empresa[]",
    siblings: ["exp_cargo[]", "exp_inicio[]", "exp_fim[]", "exp_resumo[]"],
};

/// Degrees: course is the primary list; institution and year follow it.
pub const EDUCATION_GROUP: RepeatedGroup<2> = RepeatedGroup {
    name: "education",
    primary: "formacao_curso[]",
    siblings: ["formacao_escola[]", "formacao_ano[]"],
};

/// Raw form data as an ordered multimap: key → every submitted value.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    values: HashMap<String, Vec<String>>,
}

impl FormFields {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            values.entry(key.into()).or_default().push(value.into());
        }
        FormFields { values }
    }

    /// First value submitted under `key`. Singular fields resolve this way.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    fn optional(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_string)
    }
}

/// Something the decoder tolerated but that indicates a malformed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DecodeWarning {
    /// A sibling list had more values than its group's primary list; the
    /// extra values were dropped.
    SiblingOverflow {
        group: &'static str,
        field: &'static str,
        dropped: usize,
    },
}

/// A family of parallel `key[]` lists aligned by index.
#[derive(Debug, Clone, Copy)]
pub struct RepeatedGroup<const N: usize> {
    pub name: &'static str,
    pub primary: &'static str,
    pub siblings: [&'static str; N],
}

/// One decoded row: the primary value plus each sibling (if submitted at that index).
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow<const N: usize> {
    pub primary: String,
    pub siblings: [Option<String>; N],
}

impl<const N: usize> RepeatedGroup<N> {
    /// Zips the group's lists by index. The primary list decides the row
    /// count; short siblings yield `None`, long siblings are truncated and
    /// reported.
    pub fn decode(&self, fields: &FormFields, warnings: &mut Vec<DecodeWarning>) -> Vec<GroupRow<N>> {
        let primary = fields.list(self.primary);

        for field in self.siblings {
            let len = fields.list(field).len();
            if len > primary.len() {
                warnings.push(DecodeWarning::SiblingOverflow {
                    group: self.name,
                    field,
                    dropped: len - primary.len(),
                });
            }
        }

        primary
            .iter()
            .enumerate()
            .map(|(i, value)| GroupRow {
                primary: value.clone(),
                siblings: std::array::from_fn(|s| fields.list(self.siblings[s]).get(i).cloned()),
            })
            .collect()
    }
}

/// Result of decoding a form: the record plus anything that was tolerated.
#[derive(Debug, Clone)]
pub struct DecodedSubmission {
    pub record: SubmissionRecord,
    pub warnings: Vec<DecodeWarning>,
}

/// Decodes the résumé form into a `SubmissionRecord`. Never fails: missing
/// fields become absent values.
pub fn decode_submission(fields: &FormFields) -> DecodedSubmission {
    let mut warnings = Vec::new();

    let experience_entries = EXPERIENCE_GROUP
        .decode(fields, &mut warnings)
        .into_iter()
        .map(|row| {
            let [role, start, end, summary] = row.siblings;
            ExperienceEntry {
                company: row.primary,
                role,
                start,
                end,
                summary,
            }
        })
        .collect();

    let education_entries = EDUCATION_GROUP
        .decode(fields, &mut warnings)
        .into_iter()
        .map(|row| {
            let [institution, completion_year] = row.siblings;
            EducationEntry {
                course: row.primary,
                institution,
                completion_year,
            }
        })
        .collect();

    for warning in &warnings {
        warn!(?warning, "Tolerated malformed repeated group in submission");
    }

    let record = SubmissionRecord {
        personal: PersonalInfo {
            name: fields.first(FIELD_NAME).unwrap_or_default().to_string(),
            phone: fields.optional(FIELD_PHONE),
            email: fields.optional(FIELD_EMAIL),
            address: fields.optional(FIELD_ADDRESS),
            birthdate: fields.optional(FIELD_BIRTHDATE),
        },
        objective: fields.optional(FIELD_OBJECTIVE),
        experience_entries,
        education_entries,
        qualifications: fields.optional(FIELD_QUALIFICATIONS),
    };

    DecodedSubmission { record, warnings }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
