use serde::{Deserialize, Serialize};

/// Display label used when the submitted name is blank.
pub const PLACEHOLDER_NAME: &str = "Cliente";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub course: String,
    pub institution: Option<String>,
    pub completion_year: Option<String>,
}

/// Normalized résumé input handed to the composition engine.
///
/// Optional fields are kept exactly as submitted; blank-vs-absent is resolved
/// at render time so the record stays a faithful image of the form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub personal: PersonalInfo,
    pub objective: Option<String>,
    pub experience_entries: Vec<ExperienceEntry>,
    pub education_entries: Vec<EducationEntry>,
    pub qualifications: Option<String>,
}

impl SubmissionRecord {
    /// Name shown in the document header. Falls back to a placeholder when blank.
    pub fn display_name(&self) -> &str {
        let name = self.personal.name.trim();
        if name.is_empty() {
            PLACEHOLDER_NAME
        } else {
            name
        }
    }

    /// Experience entries that will actually be rendered (non-blank company).
    pub fn visible_experience(&self) -> impl Iterator<Item = &ExperienceEntry> {
        self.experience_entries
            .iter()
            .filter(|e| !e.company.trim().is_empty())
    }

    /// Education entries that will actually be rendered (non-blank course).
    pub fn visible_education(&self) -> impl Iterator<Item = &EducationEntry> {
        self.education_entries
            .iter()
            .filter(|e| !e.course.trim().is_empty())
    }
}

/// Returns the trimmed value if it is present and non-blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
