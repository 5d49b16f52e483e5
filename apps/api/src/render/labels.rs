//! Fixed wording printed in the document, per locale.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Ok(Locale::PtBr),
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            other => Err(format!("unsupported document locale '{other}'")),
        }
    }
}

/// Headings, field prefixes and the footer disclaimer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labels {
    pub phone: &'static str,
    pub email: &'static str,
    pub address: &'static str,
    pub birthdate: &'static str,
    pub objective_title: &'static str,
    pub experience_title: &'static str,
    pub education_title: &'static str,
    pub qualifications_title: &'static str,
    pub period: &'static str,
    /// Joins start and end in the period line.
    pub period_join: &'static str,
    pub completion: &'static str,
    pub footer: &'static str,
}

const PT_BR: Labels = Labels {
    phone: "Tel",
    email: "Email",
    address: "Endereço",
    birthdate: "Nasc",
    objective_title: "OBJETIVO PROFISSIONAL",
    experience_title: "EXPERIÊNCIA PROFISSIONAL",
    education_title: "FORMAÇÃO ACADÊMICA",
    qualifications_title: "QUALIFICAÇÕES E CURSOS",
    period: "Período",
    period_join: "a",
    completion: "Conclusão",
    footer: "Documento gerado automaticamente via Info Center Digital",
};

const EN: Labels = Labels {
    phone: "Tel",
    email: "Email",
    address: "Address",
    birthdate: "Born",
    objective_title: "OBJECTIVE",
    experience_title: "EXPERIENCE",
    education_title: "EDUCATION",
    qualifications_title: "QUALIFICATIONS",
    period: "Period",
    period_join: "to",
    completion: "Completion",
    footer: "Document generated automatically via Info Center Digital",
};

impl Labels {
    pub fn for_locale(locale: Locale) -> &'static Labels {
        match locale {
            Locale::PtBr => &PT_BR,
            Locale::En => &EN,
        }
    }
}
