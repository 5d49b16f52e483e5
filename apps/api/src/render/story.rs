//! Story builder: maps a `SubmissionRecord` onto an ordered list of document
//! blocks. No measurement happens here. Conditional sections that have no
//! data contribute no blocks at all.

use serde::Serialize;

use crate::models::submission::{non_blank, EducationEntry, ExperienceEntry, SubmissionRecord};
use crate::render::labels::Labels;
use crate::render::style::{Rgb, StyleName, LIGHT_GREY};

/// Delimiter between contact fields.
pub const CONTACT_DELIMITER: &str = " | ";

/// A span of text with uniform weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Run {
            text: text.into(),
            bold: true,
        }
    }
}

/// One author-defined line. Long lines still wrap; separate `TextLine`s never merge.
pub type TextLine = Vec<Run>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Block {
    Paragraph {
        style: StyleName,
        lines: Vec<TextLine>,
    },
    /// Vertical gap in points.
    Spacer(f32),
    /// Full-width horizontal rule.
    Rule { thickness_pt: f32, color: Rgb },
}

impl Block {
    fn single(style: StyleName, runs: TextLine) -> Self {
        Block::Paragraph {
            style,
            lines: vec![runs],
        }
    }

    fn heading(title: &str) -> Self {
        Block::single(StyleName::SectionTitle, vec![Run::bold(title)])
    }

    /// Concatenated text of a paragraph, one `\n` per author line.
    #[cfg(test)]
    pub fn plain_text(&self) -> Option<String> {
        match self {
            Block::Paragraph { lines, .. } => Some(
                lines
                    .iter()
                    .map(|line| line.iter().map(|r| r.text.as_str()).collect::<String>())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => None,
        }
    }
}

/// Builds the full story for a record, top to bottom.
pub fn build_story(record: &SubmissionRecord, labels: &Labels) -> Vec<Block> {
    let mut story = Vec::new();

    // Header
    story.push(Block::single(
        StyleName::Name,
        vec![Run::bold(record.display_name().to_uppercase())],
    ));
    if let Some(contact) = contact_line(record, labels) {
        story.push(Block::single(StyleName::Small, vec![Run::plain(contact)]));
    }
    story.push(Block::Spacer(10.0));
    story.push(Block::Rule {
        thickness_pt: 1.0,
        color: LIGHT_GREY,
    });

    if let Some(objective) = non_blank(&record.objective) {
        story.push(Block::heading(labels.objective_title));
        story.push(Block::single(StyleName::Normal, vec![Run::plain(objective)]));
    }

    let experience: Vec<&ExperienceEntry> = record.visible_experience().collect();
    if !experience.is_empty() {
        story.push(Block::heading(labels.experience_title));
        for entry in experience {
            push_experience(&mut story, entry, labels);
        }
    }

    let education: Vec<&EducationEntry> = record.visible_education().collect();
    if !education.is_empty() {
        story.push(Block::heading(labels.education_title));
        for entry in education {
            push_education(&mut story, entry, labels);
        }
    }

    if let Some(qualifications) = non_blank(&record.qualifications) {
        story.push(Block::heading(labels.qualifications_title));
        story.push(Block::Paragraph {
            style: StyleName::Normal,
            lines: qualifications
                .lines()
                .map(|line| vec![Run::plain(line.trim_end())])
                .collect(),
        });
    }

    // Footer
    story.push(Block::Spacer(30.0));
    story.push(Block::Rule {
        thickness_pt: 0.5,
        color: LIGHT_GREY,
    });
    story.push(Block::single(
        StyleName::Small,
        vec![Run::plain(labels.footer)],
    ));

    story
}

/// Phone, email, address and birthdate, in that order, skipping blanks.
/// Returns `None` when no contact field is present.
pub fn contact_line(record: &SubmissionRecord, labels: &Labels) -> Option<String> {
    let personal = &record.personal;
    let parts: Vec<String> = [
        (labels.phone, &personal.phone),
        (labels.email, &personal.email),
        (labels.address, &personal.address),
        (labels.birthdate, &personal.birthdate),
    ]
    .into_iter()
    .filter_map(|(label, value)| non_blank(value).map(|v| format!("{label}: {v}")))
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(CONTACT_DELIMITER))
    }
}

fn push_experience(story: &mut Vec<Block>, entry: &ExperienceEntry, labels: &Labels) {
    let mut title = vec![Run::bold(entry.company.trim())];
    // The separator only appears when there is a role to separate.
    if let Some(role) = non_blank(&entry.role) {
        title.push(Run::plain(format!(" - {role}")));
    }
    story.push(Block::single(StyleName::Normal, title));

    let start = non_blank(&entry.start);
    let end = non_blank(&entry.end);
    if start.is_some() || end.is_some() {
        story.push(Block::single(
            StyleName::Small,
            vec![Run::plain(format!(
                "{}: {} {} {}",
                labels.period,
                start.unwrap_or_default(),
                labels.period_join,
                end.unwrap_or_default()
            ))],
        ));
    }

    if let Some(summary) = non_blank(&entry.summary) {
        story.push(Block::single(StyleName::Normal, vec![Run::plain(summary)]));
    }

    story.push(Block::Spacer(8.0));
}

fn push_education(story: &mut Vec<Block>, entry: &EducationEntry, labels: &Labels) {
    let mut lines = vec![vec![Run::bold(entry.course.trim())]];

    let institution = non_blank(&entry.institution);
    let year = non_blank(&entry.completion_year);
    let second = match (institution, year) {
        (Some(inst), Some(year)) => Some(format!("{inst} - {}: {year}", labels.completion)),
        (Some(inst), None) => Some(inst.to_string()),
        (None, Some(year)) => Some(format!("{}: {year}", labels.completion)),
        (None, None) => None,
    };
    if let Some(second) = second {
        lines.push(vec![Run::plain(second)]);
    }

    story.push(Block::Paragraph {
        style: StyleName::Normal,
        lines,
    });
    story.push(Block::Spacer(6.0));
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::PersonalInfo;
    use crate::render::labels::Locale;

    fn labels() -> &'static Labels {
        Labels::for_locale(Locale::PtBr)
    }

    fn record_named(name: &str) -> SubmissionRecord {
        SubmissionRecord {
            personal: PersonalInfo {
                name: name.to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn texts(story: &[Block]) -> Vec<String> {
        story.iter().filter_map(Block::plain_text).collect()
    }

    #[test]
    fn test_header_is_first_and_uppercased() {
        let story = build_story(&record_named("Maria Silva"), labels());
        assert_eq!(story[0].plain_text().as_deref(), Some("MARIA SILVA"));
        assert!(matches!(
            story[0],
            Block::Paragraph {
                style: StyleName::Name,
                ..
            }
        ));
    }

    #[test]
    fn test_contact_line_fixed_order_without_stray_delimiters() {
        let mut record = record_named("Ana");
        record.personal.birthdate = Some("01/02/1990".to_string());
        record.personal.email = Some("ana@example.com".to_string());
        record.personal.address = Some("   ".to_string());
        let line = contact_line(&record, labels()).unwrap();
        assert_eq!(line, "Email: ana@example.com | Nasc: 01/02/1990");

        record.personal.phone = Some("(11) 5555-0000".to_string());
        let line = contact_line(&record, labels()).unwrap();
        assert!(line.starts_with("Tel: (11) 5555-0000 | Email:"));
        assert!(!line.starts_with(" |") && !line.ends_with("| ") && !line.contains("|  |"));
    }

    #[test]
    fn test_contact_line_omitted_when_empty() {
        let record = record_named("Ana");
        assert!(contact_line(&record, labels()).is_none());
        let story = build_story(&record, labels());
        assert!(matches!(story[1], Block::Spacer(_)));
    }

    #[test]
    fn test_minimal_record_has_only_header_and_footer() {
        let story = build_story(&record_named("Ana"), labels());
        let texts = texts(&story);
        assert_eq!(texts, vec!["ANA".to_string(), labels().footer.to_string()]);
    }

    #[test]
    fn test_blank_objective_emits_no_heading() {
        let mut record = record_named("Ana");
        record.objective = Some("  \n ".to_string());
        let texts = texts(&build_story(&record, labels()));
        assert!(!texts.iter().any(|t| t == labels().objective_title));
    }

    #[test]
    fn test_experience_skips_blank_company_even_with_siblings() {
        let mut record = record_named("Ana");
        record.experience_entries = vec![
            ExperienceEntry {
                company: "".to_string(),
                role: Some("Fantasma".to_string()),
                summary: Some("Nao deve aparecer".to_string()),
                ..Default::default()
            },
            ExperienceEntry {
                company: "Acme".to_string(),
                role: Some("Dev".to_string()),
                start: Some("2020".to_string()),
                end: None,
                summary: Some("Construiu coisas".to_string()),
            },
        ];
        let texts = texts(&build_story(&record, labels()));
        assert!(texts.contains(&labels().experience_title.to_string()));
        assert!(texts.contains(&"Acme - Dev".to_string()));
        assert!(texts.contains(&"Período: 2020 a ".to_string()));
        assert!(texts.contains(&"Construiu coisas".to_string()));
        assert!(!texts.iter().any(|t| t.contains("Fantasma") || t.contains("Nao deve")));
    }

    #[test]
    fn test_experience_section_absent_when_all_companies_blank() {
        let mut record = record_named("Ana");
        record.experience_entries = vec![ExperienceEntry {
            company: "   ".to_string(),
            role: Some("Dev".to_string()),
            ..Default::default()
        }];
        let texts = texts(&build_story(&record, labels()));
        assert!(!texts.contains(&labels().experience_title.to_string()));
    }

    #[test]
    fn test_role_absent_suppresses_separator() {
        let mut record = record_named("Ana");
        record.experience_entries = vec![ExperienceEntry {
            company: "Acme".to_string(),
            ..Default::default()
        }];
        let texts = texts(&build_story(&record, labels()));
        assert!(texts.contains(&"Acme".to_string()));
        assert!(!texts.iter().any(|t| t.starts_with("Acme -")));
        assert!(!texts.iter().any(|t| t.starts_with("Período")));
    }

    #[test]
    fn test_education_two_line_block_with_completion() {
        let mut record = record_named("Ana");
        record.education_entries = vec![
            EducationEntry {
                course: "Ciência da Computação".to_string(),
                institution: Some("USP".to_string()),
                completion_year: Some("2018".to_string()),
            },
            EducationEntry {
                course: "Técnico".to_string(),
                institution: Some("ETEC".to_string()),
                completion_year: None,
            },
        ];
        let texts = texts(&build_story(&record, labels()));
        assert!(texts.contains(&"Ciência da Computação\nUSP - Conclusão: 2018".to_string()));
        assert!(texts.contains(&"Técnico\nETEC".to_string()));
    }

    #[test]
    fn test_education_year_without_institution_has_no_leading_separator() {
        let mut record = record_named("Ana");
        record.education_entries = vec![EducationEntry {
            course: "ADS".to_string(),
            institution: Some("   ".to_string()),
            completion_year: Some("2018".to_string()),
        }];
        let texts = texts(&build_story(&record, labels()));
        assert!(texts.contains(&"ADS\nConclusão: 2018".to_string()));
        assert!(!texts.iter().any(|t| t.contains(" - Conclusão")));
    }

    #[test]
    fn test_qualifications_keep_author_lines() {
        let mut record = record_named("Ana");
        record.qualifications = Some("Inglês fluente\nExcel avançado\r\nCNH B".to_string());
        let story = build_story(&record, labels());
        let block = story
            .iter()
            .find(|b| {
                b.plain_text()
                    .map(|t| t.starts_with("Inglês"))
                    .unwrap_or(false)
            })
            .unwrap();
        match block {
            Block::Paragraph { lines, .. } => assert_eq!(lines.len(), 3),
            _ => panic!("expected paragraph"),
        }
    }

    #[test]
    fn test_section_order_is_fixed() {
        let mut record = record_named("Ana");
        record.qualifications = Some("CNH B".to_string());
        record.objective = Some("Crescer".to_string());
        record.education_entries = vec![EducationEntry {
            course: "ADS".to_string(),
            ..Default::default()
        }];
        record.experience_entries = vec![ExperienceEntry {
            company: "Acme".to_string(),
            ..Default::default()
        }];
        let texts = texts(&build_story(&record, labels()));
        let pos = |needle: &str| texts.iter().position(|t| t == needle).unwrap();
        let l = labels();
        assert!(pos(l.objective_title) < pos(l.experience_title));
        assert!(pos(l.experience_title) < pos(l.education_title));
        assert!(pos(l.education_title) < pos(l.qualifications_title));
        assert!(pos(l.qualifications_title) < pos(l.footer));
    }
}
