//! Line breaking and pagination.
//!
//! Greedy word-wrap over mixed-weight runs, measured with the static font
//! tables, followed by a single top-to-bottom pass that places lines, gaps and
//! rules onto as many pages as needed. Output coordinates are PDF points with
//! the origin at the bottom-left corner.

use serde::Serialize;

use crate::render::font_metrics::{get_metrics, BaseFont};
use crate::render::story::{Block, Run};
use crate::render::style::{PageGeometry, Rgb, StyleSheet, TextStyle};

/// Padding above and below a horizontal rule.
const RULE_PADDING_PT: f32 = 2.0;

/// A contiguous piece of text in one font, positioned on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedText {
    pub x: f32,
    /// Baseline.
    pub y: f32,
    pub font: BaseFont,
    pub size_pt: f32,
    pub color: Rgb,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PlacedItem {
    Text(PlacedText),
    Rule {
        x1: f32,
        x2: f32,
        y: f32,
        thickness_pt: f32,
        color: Rgb,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<PlacedItem>,
}

impl Page {
    /// Text segments in placement order, joined per printed line.
    #[cfg(test)]
    pub fn text_lines(&self) -> Vec<String> {
        let mut lines: Vec<(f32, String)> = Vec::new();
        for item in &self.items {
            if let PlacedItem::Text(t) = item {
                match lines.last_mut() {
                    Some((y, line)) if (*y - t.y).abs() < 0.01 => line.push_str(&t.text),
                    _ => lines.push((t.y, t.text.clone())),
                }
            }
        }
        lines.into_iter().map(|(_, l)| l).collect()
    }
}

/// One wrapped output line: segments of uniform weight, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrappedLine {
    pub segments: Vec<Run>,
    pub width_pt: f32,
}

fn font_for(bold: bool) -> BaseFont {
    if bold {
        BaseFont::HelveticaBold
    } else {
        BaseFont::Helvetica
    }
}

/// A word plus whether whitespace preceded it in the source.
struct Token<'a> {
    text: &'a str,
    bold: bool,
    space_before: bool,
}

fn tokenize(runs: &[Run]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pending_space = false;
    for run in runs {
        let mut rest = run.text.as_str();
        loop {
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                pending_space = true;
            }
            if trimmed.is_empty() {
                break;
            }
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            tokens.push(Token {
                text: &trimmed[..end],
                bold: run.bold,
                space_before: pending_space,
            });
            pending_space = false;
            rest = &trimmed[end..];
        }
    }
    tokens
}

/// Splits a word that is wider than `max_width_pt` into pieces that fit.
fn hard_split(word: &str, font: BaseFont, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let metrics = get_metrics(font);
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c) * size_pt;
        if !current.is_empty() && width + w > max_width_pt {
            pieces.push(std::mem::take(&mut current));
            width = 0.0;
        }
        current.push(c);
        width += w;
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Greedy word-wrap of one author line. An empty line yields one empty
/// `WrappedLine` so blank author lines still take vertical space.
pub fn wrap_runs(runs: &[Run], size_pt: f32, max_width_pt: f32) -> Vec<WrappedLine> {
    let mut lines: Vec<WrappedLine> = Vec::new();
    let mut current = WrappedLine::default();

    let mut place = |current: &mut WrappedLine, text: &str, bold: bool, space: bool| {
        let metrics = get_metrics(font_for(bold));
        let word_w = metrics.measure_pt(text, size_pt);
        let space_w = if space && !current.segments.is_empty() {
            metrics.space_width * size_pt
        } else {
            0.0
        };

        if !current.segments.is_empty() && current.width_pt + space_w + word_w > max_width_pt {
            lines.push(std::mem::take(current));
            current.segments.push(Run {
                text: text.to_string(),
                bold,
            });
            current.width_pt = word_w;
            return;
        }

        if space_w > 0.0 {
            if let Some(last) = current.segments.last_mut() {
                last.text.push(' ');
            }
        }
        match current.segments.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(text),
            _ => current.segments.push(Run {
                text: text.to_string(),
                bold,
            }),
        }
        current.width_pt += space_w + word_w;
    };

    for token in tokenize(runs) {
        let font = font_for(token.bold);
        let word_w = get_metrics(font).measure_pt(token.text, size_pt);
        if word_w > max_width_pt {
            for (i, piece) in hard_split(token.text, font, size_pt, max_width_pt)
                .iter()
                .enumerate()
            {
                place(&mut current, piece, token.bold, i == 0 && token.space_before);
            }
        } else {
            place(&mut current, token.text, token.bold, token.space_before);
        }
    }

    lines.push(current);
    lines
}

/// Places every block onto pages.
pub fn paginate(blocks: &[Block], styles: &StyleSheet, page: &PageGeometry) -> Vec<Page> {
    let mut cursor = Cursor::new(page);

    for block in blocks {
        match block {
            Block::Paragraph { style, lines } => {
                let style = styles.get(*style);
                cursor.gap(style.space_before_pt);
                for author_line in lines {
                    for wrapped in wrap_runs(author_line, style.size_pt, page.text_width_pt()) {
                        cursor.line(&wrapped, style);
                    }
                }
                cursor.gap(style.space_after_pt);
            }
            Block::Spacer(height) => cursor.gap(*height),
            Block::Rule {
                thickness_pt,
                color,
            } => cursor.rule(*thickness_pt, *color),
        }
    }

    cursor.finish()
}

/// Vertical placement state for the pagination pass.
struct Cursor<'a> {
    geometry: &'a PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn new(geometry: &'a PageGeometry) -> Self {
        Cursor {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.top_pt(),
        }
    }

    fn at_page_top(&self) -> bool {
        (self.y - self.geometry.top_pt()).abs() < f32::EPSILON
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = self.geometry.top_pt();
    }

    /// Gaps are dropped at the top of a page and never force a page break.
    fn gap(&mut self, height: f32) {
        if height <= 0.0 || self.at_page_top() {
            return;
        }
        if self.y - height < self.geometry.bottom_pt() {
            self.new_page();
        } else {
            self.y -= height;
        }
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < self.geometry.bottom_pt() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn line(&mut self, line: &WrappedLine, style: &TextStyle) {
        self.ensure_room(style.leading_pt);
        // Baseline sits so the descender space is shared evenly with the leading.
        let baseline = self.y - style.leading_pt + (style.leading_pt - style.size_pt) / 2.0
            + style.size_pt * 0.2;
        let mut x = self.geometry.margin_pt;
        for segment in &line.segments {
            let font = font_for(segment.bold);
            self.current.items.push(PlacedItem::Text(PlacedText {
                x,
                y: baseline,
                font,
                size_pt: style.size_pt,
                color: style.color,
                text: segment.text.clone(),
            }));
            x += get_metrics(font).measure_pt(&segment.text, style.size_pt);
        }
        self.y -= style.leading_pt;
    }

    fn rule(&mut self, thickness_pt: f32, color: Rgb) {
        let height = thickness_pt + 2.0 * RULE_PADDING_PT;
        self.ensure_room(height);
        let y = self.y - RULE_PADDING_PT - thickness_pt / 2.0;
        self.current.items.push(PlacedItem::Rule {
            x1: self.geometry.margin_pt,
            x2: self.geometry.width_pt - self.geometry.margin_pt,
            y,
            thickness_pt,
            color,
        });
        self.y -= height;
    }

    fn finish(mut self) -> Vec<Page> {
        if !self.current.items.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
