//! PDF serialization of laid-out pages via `lopdf`.
//!
//! Only standard-14 fonts are referenced, so nothing is embedded. Text is
//! encoded as WinAnsi; characters outside that code page print as `?`.
//! No timestamps or random identifiers are written, so the same pages always
//! serialize to the same bytes.

use std::io::Write;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::render::font_metrics::BaseFont;
use crate::render::layout::{Page, PlacedItem, PlacedText};
use crate::render::style::{PageGeometry, Rgb};
use crate::render::RenderError;

const PRODUCER: &str = "curriculo-api";

/// Serializes `pages` as a complete PDF document into `sink`.
pub fn write_pdf<W: Write + ?Sized>(
    pages: &[Page],
    geometry: &PageGeometry,
    title: &str,
    sink: &mut W,
) -> Result<(), RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary(BaseFont::Helvetica));
    let bold_id = doc.add_object(font_dictionary(BaseFont::HelveticaBold));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            BaseFont::Helvetica.resource_name() => regular_id,
            BaseFont::HelveticaBold.resource_name() => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = Content {
            operations: page_operations(page),
        };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("content stream: {e}")))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(geometry.width_pt),
                real(geometry.height_pt),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::String(PRODUCER.as_bytes().to_vec(), StringFormat::Literal),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut target = sink;
    doc.save_to(&mut target)
        .map_err(|e| RenderError::Pdf(format!("writing document: {e}")))?;
    Ok(())
}

fn font_dictionary(font: BaseFont) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.postscript_name(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![real(color.0), real(color.1), real(color.2)]
}

fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::new();
    for item in &page.items {
        match item {
            PlacedItem::Text(text) => push_text(&mut ops, text),
            PlacedItem::Rule {
                x1,
                x2,
                y,
                thickness_pt,
                color,
            } => {
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new("RG", color_operands(*color)));
                ops.push(Operation::new("w", vec![real(*thickness_pt)]));
                ops.push(Operation::new("m", vec![real(*x1), real(*y)]));
                ops.push(Operation::new("l", vec![real(*x2), real(*y)]));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn push_text(ops: &mut Vec<Operation>, text: &PlacedText) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![
            Object::Name(text.font.resource_name().as_bytes().to_vec()),
            real(text.size_pt),
        ],
    ));
    ops.push(Operation::new("rg", color_operands(text.color)));
    ops.push(Operation::new("Td", vec![real(text.x), real(text.y)]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(
            encode_win_ansi(&text.text),
            StringFormat::Literal,
        )],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Encodes text in the WinAnsi (CP-1252) code page.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7e}' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}
