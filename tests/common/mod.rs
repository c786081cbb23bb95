//! Synthetic OCR layouts shared by the integration tests.
//!
//! Body text is sized so the glyph estimate lands near 0.012 of the page
//! height: lines are 0.0144 apart and a line holds one character per 0.006
//! of width.

#![allow(dead_code)]

use unlayout::RawElement;

pub const LINE_HEIGHT: f32 = 0.0144;
pub const CHAR_WIDTH: f32 = 0.006;

const DIGITS: [&str; 10] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];

/// Spell a number digit by digit, so distinct numbers give distinct words.
pub fn spell(n: usize) -> String {
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| DIGITS[d as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

/// Running text of exactly `chars` characters, unique per `seed`.
pub fn filler(seed: usize, chars: usize) -> String {
    let phrase = format!(
        "Paragraph {} covers the results for this part of the report. ",
        spell(seed)
    );
    let text: String = phrase.chars().cycle().take(chars).collect();
    format!("{}.", text.trim_end().trim_end_matches('.'))
}

/// A body paragraph of `lines` lines between `x0` and `x1`.
pub fn paragraph(page: u32, x0: f32, x1: f32, y0: f32, lines: usize, seed: usize) -> RawElement {
    let height = lines as f32 * LINE_HEIGHT;
    let chars = (lines as f32 * (x1 - x0) / CHAR_WIDTH).round() as usize;
    RawElement::new(page, [x0, y0, x1, y0 + height], "text", filler(seed, chars))
}

/// A labeled section heading.
pub fn heading(page: u32, x0: f32, y0: f32, width: f32, height: f32, text: &str) -> RawElement {
    RawElement::new(page, [x0, y0, x0 + width, y0 + height], "section_header", text)
}

/// Running header and page-number footer, labeled as plain text.
pub fn furniture(page: u32) -> Vec<RawElement> {
    vec![
        RawElement::new(page, [0.35, 0.02, 0.65, 0.035], "text", "Quarterly Report"),
        RawElement::new(page, [0.45, 0.95, 0.55, 0.965], "text", format!("Page {}", page)),
    ]
}

/// One two-column page: a heading atop the left column and six paragraphs
/// per column.
pub fn two_column_page(page: u32) -> Vec<RawElement> {
    let seed = page as usize * 100;
    let mut elements = vec![heading(
        page,
        0.08,
        0.08,
        0.3,
        0.025,
        &format!("Topic {}", spell(page as usize)),
    )];

    let mut y = 0.115;
    for i in 0..6 {
        elements.push(paragraph(page, 0.08, 0.46, y, 6, seed + i));
        y += 6.0 * LINE_HEIGHT + 0.015;
    }

    let mut y = 0.08;
    for i in 0..6 {
        elements.push(paragraph(page, 0.54, 0.92, y, 6, seed + 50 + i));
        y += 6.0 * LINE_HEIGHT + 0.015;
    }
    elements
}

/// Two-column pages with a running header and footer on each.
pub fn two_column_document(pages: u32) -> Vec<RawElement> {
    (1..=pages)
        .flat_map(|page| {
            let mut elements = furniture(page);
            elements.extend(two_column_page(page));
            elements
        })
        .collect()
}

/// Headings at three sizes under a document title, over two pages.
pub fn tiered_document() -> Vec<RawElement> {
    let pages: [&[(&str, f32)]; 2] = [
        &[
            ("Overview", 0.036),
            ("Market trends", 0.0288),
            ("Regional detail", 0.0216),
            ("Operations", 0.036),
        ],
        &[
            ("Finance", 0.036),
            ("Capital spending", 0.0288),
            ("Equipment purchases", 0.0216),
            ("Outlook", 0.036),
            ("Risks", 0.036),
        ],
    ];

    let mut elements = vec![RawElement::new(
        1,
        [0.1, 0.03, 0.7, 0.08],
        "title",
        "Annual Report",
    )];
    let mut seed = 0;
    for (index, sections) in pages.iter().enumerate() {
        let page = index as u32 + 1;
        let mut y = if page == 1 { 0.1 } else { 0.05 };
        for &(title, height) in sections.iter() {
            elements.push(heading(page, 0.1, y, 0.4, height, title));
            y += height + 0.01;
            elements.push(paragraph(page, 0.1, 0.9, y, 2, seed));
            seed += 1;
            y += 2.0 * LINE_HEIGHT + 0.02;
        }
    }
    elements
}

/// Full-width paragraphs stacked down each page.
pub fn single_column_document(pages: u32) -> Vec<RawElement> {
    let mut elements = Vec::new();
    for page in 1..=pages {
        let mut y = 0.08;
        for i in 0..5 {
            elements.push(paragraph(page, 0.05, 0.95, y, 4, page as usize * 10 + i));
            y += 4.0 * LINE_HEIGHT + 0.03;
        }
    }
    elements
}
