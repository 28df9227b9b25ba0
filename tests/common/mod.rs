//! Shared page fixtures for the integration tests.

#![allow(dead_code)]

use pagemark::model::Color;
use pagemark::{BBox, DrawingPrimitive, PageGeometry, TextRun};

pub const LEFT: f32 = 72.0;
pub const RIGHT: f32 = 540.0;

/// A run whose box spans `width` points from `x` with the height of its size.
pub fn run(text: &str, x: f32, y: f32, width: f32, font: &str, size: f32) -> TextRun {
    TextRun::new(text, BBox::new(x, y, x + width, y + size), font, size)
}

/// A full-measure body line in 10pt Times.
pub fn body_line(text: &str, y: f32) -> TextRun {
    run(text, LEFT, y, RIGHT - LEFT, "Times-Roman", 10.0)
}

/// One 24pt title, three 14pt bold headings and 40 body lines.
pub fn report_page() -> PageGeometry {
    let mut page = PageGeometry::letter(0);
    page.push_run(run("Annual Report", LEFT, 60.0, 200.0, "Helvetica-Bold", 24.0));

    let sections = [("Introduction", 13), ("Methods", 13), ("Results", 14)];
    let mut y = 100.0;
    let mut line = 0;
    for (heading, lines) in sections {
        page.push_run(run(heading, LEFT, y, 120.0, "Helvetica-Bold", 14.0));
        y += 24.0;
        for _ in 0..lines {
            page.push_run(body_line(&format!("body text of line {} runs across the measure", line), y));
            line += 1;
            y += 12.0;
        }
        y += 10.0;
    }
    page
}

/// Texts of a 3 × 4 table: a header row and two data rows.
pub const TABLE_CELLS: [[&str; 4]; 3] = [
    ["Name", "Qty", "Price", "Total"],
    ["alpha", "3", "1.50", "4.50"],
    ["beta", "2", "2.25", "4.50"],
];

pub const GRID_LEFT: f32 = 72.0;
pub const GRID_TOP: f32 = 200.0;
pub const CELL_WIDTH: f32 = 100.0;
pub const ROW_HEIGHT: f32 = 30.0;

/// A 3 × 4 grid drawn with 176 rectangles: a stroked box per cell plus
/// every border split into short hairline pieces, and a run centered in
/// each cell.
pub fn ruled_table_page() -> PageGeometry {
    let mut page = PageGeometry::letter(0);
    let black = Color::rgb(0, 0, 0);
    let width = 4.0 * CELL_WIDTH;
    let height = 3.0 * ROW_HEIGHT;

    // 12 cell boxes
    for row in 0..3 {
        for col in 0..4 {
            page.push_primitive(DrawingPrimitive::rect(BBox::from_origin(
                GRID_LEFT + col as f32 * CELL_WIDTH,
                GRID_TOP + row as f32 * ROW_HEIGHT,
                CELL_WIDTH,
                ROW_HEIGHT,
            )));
        }
    }

    // 4 horizontal borders of 16 filled hairlines each
    let piece = width / 16.0;
    for row in 0..=3 {
        let y = GRID_TOP + row as f32 * ROW_HEIGHT;
        for i in 0..16 {
            let x = GRID_LEFT + i as f32 * piece;
            page.push_primitive(DrawingPrimitive::filled_rect(
                BBox::new(x, y - 0.25, x + piece, y + 0.25),
                black,
            ));
        }
    }

    // 5 vertical borders of 20 stroked slivers each
    let piece = height / 20.0;
    for col in 0..=4 {
        let x = GRID_LEFT + col as f32 * CELL_WIDTH;
        for i in 0..20 {
            let y = GRID_TOP + i as f32 * piece;
            page.push_primitive(DrawingPrimitive::rect(BBox::new(x - 0.25, y, x + 0.25, y + piece)));
        }
    }

    for (row, cells) in TABLE_CELLS.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            let text_width = 6.0 * text.len() as f32;
            let x = GRID_LEFT + col as f32 * CELL_WIDTH + (CELL_WIDTH - text_width) / 2.0;
            let y = GRID_TOP + row as f32 * ROW_HEIGHT + (ROW_HEIGHT - 10.0) / 2.0;
            page.push_run(run(text, x, y, text_width, "Helvetica", 10.0));
        }
    }
    page
}

/// Two columns of three-word lines, 12pt high, separated by a 40pt gutter.
pub fn two_column_page(lines: usize) -> PageGeometry {
    let mut page = PageGeometry::letter(0);
    let word = 50.0;
    let gap = 3.0;
    let column_width = 3.0 * word + 2.0 * gap;
    for (column, x0) in [(0, LEFT), (1, LEFT + column_width + 40.0)] {
        for line in 0..lines {
            let y = 100.0 + line as f32 * 14.0;
            for k in 0..3 {
                let x = x0 + k as f32 * (word + gap);
                page.push_run(run(
                    &format!("c{}l{}w{}", column, line, k),
                    x,
                    y,
                    word,
                    "Times-Roman",
                    12.0,
                ));
            }
        }
    }
    page
}

/// A page of body lines starting at `top`.
pub fn body_page(index: usize, top: f32, texts: &[&str]) -> PageGeometry {
    let mut page = PageGeometry::letter(index);
    for (i, text) in texts.iter().enumerate() {
        page.push_run(body_line(text, top + i as f32 * 12.0));
    }
    page
}

/// A paragraph that runs off the bottom of page 0 and ends on page 1.
pub fn split_paragraph_pages() -> Vec<PageGeometry> {
    vec![
        body_page(
            0,
            640.0,
            &[
                "the paragraph begins near the bottom of the first page",
                "and keeps going with a second full line of words",
                "until the page runs out in the middle of the",
            ],
        ),
        body_page(
            1,
            72.0,
            &[
                "sentence that continues on the following page",
                "and finally ends here.",
            ],
        ),
    ]
}

/// `two_column_page(10)` under a masthead and over a footer, both running
/// the full width of the two columns.
pub fn masthead_page() -> PageGeometry {
    let mut page = two_column_page(10);
    let width = 2.0 * 156.0 + 40.0;
    page.push_run(run("The Quarterly Gazette masthead", LEFT, 60.0, width, "Times-Roman", 12.0));
    page.push_run(run("Printed footer under both columns", LEFT, 260.0, width, "Times-Roman", 12.0));
    page
}

/// Ruled 3 × 3 grid with 100pt columns and 20pt rows from `top`.
pub fn push_ruled_grid(page: &mut PageGeometry, top: f32, cells: [[&str; 3]; 3]) {
    for row in 0..=3 {
        let y = top + row as f32 * 20.0;
        page.push_primitive(DrawingPrimitive::line(GRID_LEFT, y, GRID_LEFT + 300.0, y));
    }
    for col in 0..=3 {
        let x = GRID_LEFT + col as f32 * 100.0;
        page.push_primitive(DrawingPrimitive::line(x, top, x, top + 60.0));
    }
    for (row, texts) in cells.iter().enumerate() {
        for (col, text) in texts.iter().enumerate() {
            let x = GRID_LEFT + col as f32 * 100.0 + 10.0;
            let y = top + row as f32 * 20.0 + 5.0;
            page.push_run(run(text, x, y, 6.0 * text.len() as f32, "Helvetica", 10.0));
        }
    }
}

/// Two ruled tables of the same width with a body line between them.
pub fn stacked_tables_page() -> PageGeometry {
    let mut page = PageGeometry::letter(0);
    push_ruled_grid(
        &mut page,
        100.0,
        [["Item", "Qty", "Cost"], ["pens", "4", "2.00"], ["ink", "1", "9.50"]],
    );
    page.push_run(body_line("A paragraph sits between the two tables.", 175.0));
    push_ruled_grid(
        &mut page,
        200.0,
        [["City", "Zone", "Rate"], ["Oslo", "N", "0.25"], ["Rome", "S", "0.22"]],
    );
    page
}

/// An aligned 4 × 3 table of short cells in the left column and 16 lines
/// of prose in the right column.
pub fn table_beside_prose_page() -> PageGeometry {
    let mut page = PageGeometry::letter(0);
    for row in 0..4 {
        for col in 0..3 {
            let x = LEFT + col as f32 * 42.0;
            let y = 100.0 + row as f32 * 14.0;
            page.push_run(run(&format!("v{}{}", row, col), x, y, 30.0, "Helvetica", 10.0));
        }
    }
    for line in 0..16 {
        let number = line.to_string();
        let words = ["right", "prose", "line", number.as_str(), "goes", "on"];
        for (k, word) in words.iter().enumerate() {
            let x = 320.0 + k as f32 * 28.0;
            let y = 100.0 + line as f32 * 14.0;
            page.push_run(run(word, x, y, 25.0, "Times-Roman", 10.0));
        }
    }
    page
}
