//! Property tests over randomly generated page geometry.

use std::collections::HashSet;

use proptest::prelude::*;

use pagemark::{
    convert, convert_with_options, BBox, ConvertOptions, DrawingPrimitive, FontRole, PageGeometry,
    TextRun,
};

const WORDS: [&str; 8] = ["lorem", "ipsum", "dolor", "sit", "amet", "Table", "1.", "•"];
const FONTS: [&str; 3] = ["Times-Roman", "Helvetica-Bold", "Times-Italic"];
const SIZES: [f32; 5] = [8.0, 10.0, 12.0, 14.0, 18.0];

fn run_strategy() -> impl Strategy<Value = TextRun> {
    (
        0..WORDS.len(),
        0..FONTS.len(),
        0..SIZES.len(),
        40.0f32..500.0,
        40.0f32..740.0,
        5.0f32..200.0,
    )
        .prop_map(|(word, font, size, x, y, width)| {
            let size = SIZES[size];
            TextRun::new(WORDS[word], BBox::new(x, y, x + width, y + size), FONTS[font], size)
        })
}

fn primitive_strategy() -> impl Strategy<Value = DrawingPrimitive> {
    (any::<bool>(), 40.0f32..500.0, 40.0f32..740.0, 1.0f32..150.0).prop_map(
        |(horizontal, x, y, len)| {
            if horizontal {
                DrawingPrimitive::line(x, y, x + len, y)
            } else {
                DrawingPrimitive::line(x, y, x, y + len)
            }
        },
    )
}

fn page_strategy(index: usize) -> impl Strategy<Value = PageGeometry> {
    (
        prop::collection::vec(run_strategy(), 0..40),
        prop::collection::vec(primitive_strategy(), 0..12),
    )
        .prop_map(move |(runs, primitives)| {
            let mut page = PageGeometry::letter(index);
            for run in runs {
                page.push_run(run);
            }
            for primitive in primitives {
                page.push_primitive(primitive);
            }
            page
        })
}

fn document_strategy() -> impl Strategy<Value = Vec<PageGeometry>> {
    (page_strategy(0), page_strategy(1), page_strategy(2)).prop_map(|(a, b, c)| vec![a, b, c])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_run_lands_in_exactly_one_block(pages in document_strategy()) {
        prop_assume!(pages.iter().any(|p| !p.runs.is_empty()));
        let doc = convert(&pages).unwrap();

        let mut seen = HashSet::new();
        for block in &doc.blocks {
            for key in block.page_runs() {
                prop_assert!(seen.insert(key), "run {:?} emitted twice", key);
            }
        }
        let expected: HashSet<(usize, usize)> = pages
            .iter()
            .flat_map(|p| {
                p.runs
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| !r.is_degenerate())
                    .map(move |(id, _)| (p.page_index, id))
            })
            .collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn conversion_is_deterministic(pages in document_strategy()) {
        prop_assume!(pages.iter().any(|p| !p.runs.is_empty()));
        let first = convert(&pages).unwrap();
        let second = convert(&pages).unwrap();
        let sequential = convert_with_options(&pages, ConvertOptions::new().sequential()).unwrap();

        prop_assert_eq!(&first.blocks, &second.blocks);
        prop_assert_eq!(&first.blocks, &sequential.blocks);
        prop_assert_eq!(&first.roles, &sequential.roles);
    }

    #[test]
    fn larger_headings_never_rank_lower(pages in document_strategy()) {
        prop_assume!(pages.iter().any(|p| !p.runs.is_empty()));
        let doc = convert(&pages).unwrap();

        let headings: Vec<_> = doc.roles.iter().filter(|a| a.role.is_heading()).collect();
        for a in &headings {
            for b in &headings {
                if a.size > b.size {
                    prop_assert!(a.role <= b.role, "{:?} below {:?}", a, b);
                }
            }
        }
        let titles = doc.roles.iter().filter(|a| a.role == FontRole::Title).count();
        prop_assert!(titles <= 1);
    }

    #[test]
    fn table_cells_hold_disjoint_runs(pages in document_strategy()) {
        prop_assume!(pages.iter().any(|p| !p.runs.is_empty()));
        let doc = convert(&pages).unwrap();

        for table in doc.tables() {
            let mut owned = HashSet::new();
            for id in table.region.all_runs() {
                prop_assert!(owned.insert(id));
            }
            prop_assert_eq!(table.rows.len(), table.region.row_count());
            for row in &table.rows {
                prop_assert_eq!(row.len(), table.region.column_count());
            }
        }
    }

    #[test]
    fn markdown_rendering_never_fails(pages in document_strategy()) {
        prop_assume!(pages.iter().any(|p| !p.runs.is_empty()));
        let doc = convert(&pages).unwrap();
        let markdown = pagemark::render::to_markdown(&doc, &Default::default()).unwrap();
        prop_assert_eq!(markdown.trim(), markdown.as_str());
    }
}
