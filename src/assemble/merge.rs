//! Cross-page paragraph continuation.

use crate::analysis::tolerance;
use crate::model::{Block, BlockKind, Continuation};

use super::join_lines;

/// Concatenate per-page block sequences in page order.
///
/// With `merge_paragraphs`, a page's trailing paragraph absorbs the next
/// page's leading paragraph when both carry the same role and sit in the
/// same column x-range. Pages are processed in order, so a paragraph can
/// run across several pages.
pub fn merge_pages(pages: Vec<Vec<Block>>, merge_paragraphs: bool) -> Vec<Block> {
    let mut merged: Vec<Block> = Vec::with_capacity(pages.iter().map(Vec::len).sum());
    let mut joins = 0usize;

    for page in pages {
        let mut blocks = page.into_iter();
        if merge_paragraphs {
            if let Some(first) = blocks.next() {
                match merged.last_mut() {
                    Some(prev) if continues(prev, &first) => {
                        absorb(prev, first);
                        joins += 1;
                    }
                    _ => merged.push(first),
                }
            }
        }
        merged.extend(blocks);
    }

    log::debug!(
        "merge_pages: {} blocks, {} cross-page continuations",
        merged.len(),
        joins
    );
    merged
}

/// Whether `next` continues the paragraph `prev` on the following page.
fn continues(prev: &Block, next: &Block) -> bool {
    if !prev.is_paragraph() || !next.is_paragraph() {
        return false;
    }
    if prev.role != next.role || next.page_index != prev.last_page() + 1 {
        return false;
    }
    let tol = tolerance::continuation_tolerance(prev.line_height.max(next.line_height));
    let same_left = (prev.bbox.x0 - next.bbox.x0).abs() <= tol;
    // a one-line tail may end short of the right edge
    let same_right = next.lines.len() <= 1 || (prev.bbox.x1 - next.bbox.x1).abs() <= tol;
    same_left && same_right
}

fn absorb(prev: &mut Block, next: Block) {
    let Block {
        kind,
        page_index,
        lines,
        continued,
        ..
    } = next;
    if let (BlockKind::Paragraph { spans }, BlockKind::Paragraph { spans: more }) =
        (&mut prev.kind, kind)
    {
        join_lines(spans, more);
    }
    prev.continued.push(Continuation { page_index, lines });
    prev.continued.extend(continued);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, FontRole, InlineText};

    fn paragraph(page: usize, text: &str, x0: f32, x1: f32, lines: usize) -> Block {
        Block {
            kind: BlockKind::Paragraph {
                spans: vec![InlineText::plain(text)],
            },
            page_index: page,
            bbox: BBox::new(x0, 100.0, x1, 100.0 + 12.0 * lines as f32),
            role: FontRole::Body,
            line_height: 10.0,
            lines: (0..lines).map(|i| vec![i]).collect(),
            continued: Vec::new(),
        }
    }

    fn heading(page: usize, text: &str) -> Block {
        Block {
            kind: BlockKind::Heading {
                level: 2,
                text: text.into(),
            },
            page_index: page,
            bbox: BBox::new(72.0, 60.0, 200.0, 74.0),
            role: FontRole::Heading(1),
            line_height: 14.0,
            lines: vec![vec![0]],
            continued: Vec::new(),
        }
    }

    #[test]
    fn test_merge_split_paragraph() {
        let pages = vec![
            vec![heading(0, "Intro"), paragraph(0, "The sentence runs", 72.0, 540.0, 3)],
            vec![paragraph(1, "onto the next page.", 72.0, 540.0, 2)],
        ];
        let blocks = merge_pages(pages, true);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].plain_text(), "The sentence runs onto the next page.");
        assert_eq!(blocks[1].last_page(), 1);
        assert_eq!(blocks[1].page_runs().count(), 5);
    }

    #[test]
    fn test_merge_disabled_keeps_blocks() {
        let pages = vec![
            vec![paragraph(0, "The sentence runs", 72.0, 540.0, 3)],
            vec![paragraph(1, "onto the next page.", 72.0, 540.0, 2)],
        ];
        let blocks = merge_pages(pages, false);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].plain_text(), "The sentence runs");
        assert!(blocks.iter().all(|b| b.continued.is_empty()));
    }

    #[test]
    fn test_no_merge_across_column_change() {
        let pages = vec![
            vec![paragraph(0, "left column", 72.0, 290.0, 3)],
            vec![paragraph(1, "different measure", 320.0, 540.0, 3)],
        ];
        assert_eq!(merge_pages(pages, true).len(), 2);
    }

    #[test]
    fn test_no_merge_after_heading_or_skipped_page() {
        let pages = vec![
            vec![paragraph(0, "body", 72.0, 540.0, 3)],
            vec![heading(1, "Next"), paragraph(1, "more", 72.0, 540.0, 3)],
        ];
        assert_eq!(merge_pages(pages, true).len(), 3);

        let pages = vec![
            vec![paragraph(0, "body", 72.0, 540.0, 3)],
            vec![],
            vec![paragraph(2, "more", 72.0, 540.0, 3)],
        ];
        assert_eq!(merge_pages(pages, true).len(), 2);
    }

    #[test]
    fn test_short_tail_line_still_merges() {
        let pages = vec![
            vec![paragraph(0, "almost done", 72.0, 540.0, 4)],
            vec![paragraph(1, "end.", 72.0, 110.0, 1)],
        ];
        let blocks = merge_pages(pages, true);
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_paragraph_spans_three_pages() {
        let pages = vec![
            vec![paragraph(0, "one", 72.0, 540.0, 3)],
            vec![paragraph(1, "two", 72.0, 540.0, 40)],
            vec![paragraph(2, "three", 72.0, 540.0, 2)],
        ];
        let blocks = merge_pages(pages, true);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].plain_text(), "one two three");
        assert_eq!(blocks[0].continued.len(), 2);
    }
}
