//! Document-wide font hierarchy.
//!
//! Every run is reduced to a [`FontSignature`]. Signatures are counted over
//! the whole document (phase one, page-parallel, mergeable), then ranked
//! once into a [`RoleMap`] that every page worker reads.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::model::{FontRole, PageGeometry, RoleAssignment, TextRun};

/// Runs starting within this fraction of the page height count as "top of page".
const TOP_OF_PAGE_FRACTION: f32 = 0.33;

/// Font size difference (in half points) still treated as the same size.
const SIZE_STEP_TOLERANCE: u32 = 1;

/// Font identity used for role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontSignature {
    /// Font identifier
    pub font_id: String,
    /// Size rounded to half points
    pub half_points: u32,
    /// Bold flag
    pub bold: bool,
    /// Italic flag
    pub italic: bool,
    /// Condensed flag
    pub condensed: bool,
}

impl FontSignature {
    /// Signature of a run.
    pub fn of(run: &TextRun) -> Self {
        let size = if run.size > 0.0 { run.size } else { run.bbox.height() };
        Self {
            font_id: run.font_id.clone(),
            half_points: (size * 2.0).round().max(0.0) as u32,
            bold: run.style.bold,
            italic: run.style.italic,
            condensed: run.style.condensed,
        }
    }

    /// Size in points.
    pub fn size(&self) -> f32 {
        self.half_points as f32 / 2.0
    }
}

#[derive(Debug, Clone, Copy)]
struct SignatureStats {
    chars: usize,
    runs: usize,
    /// Earliest placement as `(page_index, top / page height)`
    earliest: (usize, f32),
}

impl SignatureStats {
    fn merge(&mut self, other: &SignatureStats) {
        self.chars += other.chars;
        self.runs += other.runs;
        if earlier(other.earliest, self.earliest) {
            self.earliest = other.earliest;
        }
    }
}

fn earlier(a: (usize, f32), b: (usize, f32)) -> bool {
    a.0 < b.0 || (a.0 == b.0 && a.1 < b.1)
}

/// Per-signature counts gathered during the first pass.
#[derive(Debug, Clone, Default)]
pub struct SignatureAccumulator {
    stats: HashMap<FontSignature, SignatureStats>,
    first_page: Option<usize>,
}

impl SignatureAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator for a single page.
    pub fn from_page(page: &PageGeometry) -> Self {
        let mut acc = Self::new();
        acc.observe_page(page);
        acc
    }

    /// Count every non-degenerate run of a page.
    pub fn observe_page(&mut self, page: &PageGeometry) {
        let height = page.page_box().height();
        for run in page.runs.iter().filter(|r| !r.is_degenerate()) {
            let rel_top = if height > 0.0 { run.bbox.y0 / height } else { 0.0 };
            let entry = SignatureStats {
                chars: run.char_count(),
                runs: 1,
                earliest: (page.page_index, rel_top),
            };
            self.stats
                .entry(FontSignature::of(run))
                .and_modify(|s| s.merge(&entry))
                .or_insert(entry);
        }
        if !page.runs.is_empty() {
            self.first_page = Some(
                self.first_page
                    .map_or(page.page_index, |p| p.min(page.page_index)),
            );
        }
    }

    /// Combine two accumulators (order-independent).
    pub fn merge(mut self, other: SignatureAccumulator) -> Self {
        for (sig, stats) in other.stats {
            self.stats
                .entry(sig)
                .and_modify(|s| s.merge(&stats))
                .or_insert(stats);
        }
        self.first_page = match (self.first_page, other.first_page) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self
    }

    /// Number of distinct signatures.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    /// Check if no run was observed.
    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

/// Role of every signature in the document.
#[derive(Debug, Clone, Default)]
pub struct RoleMap {
    roles: HashMap<FontSignature, FontRole>,
    body: Option<FontSignature>,
    assignments: Vec<RoleAssignment>,
}

impl RoleMap {
    /// Role of a run. Signatures never observed are body text.
    pub fn role_of(&self, run: &TextRun) -> FontRole {
        self.role_of_signature(&FontSignature::of(run))
    }

    /// Role of a signature.
    pub fn role_of_signature(&self, signature: &FontSignature) -> FontRole {
        self.roles.get(signature).copied().unwrap_or(FontRole::Body)
    }

    /// Body text size in points, if any text was observed.
    pub fn body_size(&self) -> Option<f32> {
        self.body.as_ref().map(FontSignature::size)
    }

    /// Whether a title signature was found.
    pub fn has_title(&self) -> bool {
        self.roles.values().any(|r| *r == FontRole::Title)
    }

    /// Every signature with its role, most prominent first.
    pub fn assignments(&self) -> &[RoleAssignment] {
        &self.assignments
    }

    /// Number of signatures.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if no signature is mapped.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Ranks font signatures into roles.
#[derive(Debug, Clone)]
pub struct TypographyProfiler {
    heading_level_cap: u8,
}

impl TypographyProfiler {
    /// Create a profiler with the default heading cap of 6.
    pub fn new() -> Self {
        Self {
            heading_level_cap: 6,
        }
    }

    /// Limit the number of heading levels; deeper levels collapse into the last.
    ///
    /// A title takes Markdown level 1, so with a title the cap is at most 5
    /// and every heading level keeps a distinct `#` depth.
    pub fn with_heading_level_cap(mut self, cap: u8) -> Self {
        self.heading_level_cap = cap.max(1);
        self
    }

    /// Build the role map. Never fails: without typographic signal every
    /// signature is body text.
    pub fn profile(&self, acc: &SignatureAccumulator) -> RoleMap {
        let mut entries: Vec<(&FontSignature, &SignatureStats)> = acc.stats.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        // Step 1: body = most text by volume
        let Some(&(body, _)) = entries.iter().min_by(|a, b| {
            b.1.chars
                .cmp(&a.1.chars)
                .then(b.1.runs.cmp(&a.1.runs))
                .then(a.0.half_points.cmp(&b.0.half_points))
                .then(a.0.cmp(b.0))
        }) else {
            return RoleMap::default();
        };

        let mut roles: HashMap<FontSignature, FontRole> = entries
            .iter()
            .map(|(sig, _)| ((*sig).clone(), FontRole::Body))
            .collect();

        // Step 2: candidates ranked above body (larger, or bolder at body size)
        let mut candidates: Vec<(&FontSignature, &SignatureStats)> = entries
            .iter()
            .copied()
            .filter(|(sig, _)| {
                *sig != body
                    && (sig.half_points > body.half_points + SIZE_STEP_TOLERANCE
                        || (near(sig, body) && sig.bold && !body.bold))
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.0.half_points
                .cmp(&a.0.half_points)
                .then(b.0.bold.cmp(&a.0.bold))
                .then(a.1.runs.cmp(&b.1.runs))
                .then(a.0.cmp(b.0))
        });

        let first_page = acc.first_page.unwrap_or(0);
        let title = self.find_title(&candidates, first_page);

        if entries.len() < 3 {
            // Step 3a: too little signal for a hierarchy
            if let Some(title) = title {
                roles.insert(title.clone(), FontRole::Title);
            }
        } else {
            // Step 3b: title, heading levels, then small print and emphasis
            let cap = match title {
                Some(title) => {
                    roles.insert(title.clone(), FontRole::Title);
                    self.heading_level_cap.min(5)
                }
                None => self.heading_level_cap,
            };
            let mut level = 0u8;
            let mut last_key: Option<(u32, bool)> = None;
            for (sig, _) in candidates.iter().filter(|(sig, _)| Some(*sig) != title) {
                let key = (sig.half_points, sig.bold);
                if last_key != Some(key) {
                    level = level.saturating_add(1);
                    last_key = Some(key);
                }
                roles.insert((*sig).clone(), FontRole::Heading(level.min(cap)));
            }
            for (sig, _) in &entries {
                if roles.get(*sig) != Some(&FontRole::Body) || *sig == body {
                    continue;
                }
                if sig.half_points + SIZE_STEP_TOLERANCE < body.half_points {
                    roles.insert((*sig).clone(), FontRole::Caption);
                } else if near(sig, body)
                    && ((sig.italic && !body.italic) || (sig.condensed && !body.condensed))
                {
                    roles.insert((*sig).clone(), FontRole::Emphasis);
                }
            }
        }

        let mut assignments: Vec<RoleAssignment> = entries
            .iter()
            .map(|(sig, stats)| RoleAssignment {
                font_id: sig.font_id.clone(),
                size: sig.size(),
                bold: sig.bold,
                italic: sig.italic,
                chars: stats.chars,
                role: roles.get(*sig).copied().unwrap_or(FontRole::Body),
            })
            .collect();
        assignments.sort_by(|a, b| {
            a.role
                .cmp(&b.role)
                .then(b.size.partial_cmp(&a.size).unwrap_or(Ordering::Equal))
                .then(a.font_id.cmp(&b.font_id))
        });

        log::debug!(
            "TypographyProfiler: {} signatures, body {:.1}pt, roles {:?}",
            entries.len(),
            body.size(),
            assignments.iter().map(|a| (a.size, a.role)).collect::<Vec<_>>()
        );

        RoleMap {
            roles,
            body: Some(body.clone()),
            assignments,
        }
    }

    /// The single largest candidate, no more frequent than any other
    /// candidate, first seen near the top of the first page.
    fn find_title<'s>(
        &self,
        candidates: &[(&'s FontSignature, &SignatureStats)],
        first_page: usize,
    ) -> Option<&'s FontSignature> {
        let (top, top_stats) = candidates.first()?;
        let unique_size = candidates
            .iter()
            .skip(1)
            .all(|(sig, _)| sig.half_points < top.half_points);
        let rarest = candidates
            .iter()
            .skip(1)
            .all(|(_, stats)| top_stats.runs <= stats.runs);
        let (page, rel_top) = top_stats.earliest;
        let near_top = page == first_page && rel_top <= TOP_OF_PAGE_FRACTION;
        (unique_size && rarest && near_top).then_some(*top)
    }
}

impl Default for TypographyProfiler {
    fn default() -> Self {
        Self::new()
    }
}

fn near(a: &FontSignature, b: &FontSignature) -> bool {
    a.half_points.abs_diff(b.half_points) <= SIZE_STEP_TOLERANCE
}
