//! Text cleanup applied to rendered output.

use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

/// Typographic ligatures and their expansions.
const LIGATURES: [(char, &str); 7] = [
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\u{FB05}', "st"),
    ('\u{FB06}', "st"),
];

/// Bullet glyphs folded into `•`.
const BULLETS: [char; 10] = ['●', '○', '■', '□', '◆', '◇', '▪', '▫', '►', '▻'];

/// Cleanup preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPreset {
    /// Unicode NFC normalization and whitespace only
    Minimal,
    /// Ligatures, bullets, hyphenation, stray page numbers
    #[default]
    Standard,
    /// Standard plus private-use glyph removal
    Aggressive,
}

/// Options for text cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupOptions {
    /// Normalize Unicode to NFC form
    pub normalize_unicode: bool,

    /// Expand ligatures (ﬁ, ﬂ, ...)
    pub fix_ligatures: bool,

    /// Standardize bullet characters (●, ○, ■ → •)
    pub standardize_bullets: bool,

    /// Drop lines holding only a page number
    pub remove_page_numbers: bool,

    /// Join words still hyphenated before a space or line break
    pub fix_hyphenation: bool,

    /// Remove Private Use Area characters
    pub remove_pua: bool,

    /// Remove the Unicode replacement character (U+FFFD)
    pub remove_replacement_char: bool,

    /// Collapse runs of three or more spaces outside tables
    pub normalize_whitespace: bool,

    /// Maximum consecutive blank lines (0 = unlimited)
    pub max_blank_lines: u8,
}

impl CleanupOptions {
    /// Create options from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Self {
        match preset {
            CleanupPreset::Minimal => Self::minimal(),
            CleanupPreset::Standard => Self::standard(),
            CleanupPreset::Aggressive => Self::aggressive(),
        }
    }

    /// Minimal cleanup options.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
            standardize_bullets: false,
            remove_page_numbers: false,
            fix_hyphenation: false,
            remove_pua: false,
            remove_replacement_char: false,
            normalize_whitespace: true,
            max_blank_lines: 0,
        }
    }

    /// Standard cleanup options.
    pub fn standard() -> Self {
        Self {
            fix_ligatures: true,
            standardize_bullets: true,
            remove_page_numbers: true,
            fix_hyphenation: true,
            remove_replacement_char: true,
            max_blank_lines: 1,
            ..Self::minimal()
        }
    }

    /// Aggressive cleanup options.
    pub fn aggressive() -> Self {
        Self {
            remove_pua: true,
            ..Self::standard()
        }
    }
}

impl Default for CleanupOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text cleanup pipeline.
#[derive(Debug, Clone)]
pub struct CleanupPipeline {
    options: CleanupOptions,
    page_number: Regex,
    hyphenation: Regex,
    spaces: Regex,
}

impl CleanupPipeline {
    /// Create a new cleanup pipeline with the given options.
    pub fn new(options: CleanupOptions) -> Result<Self> {
        Ok(Self {
            options,
            page_number: Regex::new(r"^\s*(?:[-–—]\s*)?(?:[Pp]age\s+)?\d{1,4}(?:\s*[-–—])?\s*$")?,
            hyphenation: Regex::new(r"([a-zA-Z])-(?:[ \t]*\n[ \t]*|[ \t]+)([a-z])")?,
            spaces: Regex::new(r"[ ]{3,}")?,
        })
    }

    /// Create a pipeline from a preset.
    pub fn from_preset(preset: CleanupPreset) -> Result<Self> {
        Self::new(CleanupOptions::from_preset(preset))
    }

    /// Process text through the cleanup pipeline. A leading YAML
    /// frontmatter block is left untouched.
    pub fn process(&self, text: &str) -> String {
        match split_frontmatter(text) {
            Some((frontmatter, content)) => {
                format!("{}\n{}", frontmatter, self.process_content(content))
            }
            None => self.process_content(text),
        }
    }

    fn process_content(&self, text: &str) -> String {
        let options = &self.options;

        // Step 1: character-level fixes
        let mut result: String = if options.normalize_unicode {
            text.nfc().collect()
        } else {
            text.to_string()
        };
        if options.fix_ligatures {
            for (ligature, expansion) in LIGATURES {
                result = result.replace(ligature, expansion);
            }
        }
        if options.standardize_bullets {
            result = result.replace(&BULLETS[..], "•");
        }
        if options.remove_pua {
            result.retain(|c| !is_private_use(c));
        }
        if options.remove_replacement_char {
            result.retain(|c| c != '\u{FFFD}');
        }

        // Step 2: line-level fixes
        if options.fix_hyphenation {
            result = self.hyphenation.replace_all(&result, "$1$2").into_owned();
        }
        let lines: Vec<String> = result
            .lines()
            .filter(|line| !(options.remove_page_numbers && self.page_number.is_match(line)))
            .map(|line| {
                if options.normalize_whitespace && !line.trim_start().starts_with('|') {
                    self.spaces.replace_all(line.trim_end(), "  ").into_owned()
                } else {
                    line.trim_end().to_string()
                }
            })
            .collect();

        // Step 3: blank-line limit
        let mut out: Vec<String> = Vec::with_capacity(lines.len());
        let mut blanks = 0usize;
        for line in lines {
            if line.is_empty() {
                blanks += 1;
                if options.max_blank_lines > 0 && blanks > options.max_blank_lines as usize {
                    continue;
                }
            } else {
                blanks = 0;
            }
            out.push(line);
        }

        out.join("\n").trim().to_string()
    }
}

fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix("---\n")?;
    let end = body.find("\n---\n")?;
    let split = 4 + end + 5;
    Some((&text[..split], &text[split..]))
}

fn is_private_use(c: char) -> bool {
    matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD)
}
