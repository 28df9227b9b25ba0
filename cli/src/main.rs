//! pagemark CLI - convert PDF page geometry dumps to Markdown

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use crossbeam_channel::unbounded;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

use pagemark::{
    CleanupPreset, ConversionEvent, ConvertOptions, Converter, Document, GeometryDocument,
    HeadingStyle, JsonFormat, PageSelection, PageStatus, RenderOptions,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pagemark")]
#[command(version)]
#[command(about = "Convert PDF page geometry to Markdown, text and JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert geometry to Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        /// Heading syntax
        #[arg(long, value_enum, default_value = "atx")]
        heading_style: HeadingMode,

        /// Maximum heading level written (1-6)
        #[arg(long, default_value = "6")]
        max_heading: u8,

        /// Wrap paragraphs at this width (0 = no wrap)
        #[arg(long, default_value = "0")]
        wrap: usize,

        /// Write a horizontal rule where a new page starts
        #[arg(long)]
        page_separators: bool,

        /// Do not escape Markdown special characters
        #[arg(long)]
        no_escape: bool,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,
    },

    /// Convert geometry to plain text
    Text {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Text cleanup preset
        #[arg(long, value_enum)]
        cleanup: Option<CleanupLevel>,
    },

    /// Convert geometry to the block structure as JSON
    Json {
        #[command(flatten)]
        convert: ConvertArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show font roles and per-page analysis results
    Info {
        #[command(flatten)]
        convert: ConvertArgs,
    },
}

/// Options shared by every conversion command.
#[derive(Args)]
struct ConvertArgs {
    /// Input geometry JSON file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// JSON file with `convert` and `render` option sections
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Deepest heading level assigned to font roles (1-6)
    #[arg(long)]
    heading_cap: Option<u8>,

    /// Scale of the column gap threshold
    #[arg(long)]
    column_gap: Option<f32>,

    /// Disable table reconstruction
    #[arg(long)]
    no_tables: bool,

    /// Keep paragraphs split by a page break apart
    #[arg(long)]
    no_merge: bool,

    /// Process pages on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for page analysis
    #[arg(long, env = "PAGEMARK_THREADS")]
    threads: Option<usize>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum CleanupLevel {
    /// Minimal cleanup (Unicode normalization only)
    Minimal,
    /// Standard cleanup (default)
    Standard,
    /// Aggressive cleanup (also drops private-use glyphs)
    Aggressive,
}

impl From<CleanupLevel> for CleanupPreset {
    fn from(level: CleanupLevel) -> Self {
        match level {
            CleanupLevel::Minimal => CleanupPreset::Minimal,
            CleanupLevel::Standard => CleanupPreset::Standard,
            CleanupLevel::Aggressive => CleanupPreset::Aggressive,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum HeadingMode {
    /// `#` prefixes
    Atx,
    /// Underlined levels 1 and 2
    Setext,
}

impl From<HeadingMode> for HeadingStyle {
    fn from(mode: HeadingMode) -> Self {
        match mode {
            HeadingMode::Atx => HeadingStyle::Atx,
            HeadingMode::Setext => HeadingStyle::Setext,
        }
    }
}

/// Layout of a `--config` file. Both sections are optional.
#[derive(Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    convert: ConvertOptions,
    render: RenderOptions,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Markdown {
            convert,
            output,
            frontmatter,
            heading_style,
            max_heading,
            wrap,
            page_separators,
            no_escape,
            cleanup,
        } => load_config(&convert).and_then(|config| {
            let mut render = config.render;
            if frontmatter {
                render = render.with_frontmatter(true);
            }
            if heading_style != HeadingMode::Atx {
                render = render.with_heading_style(heading_style.into());
            }
            if max_heading != 6 {
                render = render.with_max_heading(max_heading);
            }
            if wrap > 0 {
                render = render.with_line_width(wrap);
            }
            if page_separators {
                render = render.with_page_separators(true);
            }
            if no_escape {
                render = render.with_escaping(false);
            }
            if let Some(level) = cleanup {
                render = render.with_cleanup_preset(level.into());
            }
            cmd_markdown(&convert, config.convert, &render, output.as_deref())
        }),
        Commands::Text {
            convert,
            output,
            cleanup,
        } => load_config(&convert).and_then(|config| {
            let mut render = config.render;
            if let Some(level) = cleanup {
                render = render.with_cleanup_preset(level.into());
            }
            cmd_text(&convert, config.convert, &render, output.as_deref())
        }),
        Commands::Json {
            convert,
            output,
            compact,
        } => load_config(&convert)
            .and_then(|config| cmd_json(&convert, config.convert, compact, output.as_deref())),
        Commands::Info { convert } => {
            load_config(&convert).and_then(|config| cmd_info(&convert, config.convert))
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Read the config file, then let command-line flags override it.
fn load_config(args: &ConvertArgs) -> CliResult<ConfigFile> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str::<ConfigFile>(&text)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?
        }
        None => ConfigFile::default(),
    };

    let mut options = config.convert;
    if let Some(pages) = &args.pages {
        let selection =
            PageSelection::parse(pages).map_err(|e| format!("Invalid page range: {}", e))?;
        options = options.with_pages(selection);
    }
    if let Some(cap) = args.heading_cap {
        options = options.with_heading_level_cap(cap);
    }
    if let Some(factor) = args.column_gap {
        options = options.with_column_gap_factor(factor);
    }
    if args.no_tables {
        options = options.with_tables(false);
    }
    if args.no_merge {
        options = options.with_paragraph_merging(false);
    }
    if args.sequential {
        options = options.sequential();
    }
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }
    options.validate()?;

    config.convert = options;
    Ok(config)
}

/// Convert the input, driving a progress bar from conversion events.
fn run_conversion(args: &ConvertArgs, options: ConvertOptions) -> CliResult<Document> {
    let source = GeometryDocument::from_path(&args.input)?;
    log::debug!("Loaded {} pages from {}", source.pages.len(), args.input.display());

    if args.quiet {
        return Ok(Converter::new(options).convert(&source)?);
    }

    let (sender, receiver) = unbounded();
    let converter = Converter::new(options).with_events(sender);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let document = thread::scope(|scope| {
        let worker = scope.spawn(move || converter.convert(&source));

        // The channel closes once the worker drops the converter.
        for event in receiver.iter() {
            match event {
                ConversionEvent::Started { pages } => {
                    pb.set_length(pages as u64 * 2);
                    pb.set_message("Reading fonts...");
                }
                ConversionEvent::PageLoaded { .. } => pb.inc(1),
                ConversionEvent::PageFailed { page_index, reason } => {
                    pb.inc(1);
                    pb.println(format!(
                        "{} page {}: {}",
                        "Warning".yellow().bold(),
                        page_index + 1,
                        reason
                    ));
                }
                ConversionEvent::RolesResolved { signatures } => {
                    pb.set_message(format!("Analyzing layout ({} font signatures)...", signatures));
                }
                ConversionEvent::PageAssembled { .. } => pb.inc(1),
                ConversionEvent::Finished { blocks, cancelled } => {
                    if cancelled > 0 {
                        pb.println(format!("{} {} pages cancelled", "Warning".yellow().bold(), cancelled));
                    }
                    pb.set_message(format!("{} blocks", blocks));
                }
            }
        }

        worker
            .join()
            .map_err(|_| "conversion worker panicked".to_string())
    })?;

    match document {
        Ok(document) => {
            pb.finish_with_message("Done!");
            Ok(document)
        }
        Err(e) => {
            pb.abandon();
            Err(e.into())
        }
    }
}

fn write_output(content: &str, output: Option<&Path>) -> CliResult<()> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_markdown(
    args: &ConvertArgs,
    options: ConvertOptions,
    render: &RenderOptions,
    output: Option<&Path>,
) -> CliResult<()> {
    let doc = run_conversion(args, options)?;
    let markdown = pagemark::render::to_markdown(&doc, render)?;
    write_output(&markdown, output)
}

fn cmd_text(
    args: &ConvertArgs,
    options: ConvertOptions,
    render: &RenderOptions,
    output: Option<&Path>,
) -> CliResult<()> {
    let doc = run_conversion(args, options)?;
    let text = pagemark::render::to_text(&doc, render)?;
    write_output(&text, output)
}

fn cmd_json(
    args: &ConvertArgs,
    options: ConvertOptions,
    compact: bool,
    output: Option<&Path>,
) -> CliResult<()> {
    let doc = run_conversion(args, options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = pagemark::render::to_json(&doc, format)?;
    write_output(&json, output)
}

fn cmd_info(args: &ConvertArgs, options: ConvertOptions) -> CliResult<()> {
    let doc = run_conversion(args, options)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), args.input.display());
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }

    println!();
    println!("{}", "Font Roles".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for assignment in &doc.roles {
        let mut style = String::new();
        if assignment.bold {
            style.push_str(" bold");
        }
        if assignment.italic {
            style.push_str(" italic");
        }
        println!(
            "{:>6.1}pt {}{} {} {:?} ({} chars)",
            assignment.size,
            assignment.font_id,
            style,
            "→".dimmed(),
            assignment.role,
            assignment.chars
        );
    }

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for report in &doc.pages {
        let status = match &report.status {
            PageStatus::Analyzed => "analyzed".green(),
            PageStatus::Empty => "empty".dimmed(),
            PageStatus::Failed(reason) => format!("failed: {}", reason).as_str().red(),
            PageStatus::Cancelled => "cancelled".yellow(),
        };
        println!(
            "{:>4}: {} | {} runs ({} dropped), {} primitives, {} columns, {} tables, {} blocks",
            report.page_index + 1,
            status,
            report.run_count,
            report.dropped_runs,
            report.primitive_count,
            report.column_count,
            report.table_count,
            report.block_count
        );
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    println!("{}: {}", "Blocks".bold(), doc.blocks.len());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(input: &Path, extra: &[&str]) -> ConvertArgs {
        let mut argv = vec!["pagemark", "info", input.to_str().unwrap()];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Info { convert } => convert,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut config = tempfile::NamedTempFile::new().unwrap();
        write!(
            config,
            r#"{{ "convert": {{ "heading_level_cap": 3, "detect_tables": false }},
                 "render": {{ "page_separators": true }} }}"#
        )
        .unwrap();
        let path = config.path().to_str().unwrap().to_string();

        let args = args(Path::new("doc.json"), &["--config", &path, "--heading-cap", "2", "--pages", "1-3"]);
        let loaded = load_config(&args).unwrap();

        assert_eq!(loaded.convert.heading_level_cap, 2);
        assert!(!loaded.convert.detect_tables);
        assert_eq!(loaded.convert.pages, PageSelection::Range(1..=3));
        assert!(loaded.render.page_separators);
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        let bad_range = args(Path::new("doc.json"), &["--pages", "3-1"]);
        assert!(load_config(&bad_range).is_err());

        let bad_cap = args(Path::new("doc.json"), &["--heading-cap", "9"]);
        assert!(load_config(&bad_cap).is_err());
    }

    #[test]
    fn test_convert_geometry_file() {
        let mut page = pagemark::PageGeometry::letter(0);
        page.push_run(pagemark::TextRun::new(
            "Hello from the CLI",
            pagemark::BBox::new(72.0, 72.0, 180.0, 82.0),
            "Helvetica",
            10.0,
        ));
        let json = GeometryDocument::new(vec![page]).to_json().unwrap();
        let mut input = tempfile::NamedTempFile::new().unwrap();
        input.write_all(json.as_bytes()).unwrap();

        let args = args(input.path(), &["--quiet"]);
        let doc = run_conversion(&args, ConvertOptions::default()).unwrap();
        assert_eq!(doc.plain_text(), "Hello from the CLI");
    }
}
