//! chapterkit CLI - roster extraction and page rewriting for the chapter site

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use chapterkit::roster::{self, format_row, text_preview, RosterExtractor};
use chapterkit::site::{self, BatchEvent, PageOutcome};
use chapterkit::{Config, ExtractOptions, PageExtract, RosterConfig, RowWidthPolicy, SiteConfig};

#[derive(Parser)]
#[command(name = "chapterkit")]
#[command(version)]
#[command(about = "Roster PDF extraction and static page rewriting", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true, value_name = "FILE", env = "CHAPTERKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Site root the page lists are resolved against
    #[arg(long, global = true, value_name = "DIR")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract roster tables from the PDF and write the raw dump and CSV
    Roster {
        /// Roster PDF
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Raw table dump
        #[arg(long, value_name = "FILE")]
        raw: Option<PathBuf>,

        /// CSV output
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,

        /// How rows that do not match the header width are written
        #[arg(long, value_enum)]
        row_width: Option<RowWidth>,

        /// Skip pages that fail to extract
        #[arg(long)]
        lenient: bool,
    },

    /// Dump the roster PDF as plain text
    RosterText {
        /// Roster PDF
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Text output
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Rebuild pages from the shared template around their <main> content
    Rebuild {
        /// Pages to rebuild instead of the configured list
        #[arg(value_name = "PAGE")]
        pages: Vec<String>,
    },

    /// Strip legacy header, footer and navigation scripts from pages
    Strip {
        /// Pages to strip instead of the configured list
        #[arg(value_name = "PAGE")]
        pages: Vec<String>,
    },

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum RowWidth {
    /// Write rows as extracted
    WriteThrough,
    /// Pad or truncate rows to the header width
    Pad,
    /// Fail on the first mismatched row
    Reject,
}

impl From<RowWidth> for RowWidthPolicy {
    fn from(mode: RowWidth) -> Self {
        match mode {
            RowWidth::WriteThrough => RowWidthPolicy::WriteThrough,
            RowWidth::Pad => RowWidthPolicy::PadOrTruncate,
            RowWidth::Reject => RowWidthPolicy::Reject,
        }
    }
}

type CliResult = Result<(), Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref(), cli.root).and_then(|config| match cli.command {
        Commands::Roster {
            input,
            raw,
            csv,
            row_width,
            lenient,
        } => {
            let mut roster = override_input(config.roster, input);
            if let Some(path) = raw {
                roster = roster.with_raw_output(path);
            }
            if let Some(path) = csv {
                roster = roster.with_csv_output(path);
            }
            if let Some(mode) = row_width {
                roster = roster.with_row_width(mode.into());
            }
            if lenient {
                roster = roster.lenient();
            }
            cmd_roster(&roster)
        }
        Commands::RosterText { input, output } => {
            let mut roster = override_input(config.roster, input);
            if let Some(path) = output {
                roster = roster.with_text_output(path);
            }
            cmd_roster_text(&roster)
        }
        Commands::Rebuild { pages } => {
            let site = if pages.is_empty() {
                config.site
            } else {
                config.site.with_rebuild_pages(pages)
            };
            cmd_rebuild(&site)
        }
        Commands::Strip { pages } => {
            let site = if pages.is_empty() {
                config.site
            } else {
                config.site.with_strip_pages(pages)
            };
            cmd_strip(&site)
        }
        Commands::Config => cmd_config(&config),
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>, root: Option<PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(root) = root {
        config.site = config.site.with_root(root);
    }
    log::debug!("Site root: {}", config.site.root.display());
    Ok(config)
}

fn override_input(roster: RosterConfig, input: Option<PathBuf>) -> RosterConfig {
    match input {
        Some(path) => roster.with_input(path),
        None => roster,
    }
}

fn extract_options(config: &RosterConfig) -> ExtractOptions {
    let options = ExtractOptions::new()
        .with_preview_rows(config.preview_rows)
        .with_preview_chars(config.preview_chars);
    if config.lenient {
        options.lenient()
    } else {
        options
    }
}

fn cmd_roster(config: &RosterConfig) -> CliResult {
    println!("{}\n", "Extracting data from PDF...".cyan().bold());

    let options = extract_options(config);
    let (preview_rows, preview_chars) = (options.preview_rows, options.preview_chars);
    let extractor = RosterExtractor::open(&config.input, options)?;
    let total = extractor.page_count();
    println!("Total pages: {}\n", total);

    let pb = ProgressBar::new(u64::from(total));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages")?
            .progress_chars("#>-"),
    );

    let doc = extractor.extract_with_progress(|page| {
        pb.suspend(|| print_page(page, preview_rows, preview_chars));
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if !doc.has_tables() {
        println!("\n{}", "No tabular data could be extracted.".yellow());
        println!("The PDF may require manual data entry or OCR.");
        return Ok(());
    }

    roster::write_raw_file(&config.raw_output, doc.tables())?;
    println!(
        "\n{} {}",
        "Raw data saved to:".green(),
        config.raw_output.display()
    );

    println!("\nAttempting to create CSV...");
    let rows = roster::write_roster_file(&config.csv_output, doc.tables(), config.row_width)?;
    println!(
        "{} {} ({} rows)",
        "CSV saved to:".green(),
        config.csv_output.display(),
        rows
    );

    Ok(())
}

fn print_page(page: &PageExtract, preview_rows: usize, preview_chars: usize) {
    println!("{}", format!("=== PAGE {} ===", page.number).bold());

    if page.has_tables() {
        println!(
            "Found {} table(s) on page {}",
            page.tables.len(),
            page.number
        );
        for (t, table) in page.tables.iter().enumerate() {
            println!("\nTable {}:", t + 1);
            for (r, row) in table.preview(preview_rows).iter().enumerate() {
                println!("  Row {}: {}", r + 1, format_row(row));
            }
        }
        return;
    }

    println!(
        "No tables found. Extracted text (first {} chars):",
        preview_chars
    );
    match page.text.as_deref().filter(|t| !t.is_empty()) {
        Some(text) => println!("{}", text_preview(text, preview_chars)),
        None => println!("{}", "No text extracted".dimmed()),
    }
    println!();
}

fn cmd_roster_text(config: &RosterConfig) -> CliResult {
    println!("{}", "Extracting text from PDF...".cyan().bold());

    let extractor = RosterExtractor::open(&config.input, extract_options(config))?;
    println!("Total pages: {}", extractor.page_count());

    let text = extractor.extract_text()?;
    roster::write_text_file(&config.text_output, &text)?;

    let rule = "=".repeat(80);
    println!("\nExtracted {} characters", text.chars().count());
    println!("\nFirst {} characters:", config.text_preview_chars);
    println!("{}", rule);
    println!("{}", text_preview(&text, config.text_preview_chars));
    println!("{}", rule);

    println!(
        "\n{} {}",
        "Raw text saved to:".green(),
        config.text_output.display()
    );
    Ok(())
}

fn cmd_rebuild(config: &SiteConfig) -> CliResult {
    let report = site::rebuild_pages(config, |event| match event {
        BatchEvent::Started(page) => println!("Processing {}...", page),
        BatchEvent::Finished(entry) => match &entry.outcome {
            PageOutcome::Rebuilt => println!("  {} Rebuilt {}", "✅".green(), entry.page),
            PageOutcome::NoMainContent => println!(
                "  {}  Could not find <main> content in {}",
                "⚠️".yellow(),
                entry.page
            ),
            PageOutcome::Failed(e) => eprintln!(
                "  {} Error processing {}: {}",
                "❌".red(),
                entry.page,
                e
            ),
            PageOutcome::NotFound => println!("{}  {} not found", "⚠️".yellow(), entry.page),
            PageOutcome::Updated | PageOutcome::Unchanged => {}
        },
    });

    println!(
        "\n{} Fixed {}/{} pages",
        "✅".green(),
        report.succeeded(),
        report.total()
    );
    Ok(())
}

fn cmd_strip(config: &SiteConfig) -> CliResult {
    println!(
        "{}\n",
        "🚀 Replacing old header/footer with WVU components...".cyan().bold()
    );

    let report = site::strip_pages(config, |event| match event {
        BatchEvent::Started(page) => println!("Processing {}...", page),
        BatchEvent::Finished(entry) => match &entry.outcome {
            PageOutcome::Updated => println!("  {} Updated {}", "✅".green(), entry.page),
            PageOutcome::Unchanged => println!(
                "  {}  No changes needed for {}",
                "⚠️".yellow(),
                entry.page
            ),
            PageOutcome::NotFound => {
                println!("  {} File not found: {}", "❌".red(), entry.page)
            }
            PageOutcome::Failed(e) => eprintln!(
                "  {} Error processing {}: {}",
                "❌".red(),
                entry.page,
                e
            ),
            PageOutcome::Rebuilt | PageOutcome::NoMainContent => {}
        },
    });

    println!(
        "\n{} Done! Updated {}/{} pages",
        "✨".yellow(),
        report.succeeded(),
        report.total()
    );
    Ok(())
}

fn cmd_config(config: &Config) -> CliResult {
    println!("{}", config.to_json_pretty()?);
    Ok(())
}
