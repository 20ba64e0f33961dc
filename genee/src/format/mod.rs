use crate::context::{AppContext, VerbosityLevel};
use indicatif::{ProgressBar, ProgressStyle};
use libgenee::ImageRecord;
use libgenee::format::format_size;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::IsTerminal;
use tabled::{Table, Tabled, settings::Style};

pub use libgenee::config::{ColorChoice, OutputFormat};

/// Trait for output formatting that can be TTY-aware or plain text
pub trait OutputFormatter {
    /// Print a success message
    fn success(&self, message: &str);

    /// Create a spinner for indeterminate progress
    fn spinner(&self, message: &str) -> ProgressBar;

    /// Create a progress bar for determinate progress
    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar;

    /// Finish a progress operation with a message
    fn finish_progress(&self, pb: ProgressBar, message: &str);
}

/// TTY-aware formatter with colors and progress indicators
pub struct TtyFormatter;

impl OutputFormatter for TtyFormatter {
    fn success(&self, message: &str) {
        println!("{} {}", "✓".green().bold(), message);
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner
    }

    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("█▓▒░ "));
        }
        pb.set_message(message.to_string());
        pb
    }

    fn finish_progress(&self, pb: ProgressBar, message: &str) {
        pb.finish_and_clear();
        eprintln!("{} {}", "✓".green(), message);
    }
}

/// Plain text formatter for non-TTY output (piped, scripted)
///
/// Status lines go to stderr so stdout stays parseable.
pub struct PlainFormatter;

impl OutputFormatter for PlainFormatter {
    fn success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn spinner(&self, message: &str) -> ProgressBar {
        eprintln!("{}", message);
        ProgressBar::hidden()
    }

    fn progress_bar(&self, len: u64, message: &str) -> ProgressBar {
        eprintln!("{} (0/{})", message, len);
        ProgressBar::hidden()
    }

    fn finish_progress(&self, pb: ProgressBar, message: &str) {
        pb.finish();
        eprintln!("✓ {}", message);
    }
}

/// Create the appropriate formatter based on the color choice and TTY
pub fn create_formatter(ctx: &AppContext) -> Box<dyn OutputFormatter> {
    if should_color(ctx) {
        Box::new(TtyFormatter)
    } else {
        Box::new(PlainFormatter)
    }
}

/// Check if we should use colors in output
pub fn should_color(ctx: &AppContext) -> bool {
    match ctx.config.output.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            std::env::var_os("NO_COLOR").is_none()
                && (std::io::stdout().is_terminal() || std::io::stderr().is_terminal())
        }
    }
}

/// Print a diagnostic line to stderr when the verbosity allows it
pub fn print(ctx: &AppContext, level: VerbosityLevel, message: &str) {
    if level > VerbosityLevel::Normal && ctx.verbosity >= level {
        eprintln!("{}", message);
    }
}

/// Parses `--format`; unknown values fall back to pretty.
pub fn parse_output_format(s: &str) -> OutputFormat {
    match s.to_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "yaml" | "yml" => OutputFormat::Yaml,
        _ => OutputFormat::Pretty,
    }
}

/// Parses `--color`; unknown values fall back to auto.
pub fn parse_color_choice(s: &str) -> ColorChoice {
    match s.to_lowercase().as_str() {
        "always" => ColorChoice::Always,
        "never" => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Trait for types that can be formatted for CLI output
pub trait Formattable: Serialize {
    /// Format the type for pretty (human-readable) output
    fn format_pretty(&self) -> String;
}

/// Format a single item for output
pub fn format_output<T: Formattable>(item: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(item.format_pretty()),
        OutputFormat::Json => serde_json::to_string_pretty(item)
            .map(|json| json + "\n")
            .map_err(|e| format!("Failed to serialize to JSON: {}", e)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(item).map_err(|e| format!("Failed to serialize to YAML: {}", e))
        }
    }
}

/// One table row of an [`ImageRecord`], display values only.
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct ImageRow {
    #[tabled(rename = "REPOSITORY")]
    pub repository: String,

    #[tabled(rename = "TAG")]
    pub tag: String,

    #[tabled(rename = "DIGEST")]
    pub digest: String,

    #[tabled(rename = "PLATFORM")]
    pub platforms: String,

    #[tabled(rename = "SIZE")]
    pub size: String,

    #[tabled(rename = "CREATED")]
    pub created: String,
}

impl From<&ImageRecord> for ImageRow {
    fn from(record: &ImageRecord) -> Self {
        let platforms = if record.platforms.is_empty() {
            "unknown".to_string()
        } else {
            record
                .platforms
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            repository: truncate(&record.repository, 30),
            tag: truncate(&record.tag, 20),
            digest: short_digest(record.digest.as_deref()),
            platforms,
            size: format_size(record.size),
            created: record.created.clone().unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Renders records as a borderless table.
pub fn render_table(records: &[ImageRecord]) -> String {
    let rows: Vec<ImageRow> = records.iter().map(ImageRow::from).collect();
    Table::new(rows).with(Style::empty()).to_string()
}

/// Cuts `value` to `max` characters, ending in `...` when shortened.
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let kept: String = value.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// First 12 characters of the digest hex, or `-`.
pub fn short_digest(digest: Option<&str>) -> String {
    match digest {
        Some(d) => {
            let hex = d.split_once(':').map(|(_, hex)| hex).unwrap_or(d);
            hex.chars().take(12).collect()
        }
        None => "-".to_string(),
    }
}
