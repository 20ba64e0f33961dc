use crate::format::OutputFormatter;
use indicatif::ProgressBar;

/// Images command
pub mod images;

/// Login command
pub mod login;

/// Docker CLI plugin metadata
pub mod metadata;

/// Search command
pub mod search;

/// Version command handlers
pub mod version;

/// Progress bar for a catalog walk, created once the total is known.
pub(crate) struct CatalogProgress<'a> {
    formatter: &'a dyn OutputFormatter,
    message: &'a str,
    bar: Option<ProgressBar>,
}

impl<'a> CatalogProgress<'a> {
    pub(crate) fn new(formatter: &'a dyn OutputFormatter, message: &'a str) -> Self {
        Self {
            formatter,
            message,
            bar: None,
        }
    }

    pub(crate) fn update(&mut self, done: usize, total: usize) {
        let (formatter, message) = (self.formatter, self.message);
        let bar = self
            .bar
            .get_or_insert_with(|| formatter.progress_bar(total as u64, message));
        bar.set_position(done as u64);
    }

    pub(crate) fn finish(self, message: &str) {
        if let Some(bar) = self.bar {
            self.formatter.finish_progress(bar, message);
        }
    }

    pub(crate) fn abandon(self) {
        if let Some(bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

/// Prints a command's error and exits with status 1.
pub(crate) fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1)
}
