use super::CatalogProgress;
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, create_formatter, render_table};
use libgenee::ImageRecord;
use serde::Serialize;

/// Search results for one query
#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub platform: Option<String>,
    pub total: usize,
    pub images: Vec<ImageRecord>,
}

impl Formattable for SearchResults {
    fn format_pretty(&self) -> String {
        if self.images.is_empty() {
            let mut output = format!("No images matching '{}'", self.query);
            if let Some(platform) = &self.platform {
                output.push_str(&format!(" (platform: {})", platform));
            }
            output.push('\n');
            return output;
        }
        format!(
            "{}\n\nFound {} images\n",
            render_table(&self.images),
            self.total
        )
    }
}

/// Searches the registry with a wildcard query
pub fn search(
    ctx: &AppContext,
    query: &str,
    platform: Option<&str>,
    limit: Option<usize>,
) -> Result<SearchResults, String> {
    let genee = ctx.session()?;
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Searching {} for '{}'", genee.registry(), query),
    );

    let formatter = create_formatter(ctx);
    let mut progress = CatalogProgress::new(formatter.as_ref(), "Searching repositories");
    let result = genee.search_with_progress(query, platform, limit, |done, total| {
        progress.update(done, total)
    });

    match result {
        Ok(images) => {
            progress.finish(&format!("Found {} matching images", images.len()));
            Ok(SearchResults {
                query: query.to_string(),
                platform: platform
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string),
                total: images.len(),
                images,
            })
        }
        Err(e) => {
            progress.abandon();
            Err(e.to_string())
        }
    }
}

/// Handle the search command
pub fn handle_search(ctx: &AppContext, query: &str, platform: Option<&str>, limit: Option<usize>) {
    let results = search(ctx, query, platform, limit).unwrap_or_else(|e| super::fail(&e));
    match format::format_output(&results, ctx.output_format()) {
        Ok(output) => print!("{}", output),
        Err(e) => super::fail(&e),
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
