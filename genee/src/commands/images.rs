use super::CatalogProgress;
use crate::context::{AppContext, VerbosityLevel};
use crate::format::{self, Formattable, create_formatter, render_table};
use libgenee::ImageRecord;
use serde::Serialize;

/// Representative image of every repository
#[derive(Debug, Serialize)]
pub struct ImageList {
    pub total: usize,
    pub images: Vec<ImageRecord>,
}

impl Formattable for ImageList {
    fn format_pretty(&self) -> String {
        if self.images.is_empty() {
            return "No images found\n".to_string();
        }
        format!(
            "{}\n\nTotal: {} images\n",
            render_table(&self.images),
            self.total
        )
    }
}

/// Lists the representative tag of every repository
pub fn list_images(ctx: &AppContext, platform: Option<&str>) -> Result<ImageList, String> {
    let genee = ctx.session()?;
    format::print(
        ctx,
        VerbosityLevel::Verbose,
        &format!("Listing images from {}", genee.registry()),
    );

    let formatter = create_formatter(ctx);
    let mut progress = CatalogProgress::new(formatter.as_ref(), "Inspecting repositories");
    let result = genee.list_images_with_progress(platform, |done, total| {
        progress.update(done, total)
    });

    match result {
        Ok(images) => {
            progress.finish(&format!("Found {} images", images.len()));
            Ok(ImageList {
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

/// Handle the images command
pub fn handle_images(ctx: &AppContext, platform: Option<&str>) {
    let list = list_images(ctx, platform).unwrap_or_else(|e| super::fail(&e));
    match format::format_output(&list, ctx.output_format()) {
        Ok(output) => print!("{}", output),
        Err(e) => super::fail(&e),
    }
}

#[cfg(test)]
#[path = "images_tests.rs"]
mod tests;
