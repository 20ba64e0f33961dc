//! Basic usage example for the genee library.
//!
//! Lists the representative image of every repository and runs one search.
//!
//! Run with: cargo run --example basic_usage -- [registry]

use libgenee::Genee;
use libgenee::format::format_size;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "docker.genee.cn".to_string());

    let genee = Genee::connect(&registry)?;
    println!("Registry: {} (credentials for {})", genee.registry(), genee.host());

    if !genee.has_valid_credentials() {
        eprintln!("No credentials found; looked in:");
        for source in genee.credential_sources() {
            eprintln!("  - {}", source);
        }
        return Ok(());
    }

    let images = genee.list_images_with_progress(None, |done, total| {
        eprint!("\r{}/{} repositories", done, total);
    })?;
    eprintln!();

    for image in images.iter().take(10) {
        let platforms: Vec<String> = image.platforms.iter().map(|p| p.to_string()).collect();
        println!(
            "  {}:{}  {}  {}",
            image.repository,
            image.tag,
            platforms.join(", "),
            format_size(image.size)
        );
    }
    if images.len() > 10 {
        println!("  ... and {} more", images.len() - 10);
    }

    let matches = genee.search("*:latest", Some("arm64"), Some(20))?;
    println!("\n{} repositories publish an arm64 'latest' tag", matches.len());

    Ok(())
}
