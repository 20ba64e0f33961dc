use serde::Serialize;

/// Answer to the Docker CLI's `docker-cli-plugin-metadata` probe.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PluginMetadata {
    pub schema_version: &'static str,
    pub vendor: &'static str,
    pub version: &'static str,
    pub short_description: &'static str,
    #[serde(rename = "URL")]
    pub url: &'static str,
}

impl PluginMetadata {
    pub fn current() -> Self {
        Self {
            schema_version: "0.1.0",
            vendor: "Genee Technology",
            version: env!("CARGO_PKG_VERSION"),
            short_description: "Browse and search the Genee image registry",
            url: env!("CARGO_PKG_REPOSITORY"),
        }
    }
}

/// Handle the hidden metadata command
pub fn handle_metadata() {
    match serde_json::to_string_pretty(&PluginMetadata::current()) {
        Ok(json) => println!("{}", json),
        Err(e) => super::fail(&format!("Failed to serialize metadata: {}", e)),
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
