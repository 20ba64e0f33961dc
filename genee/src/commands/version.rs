/// Get the version string for docker-genee and libgenee
pub fn get_version_string() -> String {
    format!(
        "docker-genee {}\nlibgenee {}",
        env!("CARGO_PKG_VERSION"),
        libgenee::version()
    )
}

/// Print version information to stdout
pub fn print_version() {
    println!("{}", get_version_string());
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
