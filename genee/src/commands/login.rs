use crate::context::AppContext;
use crate::format::create_formatter;
use std::io::Write;

/// Prompt for username if not provided
fn prompt_username(provided_username: Option<&str>) -> Result<String, String> {
    match provided_username {
        Some(username) => Ok(username.to_string()),
        None => {
            print!("Username: ");
            std::io::stdout()
                .flush()
                .map_err(|e| format!("Failed to flush stdout: {}", e))?;

            let mut username = String::new();
            std::io::stdin()
                .read_line(&mut username)
                .map_err(|e| format!("Failed to read username: {}", e))?;

            Ok(username.trim().to_string())
        }
    }
}

/// Prompt for password if not provided
fn prompt_password(provided_password: Option<&str>) -> Result<String, String> {
    match provided_password {
        Some(password) => Ok(password.to_string()),
        None => rpassword::prompt_password("Password: ")
            .map_err(|e| format!("Failed to read password: {}", e)),
    }
}

/// Verifies credentials against the registry and stores them.
///
/// Returns the name of the credential store that took them.
pub fn login(
    ctx: &AppContext,
    username: Option<&str>,
    password: Option<&str>,
) -> Result<String, String> {
    let genee = ctx.session()?;
    println!("Logging in to {}", genee.registry());

    let username = prompt_username(username)?;
    let password = prompt_password(password)?;

    let formatter = create_formatter(ctx);
    let spinner = formatter.spinner("Verifying credentials...");
    let stored = genee.login(&username, &password);
    spinner.finish_and_clear();

    stored.map_err(|e| match e {
        libgenee::GeneeError::Authentication { .. } => {
            format!("{}. Please check your username and password.", e)
        }
        other => other.to_string(),
    })
}

/// Handle the login command
pub fn handle_login(ctx: &AppContext, username: Option<&str>, password: Option<&str>) {
    match login(ctx, username, password) {
        Ok(store) => {
            create_formatter(ctx).success(&format!("Login Succeeded (saved to {})", store));
        }
        Err(e) => super::fail(&e),
    }
}

#[cfg(test)]
#[path = "login_tests.rs"]
mod tests;
