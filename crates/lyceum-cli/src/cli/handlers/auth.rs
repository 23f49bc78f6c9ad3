//! Session command handlers

use crate::client::{create_authenticated_client, create_client};
use crate::config::CliConfig;
use crate::error::{CliError, Result};
use crate::output::{json_output, print_info, print_success, table_output};
use dialoguer::{theme::ColorfulTheme, Input, Password};
use lyceum_common::defaults::MIN_PASSWORD_LEN;
use tracing::debug;

/// Handle login command
pub async fn handle_login(phone: Option<String>, config: &CliConfig) -> Result<()> {
    let client = create_client(config)?;
    let theme = ColorfulTheme::default();

    let phone = match phone {
        Some(phone) => phone,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Phone number")
            .interact_text()?,
    };
    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact()?;

    debug!("Signing in against {}", client.base_url());
    let user = client.login(phone.trim(), &password).await?;

    print_success(&format!("Logged in as {} ({})", user.full_name(), user.role));
    if user.must_change_password() {
        print_info("Your password must be changed. Run 'lyceum change-password'");
    }
    Ok(())
}

/// Handle logout command
pub fn handle_logout(config: &CliConfig) -> Result<()> {
    let client = create_client(config)?;
    if !client.is_authenticated() {
        print_info("Not logged in");
        return Ok(());
    }

    client.logout()?;
    print_success("Logged out");
    Ok(())
}

/// Handle whoami command
pub fn handle_whoami(config: &CliConfig, json: bool) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let user = client.current_user().ok_or(CliError::NotLoggedIn)?;

    if json {
        json_output(&user)?;
    } else {
        table_output::display_user(&user);
    }
    Ok(())
}

/// Handle change-password command
pub async fn handle_change_password(config: &CliConfig) -> Result<()> {
    let client = create_authenticated_client(config)?;
    let theme = ColorfulTheme::default();

    let current = Password::with_theme(&theme)
        .with_prompt("Current password")
        .interact()?;
    let new = Password::with_theme(&theme)
        .with_prompt("New password")
        .with_confirmation("Repeat new password", "Passwords do not match")
        .validate_with(|input: &String| -> std::result::Result<(), String> {
            if input.chars().count() >= MIN_PASSWORD_LEN {
                Ok(())
            } else {
                Err(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters"
                ))
            }
        })
        .interact()?;

    client.change_password(&current, &new).await?;
    print_success("Password changed");
    Ok(())
}
