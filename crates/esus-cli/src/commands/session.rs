use anyhow::{Context, Result};
use colored::Colorize;
use esus_client::{ClientConfig, SessionContextManager};
use serde_json::json;

use crate::cli::{LoginArgs, OutputFormat};
use crate::credentials::{self, StoredCredentials};
use crate::output::{print_success, print_value, render_table};

pub async fn login(config: ClientConfig, args: &LoginArgs, profile: &str) -> Result<()> {
    let username = args
        .username
        .as_deref()
        .context("--username is required")?;
    let password = args
        .password
        .as_deref()
        .context("--password is required")?;

    let endpoint = config.endpoint.to_string();
    let mut manager = SessionContextManager::new(config);
    if !manager.authenticate(username, password).await {
        anyhow::bail!("Login failed for {username} (run with -v for details)");
    }

    let creds = StoredCredentials {
        endpoint: endpoint.clone(),
        username: username.to_string(),
        password: password.to_string(),
    };
    credentials::save_credentials(profile, &creds)?;
    print_success(&format!(
        "Logged in to {} as {} ({} grants)",
        endpoint.cyan(),
        username.cyan(),
        manager.access_grants().len()
    ));
    Ok(())
}

pub fn logout(profile: &str) -> Result<()> {
    if credentials::remove_credentials(profile)? {
        print_success("Logged out (credentials removed)");
    } else {
        println!("No credentials found for profile \"{profile}\"");
    }
    Ok(())
}

pub fn whoami(manager: &SessionContextManager, profile: &str, format: OutputFormat) -> Result<()> {
    let active = manager.active_scope().map(ToString::to_string);

    if format != OutputFormat::Table {
        let value = json!({
            "profile": profile,
            "endpoint": manager.config().endpoint.as_str(),
            "activeScope": active,
            "grants": manager.access_grants(),
        });
        return print_value(&value, format);
    }

    println!("{}: {}", "Profile".cyan(), profile);
    println!("{}: {}", "Endpoint".cyan(), manager.config().endpoint);
    println!(
        "{}: {}",
        "Active scope".cyan(),
        active.as_deref().unwrap_or("(none)")
    );
    let map = manager.access_map();
    let rows = map.entries().into_iter().map(|(unit, scope)| {
        vec![
            scope.to_string(),
            unit.to_string(),
            map.unit_name(unit).unwrap_or("-").to_string(),
        ]
    });
    println!("{}", render_table(&["Scope", "Unit", "Unit name"], rows));
    let unmapped = manager.access_grants().len().saturating_sub(map.len());
    if unmapped > 0 {
        println!("{unmapped} grant(s) without a health unit or shadowed by a later grant");
    }
    Ok(())
}
