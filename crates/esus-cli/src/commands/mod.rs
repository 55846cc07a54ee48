pub mod booking;
pub mod citizen;
pub mod professional;
pub mod schedule;
pub mod session;

use anyhow::{Context, Result};
use esus_client::{ClientConfig, ScopeId, SessionContextManager};
use time::Date;

use crate::config::ProfileConfig;
use crate::credentials;

/// Builds the client configuration for `endpoint` with profile overrides.
pub fn client_config(endpoint: &str, profile: &ProfileConfig) -> Result<ClientConfig> {
    let config = ClientConfig::from_endpoint(endpoint)
        .with_context(|| format!("Invalid endpoint URL: {endpoint}"))?;
    Ok(match &profile.client_version {
        Some(version) => config.with_client_version(version),
        None => config,
    })
}

/// Logs in with the profile's stored credentials and builds the access map.
pub async fn connect(config: ClientConfig, profile: &str) -> Result<SessionContextManager> {
    let creds = credentials::load_credentials(profile)?.with_context(|| {
        format!("Not logged in (profile: \"{profile}\"). Run: esus login --username <cpf>")
    })?;
    tracing::debug!(profile, endpoint = %config.endpoint, user = %creds.username, "connecting");

    let mut manager = SessionContextManager::new(config);
    if !manager.authenticate(&creds.username, &creds.password).await {
        anyhow::bail!("Login failed for {} (run with -v for details)", creds.username);
    }
    if !manager.build_access_map().await {
        anyhow::bail!("Could not read the access grants of {}", creds.username);
    }
    Ok(manager)
}

/// Switches to the scope mapped for the health unit `scope` belongs to, so
/// queries about `scope` run inside that unit.
pub async fn act_for_scope(manager: &mut SessionContextManager, scope: &ScopeId) -> Result<()> {
    let unit = manager
        .health_unit_for_scope(scope)
        .await
        .with_context(|| format!("No health unit found for scope {scope}"))?;
    let acting = manager
        .access_map()
        .scope_for(&unit.id)
        .cloned()
        .with_context(|| format!("No access to health unit \"{}\" ({})", unit.name, unit.id))?;
    if !manager.switch_context(&acting).await {
        anyhow::bail!("Failed to switch the session to scope {acting}");
    }
    Ok(())
}

pub fn parse_day(day: &str) -> Result<Date> {
    esus_client::schedule::parse_day(day)
        .with_context(|| format!("Invalid day {day:?}, expected YYYY-MM-DD"))
}
