use anyhow::Result;
use esus_client::{HealthUnitId, OccupationId, Professional, SessionContextManager};

use crate::cli::{OutputFormat, ProfessionalsArgs};
use crate::output::print_list;

pub async fn professionals(
    manager: &mut SessionContextManager,
    args: &ProfessionalsArgs,
    format: OutputFormat,
) -> Result<()> {
    let listed = match (&args.unit, &args.cbo) {
        (Some(unit), _) => {
            let unit = HealthUnitId::new(unit.as_str());
            // Listing runs under the scope mapped to the unit.
            let Some(scope) = manager.access_map().scope_for(&unit).cloned() else {
                anyhow::bail!("No access to health unit {unit}");
            };
            if !manager.switch_context(&scope).await {
                anyhow::bail!("Failed to switch the session to scope {scope}");
            }
            manager.list_eligible_professionals(&unit).await
        }
        (None, Some(cbo)) => {
            manager
                .list_professionals_by_occupation(&OccupationId::new(cbo.as_str()))
                .await
        }
        (None, None) => anyhow::bail!("Use --unit <id> or --cbo <id>"),
    };

    print_list(
        &listed,
        format,
        &["ID", "Name", "Scopes", "Specialties"],
        professional_row,
    )
}

fn professional_row(professional: &Professional) -> Vec<String> {
    let scopes: Vec<String> = professional
        .scheduled_scopes()
        .map(|s| s.id.to_string())
        .collect();
    let specialties = professional.specialties();
    vec![
        professional.id.to_string(),
        professional.name.clone(),
        if scopes.is_empty() {
            "-".to_string()
        } else {
            scopes.join(", ")
        },
        if specialties.is_empty() {
            "-".to_string()
        } else {
            specialties
        },
    ]
}
