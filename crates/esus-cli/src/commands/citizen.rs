use anyhow::{Context, Result};
use esus_client::{Citizen, CitizenId, SessionContextManager};

use crate::cli::{CitizenUnitArgs, CitizensArgs, OutputFormat};
use crate::output::{print_list, print_value};

pub async fn citizens(
    manager: &SessionContextManager,
    args: &CitizensArgs,
    format: OutputFormat,
) -> Result<()> {
    let found = manager
        .search_citizens(&args.query, args.limit, args.contact)
        .await;
    print_list(
        &found,
        format,
        &["ID", "Name", "CPF", "CNS", "Birth date", "Phone"],
        citizen_row,
    )
}

pub async fn citizen_unit(
    manager: &SessionContextManager,
    args: &CitizenUnitArgs,
    format: OutputFormat,
) -> Result<()> {
    let unit = manager
        .find_health_unit_for_subject(&CitizenId::new(args.citizen_id.as_str()))
        .await
        .with_context(|| format!("No health unit found for citizen {}", args.citizen_id))?;
    print_value(&serde_json::to_value(&unit)?, format)
}

fn citizen_row(citizen: &Citizen) -> Vec<String> {
    let display_name = match &citizen.social_name {
        Some(social) if !social.is_empty() => format!("{social} ({})", citizen.name),
        _ => citizen.name.clone(),
    };
    let phone = citizen
        .contact
        .as_ref()
        .and_then(|c| c.mobile_phone.clone());
    vec![
        citizen.id.to_string(),
        display_name,
        citizen.cpf.clone().unwrap_or_else(|| "-".into()),
        citizen.cns.clone().unwrap_or_else(|| "-".into()),
        citizen.birth_date.clone().unwrap_or_else(|| "-".into()),
        phone.unwrap_or_else(|| "-".into()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_prefers_social_name() {
        let citizen: Citizen = serde_json::from_value(json!({
            "id": "547",
            "nome": "JOSE DA SILVA",
            "nomeSocial": "JOANA",
            "cpf": "12345678909"
        }))
        .unwrap();
        let row = citizen_row(&citizen);
        assert_eq!(row[1], "JOANA (JOSE DA SILVA)");
        assert_eq!(row[2], "12345678909");
        assert_eq!(row[3], "-");
        assert_eq!(row[5], "-");
    }
}
