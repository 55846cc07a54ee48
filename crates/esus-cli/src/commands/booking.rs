use anyhow::{Context, Result};
use colored::Colorize;
use esus_client::schedule::format_clock;
use esus_client::workflow::book;
use esus_client::{
    BookingError, BookingOptions, BookingOutcome, BookingRequest, Choice, SessionContextManager,
};
use time::UtcOffset;

use super::parse_day;
use crate::cli::{BookArgs, OutputFormat};
use crate::output::{print_success, print_value, render_table};

pub async fn book_appointment(
    manager: &mut SessionContextManager,
    args: &BookArgs,
    format: OutputFormat,
) -> Result<()> {
    let request = build_request(args)?;
    let offset = manager.config().display_offset;

    let outcome = match book(manager, &request).await {
        Ok(outcome) => outcome,
        Err(BookingError::NeedsChoice { what, options }) => {
            eprintln!("{}", render_options(&options, offset));
            anyhow::bail!("Several {what}s are available; pick one with --{what} <N>");
        }
        Err(err) => return Err(err.into()),
    };

    if format != OutputFormat::Table {
        return print_value(&serde_json::to_value(&outcome)?, format);
    }
    print_summary(&outcome, offset);
    Ok(())
}

fn build_request(args: &BookArgs) -> Result<BookingRequest> {
    let mut request = BookingRequest::new(args.citizen.as_str(), parse_day(&args.day)?);
    request.professional = parse_choice(args.professional.as_deref(), "--professional")?;
    request.scope = parse_choice(args.scope.as_deref(), "--scope")?;
    request.slot = parse_choice(args.slot.as_deref(), "--slot")?;
    request.dry_run = args.dry_run;
    Ok(request)
}

fn parse_choice(raw: Option<&str>, flag: &str) -> Result<Option<Choice>> {
    raw.map(|value| {
        Choice::parse(value)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Invalid {flag}"))
    })
    .transpose()
}

fn render_options(options: &BookingOptions, offset: UtcOffset) -> String {
    match options {
        BookingOptions::Professionals(professionals) => render_table(
            &["#", "ID", "Name", "Specialties"],
            professionals.iter().enumerate().map(|(i, p)| {
                vec![
                    (i + 1).to_string(),
                    p.id.to_string(),
                    p.name.clone(),
                    p.specialties(),
                ]
            }),
        ),
        BookingOptions::Scopes(scopes) => render_table(
            &["#", "Scope", "Occupation"],
            scopes.iter().enumerate().map(|(i, s)| {
                vec![
                    (i + 1).to_string(),
                    s.id.to_string(),
                    s.occupation_name().to_string(),
                ]
            }),
        ),
        BookingOptions::Slots(slots) => render_table(
            &["#", "Time", "Id"],
            slots.iter().enumerate().map(|(i, at)| {
                vec![(i + 1).to_string(), format_clock(*at, offset), at.to_string()]
            }),
        ),
    }
}

fn print_summary(outcome: &BookingOutcome, offset: UtcOffset) {
    let plan = &outcome.plan;
    println!("{}: {} ({})", "Citizen".cyan(), plan.citizen.name, plan.citizen.id);
    println!(
        "{}: {} ({})",
        "Health unit".cyan(),
        plan.health_unit.name,
        plan.health_unit.id
    );
    println!("{}: {}", "Acting scope".cyan(), plan.acting_scope);
    println!(
        "{}: {} / {}",
        "Professional".cyan(),
        plan.professional.name,
        plan.scope.occupation_name()
    );
    println!(
        "{}: {} {}",
        "Slot".cyan(),
        esus_client::schedule::format_day(plan.day),
        format_clock(plan.slot, offset)
    );
    match &outcome.appointment {
        Some(id) => print_success(&format!("Appointment {id} created")),
        None => println!("Dry run: no appointment created"),
    }
}
