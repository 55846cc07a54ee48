use anyhow::{Context, Result};
use esus_client::schedule::format_clock;
use esus_client::{ScheduleSlot, ScheduledAppointment, ScopeId, SessionContextManager};
use time::UtcOffset;

use super::{act_for_scope, parse_day};
use crate::cli::{AppointmentsArgs, OutputFormat, ScopeUnitArgs, SlotsArgs};
use crate::output::{print_list, print_value};

pub async fn slots(
    manager: &mut SessionContextManager,
    args: &SlotsArgs,
    format: OutputFormat,
) -> Result<()> {
    let day = parse_day(&args.day)?;
    let scope = ScopeId::new(args.scope.as_str());
    act_for_scope(manager, &scope).await?;
    let offset = manager.config().display_offset;

    let mut slots = manager.day_schedule(&scope, day).await;
    if !args.all {
        slots.retain(|slot| !slot.occupied);
    }
    print_list(
        &slots,
        format,
        &["#", "Time", "Duration", "Status", "Id"],
        |slot| slot_row(&slots, slot, offset),
    )
}

pub async fn appointments(
    manager: &mut SessionContextManager,
    args: &AppointmentsArgs,
    format: OutputFormat,
) -> Result<()> {
    let day = parse_day(&args.day)?;
    let scope = ScopeId::new(args.scope.as_str());
    act_for_scope(manager, &scope).await?;
    let offset = manager.config().display_offset;
    let booked = manager.appointments_for_day(&scope, day).await;
    print_list(
        &booked,
        format,
        &["ID", "Time", "Situation", "Citizen"],
        |appointment| appointment_row(appointment, offset),
    )
}

pub async fn scope_unit(
    manager: &SessionContextManager,
    args: &ScopeUnitArgs,
    format: OutputFormat,
) -> Result<()> {
    let unit = manager
        .health_unit_for_scope(&ScopeId::new(args.scope_id.as_str()))
        .await
        .with_context(|| format!("No health unit found for scope {}", args.scope_id))?;
    print_value(&serde_json::to_value(&unit)?, format)
}

fn slot_row(all: &[ScheduleSlot], slot: &ScheduleSlot, offset: UtcOffset) -> Vec<String> {
    // Booking positions count open slots only.
    let position = all
        .iter()
        .filter(|s| !s.occupied)
        .position(|s| s == slot)
        .filter(|_| !slot.occupied)
        .map_or_else(|| "-".to_string(), |i| (i + 1).to_string());
    vec![
        position,
        format_clock(slot.starts_at, offset),
        slot.duration_minutes
            .map_or_else(|| "-".to_string(), |m| format!("{m} min")),
        if slot.occupied { "occupied" } else { "open" }.to_string(),
        slot.starts_at.to_string(),
    ]
}

fn appointment_row(appointment: &ScheduledAppointment, offset: UtcOffset) -> Vec<String> {
    vec![
        appointment.id.to_string(),
        format_clock(appointment.starts_at, offset),
        appointment.situation.label().to_string(),
        appointment
            .citizen
            .as_ref()
            .map_or_else(|| "-".to_string(), |c| c.name.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn slot_rows_show_local_time() {
        let slots = [
            ScheduleSlot {
                starts_at: 1_757_941_200_000,
                duration_minutes: Some(20),
                occupied: false,
            },
            ScheduleSlot {
                starts_at: 1_757_942_400_000,
                duration_minutes: None,
                occupied: true,
            },
        ];
        let open = slot_row(&slots, &slots[0], offset!(-3));
        assert_eq!(open, vec!["1", "10:00", "20 min", "open", "1757941200000"]);

        let taken = slot_row(&slots, &slots[1], offset!(-3));
        assert_eq!(taken, vec!["-", "10:20", "-", "occupied", "1757942400000"]);
    }
}
