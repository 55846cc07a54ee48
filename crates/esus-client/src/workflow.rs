//! Citizen-to-appointment booking flow.
//!
//! [`book`] chains the manager operations in the order the service requires:
//! find the citizen, resolve their health unit, switch to the scope mapped
//! for that unit, pick a professional and one of their scheduled scopes, pick
//! an open slot, and create the appointment. It stops at the first step that
//! comes back empty.

use serde::Serialize;
use time::Date;

use crate::manager::SessionContextManager;
use crate::models::{
    AppointmentId, Citizen, HealthUnit, Professional, ProfessionalScope, ScopeId,
};

/// How the caller picks among listed options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// 1-based position in the listed options.
    Index(usize),
    /// Identifier of the option (professional id, scope id, or slot epoch ms).
    Id(String),
}

impl Choice {
    /// Parses `id:<value>` as an id and anything else as a 1-based index
    /// (an optional leading `#` is accepted).
    ///
    /// # Errors
    ///
    /// Returns a message when the input is neither.
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if let Some(id) = input.strip_prefix("id:") {
            return Ok(Self::Id(id.trim().to_string()));
        }
        input
            .trim_start_matches('#')
            .parse()
            .map(Self::Index)
            .map_err(|_| {
                format!("expected a position like 2 or an id like id:1127, got {input:?}")
            })
    }
}

/// Inputs for one booking attempt.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    /// Name, CPF, or CNS of the citizen.
    pub citizen_query: String,
    pub day: Date,
    pub professional: Option<Choice>,
    pub scope: Option<Choice>,
    pub slot: Option<Choice>,
    /// Stop after planning, without creating the appointment.
    pub dry_run: bool,
}

impl BookingRequest {
    pub fn new(citizen_query: impl Into<String>, day: Date) -> Self {
        Self {
            citizen_query: citizen_query.into(),
            day,
            professional: None,
            scope: None,
            slot: None,
            dry_run: false,
        }
    }
}

/// Options offered when a choice is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum BookingOptions {
    Professionals(Vec<Professional>),
    Scopes(Vec<ProfessionalScope>),
    Slots(Vec<i64>),
}

/// Why a booking attempt stopped.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Citizen not found for \"{0}\"")]
    CitizenNotFound(String),

    #[error("Citizen {0} is not bound to any health unit")]
    NoHealthUnit(String),

    #[error("No scope grants access to health unit \"{}\" ({})", .0.name, .0.id)]
    NoAccess(HealthUnit),

    #[error("Failed to switch the session to scope {0}")]
    SwitchFailed(ScopeId),

    #[error("No professional with a configured schedule in health unit \"{0}\"")]
    NoProfessionals(String),

    #[error("Invalid {what} choice {choice:?}")]
    InvalidChoice { what: &'static str, choice: Choice },

    #[error("A {what} must be chosen")]
    NeedsChoice {
        what: &'static str,
        options: BookingOptions,
    },

    #[error("No open slots on {0}")]
    NoOpenSlots(String),

    #[error("The service did not create the appointment")]
    CreateFailed,
}

/// Everything decided before the appointment is created.
#[derive(Debug, Clone, Serialize)]
pub struct BookingPlan {
    pub citizen: Citizen,
    pub health_unit: HealthUnit,
    /// Scope the session acts under for this unit.
    pub acting_scope: ScopeId,
    pub professional: Professional,
    /// The professional's scope that owns the schedule.
    pub scope: ProfessionalScope,
    #[serde(with = "day_text")]
    pub day: Date,
    /// Slot start in epoch milliseconds.
    pub slot: i64,
}

/// Result of [`book`].
#[derive(Debug, Clone, Serialize)]
pub struct BookingOutcome {
    pub plan: BookingPlan,
    /// `None` for dry runs.
    pub appointment: Option<AppointmentId>,
}

/// Runs the booking flow for `request`.
///
/// The manager must already be authenticated with its access map built.
///
/// # Errors
///
/// Returns the first step that failed. A missing choice with more than one
/// option yields [`BookingError::NeedsChoice`] carrying the options.
pub async fn book(
    manager: &mut SessionContextManager,
    request: &BookingRequest,
) -> Result<BookingOutcome, BookingError> {
    let citizen = manager
        .find_subject_by_identifier(&request.citizen_query, false)
        .await
        .ok_or_else(|| BookingError::CitizenNotFound(request.citizen_query.clone()))?;
    tracing::info!(citizen = %citizen.id, "citizen found");

    let health_unit = manager
        .find_health_unit_for_subject(&citizen.id)
        .await
        .ok_or_else(|| BookingError::NoHealthUnit(citizen.id.to_string()))?;

    let acting_scope = manager
        .access_map()
        .scope_for(&health_unit.id)
        .cloned()
        .ok_or_else(|| BookingError::NoAccess(health_unit.clone()))?;

    if !manager.switch_context(&acting_scope).await {
        return Err(BookingError::SwitchFailed(acting_scope));
    }

    let professionals = manager.list_eligible_professionals(&health_unit.id).await;
    if professionals.is_empty() {
        return Err(BookingError::NoProfessionals(health_unit.name.clone()));
    }
    let professional = pick(
        "professional",
        &professionals,
        request.professional.as_ref(),
        |p| p.id.to_string(),
        BookingOptions::Professionals,
    )?
    .clone();

    let scheduled: Vec<ProfessionalScope> = professional.scheduled_scopes().cloned().collect();
    let scope = pick(
        "scope",
        &scheduled,
        request.scope.as_ref(),
        |s| s.id.to_string(),
        BookingOptions::Scopes,
    )?
    .clone();

    let open = manager.list_open_slots(&scope.id, request.day).await;
    if open.is_empty() {
        return Err(BookingError::NoOpenSlots(crate::schedule::format_day(request.day)));
    }
    let slot = *pick(
        "slot",
        &open,
        request.slot.as_ref(),
        i64::to_string,
        BookingOptions::Slots,
    )?;

    let plan = BookingPlan {
        citizen,
        health_unit,
        acting_scope,
        professional,
        scope,
        day: request.day,
        slot,
    };

    if request.dry_run {
        return Ok(BookingOutcome {
            plan,
            appointment: None,
        });
    }

    let appointment = manager
        .create_appointment(&plan.citizen.id, &plan.scope.id, plan.slot)
        .await
        .ok_or(BookingError::CreateFailed)?;

    Ok(BookingOutcome {
        plan,
        appointment: Some(appointment),
    })
}

fn pick<'a, T: Clone>(
    what: &'static str,
    items: &'a [T],
    choice: Option<&Choice>,
    id_of: impl Fn(&T) -> String,
    options: impl FnOnce(Vec<T>) -> BookingOptions,
) -> Result<&'a T, BookingError> {
    let invalid = |choice: &Choice| BookingError::InvalidChoice {
        what,
        choice: choice.clone(),
    };
    match choice {
        None if items.len() == 1 => Ok(&items[0]),
        None => Err(BookingError::NeedsChoice {
            what,
            options: options(items.to_vec()),
        }),
        Some(c @ Choice::Index(index)) => index
            .checked_sub(1)
            .and_then(|i| items.get(i))
            .ok_or_else(|| invalid(c)),
        Some(c @ Choice::Id(id)) => items
            .iter()
            .find(|&item| id_of(item) == *id)
            .ok_or_else(|| invalid(c)),
    }
}

mod day_text {
    use serde::Serializer;
    use time::Date;

    pub fn serialize<S: Serializer>(day: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::schedule::format_day(*day))
    }
}
