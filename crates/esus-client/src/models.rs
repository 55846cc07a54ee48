//! Domain types returned by the PEC GraphQL API.
//!
//! Field names follow the service's Portuguese schema on the wire and are
//! renamed to English on the Rust side.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// GraphQL `ID` values arrive either as strings or as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier text.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserialize_id(deserializer).map(Self)
            }
        }
    };
}

string_id!(
    /// A scope ("lotação"): a professional's binding to one health unit.
    ScopeId
);
string_id!(
    /// A health unit ("UBS").
    HealthUnitId
);
string_id!(
    /// A citizen record.
    CitizenId
);
string_id!(
    /// A citizen contact sub-record.
    ContactId
);
string_id!(
    /// A professional record.
    ProfessionalId
);
string_id!(
    /// A CBO occupation code record.
    OccupationId
);
string_id!(
    /// A scheduled appointment.
    AppointmentId
);

/// A health facility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthUnit {
    pub id: HealthUnitId,
    #[serde(rename = "nome", default)]
    pub name: String,
}

/// Contact details requested through `@include(if: $retrieveContato)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(rename = "telefoneCelular", default)]
    pub mobile_phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A citizen as returned by the `cidadaosCombo` search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nomeSocial", default)]
    pub social_name: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub cns: Option<String>,
    #[serde(rename = "dataNascimento", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "contato", default)]
    pub contact: Option<Contact>,
}

/// CBO occupation attached to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupation {
    pub id: OccupationId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// One of a professional's scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalScope {
    pub id: ScopeId,
    #[serde(rename = "ativo", default)]
    pub active: Option<bool>,
    #[serde(rename = "hasConfiguracaoAgenda", default)]
    pub has_schedule: bool,
    #[serde(rename = "cbo", default)]
    pub occupation: Option<Occupation>,
}

impl ProfessionalScope {
    /// Occupation name, or `-` when the service did not return one.
    #[must_use]
    pub fn occupation_name(&self) -> &str {
        self.occupation.as_ref().map_or("-", |o| o.name.as_str())
    }
}

/// A professional and their scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: ProfessionalId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "nomeSocial", default)]
    pub social_name: Option<String>,
    #[serde(rename = "lotacoes", default)]
    pub scopes: Vec<ProfessionalScope>,
}

impl Professional {
    /// Scopes with an active schedule configuration.
    pub fn scheduled_scopes(&self) -> impl Iterator<Item = &ProfessionalScope> {
        self.scopes.iter().filter(|scope| scope.has_schedule)
    }

    /// Whether at least one scope has a schedule configured.
    #[must_use]
    pub fn has_schedule(&self) -> bool {
        self.scheduled_scopes().next().is_some()
    }

    /// Comma-separated occupation names of the scheduled scopes.
    #[must_use]
    pub fn specialties(&self) -> String {
        self.scheduled_scopes()
            .map(ProfessionalScope::occupation_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One slot of a scope's daily schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Slot start in epoch milliseconds.
    #[serde(rename = "horario")]
    pub starts_at: i64,
    #[serde(rename = "duracao", default)]
    pub duration_minutes: Option<u32>,
    #[serde(rename = "isOcupado", default)]
    pub occupied: bool,
}

/// Situation of a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentSituation {
    Agendado,
    CidadaoPresenteNaUnidade,
    NaoCompareceu,
    AtendimentoRealizado,
    NaoAguardou,
    #[serde(other)]
    Other,
}

impl AppointmentSituation {
    /// The situations a day's agenda is queried with.
    pub const ALL: [Self; 5] = [
        Self::Agendado,
        Self::CidadaoPresenteNaUnidade,
        Self::NaoCompareceu,
        Self::AtendimentoRealizado,
        Self::NaoAguardou,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Agendado => "scheduled",
            Self::CidadaoPresenteNaUnidade => "present",
            Self::NaoCompareceu => "no-show",
            Self::AtendimentoRealizado => "attended",
            Self::NaoAguardou => "left",
            Self::Other => "other",
        }
    }
}

/// Citizen summary embedded in an appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitizenRef {
    pub id: CitizenId,
    #[serde(rename = "nome")]
    pub name: String,
}

/// An appointment on a scope's agenda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledAppointment {
    pub id: AppointmentId,
    /// Start in epoch milliseconds.
    #[serde(rename = "horarioInicial")]
    pub starts_at: i64,
    #[serde(rename = "situacao")]
    pub situation: AppointmentSituation,
    #[serde(rename = "cidadao", default)]
    pub citizen: Option<CitizenRef>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numeric_ids_become_text() {
        let unit: HealthUnit = serde_json::from_value(json!({"id": 10, "nome": "UBS Centro"})).unwrap();
        assert_eq!(unit.id, HealthUnitId::from("10"));
        assert_eq!(unit.id.to_string(), "10");
    }

    #[test]
    fn professional_schedule_helpers() {
        let prof: Professional = serde_json::from_value(json!({
            "id": "7",
            "nome": "Ana",
            "lotacoes": [
                {"id": "1", "hasConfiguracaoAgenda": false, "cbo": {"id": "a", "nome": "Enfermeiro"}},
                {"id": "2", "hasConfiguracaoAgenda": true, "cbo": {"id": "b", "nome": "Médico clínico"}},
                {"id": "3", "hasConfiguracaoAgenda": true, "cbo": null}
            ]
        }))
        .unwrap();

        assert!(prof.has_schedule());
        assert_eq!(prof.scheduled_scopes().count(), 2);
        assert_eq!(prof.specialties(), "Médico clínico, -");
    }

    #[test]
    fn unknown_situation_maps_to_other() {
        let appt: ScheduledAppointment = serde_json::from_value(json!({
            "id": "55",
            "horarioInicial": 1757941200000_i64,
            "situacao": "CANCELADO",
            "cidadao": {"id": "547", "nome": "José"}
        }))
        .unwrap();
        assert_eq!(appt.situation, AppointmentSituation::Other);

        let wire = serde_json::to_value(AppointmentSituation::CidadaoPresenteNaUnidade).unwrap();
        assert_eq!(wire, json!("CIDADAO_PRESENTE_NA_UNIDADE"));
    }
}
