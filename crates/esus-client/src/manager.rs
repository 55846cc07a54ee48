//! Session and scope ("lotação") management for the PEC API.
//!
//! [`SessionContextManager`] logs in, learns which scopes the identity may
//! act under, and switches the session's active scope on request. Every
//! public operation logs its own failure and returns `false`, `None`, or an
//! empty list; nothing is retried and no error crosses an operation boundary.
//!
//! The manager never switches scope on its own. Before calling a
//! scope-dependent operation for health unit `U`, callers switch to
//! `access_map().scope_for(U)`; otherwise the service rejects the call.

use serde::Deserialize;
use serde_json::{Value, json};
use time::Date;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::graphql::GraphQLTransport;
use crate::models::{
    AppointmentId, AppointmentSituation, Citizen, CitizenId, HealthUnit, HealthUnitId,
    OccupationId, Professional, ScheduleSlot, ScheduledAppointment, ScopeId,
};
use crate::operations::{self, Operation};
use crate::schedule::{format_day, local_midnight_utc};
use crate::session::{AccessGrant, AccessMap, Session};

// Response shapes. Intermediate objects are nullable in the schema, so every
// level defaults to empty.

#[derive(Debug, Deserialize)]
struct SessionData {
    sessao: Option<SessionNode>,
}

#[derive(Debug, Deserialize)]
struct SessionNode {
    profissional: Option<SessionProfessional>,
}

#[derive(Debug, Deserialize)]
struct SessionProfessional {
    #[serde(default)]
    acessos: Vec<AccessGrant>,
}

#[derive(Debug, Deserialize)]
struct CitizenSearchData {
    #[serde(rename = "cidadaosCombo", default)]
    citizens: Vec<Citizen>,
}

#[derive(Debug, Deserialize)]
struct CitizenDetailData {
    cidadao: Option<CitizenDetail>,
}

#[derive(Debug, Deserialize)]
struct CitizenDetail {
    #[serde(rename = "cidadaoVinculacaoEquipe")]
    team_binding: Option<UnitHolder>,
}

#[derive(Debug, Deserialize)]
struct UnitHolder {
    #[serde(rename = "unidadeSaude")]
    health_unit: Option<HealthUnit>,
}

#[derive(Debug, Deserialize)]
struct ScopeUnitData {
    lotacao: Option<UnitHolder>,
}

#[derive(Debug, Deserialize)]
struct ProfessionalsData {
    profissionais: Option<Page<Professional>>,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    content: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct SlotsData {
    #[serde(rename = "horariosAgenda", default)]
    slots: Vec<ScheduleSlot>,
}

#[derive(Debug, Deserialize)]
struct SaveAppointmentData {
    #[serde(rename = "salvarAgendamentoConsulta")]
    appointment: Option<AppointmentId>,
}

#[derive(Debug, Deserialize)]
struct AgendaData {
    agendados: Option<Page<ScheduledAppointment>>,
}

/// Owns one authenticated PEC session and the access map derived from it.
#[derive(Debug)]
pub struct SessionContextManager {
    transport: GraphQLTransport,
    session: Option<Session>,
    grants: Vec<AccessGrant>,
    access_map: AccessMap,
}

impl SessionContextManager {
    /// Creates an unauthenticated manager for `config`.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            transport: GraphQLTransport::new(config),
            session: None,
            grants: Vec::new(),
            access_map: AccessMap::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        self.transport.config()
    }

    /// Current session, if [`authenticate`](Self::authenticate) succeeded.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Scope recorded by the last successful switch (or by login).
    pub fn active_scope(&self) -> Option<&ScopeId> {
        self.session.as_ref().and_then(Session::active_scope)
    }

    /// Grants returned by the most recent successful introspection.
    pub fn access_grants(&self) -> &[AccessGrant] {
        &self.grants
    }

    /// Health unit → scope map from the last [`build_access_map`](Self::build_access_map).
    pub fn access_map(&self) -> &AccessMap {
        &self.access_map
    }

    /// Logs in with `force: true`, discovers the identity's grants, and
    /// activates the first one.
    ///
    /// Once the login mutation succeeds, the previous session, grants and
    /// access map are discarded, even if a later step fails. A login rejected
    /// by the service leaves the manager untouched.
    pub async fn authenticate(&mut self, identifier: &str, secret: &str) -> bool {
        match self.try_authenticate(identifier, secret).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                false
            }
        }
    }

    async fn try_authenticate(&mut self, identifier: &str, secret: &str) -> ClientResult<()> {
        tracing::info!("logging in with forced session takeover");
        let session = self.transport.login(identifier, secret).await?;
        // The forced login ends any earlier session on the service side.
        self.session = None;
        self.grants.clear();
        self.access_map = AccessMap::default();

        let grants = self.fetch_grants(&session).await?;
        let first = grants
            .first()
            .map(|grant| grant.scope_id.clone())
            .ok_or_else(|| ClientError::Authentication("identity has no access grants".into()))?;

        self.select_access(&session, &first).await?;
        tracing::info!(scope = %first, grants = grants.len(), "session activated");

        self.session = Some(session.with_active_scope(first));
        self.grants = grants;
        Ok(())
    }

    /// Rebuilds the access map from a fresh introspection.
    ///
    /// Grants without a health unit are skipped; for duplicate units the
    /// later grant wins. On failure the previous map is kept.
    pub async fn build_access_map(&mut self) -> bool {
        let result = match self.current_session() {
            Ok(session) => self.fetch_grants(session).await,
            Err(err) => Err(err),
        };
        let Some(grants) = settle(&operations::SESSION, result) else {
            return false;
        };
        self.access_map = AccessMap::from_grants(&grants);
        self.grants = grants;
        tracing::info!(units = self.access_map.len(), "access map built");
        true
    }

    /// Makes `scope` the session's active scope.
    ///
    /// The scope is not checked against the grants; the service rejects
    /// scopes the identity does not hold. Switching to the current scope is
    /// still sent.
    pub async fn switch_context(&mut self, scope: &ScopeId) -> bool {
        let result = match self.current_session() {
            Ok(session) => self
                .select_access(session, scope)
                .await
                .map(|()| session.with_active_scope(scope.clone())),
            Err(err) => Err(err),
        };
        match settle(&operations::SELECT_ACCESS, result) {
            Some(next) => {
                tracing::info!(%scope, "switched active scope");
                self.session = Some(next);
                true
            }
            None => false,
        }
    }

    /// First citizen matching `query` (name, CPF, or CNS).
    ///
    /// `None` covers both "no match" and failures.
    pub async fn find_subject_by_identifier(
        &self,
        query: &str,
        include_contact: bool,
    ) -> Option<Citizen> {
        let result = self.try_search_citizens(query, 1, include_contact).await;
        settle(&operations::CITIZEN_SEARCH, result)?.into_iter().next()
    }

    /// Up to `limit` active, living citizens matching `query`.
    pub async fn search_citizens(
        &self,
        query: &str,
        limit: u32,
        include_contact: bool,
    ) -> Vec<Citizen> {
        let result = self.try_search_citizens(query, limit, include_contact).await;
        settle(&operations::CITIZEN_SEARCH, result).unwrap_or_default()
    }

    async fn try_search_citizens(
        &self,
        query: &str,
        limit: u32,
        include_contact: bool,
    ) -> ClientResult<Vec<Citizen>> {
        let variables = json!({
            "input": { "query": query, "ativo": true, "obito": false, "limit": limit },
            "emAtencaoDomiciliar": false,
            "retrieveContato": include_contact,
        });
        let data: CitizenSearchData = self.run(&operations::CITIZEN_SEARCH, variables).await?;
        Ok(data.citizens)
    }

    /// Health unit of the citizen's team binding.
    pub async fn find_health_unit_for_subject(&self, citizen: &CitizenId) -> Option<HealthUnit> {
        let result = self
            .run::<CitizenDetailData>(&operations::CITIZEN_DETAIL, json!({ "id": citizen }))
            .await;
        settle(&operations::CITIZEN_DETAIL, result)?
            .cidadao?
            .team_binding?
            .health_unit
    }

    /// Health unit `scope` is bound to.
    pub async fn health_unit_for_scope(&self, scope: &ScopeId) -> Option<HealthUnit> {
        let result = self
            .run::<ScopeUnitData>(&operations::SCOPE_UNIT, json!({ "id": scope }))
            .await;
        settle(&operations::SCOPE_UNIT, result)?
            .lotacao?
            .health_unit
    }

    /// Professionals of `unit` with at least one scheduled scope.
    ///
    /// The service returns every professional of the unit; the filter is
    /// applied here.
    pub async fn list_eligible_professionals(&self, unit: &HealthUnitId) -> Vec<Professional> {
        let variables = json!({
            "input": {
                "unidadeSaudeId": unit,
                "pageParams": { "sort": ["nome"] },
                "mostrarSemLotacaoAtiva": true,
            }
        });
        let result = self.fetch_professionals(variables).await;
        settle(&operations::PROFESSIONALS, result)
            .map(retain_scheduled)
            .unwrap_or_default()
    }

    /// Professionals holding a scope with CBO `occupation`, unfiltered.
    pub async fn list_professionals_by_occupation(
        &self,
        occupation: &OccupationId,
    ) -> Vec<Professional> {
        let variables = json!({
            "input": {
                "cboId": occupation,
                "pageParams": { "sort": ["nome"] },
                "mostrarSemLotacaoAtiva": true,
            }
        });
        let result = self.fetch_professionals(variables).await;
        settle(&operations::PROFESSIONALS, result).unwrap_or_default()
    }

    async fn fetch_professionals(&self, variables: Value) -> ClientResult<Vec<Professional>> {
        let data: ProfessionalsData = self.run(&operations::PROFESSIONALS, variables).await?;
        Ok(data.profissionais.map(|page| page.content).unwrap_or_default())
    }

    /// Every slot of `scope`'s schedule on `day`, in service order.
    pub async fn day_schedule(&self, scope: &ScopeId, day: Date) -> Vec<ScheduleSlot> {
        let result = self.try_day_schedule(scope, day).await;
        settle(&operations::SCHEDULE_SLOTS, result).unwrap_or_default()
    }

    async fn try_day_schedule(
        &self,
        scope: &ScopeId,
        day: Date,
    ) -> ClientResult<Vec<ScheduleSlot>> {
        let variables = json!({
            "input": {
                "lotacaoId": scope,
                "dia": format_day(day),
                "isAtencaoDomiciliar": false,
                "agendamentosIdsDesconsiderar": [],
            }
        });
        let data: SlotsData = self.run(&operations::SCHEDULE_SLOTS, variables).await?;
        Ok(data.slots)
    }

    /// Start times (epoch ms) of the unoccupied slots of `scope` on `day`.
    pub async fn list_open_slots(&self, scope: &ScopeId, day: Date) -> Vec<i64> {
        open_slot_times(&self.day_schedule(scope, day).await)
    }

    /// Books `citizen` into `scope` at `slot` (epoch ms).
    ///
    /// The active scope must already be `scope`.
    pub async fn create_appointment(
        &self,
        citizen: &CitizenId,
        scope: &ScopeId,
        slot: i64,
    ) -> Option<AppointmentId> {
        let variables = json!({
            "input": {
                "cidadao": citizen,
                "horario": slot,
                "isForaUbs": false,
                "lotacao": scope,
            }
        });
        let result = self
            .run::<SaveAppointmentData>(&operations::SAVE_APPOINTMENT, variables)
            .await;
        let id = settle(&operations::SAVE_APPOINTMENT, result)?.appointment?;
        tracing::info!(appointment = %id, %citizen, %scope, "appointment created");
        Some(id)
    }

    /// Appointments booked for `scope` on `day`, in every situation.
    pub async fn appointments_for_day(
        &self,
        scope: &ScopeId,
        day: Date,
    ) -> Vec<ScheduledAppointment> {
        let result = self.try_appointments_for_day(scope, day).await;
        settle(&operations::DAY_AGENDA, result).unwrap_or_default()
    }

    async fn try_appointments_for_day(
        &self,
        scope: &ScopeId,
        day: Date,
    ) -> ClientResult<Vec<ScheduledAppointment>> {
        let midnight = local_midnight_utc(day, self.config().display_offset);
        let variables = json!({
            "input": {
                "lotacaoId": scope,
                "dataAgendadoInicio": midnight,
                "dataAgendadoFim": midnight,
                "situacao": AppointmentSituation::ALL,
            }
        });
        let session = self.current_session()?;
        let data: AgendaData = self
            .transport
            .execute_batched(session, &operations::DAY_AGENDA, variables)
            .await?;
        Ok(data.agendados.map(|page| page.content).unwrap_or_default())
    }

    fn current_session(&self) -> ClientResult<&Session> {
        self.session.as_ref().ok_or(ClientError::NotAuthenticated)
    }

    async fn run<T: serde::de::DeserializeOwned>(
        &self,
        operation: &Operation,
        variables: Value,
    ) -> ClientResult<T> {
        let session = self.current_session()?;
        self.transport.execute(session, operation, variables).await
    }

    async fn fetch_grants(&self, session: &Session) -> ClientResult<Vec<AccessGrant>> {
        let data: SessionData = self
            .transport
            .execute(session, &operations::SESSION, json!({}))
            .await?;
        Ok(data
            .sessao
            .and_then(|node| node.profissional)
            .map(|prof| prof.acessos)
            .unwrap_or_default())
    }

    async fn select_access(&self, session: &Session, scope: &ScopeId) -> ClientResult<()> {
        let _: Value = self
            .transport
            .execute(
                session,
                &operations::SELECT_ACCESS,
                json!({ "input": { "id": scope } }),
            )
            .await?;
        Ok(())
    }
}

/// Logs a failed operation and turns it into `None`.
fn settle<T>(operation: &Operation, result: ClientResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(operation = operation.name, error = %err, "operation failed");
            None
        }
    }
}

/// Start times of the slots whose occupied flag is false, in input order.
#[must_use]
pub fn open_slot_times(slots: &[ScheduleSlot]) -> Vec<i64> {
    slots
        .iter()
        .filter(|slot| !slot.occupied)
        .map(|slot| slot.starts_at)
        .collect()
}

/// Drops professionals without any scheduled scope.
#[must_use]
pub fn retain_scheduled(mut professionals: Vec<Professional>) -> Vec<Professional> {
    professionals.retain(Professional::has_schedule);
    professionals
}
