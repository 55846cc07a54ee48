mod common;

use common::*;
use esus_client::workflow::book;
use esus_client::{AppointmentId, BookingError, BookingOptions, BookingRequest, Choice, ScopeId};
use serde_json::{Value, json};
use time::macros::date;
use wiremock::MockServer;

const UNITS: &[(&str, Option<(&str, &str)>)] = &[
    ("1127", Some(("10", "UBS Centro"))),
    ("42", Some(("20", "UBS Alto"))),
];

const NINE: i64 = 1758024000000;
const TEN: i64 = 1758027600000;

async fn mount_citizen(server: &MockServer, unit: Value) {
    graphql(graphql_op("CidadaoAtendimentoSelectField").with_input("query", "12345678909"))
        .respond_with(data(json!({
            "cidadaosCombo": [{ "id": "547", "nome": "JOSÉ DA SILVA", "cpf": "12345678909" }]
        })))
        .mount(server)
        .await;
    graphql(graphql_op("BuscaDetailCidadao").with_variable("id", "547"))
        .respond_with(data(json!({
            "cidadao": { "cidadaoVinculacaoEquipe": { "unidadeSaude": unit } }
        })))
        .mount(server)
        .await;
}

async fn mount_professionals(server: &MockServer) {
    graphql(graphql_op("ProfissionalTable").with_input("unidadeSaudeId", "20"))
        .respond_with(data(json!({
            "profissionais": { "content": [
                { "id": "7", "nome": "ANA", "lotacoes": [
                    { "id": "42", "hasConfiguracaoAgenda": true, "cbo": { "id": "225125", "nome": "MÉDICO CLÍNICO" } }
                ]},
                { "id": "8", "nome": "BRUNO", "lotacoes": [
                    { "id": "43", "hasConfiguracaoAgenda": false }
                ]}
            ]}
        })))
        .mount(server)
        .await;
}

async fn mount_slots(server: &MockServer, slots: Value) {
    graphql(
        graphql_op("HorarioAgendaSelectField")
            .with_input("lotacaoId", "42")
            .with_input("dia", "2025-09-16"),
    )
    .respond_with(data(json!({ "horariosAgenda": slots })))
    .mount(server)
    .await;
}

fn request() -> BookingRequest {
    BookingRequest::new("12345678909", date!(2025 - 09 - 16))
}

#[tokio::test]
async fn books_through_the_mapped_scope() {
    let (server, config) = start().await;
    mount_citizen(&server, json!({ "id": "20", "nome": "UBS Alto" })).await;
    mount_professionals(&server).await;
    mount_slots(
        &server,
        json!([
            { "horario": NINE, "isOcupado": true },
            { "horario": TEN, "isOcupado": false }
        ]),
    )
    .await;
    graphql(graphql_op("SelecionarAcesso").with_input("id", "42"))
        .respond_with(data(json!({ "selecionarAcesso": { "id": "42" } })))
        .expect(1)
        .mount(&server)
        .await;
    graphql(
        graphql_op("SalvarAgendamentoConsulta")
            .with_input("cidadao", "547")
            .with_input("lotacao", "42")
            .with_input("horario", TEN),
    )
    .respond_with(data(json!({ "salvarAgendamentoConsulta": "9001" })))
    .expect(1)
    .mount(&server)
    .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let outcome = book(&mut manager, &request()).await.unwrap();

    assert_eq!(outcome.appointment, Some(AppointmentId::from("9001")));
    assert_eq!(outcome.plan.acting_scope, ScopeId::from("42"));
    assert_eq!(outcome.plan.professional.name, "ANA");
    assert_eq!(outcome.plan.slot, TEN);
    assert_eq!(manager.active_scope(), Some(&ScopeId::from("42")));
}

#[tokio::test]
async fn appointment_goes_to_the_professional_scope_while_acting_as_the_unit() {
    let (server, config) = start().await;
    mount_citizen(&server, json!({ "id": "20", "nome": "UBS Alto" })).await;
    graphql(graphql_op("ProfissionalTable").with_input("unidadeSaudeId", "20"))
        .respond_with(data(json!({
            "profissionais": { "content": [
                { "id": "9", "nome": "CARLA", "lotacoes": [
                    { "id": "77", "hasConfiguracaoAgenda": true }
                ]}
            ]}
        })))
        .mount(&server)
        .await;
    graphql(
        graphql_op("HorarioAgendaSelectField")
            .with_input("lotacaoId", "77")
            .with_input("dia", "2025-09-16"),
    )
    .respond_with(data(json!({ "horariosAgenda": [{ "horario": TEN, "isOcupado": false }] })))
    .mount(&server)
    .await;
    graphql(graphql_op("SelecionarAcesso").with_input("id", "42"))
        .respond_with(data(json!({ "selecionarAcesso": { "id": "42" } })))
        .expect(1)
        .mount(&server)
        .await;
    graphql(
        graphql_op("SalvarAgendamentoConsulta")
            .with_input("cidadao", "547")
            .with_input("lotacao", "77"),
    )
    .respond_with(data(json!({ "salvarAgendamentoConsulta": 9002 })))
    .expect(1)
    .mount(&server)
    .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let outcome = book(&mut manager, &request()).await.unwrap();

    assert_eq!(outcome.appointment, Some(AppointmentId::from("9002")));
    assert_eq!(outcome.plan.acting_scope, ScopeId::from("42"));
    assert_eq!(outcome.plan.scope.id, ScopeId::from("77"));
    assert_eq!(manager.active_scope(), Some(&ScopeId::from("42")));
}

#[tokio::test]
async fn unit_without_grant_stops_before_switching() {
    let (server, config) = start().await;
    mount_citizen(&server, json!({ "id": "30", "nome": "UBS Rural" })).await;
    graphql(graphql_op("SelecionarAcesso").with_input("id", "42"))
        .respond_with(data(json!({ "selecionarAcesso": { "id": "42" } })))
        .expect(0)
        .mount(&server)
        .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let err = book(&mut manager, &request()).await.unwrap_err();

    match err {
        BookingError::NoAccess(unit) => assert_eq!(unit.name, "UBS Rural"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(manager.active_scope(), Some(&ScopeId::from("1127")));
}

#[tokio::test]
async fn dry_run_does_not_create() {
    let (server, config) = start().await;
    mount_citizen(&server, json!({ "id": "20", "nome": "UBS Alto" })).await;
    mount_professionals(&server).await;
    mount_slots(&server, json!([{ "horario": TEN, "isOcupado": false }])).await;
    graphql(graphql_op("SalvarAgendamentoConsulta"))
        .respond_with(data(json!({ "salvarAgendamentoConsulta": "1" })))
        .expect(0)
        .mount(&server)
        .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let mut request = request();
    request.dry_run = true;

    let outcome = book(&mut manager, &request).await.unwrap();
    assert!(outcome.appointment.is_none());
    assert_eq!(outcome.plan.slot, TEN);
}

#[tokio::test]
async fn several_open_slots_need_a_choice() {
    let (server, config) = start().await;
    mount_citizen(&server, json!({ "id": "20", "nome": "UBS Alto" })).await;
    mount_professionals(&server).await;
    mount_slots(
        &server,
        json!([
            { "horario": NINE, "isOcupado": false },
            { "horario": TEN, "isOcupado": false }
        ]),
    )
    .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let err = book(&mut manager, &request()).await.unwrap_err();
    match err {
        BookingError::NeedsChoice { what, options } => {
            assert_eq!(what, "slot");
            assert_eq!(options, BookingOptions::Slots(vec![NINE, TEN]));
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut request = request();
    request.slot = Some(Choice::Index(2));
    request.dry_run = true;
    let outcome = book(&mut manager, &request).await.unwrap();
    assert_eq!(outcome.plan.slot, TEN);
}

#[tokio::test]
async fn unknown_citizen_is_reported() {
    let (server, config) = start().await;
    graphql(graphql_op("CidadaoAtendimentoSelectField"))
        .respond_with(data(json!({ "cidadaosCombo": [] })))
        .mount(&server)
        .await;
    mount_session(&server, UNITS).await;

    let mut manager = logged_in(config).await;
    let err = book(&mut manager, &request()).await.unwrap_err();
    assert!(matches!(err, BookingError::CitizenNotFound(query) if query == "12345678909"));
}
