#![allow(dead_code)]

use esus_client::{ClientConfig, SessionContextManager};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

pub const GRAPHQL_PATH: &str = "/api/graphql";
pub const COOKIE: &str = "JSESSIONID=sess-1; XSRF-TOKEN=xsrf-1";
pub const XSRF: &str = "xsrf-1";

/// Matches a GraphQL request by operation name and, optionally, variables.
pub struct GraphQLOperation {
    name: &'static str,
    input: Vec<(&'static str, Value)>,
    variables: Vec<(&'static str, Value)>,
    batched: bool,
}

pub fn graphql_op(name: &'static str) -> GraphQLOperation {
    GraphQLOperation {
        name,
        input: Vec::new(),
        variables: Vec::new(),
        batched: false,
    }
}

impl GraphQLOperation {
    /// Requires `variables.input.<key> == value`.
    pub fn with_input(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.input.push((key, value.into()));
        self
    }

    /// Requires `variables.<key> == value`.
    pub fn with_variable(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.variables.push((key, value.into()));
        self
    }

    /// Requires the array envelope form.
    pub fn batched(mut self) -> Self {
        self.batched = true;
        self
    }
}

impl Match for GraphQLOperation {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return false;
        };
        let envelope = match (&body, self.batched) {
            (Value::Array(items), true) if items.len() == 1 => &items[0],
            (Value::Object(_), false) => &body,
            _ => return false,
        };
        envelope["operationName"] == self.name
            && self
                .input
                .iter()
                .all(|(key, value)| envelope["variables"]["input"][*key] == *value)
            && self
                .variables
                .iter()
                .all(|(key, value)| envelope["variables"][*key] == *value)
    }
}

/// `{ "data": data }`
pub fn data(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// `{ "data": null, "errors": [{ "message": message }] }` with HTTP 200.
pub fn gql_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "data": null,
        "errors": [{ "message": message }]
    }))
}

pub fn login_response(session: &str, xsrf: &str) -> ResponseTemplate {
    data(json!({ "login": { "success": true } }))
        .append_header("set-cookie", format!("JSESSIONID={session}; Path=/; HttpOnly").as_str())
        .append_header("set-cookie", format!("XSRF-TOKEN={xsrf}; Path=/").as_str())
}

/// Introspection payload for `(scope id, optional (unit id, unit name))` grants.
pub fn session_data(grants: &[(&str, Option<(&str, &str)>)]) -> Value {
    let acessos: Vec<Value> = grants
        .iter()
        .map(|(scope, unit)| match unit {
            Some((id, name)) => json!({ "id": scope, "unidadeSaude": { "id": id, "nome": name } }),
            None => json!({ "id": scope }),
        })
        .collect();
    json!({ "sessao": { "profissional": { "acessos": acessos } } })
}

pub async fn start() -> (MockServer, ClientConfig) {
    let server = MockServer::start().await;
    let config = ClientConfig::from_endpoint(&format!("{}{GRAPHQL_PATH}", server.uri()))
        .expect("mock server uri is a valid endpoint");
    (server, config)
}

pub fn graphql(operation: GraphQLOperation) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(GRAPHQL_PATH))
        .and(operation)
}

/// Mounts a successful login, an introspection answering `grants`, and a
/// scope selection that accepts any id.
pub async fn mount_session(server: &MockServer, grants: &[(&str, Option<(&str, &str)>)]) {
    graphql(graphql_op("Login"))
        .respond_with(login_response("sess-1", XSRF))
        .mount(server)
        .await;
    graphql(graphql_op("Sessao"))
        .respond_with(data(session_data(grants)))
        .mount(server)
        .await;
    graphql(graphql_op("SelecionarAcesso"))
        .respond_with(data(json!({ "selecionarAcesso": { "id": "ok" } })))
        .mount(server)
        .await;
}

/// A manager logged in against `server` with the access map built.
pub async fn logged_in(config: ClientConfig) -> SessionContextManager {
    let mut manager = SessionContextManager::new(config);
    assert!(manager.authenticate("12345678900", "secret").await);
    assert!(manager.build_access_map().await);
    manager
}
