//! GraphQL wire envelope and HTTP transport.

use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::operations::{self, Operation};
use crate::session::Session;

const CLIENT_NAME_HEADER: &str = "apollographql-client-name";
const CLIENT_VERSION_HEADER: &str = "apollographql-client-version";
const CONSUMER_ID_HEADER: &str = "Api-Consumer-Id";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Request envelope: `{ operationName, query, variables }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    pub operation_name: String,
    pub query: String,
    pub variables: Value,
}

impl GraphQLRequest {
    pub fn new(operation: &Operation, variables: Value) -> Self {
        Self {
            operation_name: operation.name.to_string(),
            query: operation.document.to_string(),
            variables,
        }
    }
}

/// One entry of a response's `errors` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GraphQLErrorItem {
    pub message: String,
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

/// Response envelope: `{ data, errors }`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLErrorItem>>,
}

impl GraphQLResponse {
    /// Decodes `data` into `T`. Any non-null `errors` member is a failure,
    /// even an empty array and even when `data` is present.
    ///
    /// # Errors
    ///
    /// [`ClientError::Application`] for reported errors,
    /// [`ClientError::Transport`] if `data` does not match `T`.
    pub fn into_data<T: DeserializeOwned>(self, operation: &str) -> ClientResult<T> {
        if let Some(errors) = self.errors {
            return Err(ClientError::Application {
                operation: operation.to_string(),
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| {
            ClientError::Transport(format!("Unexpected {operation} response shape: {e}"))
        })
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    login: Option<LoginPayload>,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    #[serde(default)]
    success: Option<bool>,
}

/// HTTP transport for the PEC GraphQL endpoint.
///
/// Holds no session state: authorized calls borrow a [`Session`].
#[derive(Debug)]
pub struct GraphQLTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

impl GraphQLTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn post(&self) -> reqwest::RequestBuilder {
        self.http
            .post(self.config.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_NAME_HEADER, &self.config.client_name)
            .header(CLIENT_VERSION_HEADER, &self.config.client_version)
    }

    fn authorized(&self, session: &Session) -> reqwest::RequestBuilder {
        self.post()
            .header(COOKIE, session.cookie())
            .header(XSRF_HEADER, session.xsrf_token())
    }

    /// Sends the `Login` mutation with `force: true` and builds a session from
    /// the `Set-Cookie` headers of the response.
    ///
    /// Forcing makes the service drop any other live session of the same
    /// identity instead of refusing this login.
    ///
    /// # Errors
    ///
    /// Transport and application failures as usual;
    /// [`ClientError::Authentication`] when the service reports
    /// `success: false` or omits either token.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<Session> {
        let request = GraphQLRequest::new(
            &operations::LOGIN,
            json!({ "input": { "username": username, "password": password, "force": true } }),
        );
        let resp = self
            .post()
            .header(CONSUMER_ID_HEADER, &self.config.consumer_id)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ClientError::Transport(format!("Failed to reach {}: {e}", self.config.endpoint))
            })?;

        let cookies: Vec<String> = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect();

        let envelope: GraphQLResponse = read_envelope(resp, operations::LOGIN.name).await?;
        let data: LoginData = envelope.into_data(operations::LOGIN.name)?;
        if data.login.and_then(|payload| payload.success) == Some(false) {
            return Err(ClientError::Authentication(
                "service rejected the credentials".to_string(),
            ));
        }

        Session::from_set_cookie(cookies.iter().map(String::as_str))
    }

    /// Executes `operation` within `session` and decodes its `data`.
    ///
    /// # Errors
    ///
    /// See [`GraphQLResponse::into_data`]; connection failures and non-2xx
    /// statuses are [`ClientError::Transport`].
    pub async fn execute<T: DeserializeOwned>(
        &self,
        session: &Session,
        operation: &Operation,
        variables: Value,
    ) -> ClientResult<T> {
        tracing::debug!(operation = operation.name, "sending GraphQL request");
        let request = GraphQLRequest::new(operation, variables);
        let resp = self
            .authorized(session)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ClientError::Transport(format!("Failed to reach {}: {e}", self.config.endpoint))
            })?;
        let envelope: GraphQLResponse = read_envelope(resp, operation.name).await?;
        envelope.into_data(operation.name)
    }

    /// Like [`execute`](Self::execute), but sends the envelope as a
    /// one-element array and expects a one-element array back.
    ///
    /// # Errors
    ///
    /// As for `execute`; an empty response array is a transport error.
    pub async fn execute_batched<T: DeserializeOwned>(
        &self,
        session: &Session,
        operation: &Operation,
        variables: Value,
    ) -> ClientResult<T> {
        tracing::debug!(operation = operation.name, "sending batched GraphQL request");
        let batch = [GraphQLRequest::new(operation, variables)];
        let resp = self
            .authorized(session)
            .json(&batch)
            .send()
            .await
            .map_err(|e| {
                ClientError::Transport(format!("Failed to reach {}: {e}", self.config.endpoint))
            })?;
        let envelopes: Vec<GraphQLResponse> = read_envelope(resp, operation.name).await?;
        envelopes
            .into_iter()
            .next()
            .ok_or_else(|| {
                ClientError::Transport(format!("Empty batch response for {}", operation.name))
            })?
            .into_data(operation.name)
    }
}

async fn read_envelope<T: DeserializeOwned>(
    resp: reqwest::Response,
    operation: &str,
) -> ClientResult<T> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        // GraphQL errors can also arrive with a non-2xx status.
        if let Ok(envelope) = serde_json::from_str::<GraphQLResponse>(&body)
            && let Some(errors) = envelope.errors
            && !errors.is_empty()
        {
            let msgs: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ClientError::Transport(format!(
                "{operation}: HTTP {status}: {}",
                msgs.join("; ")
            )));
        }
        return Err(ClientError::Transport(format!(
            "{operation}: HTTP {status}: {body}"
        )));
    }

    serde_json::from_str(&body)
        .map_err(|e| ClientError::Transport(format!("{operation}: invalid response JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_uses_camel_case() {
        let request = GraphQLRequest::new(&operations::SELECT_ACCESS, json!({"input": {"id": "42"}}));
        let wire = serde_json::to_value(&request).unwrap();

        assert_eq!(wire["operationName"], "SelecionarAcesso");
        assert_eq!(wire["variables"]["input"]["id"], "42");
        assert!(wire["query"].as_str().unwrap().contains("selecionarAcesso"));
    }

    #[test]
    fn errors_win_over_data() {
        let envelope: GraphQLResponse = serde_json::from_value(json!({
            "data": {"salvarAgendamentoConsulta": null},
            "errors": [{"message": "Acesso negado", "path": ["salvarAgendamentoConsulta"]}]
        }))
        .unwrap();

        let err = envelope
            .into_data::<Value>("SalvarAgendamentoConsulta")
            .unwrap_err();
        assert!(err.is_application());
    }

    #[test]
    fn empty_errors_array_is_a_failure() {
        let envelope: GraphQLResponse =
            serde_json::from_value(json!({"data": {"ok": 1}, "errors": []})).unwrap();
        let err = envelope.into_data::<Value>("Any").unwrap_err();
        assert!(err.is_application());
    }

    #[test]
    fn null_errors_is_success() {
        let envelope: GraphQLResponse =
            serde_json::from_value(json!({"data": {"ok": 1}, "errors": null})).unwrap();
        let data: Value = envelope.into_data("Any").unwrap();
        assert_eq!(data["ok"], 1);
    }

    #[test]
    fn shape_mismatch_is_transport_error() {
        #[derive(Debug, Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            required: String,
        }
        let envelope: GraphQLResponse = serde_json::from_value(json!({"data": {}})).unwrap();
        let err = envelope.into_data::<Expected>("Any").unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
