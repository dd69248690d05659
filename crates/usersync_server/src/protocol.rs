//! Wire envelope and endpoint dispatch.
//!
//! Every request body is a JSON object; authenticated calls carry
//! `sessionId`. Responses are `{status: "ok", result, serverVersion}` or
//! `{status: "error", code, message}`. The HTTP layer itself is an
//! external collaborator: it hands the endpoint name and parsed body to
//! [`SyncServer::handle_request`] and writes the returned JSON back.

use crate::error::{ServerError, ServerResult, INTERNAL_ERROR_CODE};
use crate::server::SyncServer;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use usersync_core::{Change, ChangeId, DomainError, SessionId};

/// Result of guest login, sign-up, and log-in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthOutcome {
    /// The freshly created session id.
    pub session_id: SessionId,
    /// The account's field map with internal fields stripped.
    pub user_data: Map<String, Value>,
}

/// Result of a synchronization call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// The merged account's field map with internal fields stripped.
    pub user_data: Map<String, Value>,
    /// Ids of the consumed client changes, for client-side buffer
    /// pruning.
    pub processed_changes: Vec<ChangeId>,
}

fn ok_envelope(result: Value) -> Value {
    json!({
        "status": "ok",
        "result": result,
        "serverVersion": env!("CARGO_PKG_VERSION"),
    })
}

fn error_envelope(code: i32, message: String) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message,
    })
}

fn str_field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name).and_then(Value::as_str)
}

fn session_id(body: &Value) -> ServerResult<SessionId> {
    str_field(body, "sessionId")
        .map(SessionId::from)
        .ok_or_else(|| DomainError::NotLoggedIn.into())
}

fn to_result_value<T: Serialize>(outcome: T) -> ServerResult<Value> {
    serde_json::to_value(outcome).map_err(|e| ServerError::internal(e.to_string()))
}

impl SyncServer {
    /// Handles one request and returns the response envelope.
    ///
    /// Domain errors surface with their stable code and message;
    /// everything else collapses to code [`INTERNAL_ERROR_CODE`] with a
    /// generic message unless debug responses are enabled.
    pub fn handle_request(&self, endpoint: &str, body: &Value) -> Value {
        match self.dispatch(endpoint, body) {
            Ok(result) => ok_envelope(result),
            Err(err) => {
                debug!(endpoint, code = err.wire_code(), "request failed: {err}");
                error_envelope(err.wire_code(), err.wire_message(self.config().debug))
            }
        }
    }

    fn dispatch(&self, endpoint: &str, body: &Value) -> ServerResult<Value> {
        match endpoint {
            "_logInAsGuest" => to_result_value(self.log_in_as_guest()?),
            "_signUp" => {
                let email = str_field(body, "email").ok_or(DomainError::InvalidEmailAddress)?;
                let password = str_field(body, "password").ok_or(DomainError::InvalidPassword)?;
                to_result_value(self.sign_up(email, password)?)
            }
            "_logIn" => {
                let email = str_field(body, "email").ok_or(DomainError::NoUserWithGivenEmail)?;
                let password = str_field(body, "password").ok_or(DomainError::IncorrectPassword)?;
                to_result_value(self.log_in(email, password)?)
            }
            "_convertGuestUser" => {
                let session = session_id(body)?;
                let email = str_field(body, "email").ok_or(DomainError::InvalidEmailAddress)?;
                let password = str_field(body, "password").ok_or(DomainError::InvalidPassword)?;
                let user_data = self.convert_guest_user(&session, email, password)?;
                Ok(json!({ "userData": user_data }))
            }
            "_logOut" => {
                let session = session_id(body)?;
                self.log_out(&session)?;
                Ok(json!({}))
            }
            "_synchronizeUser" => {
                let session = session_id(body)?;
                let raw = body
                    .get("clientChangelog")
                    .cloned()
                    .unwrap_or_else(|| json!([]));
                let client_changelog: Vec<Change> = serde_json::from_value(raw)
                    .map_err(|e| DomainError::invalid_change_type(e.to_string()))?;
                to_result_value(self.synchronize_user(&session, client_changelog)?)
            }
            _ => Err(ServerError::internal(format!(
                "unknown endpoint: {endpoint}"
            ))),
        }
    }
}
