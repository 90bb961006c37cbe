//! HTTP panel server.

use std::io::Cursor;
use std::sync::MutexGuard;
use std::thread::{self, JoinHandle};

use seascape_scene::{EventSender, PanelEdit, ParamField, ParamValue, SceneError, SceneEvent};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

use crate::{PanelState, SharedPanelState};

type HandlerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum PanelServerError {
    #[error("failed to bind to port {port}: {error}")]
    BindError { port: u16, error: String },
    #[error("failed to spawn panel server thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Control panel HTTP server on a background thread.
pub struct PanelServer {
    port: u16,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Deserialize)]
struct EditRequest {
    field: String,
    value: ParamValue,
}

#[derive(Serialize)]
struct EditResponse {
    field: ParamField,
    value: ParamValue,
    forwarded: bool,
}

#[derive(Deserialize)]
struct Command {
    command: String,
}

#[derive(Serialize)]
struct CommandResponse {
    executed: bool,
    command: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl PanelServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            actual_port: None,
            handle: None,
        }
    }

    /// Bind on 127.0.0.1 and start serving. Accepted edits are sent to
    /// `events`.
    pub fn start(
        &mut self,
        state: SharedPanelState,
        events: EventSender,
    ) -> Result<(), PanelServerError> {
        let server = Server::http(format!("127.0.0.1:{}", self.port)).map_err(|e| {
            PanelServerError::BindError {
                port: self.port,
                error: e.to_string(),
            }
        })?;

        let actual_port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.port);
        self.actual_port = Some(actual_port);

        let handle = thread::Builder::new()
            .name("panel-server".to_string())
            .spawn(move || Self::run_server(server, state, events))?;
        self.handle = Some(handle);
        tracing::info!("control panel listening on http://127.0.0.1:{actual_port}/panel");
        Ok(())
    }

    pub fn stop(&mut self) {
        // tiny_http has no graceful shutdown; the thread may be parked in
        // incoming_requests(), so detach instead of joining.
        self.handle.take();
    }

    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(self.port)
    }

    fn run_server(server: Server, state: SharedPanelState, events: EventSender) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, &state, &events) {
                tracing::warn!("panel server error: {e}");
            }
        }
    }

    fn handle_request(
        mut request: Request,
        state: &SharedPanelState,
        events: &EventSender,
    ) -> Result<(), HandlerError> {
        let response = match (request.method(), request.url()) {
            (&Method::Get, "/health") => {
                let state = lock(state)?;
                json(
                    200,
                    &HealthResponse {
                        status: "ok",
                        uptime_seconds: state.uptime_seconds,
                    },
                )?
            }
            (&Method::Get, "/panel") => {
                let state = lock(state)?;
                json(200, &state.folders)?
            }
            (&Method::Post, "/panel") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                Self::handle_edit(&body, state, events)?
            }
            (&Method::Get, "/metrics") => {
                let state = lock(state)?;
                json(200, &state.stats)?
            }
            (&Method::Post, "/command") => {
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body)?;
                match serde_json::from_str::<Command>(&body) {
                    Ok(command) => {
                        let executed = match command.command.as_str() {
                            "quit" => {
                                lock(state)?.quit_requested = true;
                                true
                            }
                            _ => false,
                        };
                        json(
                            200,
                            &CommandResponse {
                                executed,
                                command: command.command,
                            },
                        )?
                    }
                    Err(e) => error(400, format!("invalid command: {e}"))?,
                }
            }
            _ => Response::from_string("Not Found").with_status_code(404),
        };

        request.respond(response)?;
        Ok(())
    }

    fn handle_edit(
        body: &str,
        state: &SharedPanelState,
        events: &EventSender,
    ) -> Result<Response<Cursor<Vec<u8>>>, HandlerError> {
        let request: EditRequest = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(e) => return error(400, format!("invalid edit: {e}")),
        };
        let Some(field) = ParamField::from_key(&request.field) else {
            return error(400, SceneError::UnknownField(request.field).to_string());
        };
        let value = match field.sanitize(request.value) {
            Ok(value) => value,
            Err(e) => return error(400, e.to_string()),
        };

        if !lock(state)?.set_value(field, value) {
            return error(400, format!("panel field `{}` is not bound", field.key()));
        }
        let forwarded = events
            .send(SceneEvent::Panel(PanelEdit::new(field, value)))
            .is_ok();
        if !forwarded {
            tracing::warn!(field = field.key(), "render loop gone, edit not forwarded");
        }
        json(
            200,
            &EditResponse {
                field,
                value,
                forwarded,
            },
        )
    }
}

impl Drop for PanelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &SharedPanelState) -> Result<MutexGuard<'_, PanelState>, HandlerError> {
    state.lock().map_err(|_| "panel state poisoned".into())
}

fn json_header() -> Result<Header, HandlerError> {
    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|()| "invalid content-type header".into())
}

fn json<T: Serialize + ?Sized>(
    status: u16,
    body: &T,
) -> Result<Response<Cursor<Vec<u8>>>, HandlerError> {
    let text = serde_json::to_string(body)?;
    Ok(Response::from_string(text)
        .with_status_code(status)
        .with_header(json_header()?))
}

fn error(status: u16, message: String) -> Result<Response<Cursor<Vec<u8>>>, HandlerError> {
    json(status, &ErrorResponse { error: message })
}
