// Token endpoint: `GET /token?room=&name=`.

use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use kings_shared::{TokenGrant, TokenRefusal};
use serde::Deserialize;
use url::Url;

use crate::server::state::{IssueError, RelayState};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub room: Option<String>,
    pub name: Option<String>,
}

pub async fn token_handler(
    State(state): State<RelayState>,
    Query(q): Query<TokenQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let room = q.room.unwrap_or_default();
    let name = q.name.unwrap_or_default();

    let url = match session_url(&state, &headers) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "cannot build the session URL");
            return refuse(StatusCode::INTERNAL_SERVER_ERROR, e);
        }
    };
    match state.issue(&room, &name).await {
        Ok(token) => (StatusCode::OK, Json(TokenGrant { token, url })).into_response(),
        Err(e) => {
            tracing::debug!(room = %room, name = %name, error = %e, "token refused");
            let status = match e {
                IssueError::MissingRoom | IssueError::MissingName => StatusCode::BAD_REQUEST,
                IssueError::NameTaken(_) => StatusCode::CONFLICT,
                IssueError::RoomFull(_) => StatusCode::FORBIDDEN,
            };
            refuse(status, e.to_string())
        }
    }
}

fn refuse(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(TokenRefusal { error })).into_response()
}

/// `ws(s)://<public host>/ws`, from config or from the request's Host.
fn session_url(state: &RelayState, headers: &HeaderMap) -> Result<String, String> {
    let base = match &state.config.public_url {
        Some(public) => public.clone(),
        None => {
            let host = headers
                .get(HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            format!("ws://{host}")
        }
    };
    let mut url = Url::parse(&base).map_err(|e| format!("bad public url '{base}': {e}"))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(format!("unsupported scheme '{other}'")),
    };
    url.set_scheme(scheme)
        .map_err(|_| format!("cannot use scheme '{scheme}' for '{base}'"))?;
    url.set_path("/ws");
    Ok(url.to_string())
}
