//! Fetching a session credential from the room's token endpoint.
//!
//! This is the only step before a transport session opens. Nothing touches
//! game state until it succeeds.

use kings_shared::{TokenGrant, TokenRefusal};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("missing {0}")]
    MissingParameter(&'static str),
    #[error("could not reach the token endpoint: {0}")]
    Http(#[from] reqwest::Error),
    #[error("join refused ({status}): {message}")]
    Refused { status: u16, message: String },
}

/// An opaque access credential plus the transport endpoint it unlocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub url: String,
}

impl Credential {
    /// The URL a transport connects to with this credential attached.
    pub fn session_url(&self) -> String {
        let sep = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}token={}", self.url, sep, self.token)
    }
}

impl From<TokenGrant> for Credential {
    fn from(g: TokenGrant) -> Self {
        Credential {
            token: g.token,
            url: g.url,
        }
    }
}

/// Ask `endpoint` for a credential to join `room` as `name`.
pub async fn fetch_credential(endpoint: &str, room: &str, name: &str) -> Result<Credential, JoinError> {
    let room = room.trim();
    let name = name.trim();
    if room.is_empty() {
        return Err(JoinError::MissingParameter("room name"));
    }
    if name.is_empty() {
        return Err(JoinError::MissingParameter("display name"));
    }

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/token", endpoint.trim_end_matches('/')))
        .query(&[("room", room), ("name", name)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<TokenRefusal>().await {
            Ok(refusal) => refusal.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("token issuance failed")
                .to_string(),
        };
        return Err(JoinError::Refused {
            status: status.as_u16(),
            message,
        });
    }
    let grant: TokenGrant = response.json().await?;
    tracing::debug!(room, name, url = %grant.url, "credential issued");
    Ok(grant.into())
}
