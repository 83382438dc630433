// Relay state: rooms, their members and outstanding tokens.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use kings_shared::{Identity, RelayServerMsg};
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::RwLock;

use crate::config::RelayConfig;

/// Outbound frames for one connected member.
pub type MemberTx = mpsc::UnboundedSender<RelayServerMsg>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IssueError {
    #[error("missing room")]
    MissingRoom,
    #[error("missing name")]
    MissingName,
    #[error("name '{0}' is already in this room")]
    NameTaken(String),
    #[error("room '{0}' is full")]
    RoomFull(String),
}

/// A redeemable token's payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grant {
    pub room: String,
    pub name: Identity,
    expires: Instant,
}

#[derive(Default)]
pub(crate) struct Rooms {
    rooms: HashMap<String, BTreeMap<Identity, MemberTx>>,
    grants: HashMap<String, Grant>,
}

/// Shared application state exposed to handlers.
#[derive(Clone)]
pub struct RelayState {
    pub(crate) inner: Arc<RwLock<Rooms>>,
    pub config: Arc<RelayConfig>,
}

impl Default for RelayState {
    fn default() -> Self {
        RelayState::new(RelayConfig::default())
    }
}

impl RelayState {
    pub fn new(config: RelayConfig) -> Self {
        RelayState {
            inner: Arc::new(RwLock::new(Rooms::default())),
            config: Arc::new(config),
        }
    }

    /// Issue a single-use token for `name` in `room`.
    pub async fn issue(&self, room: &str, name: &str) -> Result<String, IssueError> {
        let room = room.trim();
        let name = Identity::from_display_name(name);
        if room.is_empty() {
            return Err(IssueError::MissingRoom);
        }
        if name.as_str().is_empty() {
            return Err(IssueError::MissingName);
        }

        let mut inner = self.inner.write().await;
        let now = Instant::now();
        inner.grants.retain(|_, g| g.expires > now);
        inner.check_admission(room, &name, self.config.max_room_size)?;

        let token = hex::encode(rand::rng().random::<[u8; 16]>());
        inner.grants.insert(
            token.clone(),
            Grant {
                room: room.to_string(),
                name: name.clone(),
                expires: now + Duration::from_secs(self.config.token_ttl_secs),
            },
        );
        tracing::debug!(room, name = %name, "token issued");
        Ok(token)
    }

    /// Consume a token. Unknown, reused and expired tokens yield `None`.
    pub async fn redeem(&self, token: &str) -> Option<Grant> {
        let grant = self.inner.write().await.grants.remove(token)?;
        (grant.expires > Instant::now()).then_some(grant)
    }

    /// Admit a member and tell the others. Returns who was already there.
    pub async fn join(&self, grant: &Grant, tx: MemberTx) -> Result<Vec<Identity>, IssueError> {
        let mut inner = self.inner.write().await;
        inner.check_admission(&grant.room, &grant.name, self.config.max_room_size)?;
        let members = inner.rooms.entry(grant.room.clone()).or_default();
        let present: Vec<Identity> = members.keys().cloned().collect();
        for other in members.values() {
            let _ = other.send(RelayServerMsg::PeerJoined(grant.name.clone()));
        }
        members.insert(grant.name.clone(), tx);
        tracing::info!(room = %grant.room, name = %grant.name, members = members.len(), "member joined");
        Ok(present)
    }

    /// Remove a member, tell the others and drop the room once empty.
    pub async fn leave(&self, room: &str, name: &Identity) {
        let mut inner = self.inner.write().await;
        let Some(members) = inner.rooms.get_mut(room) else {
            return;
        };
        if members.remove(name).is_none() {
            return;
        }
        for other in members.values() {
            let _ = other.send(RelayServerMsg::PeerLeft(name.clone()));
        }
        tracing::info!(room, name = %name, members = members.len(), "member left");
        if members.is_empty() {
            inner.rooms.remove(room);
            tracing::debug!(room, "room closed");
        }
    }

    /// Deliver `payload` from `from` to every other member of `room`.
    pub async fn forward(&self, room: &str, from: &Identity, payload: String) {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(room) else {
            return;
        };
        for (name, tx) in members {
            if name != from {
                let _ = tx.send(RelayServerMsg::Data {
                    from: from.clone(),
                    payload: payload.clone(),
                });
            }
        }
    }

    pub async fn members(&self, room: &str) -> Vec<Identity> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room)
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Rooms {
    fn check_admission(&self, room: &str, name: &Identity, max: usize) -> Result<(), IssueError> {
        if let Some(members) = self.rooms.get(room) {
            if members.contains_key(name) {
                return Err(IssueError::NameTaken(name.to_string()));
            }
            if members.len() >= max {
                return Err(IssueError::RoomFull(room.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relay(max: usize) -> RelayState {
        RelayState::new(RelayConfig {
            max_room_size: max,
            ..RelayConfig::default()
        })
    }

    #[tokio::test]
    async fn tokens_are_single_use() {
        let state = relay(4);
        let token = state.issue("den", "ann").await.unwrap();
        assert_eq!(token.len(), 32);
        let grant = state.redeem(&token).await.unwrap();
        assert_eq!(grant.room, "den");
        assert_eq!(grant.name, Identity::from("ann"));
        assert!(state.redeem(&token).await.is_none());
        assert!(state.redeem("nope").await.is_none());
    }

    #[tokio::test]
    async fn expired_tokens_are_refused() {
        let state = RelayState::new(RelayConfig {
            token_ttl_secs: 0,
            ..RelayConfig::default()
        });
        let token = state.issue("den", "ann").await.unwrap();
        assert!(state.redeem(&token).await.is_none());
    }

    #[tokio::test]
    async fn parameters_and_admission_are_checked() {
        let state = relay(1);
        assert_eq!(state.issue(" ", "ann").await, Err(IssueError::MissingRoom));
        assert_eq!(state.issue("den", "").await, Err(IssueError::MissingName));

        let token = state.issue("den", "ann").await.unwrap();
        let grant = state.redeem(&token).await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        state.join(&grant, tx).await.unwrap();

        assert_eq!(
            state.issue("den", "ann").await,
            Err(IssueError::NameTaken("ann".into()))
        );
        assert_eq!(
            state.issue("den", "bo").await,
            Err(IssueError::RoomFull("den".into()))
        );
        assert!(state.issue("attic", "ann").await.is_ok());
        assert_eq!(
            state.issue("den", " ann ").await,
            Err(IssueError::NameTaken("ann".into()))
        );
    }

    #[tokio::test]
    async fn members_hear_about_each_other_and_data() {
        let state = relay(4);
        let mut rxs = Vec::new();
        for name in ["ann", "bo"] {
            let token = state.issue("den", name).await.unwrap();
            let grant = state.redeem(&token).await.unwrap();
            let (tx, rx) = mpsc::unbounded_channel();
            let present = state.join(&grant, tx).await.unwrap();
            assert_eq!(present.len(), rxs.len());
            rxs.push(rx);
        }
        assert_eq!(
            rxs[0].recv().await,
            Some(RelayServerMsg::PeerJoined("bo".into()))
        );

        state.forward("den", &"bo".into(), "abcd".into()).await;
        assert_eq!(
            rxs[0].recv().await,
            Some(RelayServerMsg::Data {
                from: "bo".into(),
                payload: "abcd".into()
            })
        );
        assert!(rxs[1].try_recv().is_err());

        state.leave("den", &"ann".into()).await;
        assert_eq!(
            rxs[1].recv().await,
            Some(RelayServerMsg::PeerLeft("ann".into()))
        );
        state.leave("den", &"bo".into()).await;
        assert!(state.members("den").await.is_empty());
        assert!(state.inner.read().await.rooms.is_empty());
    }
}
