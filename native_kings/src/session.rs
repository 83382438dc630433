//! Drive one native peer for the lifetime of a relay session.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use kad_kings::utils::now_millis;
use kad_kings::{fetch_credential, Dispatch, Peer, TableRules, TransportEvent};
use kings_shared::{Action, CanonicalState};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot, watch};

use crate::config::PeerConfig;
use crate::transport;

/// Where and as whom to join, and the rules to enforce if we end up host.
#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub relay: String,
    pub room: String,
    pub name: String,
    pub rules: TableRules,
    pub tick: Duration,
}

impl SessionOptions {
    pub fn from_config(peer: &PeerConfig, name: String, rules: TableRules) -> Self {
        SessionOptions {
            relay: peer.relay.clone(),
            room: peer.room.clone(),
            name,
            rules,
            tick: Duration::from_millis(peer.tick_ms.max(50)),
        }
    }
}

/// Requests from the local user interface.
#[derive(Debug)]
pub enum Command {
    Act(Action, oneshot::Sender<Dispatch>),
    Quit,
}

/// What the session publishes on every local state change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct View {
    pub state: Arc<CanonicalState>,
    pub is_host: bool,
    pub connected: bool,
}

/// Join `opts.room` and run until `Quit`, the command channel closing, or
/// the relay connection dropping (which is reported as an error after the
/// local table is reset).
pub async fn run_session(
    opts: SessionOptions,
    mut commands: mpsc::Receiver<Command>,
    updates: watch::Sender<View>,
) -> Result<()> {
    let credential = fetch_credential(&opts.relay, &opts.room, &opts.name)
        .await
        .with_context(|| format!("joining room '{}' as '{}'", opts.room, opts.name))?;
    let conn = transport::connect(&credential).await?;
    let mut events = conn.events;

    let mut peer = Peer::new(
        conn.you.clone(),
        opts.rules.clone(),
        conn.transport,
        StdRng::from_os_rng(),
    );
    peer.on_connected(conn.peers, now_millis());
    publish(&updates, &peer);

    let mut ticker = tokio::time::interval(opts.tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            ev = events.recv() => {
                let ev = ev.unwrap_or(TransportEvent::Disconnected);
                let lost = ev == TransportEvent::Disconnected;
                if peer.handle_event(ev, now_millis()) {
                    publish(&updates, &peer);
                }
                if lost {
                    bail!("connection to the relay was lost");
                }
            }
            cmd = commands.recv() => {
                match cmd {
                    Some(Command::Act(action, reply)) => {
                        let outcome = peer.perform(action, now_millis());
                        if outcome == Dispatch::Applied {
                            publish(&updates, &peer);
                        }
                        let _ = reply.send(outcome);
                    }
                    Some(Command::Quit) | None => {
                        tracing::info!(me = %peer.me(), "leaving the room");
                        return Ok(());
                    }
                }
            }
            _ = ticker.tick() => {
                if peer.tick(now_millis()) {
                    publish(&updates, &peer);
                }
            }
        }
    }
}

fn publish<T: kad_kings::Transport, R: rand::Rng>(updates: &watch::Sender<View>, peer: &Peer<T, R>) {
    updates.send_replace(View {
        state: peer.state(),
        is_host: peer.is_host(),
        connected: peer.is_connected(),
    });
}
