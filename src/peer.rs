//! Host authority and request routing.
//!
//! A [`Peer`] is one participant's view of the table. Exactly one peer in a
//! session is the host: it owns the only writable copy of the state, runs
//! every transition and broadcasts a full snapshot after each one. Every
//! other peer is a guest that forwards its actions as requests and replaces
//! its mirror wholesale whenever a snapshot arrives.

use std::collections::BTreeSet;
use std::sync::Arc;

use kings_shared::{codec, Action, CanonicalState, Decoded, Identity, PeerMsg};
use rand::Rng;

use crate::game::{self, Ctx, HostMigration, Rejected, TableRules};
use crate::store::Store;
use crate::transport::{Transport, TransportEvent};

/// What happened to a locally performed action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// We are host and the transition was committed and broadcast.
    Applied,
    /// We are a guest and the request went out to the host.
    Requested,
    /// We are host and the rules refused it. Nothing changed.
    Rejected(Rejected),
    /// No session, or the transport refused the request.
    Offline,
}

pub struct Peer<T: Transport, R: Rng> {
    me: Identity,
    rules: TableRules,
    transport: T,
    rng: R,
    store: Store,
    /// Other session members as reported by the transport.
    roster: BTreeSet<Identity>,
    connected: bool,
}

impl<T: Transport, R: Rng> Peer<T, R> {
    pub fn new(me: Identity, rules: TableRules, transport: T, rng: R) -> Self {
        Peer {
            me,
            rules,
            transport,
            rng,
            store: Store::default(),
            roster: BTreeSet::new(),
            connected: false,
        }
    }

    pub fn me(&self) -> &Identity {
        &self.me
    }

    pub fn state(&self) -> Arc<CanonicalState> {
        self.store.snapshot()
    }

    pub fn is_host(&self) -> bool {
        self.connected && self.store.snapshot().is_host(&self.me)
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The session is up and `present` are the members already in the room.
    /// Finding the room empty makes us host of a fresh table; otherwise we
    /// wait for the host's snapshot.
    pub fn on_connected(&mut self, present: impl IntoIterator<Item = Identity>, now: u64) {
        self.connected = true;
        self.roster = present.into_iter().filter(|p| p != &self.me).collect();
        if self.roster.is_empty() {
            tracing::info!(me = %self.me, "room is empty, hosting a new table");
            let mut table = game::new_table(self.me.clone(), &mut self.rng);
            game::settle(&mut table, &self.rules, now);
            self.commit(table);
        } else {
            tracing::info!(me = %self.me, peers = self.roster.len(), "joined as guest");
        }
    }

    /// Perform a local action: applied directly on the host, sent as a
    /// request from a guest.
    pub fn perform(&mut self, action: Action, now: u64) -> Dispatch {
        if !self.connected {
            return Dispatch::Offline;
        }
        if self.is_host() {
            let me = self.me.clone();
            return match self.transition(&me, &action, now) {
                Ok(()) => Dispatch::Applied,
                Err(reason) => {
                    tracing::debug!(%reason, "local action rejected");
                    Dispatch::Rejected(reason)
                }
            };
        }
        let msg = PeerMsg::request(self.me.clone(), action);
        if self.send(&msg) {
            Dispatch::Requested
        } else {
            Dispatch::Offline
        }
    }

    /// Feed one transport event through the router. Returns whether the
    /// local state changed.
    pub fn handle_event(&mut self, event: TransportEvent, now: u64) -> bool {
        match event {
            TransportEvent::Message { from, payload } => self.on_message(from, &payload, now),
            TransportEvent::PeerJoined(who) => self.on_peer_joined(who, now),
            TransportEvent::PeerLeft(who) => self.on_peer_left(who, now),
            TransportEvent::Disconnected => {
                tracing::info!(me = %self.me, "session lost, resetting table");
                self.connected = false;
                self.roster.clear();
                self.store.reset();
                true
            }
        }
    }

    /// Periodic re-check of clock-driven state. Host only; a no-op elsewhere.
    pub fn tick(&mut self, now: u64) -> bool {
        if !self.is_host() {
            return false;
        }
        let mut next = (*self.store.snapshot()).clone();
        if !game::settle(&mut next, &self.rules, now) {
            return false;
        }
        self.commit(next);
        true
    }

    fn on_message(&mut self, from: Option<Identity>, payload: &[u8], now: u64) -> bool {
        let msg = match codec::decode(payload) {
            Decoded::Msg(msg) => msg,
            Decoded::Unknown(tag) => {
                tracing::debug!(%tag, "ignoring unknown message type");
                return false;
            }
            Decoded::Malformed(reason) => {
                tracing::debug!(%reason, "dropping malformed message");
                return false;
            }
        };
        match msg {
            PeerMsg::State(snapshot) => self.on_snapshot(from, *snapshot),
            request => {
                if !self.is_host() {
                    return false;
                }
                let Some((by, action)) = request.into_request() else {
                    return false;
                };
                if from.as_ref().is_some_and(|f| f != &by) {
                    tracing::debug!(?from, %by, "dropping request with forged requester");
                    return false;
                }
                match self.transition(&by, &action, now) {
                    Ok(()) => true,
                    Err(reason) => {
                        tracing::debug!(%by, %reason, "request rejected");
                        false
                    }
                }
            }
        }
    }

    fn on_snapshot(&mut self, from: Option<Identity>, snapshot: CanonicalState) -> bool {
        let Some(their_host) = snapshot.host.clone() else {
            tracing::debug!("dropping snapshot without a host");
            return false;
        };
        if from.as_ref().is_some_and(|f| f != &their_host) {
            tracing::debug!(?from, host = %their_host, "dropping snapshot from a non-host");
            return false;
        }
        if their_host == self.me {
            return false;
        }
        if self.is_host() {
            // The longer-running table wins; ties go to the lower identity.
            let ours = self.store.snapshot().revision;
            let outranked = snapshot.revision > ours
                || (snapshot.revision == ours && their_host < self.me);
            if outranked {
                tracing::info!(other = %their_host, "another host outranks us, stepping down");
                self.store.replace(snapshot);
                return true;
            }
            tracing::info!(other = %their_host, "other host is outranked, re-asserting");
            self.broadcast();
            return false;
        }
        self.store.replace(snapshot);
        true
    }

    fn on_peer_joined(&mut self, who: Identity, now: u64) -> bool {
        if who == self.me {
            return false;
        }
        self.roster.insert(who.clone());
        if !self.is_host() {
            return false;
        }
        let mut next = (*self.store.snapshot()).clone();
        game::join(&mut next, &who);
        game::settle(&mut next, &self.rules, now);
        // Always re-broadcast so the newcomer gets a snapshot even when they
        // were already on the roster.
        self.commit(next);
        true
    }

    fn on_peer_left(&mut self, who: Identity, now: u64) -> bool {
        self.roster.remove(&who);
        if self.is_host() {
            let mut next = (*self.store.snapshot()).clone();
            if !game::leave(&mut next, &who, &self.rules, now) {
                return false;
            }
            self.commit(next);
            return true;
        }
        if !self.connected {
            return false;
        }

        let host = self.store.snapshot().host.clone();
        let orphaned = match &host {
            Some(h) => h == &who,
            // No snapshot yet, so whoever left may have been the host.
            None => who != self.me,
        };
        if !orphaned {
            return false;
        }
        let frozen = host.is_some() || !self.roster.is_empty();
        if frozen && self.rules.host_migration == HostMigration::Freeze {
            tracing::warn!(host = %who, "host left, table is frozen");
            return false;
        }
        let successor = self.roster.iter().next().filter(|p| *p < &self.me);
        if let Some(next_host) = successor {
            tracing::info!(host = %who, successor = %next_host, "host left, waiting for successor");
            return false;
        }
        self.take_over(host.as_ref(), now);
        true
    }

    /// Become host, starting from the local mirror.
    fn take_over(&mut self, departed: Option<&Identity>, now: u64) {
        let mut next = (*self.store.snapshot()).clone();
        match departed {
            Some(old) => {
                game::leave(&mut next, old, &self.rules, now);
                next.host = Some(self.me.clone());
            }
            None => next = game::new_table(self.me.clone(), &mut self.rng),
        }

        let mut present = self.roster.clone();
        present.insert(self.me.clone());
        let stale: Vec<Identity> = next
            .players
            .keys()
            .filter(|p| !present.contains(*p))
            .cloned()
            .collect();
        for p in &stale {
            game::leave(&mut next, p, &self.rules, now);
        }
        for p in &present {
            game::join(&mut next, p);
        }
        game::settle(&mut next, &self.rules, now);
        tracing::info!(me = %self.me, players = next.players.len(), "took over as host");
        self.commit(next);
    }

    /// Validate and apply on a working copy; commit only on success.
    fn transition(&mut self, by: &Identity, action: &Action, now: u64) -> Result<(), Rejected> {
        let mut next = (*self.store.snapshot()).clone();
        let mut ctx = Ctx {
            rules: &self.rules,
            rng: &mut self.rng,
            now,
        };
        game::apply(&mut next, by, action, &mut ctx)?;
        self.commit(next);
        Ok(())
    }

    fn commit(&mut self, mut next: CanonicalState) {
        next.revision += 1;
        self.store.replace(next);
        self.broadcast();
    }

    fn broadcast(&mut self) {
        let snapshot = self.store.snapshot();
        self.send(&PeerMsg::State(Box::new((*snapshot).clone())));
    }

    fn send(&mut self, msg: &PeerMsg) -> bool {
        let payload = match codec::encode(msg) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode message");
                return false;
            }
        };
        match self.transport.publish(payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "publish failed");
                false
            }
        }
    }
}
