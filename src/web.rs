//! Browser bindings. The page owns the video/data transport and hands us its
//! events; we hand back bytes to publish through a JS callback.

use js_sys::{Function, Uint8Array};
use kings_shared::{Action, Identity};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::game::TableRules;
use crate::peer::{Dispatch, Peer};
use crate::transport::{Transport, TransportError, TransportEvent};
use crate::utils::now_millis;

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    crate::utils::set_panic_hook();
    if tracing_wasm::try_set_as_global_default().is_err() {
        web_sys::console::warn_1(&"tracing already initialised".into());
    }
}

/// Publishes through a page-provided `send(Uint8Array)` callback.
pub struct JsTransport {
    send: Function,
}

impl Transport for JsTransport {
    fn publish(&mut self, payload: Vec<u8>) -> Result<(), TransportError> {
        let bytes = Uint8Array::from(payload.as_slice());
        self.send
            .call1(&JsValue::NULL, &bytes)
            .map(|_| ())
            .map_err(|e| TransportError::Send(format!("{e:?}")))
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WebPeer {
    inner: Peer<JsTransport, StdRng>,
}

#[wasm_bindgen]
impl WebPeer {
    /// `rules` is an optional JSON object overriding the default table rules.
    /// `name` is trimmed the same way the relay trims it.
    #[wasm_bindgen(constructor)]
    pub fn new(name: String, send: Function, rules: Option<String>) -> Result<WebPeer, JsValue> {
        let rules = match rules {
            Some(json) => serde_json::from_str::<TableRules>(&json).map_err(js_err)?,
            None => TableRules::default(),
        };
        Ok(WebPeer {
            inner: Peer::new(
                Identity::from_display_name(&name),
                rules,
                JsTransport { send },
                StdRng::from_os_rng(),
            ),
        })
    }

    /// Call once the transport session is up, with everyone already present.
    pub fn connected(&mut self, present: Vec<String>) {
        self.inner
            .on_connected(present.into_iter().map(Identity::from), now_millis());
    }

    pub fn receive(&mut self, from: Option<String>, payload: Vec<u8>) -> bool {
        let event = TransportEvent::Message {
            from: from.map(Identity::from),
            payload,
        };
        self.inner.handle_event(event, now_millis())
    }

    pub fn peer_joined(&mut self, name: String) -> bool {
        self.inner
            .handle_event(TransportEvent::PeerJoined(name.into()), now_millis())
    }

    pub fn peer_left(&mut self, name: String) -> bool {
        self.inner
            .handle_event(TransportEvent::PeerLeft(name.into()), now_millis())
    }

    pub fn disconnected(&mut self) {
        self.inner
            .handle_event(TransportEvent::Disconnected, now_millis());
    }

    /// Call on a coarse interval (and after visibility changes).
    pub fn tick(&mut self) -> bool {
        self.inner.tick(now_millis())
    }

    /// `action` is the JSON form of an action, e.g. `{"type":"draw"}`.
    /// Returns `applied`, `requested`, `offline` or the rejection reason.
    pub fn perform(&mut self, action: &str) -> Result<String, JsValue> {
        let action: Action = serde_json::from_str(action).map_err(js_err)?;
        Ok(match self.inner.perform(action, now_millis()) {
            Dispatch::Applied => "applied".to_string(),
            Dispatch::Requested => "requested".to_string(),
            Dispatch::Offline => "offline".to_string(),
            Dispatch::Rejected(reason) => reason.to_string(),
        })
    }

    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&*self.inner.state()).map_err(js_err)
    }

    pub fn is_host(&self) -> bool {
        self.inner.is_host()
    }
}

/// Resolves to `{token, url, session_url}` or rejects with a readable message.
#[wasm_bindgen]
pub fn fetch_credential(endpoint: String, room: String, name: String) -> js_sys::Promise {
    future_to_promise(async move {
        let cred = crate::credentials::fetch_credential(&endpoint, &room, &name)
            .await
            .map_err(js_err)?;
        let out = serde_json::json!({
            "token": cred.token,
            "url": cred.url,
            "session_url": cred.session_url(),
        });
        Ok(JsValue::from_str(&out.to_string()))
    })
}
