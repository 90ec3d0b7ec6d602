//! Remote smart-lighting bridge (Hue-style REST API).
//!
//! Every [`RemoteBridgeActuator::apply`] is a read-modify-write:
//!
//! 1. `GET /api/{user}/groups/{group}` and read `action.on`,
//! 2. return [`BridgeAction::Unchanged`] if it already matches the intent,
//! 3. otherwise `PUT /api/{user}/groups/{group}/action` with the new state.
//!
//! Re-reading first keeps the call idempotent even when someone else toggles
//! the lights between cycles.  If the state cannot be read the PUT is
//! skipped; the next cycle resamples and tries again.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{HttpPort, HttpResponse};
use crate::config::BridgeConfig;
use crate::error::ActuationError;
use crate::severity::ActuationIntent;

/// Effect reset sent with every colour change so the hue is visible.
const EFFECT_NONE: &str = "none";

/// Result of a successful apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeAction {
    /// Group was already in the desired power state; nothing sent.
    Unchanged,
    /// A PUT switched the group.
    Switched { on: bool },
}

/// Resolved group URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeEndpoints {
    pub state_url: String,
    pub action_url: String,
}

impl BridgeEndpoints {
    pub fn from_config(cfg: &BridgeConfig) -> Self {
        let state_url = format!(
            "http://{}/api/{}/groups/{}",
            cfg.host, cfg.username, cfg.group
        );
        let action_url = format!("{state_url}/action");
        Self {
            state_url,
            action_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GroupState {
    action: GroupAction,
}

#[derive(Debug, Deserialize)]
struct GroupAction {
    on: bool,
}

/// Body of the action PUT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionBody {
    pub on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<&'static str>,
}

impl ActionBody {
    pub fn for_intent(intent: &ActuationIntent) -> Self {
        if !intent.desired_bridge_power {
            return Self {
                on: false,
                hue: None,
                effect: None,
            };
        }
        match intent.desired_bridge_color {
            Some(color) => Self {
                on: true,
                hue: Some(color.hue),
                effect: Some(EFFECT_NONE),
            },
            None => Self {
                on: true,
                hue: None,
                effect: None,
            },
        }
    }
}

/// Parse `action.on` out of a group state document.
pub fn parse_group_power(body: &str) -> Result<bool, ActuationError> {
    serde_json::from_str::<GroupState>(body)
        .map(|s| s.action.on)
        .map_err(|_| ActuationError::MalformedState)
}

/// The bridge replies to writes with `[{"success":{..}}, {"error":{..}}]`
/// regardless of HTTP status.  Any `error` entry rejects the write.
/// Bodies that are not such an array are accepted.
pub fn write_rejected(body: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Array(items)) => items.iter().any(|item| item.get("error").is_some()),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

pub struct RemoteBridgeActuator<H: HttpPort> {
    http: H,
    endpoints: BridgeEndpoints,
}

impl<H: HttpPort> RemoteBridgeActuator<H> {
    pub fn new(http: H, cfg: &BridgeConfig) -> Self {
        Self {
            http,
            endpoints: BridgeEndpoints::from_config(cfg),
        }
    }

    pub fn endpoints(&self) -> &BridgeEndpoints {
        &self.endpoints
    }

    pub fn http(&self) -> &H {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut H {
        &mut self.http
    }

    /// Bring the group into the intent's power state.
    ///
    /// Exactly one GET and at most one PUT; never retries within a call.
    pub fn apply(&mut self, intent: &ActuationIntent) -> Result<BridgeAction, ActuationError> {
        self.apply_with(intent, || {})
    }

    /// [`apply`](Self::apply), calling `between` once the GET has returned
    /// (whatever its outcome) so each request gets a full watchdog period.
    pub fn apply_with<F>(
        &mut self,
        intent: &ActuationIntent,
        between: F,
    ) -> Result<BridgeAction, ActuationError>
    where
        F: FnOnce(),
    {
        let current = self.read_power();
        between();
        let current = current.inspect_err(|e| {
            warn!("Bridge: state unavailable, not writing: {}", e);
        })?;

        if current == intent.desired_bridge_power {
            debug!("Bridge: already {}", on_off(current));
            return Ok(BridgeAction::Unchanged);
        }

        let body = ActionBody::for_intent(intent);
        let json = serde_json::to_string(&body).map_err(|_| ActuationError::MalformedState)?;
        let resp = self
            .http
            .put(&self.endpoints.action_url, &json)
            .inspect_err(|e| warn!("Bridge: PUT failed: {}", e))?;
        check_status(&resp).inspect_err(|e| warn!("Bridge: PUT failed: {}", e))?;
        if write_rejected(&resp.body) {
            warn!("Bridge: PUT rejected: {}", resp.body);
            return Err(ActuationError::Rejected);
        }

        info!("Bridge: switched {} ({})", on_off(body.on), intent.level.name());
        Ok(BridgeAction::Switched { on: body.on })
    }

    fn read_power(&mut self) -> Result<bool, ActuationError> {
        let resp = self.http.get(&self.endpoints.state_url)?;
        check_status(&resp)?;
        parse_group_power(&resp.body)
    }
}

fn check_status(resp: &HttpResponse) -> Result<(), ActuationError> {
    if resp.is_success() {
        Ok(())
    } else {
        Err(ActuationError::Status(resp.status))
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}
