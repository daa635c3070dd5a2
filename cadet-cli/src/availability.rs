//! Remote channel reachability.

use crate::client::AdvisoryChannel;

pub const HINT_CHECKING: &str = "checking…";
pub const HINT_ONLINE: &str = "AI available";
pub const HINT_FALLBACK: &str = "AI unavailable — local fallback used";
pub const HINT_LOCAL_ONLY: &str = "AI unavailable — local only";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Offline,
}

/// Latest known state of the remote channel, with a short user-facing hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityState {
    pub status: Availability,
    pub hint: String,
}

impl AvailabilityState {
    /// Before the first probe completes.
    pub fn checking() -> Self {
        Self {
            status: Availability::Offline,
            hint: HINT_CHECKING.to_string(),
        }
    }

    pub fn online() -> Self {
        Self {
            status: Availability::Online,
            hint: HINT_ONLINE.to_string(),
        }
    }

    /// Offline with the base hint and, when known, the failure class.
    pub fn offline(base: &str, class: Option<&str>) -> Self {
        let hint = match class {
            Some(class) => format!("{} ({})", base, class),
            None => base.to_string(),
        };
        Self {
            status: Availability::Offline,
            hint,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == Availability::Online
    }
}

/// Probe the advisory route.
///
/// The gateway rejects `GET` with 405, so a 2xx or a request-level rejection
/// (400, 401, 403, 405) proves the route is served. Anything else, including
/// 404 and 5xx, means Offline.
pub async fn probe(channel: &dyn AdvisoryChannel) -> AvailabilityState {
    match channel.probe().await {
        Ok(status) if route_is_served(status) => AvailabilityState::online(),
        Ok(_) => AvailabilityState::offline(HINT_LOCAL_ONLY, Some("upstream error")),
        Err(e) => AvailabilityState::offline(HINT_LOCAL_ONLY, Some(e.class())),
    }
}

fn route_is_served(status: u16) -> bool {
    (200..300).contains(&status) || matches!(status, 400 | 401 | 403 | 405)
}
