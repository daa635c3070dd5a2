//! Terminal client for the Cadet Compass advisory gateway.

pub mod availability;
pub mod client;
pub mod logging;
pub mod orchestrator;

pub use availability::{Availability, AvailabilityState};
pub use client::{AdvisoryChannel, ChannelError, GatewayClient};
pub use orchestrator::{GREETING, InputError, Orchestrator, Presenter, Role};
