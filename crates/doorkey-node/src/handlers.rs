//! Command handlers.
//!
//! One function per command. Handlers are total: every validated command
//! produces a response, and only unlock-door and reject-key touch the
//! actuators.

use crate::actuator::{ActuatorController, IndicatorColor};
use doorkey_core::{Millis, TokenSnapshot};
use doorkey_protocol::{Command, PingRequest, Response};
use tracing::debug;

/// Echo the ping payload.
pub fn handle_ping(request: &PingRequest) -> Response {
    debug!("ping");
    Response::Pong { data: request.data }
}

/// Report the current token snapshot.
pub fn handle_get_status(token: &TokenSnapshot) -> Response {
    debug!("get status");
    Response::Status(*token)
}

/// Engage the door strike and light green.
pub fn handle_unlock_door(actuators: &mut ActuatorController, now: Millis) -> Response {
    debug!("unlock door");
    actuators.engage_relay(now);
    actuators.set_indicator(IndicatorColor::Green, now);
    Response::DoorUnlocked
}

/// Light red. The relay keeps whatever state it had.
pub fn handle_reject_key(actuators: &mut ActuatorController, now: Millis) -> Response {
    debug!("reject key");
    actuators.set_indicator(IndicatorColor::Red, now);
    Response::KeyRejected
}

/// Route a validated command to its handler.
pub fn handle(
    command: &Command,
    now: Millis,
    actuators: &mut ActuatorController,
    token: &TokenSnapshot,
) -> Response {
    match command {
        Command::Ping(request) => handle_ping(request),
        Command::GetStatus => handle_get_status(token),
        Command::UnlockDoor => handle_unlock_door(actuators, now),
        Command::RejectKey => handle_reject_key(actuators, now),
    }
}
