/// Middleware module
///
/// Request gating for the admin area.

mod request_gate;

pub use request_gate::{GateDecision, GatePolicy, RequestGate};
