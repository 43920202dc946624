pub mod events;
pub mod throttle;

// Re-export the essential types
pub use events::{CameraEvent, CameraEventKind, EngineCameraPayload, TapEvent};
pub use throttle::{CameraThrottler, GateDecision, ThrottleGate};
