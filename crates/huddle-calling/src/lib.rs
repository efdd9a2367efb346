//! Calling-service boundary for huddle.
//!
//! The calling SDK is a black box to the rest of the workspace. This crate
//! pins down what the middleware may ask of it (`CallingService`), the push
//! streams it exposes (`CallingEventHub`), and an in-process implementation
//! used by tests and the simulator.

pub mod error;
pub mod events;
pub mod in_memory;
pub mod model;
pub mod service;

pub use error::{CallingServiceError, CallingServiceErrorKind, ServiceResult};
pub use events::{CallingEventHub, CallingEventStreams, DEFAULT_EVENT_CAPACITY};
pub use in_memory::{InMemoryCallingService, ServiceCall, ServiceOp};
pub use model::*;
pub use service::CallingService;
