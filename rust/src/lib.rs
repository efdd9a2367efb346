//! Control layer of the huddle calling client.
//!
//! Intent actions flow into [`Store`]; the [`CallingMiddlewareHandler`] runs
//! the matching calling operation and dispatches its outcome, while the
//! subscription bridge turns service push streams into actions of its own.

mod actions;
mod capabilities;
pub mod config;
mod diagnostics;
mod dispatch;
mod errors;
pub mod logging;
mod middleware;
mod state;
mod store;

pub use actions::*;
pub use capabilities::{CapabilitiesChangeNotificationMode, CapabilitiesManager};
pub use config::{load_middleware_config, MiddlewareConfig};
pub use diagnostics::{dismiss_action, media_toast, network_quality_toast, network_toast};
pub use dispatch::ActionDispatch;
pub use errors::{internal_error_for_failure, CallCompositeError, LobbyErrorCode};
pub use middleware::{
    CallSubscriptions, CallingMiddlewareHandler, HandlerTask, SubscriptionError,
    CAMERA_SETTLE_DELAY,
};
pub use state::*;
pub use store::{Reducer, StateReconciler, StateUpdate, Store, StoreHandle};

pub use huddle_calling as calling;
