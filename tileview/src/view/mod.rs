//! View request scheduling.
//!
//! Turns "show this place next" requests into an ordered sequence of active
//! tile sets. See [`ViewRequestQueue`] for the state machine and
//! [`LinkedViews`] for keeping two maps in step.

mod linked;
mod queue;
mod types;

pub use linked::LinkedViews;
pub use queue::ViewRequestQueue;
pub use types::{
    ControlOutcome, QueueConfig, ResultDelivery, ViewRequest, ViewState, DEFAULT_REQUEST_TIMEOUT,
};
