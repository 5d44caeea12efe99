//! UI components for the live view

mod live_alert;
mod live_stream;
mod query_states;

pub use live_alert::{AlertAction, LiveAlert};
pub use live_stream::{live_status, LiveStatus, LiveStream, LiveStreamProps};
pub use query_states::{EmptyState, ErrorState, LoadingState};
