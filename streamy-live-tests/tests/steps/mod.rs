mod guest_identity_steps;
mod remote_stream_steps;
mod sdk_loading_steps;
mod session_lifecycle_steps;
mod token_steps;
