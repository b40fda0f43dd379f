// Common test utilities and fixtures

pub mod fixtures;

// Re-export commonly used items
// Note: These may appear unused in some test crates but are used in others
#[allow(unused_imports)]
pub use fixtures::{body, cobol_batch, cobol_stream, explanation_frame, sse_frame, EXPLANATION};
#[allow(unused_imports)]
pub use helpers::{
    create_test_services, scripted_session, settle, spawn_sse_server, split_into, wait_until,
    ScriptedTransport, ServerScript,
};
