//! Event-stream consumption
//!
//! - **decoder**: byte chunks to complete frames, with carry-over buffering
//! - **router**: frames to typed [`StreamEvent`]s (tag first, then shape)
//! - **transport**: cancellable HTTP read loop feeding a frame callback

pub mod decoder;
pub mod router;
pub mod transport;

pub use decoder::{FrameDecoder, RawFrame};
pub use router::{classify, classify_structural, classify_tagged, route, StreamEvent};
pub use transport::{
    FrameSink, HttpTransport, StreamHandle, StreamRequest, StreamTransport, TransportEvent,
};
