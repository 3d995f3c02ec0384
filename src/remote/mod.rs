//! Remote — the service that owns boards and accepts pins.
//!
//! DESIGN
//! ======
//! The session core depends only on the `RemoteBoardSource` trait. The
//! Pinterest client is one implementation; tests substitute mocks.

pub mod pinterest;
pub mod types;

pub use pinterest::PinterestClient;
pub use types::{PinError, PinId, PinPayload, RemoteBoardSource};
