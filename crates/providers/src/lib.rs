pub mod canned;
pub mod client;
pub mod discovery;
pub mod ollama;
pub mod stub;
pub mod traits;
pub(crate) mod util;

// Re-exports for convenience.
pub use canned::{CannedKind, CannedResponder};
pub use client::{Answer, Tier, TieredInferenceClient};
pub use discovery::{DiscoveryStatus, EndpointDiscovery};
pub use ollama::OllamaBackend;
pub use stub::LocalStubResponder;
pub use traits::{GenerateOutcome, GenerateRequest, InferenceBackend};
