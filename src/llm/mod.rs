//! Provider profiles, transport and response parsing.

pub mod ollama;
pub mod provider;
pub mod response;
pub mod transport;

pub use ollama::check_ollama_ready;
pub use provider::{ApiShape, AuthPolicy, Provider, ProviderProfile};
pub use response::extract_message;
pub use transport::{HttpTransport, Transport};
