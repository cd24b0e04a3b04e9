// dottie-api: Async request pipeline for the WSDOT traffic and ferries REST APIs.

pub mod client;
pub mod dates;
pub mod endpoint;
pub mod error;
pub mod params;
pub mod timestamp;
pub mod transport;
pub mod url_builder;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, ClientConfig, DEFAULT_BASE_URL, FetchMode};
pub use endpoint::EndpointDescriptor;
pub use error::{Error, ErrorKind};
pub use params::{ParamValue, Params};
pub use timestamp::{DateParseError, WsdotDate};
pub use transport::{
    RuntimeEnvironment, StrategyKind, TransportConfig, TransportMode, select_strategy,
};
pub use url_builder::ServiceFamily;
pub use validate::{SerdeSchema, Validate, ValidationError};

// Re-exported so callers can build credentials without a direct dependency.
pub use secrecy::SecretString;
