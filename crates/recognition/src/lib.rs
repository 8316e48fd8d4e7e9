//! Typed client for the external face-recognition service.
//!
//! The service is a black box reached over HTTP: it detects faces, searches
//! a template collection by similarity, indexes new templates, and deletes
//! them. [`RecognitionProvider`] is the narrow seam the engine consumes;
//! [`HttpRecognitionClient`] is the production implementation. Every
//! response is deserialized into a strongly-typed struct and validated at
//! this boundary so internal code never inspects loosely-typed maps.

pub mod error;
pub mod http;
pub mod provider;
pub mod types;

pub use error::ProviderError;
pub use http::{HttpRecognitionClient, RecognitionServiceConfig};
pub use provider::RecognitionProvider;
pub use types::{IndexedTemplate, QualityHints, RemoteFace, TemplateMatch};
