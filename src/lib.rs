//! HTTP API that normalizes payment-provider chargeback webhooks into a single
//! record shape, plus a small in-memory user service.

pub mod config;
pub mod error;
pub mod http_server;
pub mod logging;
pub mod schema;
pub mod store;
pub mod transform;
pub mod types;

pub use error::ApiError;
pub use http_server::{build_router, AppState};
pub use schema::{validate_envelope, FieldIssue, ValidationFailure};
pub use transform::{transform, TransformError};
pub use types::{CanonicalChargeback, WebhookEnvelope, WebhookType};
