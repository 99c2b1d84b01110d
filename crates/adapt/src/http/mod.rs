pub mod app;
pub mod contact;
pub mod domains;
pub mod error;

pub use app::{build_api, ApiState, ContactConfig, DomainConfig};
pub use error::ApiError;
