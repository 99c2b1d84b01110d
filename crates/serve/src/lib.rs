pub mod content;
pub mod fm;
pub mod i18n;

pub use content::{ContentError, ContentStore};
pub use i18n::{BundleSource, FsBundles, I18n, I18nError, ResourceSet, StaticBundles, Translator};

use http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("content error: {0}")]
    Content(#[from] ContentError),
}

impl Error {
    pub fn to_status(&self) -> StatusCode {
        match self {
            Error::Content(ContentError::NotFound { .. }) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
