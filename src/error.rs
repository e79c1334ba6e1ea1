use crate::coerce::CoercionError;
use crate::load::LoadError;
use thiserror::Error;

/// Top-level error type for the dragon-settings library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("settings load failed: {0}")]
    Load(#[from] LoadError),

    #[error("no setting registered under key \"{0}\"")]
    UnknownKey(String),

    #[error("setting \"{0}\" does not accept runtime assignment")]
    NotAssignable(String),

    #[error("cannot assign setting \"{key}\": {source}")]
    Coercion { key: String, source: CoercionError },
}
