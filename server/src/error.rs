//! Startup errors for the server binary.
//!
//! Nothing here is produced while serving: request-level failures are
//! logged by the dispatcher and never stop the process.

use thiserror::Error;
use todo_core::StoreError;

use crate::config::ConfigError;
use crate::templates::TemplateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to open store: {0}")]
    Store(#[from] StoreError),

    #[error("invalid templates: {0}")]
    Template(#[from] TemplateError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
