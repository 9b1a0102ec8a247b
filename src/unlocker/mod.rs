//! Motor para eliminar marcadores de protección de libros OOXML.

mod artifacts;
mod batch;
mod config;
mod constants;
mod error;
pub mod office;
mod service;
mod utils;

pub use artifacts::{
    Artifact, ArtifactId, ArtifactStore, Binding, InMemoryScopeStore, Scope, ScopeStore,
};
pub use batch::{BatchReport, FileFailure, UnlockEvent, UploadedFile};
pub use config::{CONFIG_ENV_VAR, UnlockConfig};
pub use error::{AuthorizationError, ErrorKind, Result, UnlockError};
pub use service::{DownloadTicket, ProcessedFile, Unlocker};
pub use utils::output_filename;

#[cfg(test)]
mod test_support;
