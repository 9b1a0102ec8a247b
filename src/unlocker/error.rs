//! Taxonomía de errores del motor de desbloqueo.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error de autorización al recuperar un artefacto.
///
/// No distingue entre un artefacto inexistente y uno que pertenece a otro ámbito.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("acceso denegado al artefacto solicitado")]
pub struct AuthorizationError;

#[derive(Debug, Error)]
pub enum UnlockError {
    #[error("no es un paquete de hoja de cálculo válido: {0}")]
    Format(String),
    #[error("XML mal formado en {part}: {message}")]
    XmlParse { part: String, message: String },
    #[error("error de E/S: {0}")]
    Io(#[from] std::io::Error),
    #[error("error de ZIP: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("no se pudo serializar {part}: {message}")]
    XmlWrite { part: String, message: String },
    #[error("expresión de ruta inválida `{expression}`: {reason}")]
    Expression { expression: String, reason: String },
    #[error("la verificación encontró marcadores de protección en {0}")]
    Verification(String),
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error("configuración inválida: {0}")]
    Config(String),
    #[error("almacén de ámbitos no disponible: {0}")]
    ScopeStore(String),
}

/// Categoría de un fallo, usada en los reportes por lote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Format,
    XmlParse,
    Io,
    Authorization,
    Internal,
}

impl UnlockError {
    pub(crate) fn format(reason: impl Into<String>) -> Self {
        Self::Format(reason.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format(_) => ErrorKind::Format,
            Self::XmlParse { .. } | Self::XmlWrite { .. } => ErrorKind::XmlParse,
            Self::Io(_) | Self::Zip(_) => ErrorKind::Io,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::Expression { .. }
            | Self::Verification(_)
            | Self::Config(_)
            | Self::ScopeStore(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T, E = UnlockError> = std::result::Result<T, E>;
