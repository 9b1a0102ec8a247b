//! Validación superficial de paquetes de hoja de cálculo.

use std::collections::HashSet;
use std::io::Cursor;
use zip::ZipArchive;

use crate::unlocker::constants::{REQUIRED_PARTS, ZIP_LOCAL_HEADER_SIGNATURE};
use crate::unlocker::error::{Result, UnlockError};

/// Indica si los bytes forman un paquete ZIP con las partes obligatorias.
pub fn validate(bytes: &[u8]) -> bool {
    check_package(bytes).is_ok()
}

/// Igual que [`validate`], pero informa el motivo del rechazo.
pub fn check_package(bytes: &[u8]) -> Result<()> {
    if !bytes.starts_with(&ZIP_LOCAL_HEADER_SIGNATURE) {
        return Err(UnlockError::format("falta la firma de cabecera ZIP"));
    }

    let archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| UnlockError::format(format!("archivo ZIP ilegible: {}", e)))?;

    let names: HashSet<&str> = archive.file_names().collect();
    for required in REQUIRED_PARTS {
        if !names.contains(required) {
            return Err(UnlockError::format(format!(
                "falta la parte obligatoria {}",
                required
            )));
        }
    }

    Ok(())
}
