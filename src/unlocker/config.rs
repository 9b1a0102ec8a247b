//! Configuración del motor, cargada desde JSON o con valores por defecto.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::constants::DEFAULT_MAX_PART_BYTES;
use super::error::{Result, UnlockError};

/// Variable de entorno con la ruta del archivo de configuración.
pub const CONFIG_ENV_VAR: &str = "SHEETUNLOCK_CONFIG";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockConfig {
    /// Directorio donde se crean los artefactos temporales. Usa el temporal del sistema si falta.
    pub temp_root: Option<PathBuf>,
    pub max_part_bytes: u64,
    pub output_suffix: String,
    pub output_extension: String,
    /// Convierte en error las hojas que no se pueden analizar como XML.
    pub strict_worksheets: bool,
    pub verify_output: bool,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            temp_root: None,
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            output_suffix: "_unlocked".to_string(),
            output_extension: "xlsx".to_string(),
            strict_worksheets: false,
            verify_output: true,
        }
    }
}

impl UnlockConfig {
    /// Lee la configuración indicada en `SHEETUNLOCK_CONFIG` o devuelve la predeterminada.
    pub fn load() -> Result<Self> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_json_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            UnlockError::Config(format!("no se pudo leer {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| UnlockError::Config(format!("JSON inválido: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_part_bytes == 0 {
            return Err(UnlockError::Config(
                "max_part_bytes debe ser mayor que cero".to_string(),
            ));
        }
        if self.output_extension.is_empty() || self.output_extension.contains(['.', '/', '\\']) {
            return Err(UnlockError::Config(format!(
                "extensión de salida inválida: `{}`",
                self.output_extension
            )));
        }
        Ok(())
    }

    /// Directorio efectivo para los artefactos temporales.
    pub fn resolved_temp_root(&self) -> PathBuf {
        self.temp_root.clone().unwrap_or_else(env::temp_dir)
    }
}
