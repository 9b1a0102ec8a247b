//! Punto de entrada del motor para la capa web u otros consumidores.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::artifacts::{Artifact, ArtifactId, ArtifactStore, Scope};
use super::config::UnlockConfig;
use super::error::{Result, UnlockError};
use super::office::{StripOptions, StripSummary, check_package, strip, verify_protection_removed};
use super::utils::output_filename;

/// Resultado de desbloquear un archivo en memoria.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub summary: StripSummary,
}

/// Referencia a un resultado guardado para que su ámbito lo descargue más tarde.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTicket {
    pub artifact_id: ArtifactId,
    pub source_filename: String,
    pub download_filename: String,
    pub summary: StripSummary,
}

#[derive(Clone, Debug)]
pub struct Unlocker {
    config: UnlockConfig,
    store: ArtifactStore,
}

impl Unlocker {
    pub fn new(config: UnlockConfig) -> Result<Self> {
        let store = ArtifactStore::from_config(&config)?;
        Ok(Self { config, store })
    }

    pub fn with_store(config: UnlockConfig, store: ArtifactStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &UnlockConfig {
        &self.config
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn output_filename(&self, original: &str) -> String {
        output_filename(
            original,
            &self.config.output_suffix,
            &self.config.output_extension,
        )
    }

    fn strip_options(&self) -> StripOptions {
        StripOptions {
            max_part_bytes: self.config.max_part_bytes,
            strict_worksheets: self.config.strict_worksheets,
        }
    }

    /// Valida y limpia el paquete; el artefacto devuelto se borra solo si se suelta.
    fn unlock_to_artifact(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<(Artifact, Vec<u8>, StripSummary)> {
        check_package(bytes)?;

        let (artifact, summary) = strip(bytes, &self.store, self.strip_options())?;
        let output = artifact.read_bytes()?;

        if self.config.verify_output && !verify_protection_removed(&output)? {
            return Err(UnlockError::Verification(filename.to_string()));
        }

        info!(
            file = filename,
            markers = summary.markers_removed(),
            skipped = summary.worksheets_skipped.len(),
            "protecciones eliminadas"
        );
        Ok((artifact, output, summary))
    }

    /// Desbloquea un archivo y devuelve el resultado junto con su nombre de descarga.
    pub fn process(&self, bytes: &[u8], original_filename: &str) -> Result<ProcessedFile> {
        let (_artifact, output, summary) = self.unlock_to_artifact(bytes, original_filename)?;
        Ok(ProcessedFile {
            bytes: output,
            filename: self.output_filename(original_filename),
            summary,
        })
    }

    /// Desbloquea un archivo y guarda el resultado asociado a `scope`.
    pub fn submit(
        &self,
        scope: &Scope,
        bytes: &[u8],
        original_filename: &str,
    ) -> Result<DownloadTicket> {
        let (artifact, _, summary) = self.unlock_to_artifact(bytes, original_filename)?;
        let artifact_id = self.store.bind(artifact, scope)?;
        Ok(DownloadTicket {
            artifact_id,
            source_filename: original_filename.to_string(),
            download_filename: self.output_filename(original_filename),
            summary,
        })
    }

    /// Entrega un resultado a su propietario y lo borra del disco.
    pub fn retrieve_for_download(
        &self,
        artifact_id: &ArtifactId,
        scope: &Scope,
    ) -> Result<Vec<u8>> {
        self.store.release(artifact_id, scope)
    }

    /// Borra los resultados pendientes de un ámbito que terminó.
    pub fn end_scope(&self, scope: &Scope) -> Result<usize> {
        self.store.purge_scope(scope)
    }
}
