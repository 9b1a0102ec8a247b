//! Ciclo de vida de los artefactos temporales: creación, asociación a un ámbito,
//! entrega y borrado garantizado.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use tempfile::{Builder, NamedTempFile, TempDir};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::UnlockConfig;
use super::error::{AuthorizationError, Result};

const ARTIFACT_PREFIX: &str = "sheetunlock-";
const WORK_DIR_PREFIX: &str = "sheetunlock-work-";

/// Identidad (sesión o petición) propietaria de un artefacto.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope(String);

impl Scope {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Genera un ámbito aleatorio, útil para peticiones sin sesión previa.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ArtifactId {
    type Err = AuthorizationError;

    /// Un identificador mal formado se trata como uno inexistente.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(|_| AuthorizationError)
    }
}

/// Asociación persistida entre un artefacto y su ámbito propietario.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub scope: Scope,
    pub path: PathBuf,
}

/// Almacén de asociaciones ámbito → artefacto.
///
/// Se inyecta en [`ArtifactStore`] para poder compartirlo entre instancias. Una
/// implementación persistente informa sus fallos con [`UnlockError::ScopeStore`].
///
/// [`UnlockError::ScopeStore`]: super::error::UnlockError::ScopeStore
pub trait ScopeStore: Send + Sync {
    fn insert(&self, id: ArtifactId, binding: Binding) -> Result<()>;

    fn get(&self, id: &ArtifactId) -> Result<Option<Binding>>;

    /// Quita la asociación solo si pertenece a `scope`, de forma atómica.
    fn take_owned(&self, id: &ArtifactId, scope: &Scope) -> Result<Option<Binding>>;

    fn remove(&self, id: &ArtifactId) -> Result<Option<Binding>>;

    fn ids_for_scope(&self, scope: &Scope) -> Result<Vec<ArtifactId>>;
}

#[derive(Debug, Default)]
pub struct InMemoryScopeStore {
    bindings: Mutex<HashMap<ArtifactId, Binding>>,
}

impl InMemoryScopeStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ArtifactId, Binding>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ScopeStore for InMemoryScopeStore {
    fn insert(&self, id: ArtifactId, binding: Binding) -> Result<()> {
        self.lock().insert(id, binding);
        Ok(())
    }

    fn get(&self, id: &ArtifactId) -> Result<Option<Binding>> {
        Ok(self.lock().get(id).cloned())
    }

    fn take_owned(&self, id: &ArtifactId, scope: &Scope) -> Result<Option<Binding>> {
        let mut bindings = self.lock();
        Ok(match bindings.get(id) {
            Some(binding) if binding.scope == *scope => bindings.remove(id),
            _ => None,
        })
    }

    fn remove(&self, id: &ArtifactId) -> Result<Option<Binding>> {
        Ok(self.lock().remove(id))
    }

    fn ids_for_scope(&self, scope: &Scope) -> Result<Vec<ArtifactId>> {
        Ok(self
            .lock()
            .iter()
            .filter(|(_, binding)| binding.scope == *scope)
            .map(|(id, _)| *id)
            .collect())
    }
}

/// Archivo temporal aún sin ámbito. Se borra al soltarse.
#[derive(Debug)]
pub struct Artifact {
    id: ArtifactId,
    file: NamedTempFile,
}

impl Artifact {
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.file.path())?)
    }
}

/// Borra el archivo entregado al salir de [`ArtifactStore::release`], haya o no error.
struct ReleaseGuard {
    path: PathBuf,
}

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        remove_backing_file(&self.path);
    }
}

fn remove_backing_file(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "artefacto borrado"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "no se pudo borrar el artefacto"),
    }
}

/// Propietario de todos los archivos temporales del proceso de desbloqueo.
#[derive(Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    bindings: Arc<dyn ScopeStore>,
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_scope_store(root, Arc::new(InMemoryScopeStore::default()))
    }

    pub fn with_scope_store(
        root: impl Into<PathBuf>,
        bindings: Arc<dyn ScopeStore>,
    ) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, bindings })
    }

    pub fn from_config(config: &UnlockConfig) -> Result<Self> {
        Self::new(config.resolved_temp_root())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserva un archivo temporal con nombre único.
    pub fn create(&self) -> Result<Artifact> {
        let file = Builder::new()
            .prefix(ARTIFACT_PREFIX)
            .suffix(".xlsx")
            .tempfile_in(&self.root)?;
        let artifact = Artifact {
            id: ArtifactId::generate(),
            file,
        };
        debug!(id = %artifact.id, path = %artifact.path().display(), "artefacto creado");
        Ok(artifact)
    }

    /// Reserva un directorio de trabajo que se borra al soltarse.
    pub fn working_area(&self) -> Result<TempDir> {
        Ok(Builder::new().prefix(WORK_DIR_PREFIX).tempdir_in(&self.root)?)
    }

    /// Asocia el artefacto a `scope`; desde ese momento solo ese ámbito puede leerlo o borrarlo.
    pub fn bind(&self, artifact: Artifact, scope: &Scope) -> Result<ArtifactId> {
        let Artifact { id, file } = artifact;
        let path = file.into_temp_path().keep().map_err(|e| e.error)?;
        let binding = Binding {
            scope: scope.clone(),
            path: path.clone(),
        };
        if let Err(error) = self.bindings.insert(id, binding) {
            // Sin asociación nadie podría reclamar ni borrar el archivo.
            remove_backing_file(&path);
            return Err(error);
        }
        debug!(%id, %scope, "artefacto asociado");
        Ok(id)
    }

    /// Entrega el contenido si `scope` es el propietario y borra el artefacto después.
    ///
    /// Un identificador desconocido y uno ajeno producen el mismo [`AuthorizationError`];
    /// en ese caso el artefacto sigue intacto y asociado a su propietario.
    pub fn release(&self, id: &ArtifactId, scope: &Scope) -> Result<Vec<u8>> {
        let Some(binding) = self.bindings.take_owned(id, scope)? else {
            warn!(%id, %scope, "recuperación denegada");
            return Err(AuthorizationError.into());
        };
        let guard = ReleaseGuard { path: binding.path };
        Ok(fs::read(&guard.path)?)
    }

    /// Borra el archivo y su asociación. Devuelve `false` si el artefacto no existía.
    pub fn delete(&self, id: &ArtifactId) -> Result<bool> {
        match self.bindings.remove(id)? {
            Some(binding) => {
                remove_backing_file(&binding.path);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Borra todos los artefactos de un ámbito que terminó o fue abandonado.
    pub fn purge_scope(&self, scope: &Scope) -> Result<usize> {
        let mut deleted = 0;
        for id in self.bindings.ids_for_scope(scope)? {
            if self.delete(&id)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    pub fn is_bound_to(&self, id: &ArtifactId, scope: &Scope) -> Result<bool> {
        Ok(self
            .bindings
            .get(id)?
            .is_some_and(|binding| binding.scope == *scope && binding.path.is_file()))
    }
}
