use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Seek, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::unlocker::artifacts::{Artifact, ArtifactStore};
use crate::unlocker::constants::{
    FILE_SHARING_PATH, SHEET_PROTECTION_PATH, WORKBOOK_PART, WORKBOOK_PROTECTION_PATH,
    WORKSHEETS_DIR,
};
use crate::unlocker::error::{Result, UnlockError};

use super::archive::{extract_to, member_path, repack};
use super::xml::{NodePath, parse_document, prune, serialize_document};

/// Opciones que afectan a la eliminación de protecciones.
#[derive(Clone, Copy, Debug)]
pub struct StripOptions {
    pub max_part_bytes: u64,
    pub strict_worksheets: bool,
}

/// Resumen de lo que se eliminó de un paquete.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripSummary {
    pub worksheets_visited: usize,
    pub worksheets_skipped: Vec<String>,
    pub sheet_protections_removed: usize,
    pub workbook_protections_removed: usize,
    pub file_sharing_removed: usize,
}

impl StripSummary {
    pub fn markers_removed(&self) -> usize {
        self.sheet_protections_removed
            + self.workbook_protections_removed
            + self.file_sharing_removed
    }
}

pub(crate) fn is_worksheet_part(name: &str) -> bool {
    name.strip_prefix(WORKSHEETS_DIR)
        .is_some_and(|rest| !rest.contains('/') && rest.ends_with(".xml"))
}

/// Aplica `paths` a una parte ya extraída y la reescribe si se eliminó algo.
///
/// Devuelve el número de nodos eliminados por cada expresión, en el mismo orden.
fn prune_part(work_dir: &Path, part: &str, paths: &[&NodePath]) -> Result<Option<Vec<usize>>> {
    let Some(location) = member_path(work_dir, part) else {
        return Ok(None);
    };
    if !location.is_file() {
        return Ok(None);
    }

    let contents = fs::read(&location)?;
    let mut document = parse_document(part, &contents)?;
    let removed: Vec<usize> = paths.iter().map(|path| prune(&mut document, path)).collect();

    if removed.iter().any(|&count| count > 0) {
        fs::write(&location, serialize_document(part, &document)?)?;
        debug!(part, ?removed, "marcadores de protección eliminados");
    }

    Ok(Some(removed))
}

/// Elimina las protecciones de hoja, de libro y de uso compartido, escribiendo el
/// paquete resultante en `sink`.
///
/// `work_dir` debe ser un directorio vacío reservado para esta operación.
pub fn strip_into<W: Write + Seek>(
    bytes: &[u8],
    work_dir: &Path,
    options: StripOptions,
    sink: W,
) -> Result<(W, StripSummary)> {
    let sheet_protection = NodePath::parse(SHEET_PROTECTION_PATH)?;
    let workbook_protection = NodePath::parse(WORKBOOK_PROTECTION_PATH)?;
    let file_sharing = NodePath::parse(FILE_SHARING_PATH)?;

    let extraction = extract_to(bytes, work_dir, options.max_part_bytes)?;
    let mut summary = StripSummary::default();

    let worksheets = extraction
        .members
        .iter()
        .map(|member| &member.name)
        .filter(|name| is_worksheet_part(name));
    for part in worksheets {
        match prune_part(work_dir, part, &[&sheet_protection]) {
            Ok(Some(removed)) => {
                summary.worksheets_visited += 1;
                summary.sheet_protections_removed += removed[0];
            }
            Ok(None) => {}
            Err(error @ UnlockError::XmlParse { .. }) if !options.strict_worksheets => {
                warn!(part = %part, %error, "hoja omitida: no es XML válido");
                summary.worksheets_skipped.push(part.clone());
            }
            Err(error) => return Err(error),
        }
    }

    let workbook_paths = [&workbook_protection, &file_sharing];
    if let Some(removed) = prune_part(work_dir, WORKBOOK_PART, &workbook_paths)? {
        summary.workbook_protections_removed = removed[0];
        summary.file_sharing_removed = removed[1];
    }

    let sink = repack(work_dir, &extraction.members, extraction.compression, sink)?;
    Ok((sink, summary))
}

/// Elimina las protecciones usando artefactos temporales gestionados por `store`.
///
/// El directorio de trabajo se borra al terminar; el artefacto de salida se borra
/// automáticamente si la operación falla.
pub fn strip(
    bytes: &[u8],
    store: &ArtifactStore,
    options: StripOptions,
) -> Result<(Artifact, StripSummary)> {
    let work_dir = store.working_area()?;
    let mut output = store.create()?;
    let (_, summary) = strip_into(bytes, work_dir.path(), options, output.file_mut())?;
    output.file_mut().flush()?;
    Ok((output, summary))
}
