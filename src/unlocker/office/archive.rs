use std::fs::{self, File};
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::unlocker::error::{Result, UnlockError};

/// Miembro del paquete con los atributos que se restauran al reempaquetar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub unix_mode: Option<u32>,
    pub last_modified: Option<DateTime>,
}

/// Lista de miembros y método de compresión registrados al extraer un paquete.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extraction {
    pub members: Vec<Member>,
    pub compression: CompressionMethod,
}

/// Traduce un nombre de miembro a una ruta dentro de `root`.
///
/// Devuelve `None` si el nombre es absoluto o intenta salir del directorio de trabajo.
pub(crate) fn member_path(root: &Path, name: &str) -> Option<PathBuf> {
    if name.starts_with('/') || name.contains('\\') {
        return None;
    }

    let mut path = root.to_path_buf();
    for component in name.split('/') {
        match component {
            "" | "." => continue,
            ".." => return None,
            _ if component.contains(':') => return None,
            _ => path.push(component),
        }
    }
    Some(path)
}

/// Extrae todas las partes del paquete en `dest` y registra el orden de los miembros.
pub fn extract_to(bytes: &[u8], dest: &Path, max_part_bytes: u64) -> Result<Extraction> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut members = Vec::with_capacity(archive.len());
    let mut compression = None;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();
        let member = Member {
            name: name.clone(),
            unix_mode: file.unix_mode(),
            last_modified: file.last_modified(),
        };
        let target = member_path(dest, &name)
            .ok_or_else(|| UnlockError::format(format!("ruta de miembro insegura: {}", name)))?;

        if file.is_dir() {
            fs::create_dir_all(&target)?;
            members.push(member);
            continue;
        }

        if file.size() > max_part_bytes {
            return Err(UnlockError::format(format!(
                "{} ocupa {} bytes sin comprimir (máximo {})",
                name,
                file.size(),
                max_part_bytes
            )));
        }

        compression.get_or_insert(file.compression());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&target)?;
        // El tamaño declarado puede ser falso; se limita lo que realmente se infla.
        let written = io::copy(&mut (&mut file).take(max_part_bytes + 1), &mut output)?;
        if written > max_part_bytes {
            return Err(UnlockError::format(format!(
                "{} supera el máximo de {} bytes al descomprimirse",
                name, max_part_bytes
            )));
        }

        debug!(part = %name, bytes = written, "parte extraída");
        members.push(member);
    }

    Ok(Extraction {
        members,
        compression: compression.unwrap_or(CompressionMethod::Deflated),
    })
}

fn writable_compression(method: CompressionMethod) -> CompressionMethod {
    match method {
        CompressionMethod::Stored => CompressionMethod::Stored,
        _ => CompressionMethod::Deflated,
    }
}

/// Reconstruye un ZIP con exactamente los miembros registrados, en el mismo orden.
///
/// Los miembros que ya no existen como archivo (por ejemplo, entradas de directorio) se omiten.
/// Cada miembro conserva sus permisos y su fecha de modificación.
pub fn repack<W: Write + Seek>(
    work_dir: &Path,
    members: &[Member],
    compression: CompressionMethod,
    sink: W,
) -> Result<W> {
    let method = writable_compression(compression);
    if method != compression {
        debug!(?compression, ?method, "método de compresión sustituido");
    }

    let mut writer = ZipWriter::new(sink);
    for member in members {
        let name = member.name.as_str();
        let Some(source) = member_path(work_dir, name) else {
            continue;
        };
        if !source.is_file() {
            continue;
        }

        let size = fs::metadata(&source)?.len();
        let mut options = FileOptions::<'_, ()>::default()
            .compression_method(method)
            .large_file(size >= u64::from(u32::MAX));
        if let Some(mode) = member.unix_mode {
            options = options.unix_permissions(mode);
        }
        if let Some(time) = member.last_modified {
            options = options.last_modified_time(time);
        }

        writer.start_file(name, options)?;
        let mut input = File::open(&source)?;
        io::copy(&mut input, &mut writer)?;
    }

    Ok(writer.finish()?)
}

/// Lee todas las partes de un paquete en memoria, en orden de aparición.
pub fn read_parts(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        parts.push((file.name().to_string(), contents));
    }
    Ok(parts)
}
