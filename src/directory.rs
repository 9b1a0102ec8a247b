use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

fn is_candidate(path: &Path, output_suffix: &str) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    if !SPREADSHEET_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
        return false;
    }

    // Los resultados de una ejecución anterior no se vuelven a procesar.
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    !stem.ends_with(output_suffix) && !stem.starts_with("~$")
}

/// Busca libros de Excel en `root` (recursivamente) ordenados por ruta.
pub fn collect_candidate_files(root: &Path, output_suffix: &str) -> Result<Vec<PathBuf>, String> {
    if !root.is_dir() {
        return Err("La ruta proporcionada no es un directorio".to_string());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("No se pudo recorrer {}: {}", root.display(), e))?;
        if entry.file_type().is_file() && is_candidate(entry.path(), output_suffix) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
