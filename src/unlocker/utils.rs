//! Utilidades compartidas para nombrar archivos de salida.

use std::path::Path;

/// Construye `<nombre base><sufijo>.<extensión>` a partir del nombre original.
///
/// Solo se descarta la última extensión; un nombre vacío produce `unlocked.<extensión>`.
pub fn output_filename(original: &str, suffix: &str, extension: &str) -> String {
    let file_name = Path::new(original)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name.as_str(),
    };

    if base.is_empty() {
        return format!("unlocked.{}", extension);
    }

    format!("{}{}.{}", base, suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::output_filename;

    #[test]
    fn replaces_last_extension() {
        assert_eq!(
            output_filename("informe.trimestral.xlsm", "_unlocked", "xlsx"),
            "informe.trimestral_unlocked.xlsx"
        );
    }

    #[test]
    fn keeps_names_without_extension() {
        assert_eq!(output_filename("ventas", "_unlocked", "xlsx"), "ventas_unlocked.xlsx");
        assert_eq!(output_filename(".hidden", "_unlocked", "xlsx"), ".hidden_unlocked.xlsx");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(output_filename("", "_unlocked", "xlsx"), "unlocked.xlsx");
    }

    #[test]
    fn drops_directories() {
        assert_eq!(
            output_filename("carpeta/libro.xlsx", "_unlocked", "xlsx"),
            "libro_unlocked.xlsx"
        );
    }
}
