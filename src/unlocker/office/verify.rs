use std::io::{Cursor, Read};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::unlocker::constants::{
    FILE_SHARING_PATH, SHEET_PROTECTION_PATH, WORKBOOK_PART, WORKBOOK_PROTECTION_PATH,
};
use crate::unlocker::error::Result;

use super::strip::is_worksheet_part;
use super::xml::{NodePath, count_matches, parse_document};

/// Comprueba que un paquete ya procesado no conserva marcadores de protección.
///
/// Las hojas que no se pueden analizar se ignoran, igual que durante la limpieza.
pub fn verify_protection_removed(bytes: &[u8]) -> Result<bool> {
    let sheet_protection = NodePath::parse(SHEET_PROTECTION_PATH)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let worksheet_names: Vec<String> = archive
        .file_names()
        .filter(|name| is_worksheet_part(name))
        .map(str::to_string)
        .collect();

    for name in &worksheet_names {
        let mut contents = Vec::new();
        archive.by_name(name)?.read_to_end(&mut contents)?;
        let Ok(document) = parse_document(name, &contents) else {
            continue;
        };
        if count_matches(&document, &sheet_protection) > 0 {
            return Ok(false);
        }
    }

    let workbook_clean = match archive.by_name(WORKBOOK_PART) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            let document = parse_document(WORKBOOK_PART, &contents)?;
            [WORKBOOK_PROTECTION_PATH, FILE_SHARING_PATH]
                .into_iter()
                .map(NodePath::parse)
                .collect::<Result<Vec<_>>>()?
                .iter()
                .all(|path| count_matches(&document, path) == 0)
        }
        Err(ZipError::FileNotFound) => true,
        Err(e) => return Err(e.into()),
    };

    Ok(workbook_clean)
}
