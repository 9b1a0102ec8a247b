//! Valores compartidos del formato de paquete de hoja de cálculo.

pub const SPREADSHEET_MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Prefijo enlazado al espacio de nombres principal en las expresiones de ruta.
pub const MAIN_PREFIX: &str = "main";

pub const ZIP_LOCAL_HEADER_SIGNATURE: [u8; 4] = *b"PK\x03\x04";

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const REQUIRED_PARTS: [&str; 2] = [CONTENT_TYPES_PART, WORKBOOK_PART];

pub const WORKSHEETS_DIR: &str = "xl/worksheets/";

pub const SHEET_PROTECTION_PATH: &str = "//main:sheetProtection";
pub const WORKBOOK_PROTECTION_PATH: &str = "//main:workbookProtection";
pub const FILE_SHARING_PATH: &str = "//main:fileSharing";

pub const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";

pub const DEFAULT_MAX_PART_BYTES: u64 = 256 * 1024 * 1024; // 256 MiB
