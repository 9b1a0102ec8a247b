//! Paquetes de prueba construidos en memoria.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub(crate) const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>
"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>
"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/></Relationships>
"#;

/// Hoja con `markers` insertado entre los datos y los márgenes.
pub(crate) fn sheet_xml(markers: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Ventas</t></is></c></row></sheetData>"#,
            "{}",
            r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
            "</worksheet>"
        ),
        markers
    )
}

/// Libro con `markers` insertado antes de la lista de hojas.
pub(crate) fn workbook_xml(markers: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            "{}",
            r#"<sheets><sheet name="Hoja1" sheetId="1" r:id="rId1"/><sheet name="Hoja2" sheetId="2" r:id="rId2"/></sheets>"#,
            "</workbook>"
        ),
        markers
    )
}

pub(crate) const EXCEL_SHEET_PROTECTION: &str = r#"<sheetProtection algorithmName="SHA-512" hashValue="c2VjcmV0bw==" saltValue="c2Fs" spinCount="100000" sheet="1" objects="1" scenarios="1"/>"#;
pub(crate) const EXCEL_FILE_SHARING: &str =
    r#"<fileSharing readOnlyRecommended="1" userName="Ana Pérez"/>"#;
pub(crate) const EXCEL_WORKBOOK_PROTECTION: &str =
    r#"<workbookProtection workbookAlgorithmName="SHA-512" workbookSpinCount="100000" lockStructure="1"/>"#;

/// Hoja con la forma que guarda Excel: `mc:Ignorable`, atributos `x14ac:`/`xr:`,
/// `xml:space="preserve"` con texto en blanco y entidades escapadas.
pub(crate) fn excel_sheet_xml(protection: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\r\n",
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x14ac xr xr2 xr3" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac" xmlns:xr="http://schemas.microsoft.com/office/spreadsheetml/2014/revision" xmlns:xr2="http://schemas.microsoft.com/office/spreadsheetml/2015/revision2" xmlns:xr3="http://schemas.microsoft.com/office/spreadsheetml/2016/revision3" xr:uid="{{7A0C5D2E-1B3F-4C9A-8E21-5D6F7A8B9C0D}}">"#,
            r#"<dimension ref="A1:C1"/><sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews>"#,
            r#"<sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/>"#,
            r#"<sheetData><row r="1" spans="1:3" x14ac:dyDescent="0.25">"#,
            r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve"> </t></is></c>"#,
            r#"<c r="B1" t="inlineStr"><is><t>Ventas &amp; gastos</t></is></c>"#,
            r#"<c r="C1"><f>SUM(1,2)</f><v>3</v></c></row></sheetData>"#,
            "{}",
            r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#,
            r#"<drawing r:id="rId1"/></worksheet>"#
        ),
        protection
    )
}

/// Libro con la forma que guarda Excel, con `file_sharing` y `protection` en sus
/// posiciones habituales.
pub(crate) fn excel_workbook_xml(file_sharing: &str, protection: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\r\n",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" mc:Ignorable="x15 xr xr6 xr10 xr2" xmlns:x15="http://schemas.microsoft.com/office/spreadsheetml/2010/11/main" xmlns:xr="http://schemas.microsoft.com/office/spreadsheetml/2014/revision" xmlns:xr6="http://schemas.microsoft.com/office/spreadsheetml/2016/revision6" xmlns:xr10="http://schemas.microsoft.com/office/spreadsheetml/2016/revision10" xmlns:xr2="http://schemas.microsoft.com/office/spreadsheetml/2015/revision2">"#,
            r#"<fileVersion appName="xl" lastEdited="7" lowestEdited="7" rupBuild="27328"/>"#,
            "{}",
            r#"<workbookPr defaultThemeVersion="166925"/>"#,
            r#"<mc:AlternateContent xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006"><mc:Choice Requires="x15"><x15ac:absPath url="C:\Users\ana\Documents\" xmlns:x15ac="http://schemas.microsoft.com/office/spreadsheetml/2010/11/ac"/></mc:Choice></mc:AlternateContent>"#,
            r#"<xr:revisionPtr revIDLastSave="0" documentId="8_{{1F2E3D4C-5B6A-4978-8695-A4B3C2D1E0F9}}" xr6:coauthVersionLast="47" xr6:coauthVersionMax="47" xr10:uidLastSave="{{00000000-0000-0000-0000-000000000000}}"/>"#,
            "{}",
            r#"<bookViews><workbookView xWindow="-120" yWindow="-120" windowWidth="29040" windowHeight="15840" xr2:uid="{{00000000-000D-0000-FFFF-FFFF00000000}}"/></bookViews>"#,
            r#"<sheets><sheet name="Hoja1" sheetId="1" r:id="rId1"/><sheet name="Hoja2" sheetId="2" r:id="rId2"/></sheets>"#,
            r#"<calcPr calcId="191029"/></workbook>"#
        ),
        file_sharing, protection
    )
}

pub(crate) fn build_zip_with(method: CompressionMethod, entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<'_, ()>::default().compression_method(method);
    for (name, contents) in entries {
        writer
            .start_file(*name, options)
            .expect("no se pudo iniciar la entrada ZIP");
        writer
            .write_all(contents)
            .expect("no se pudo escribir la entrada ZIP");
    }
    writer
        .finish()
        .expect("no se pudo finalizar el ZIP")
        .into_inner()
}

pub(crate) fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    build_zip_with(CompressionMethod::Deflated, entries)
}

pub(crate) fn minimal_workbook() -> Vec<u8> {
    let workbook = workbook_xml("");
    build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
    ])
}

/// Paquete con una hoja protegida, otra libre y un libro con protección y uso compartido.
pub(crate) fn protected_workbook() -> Vec<u8> {
    let protected_sheet = sheet_xml(
        r#"<sheetProtection algorithmName="SHA-512" hashValue="c2VjcmV0bw==" saltValue="c2Fs" spinCount="100000" sheet="1" objects="1" scenarios="1"/>"#,
    );
    let open_sheet = sheet_xml("");
    let workbook = workbook_xml(concat!(
        r#"<fileSharing readOnlyRecommended="1" userName="Ana"/>"#,
        r#"<workbookPr defaultThemeVersion="166925"/>"#,
        r#"<workbookProtection lockStructure="1" workbookPassword="CC3D"/>"#,
    ));

    build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", protected_sheet.as_bytes()),
        ("xl/worksheets/sheet2.xml", open_sheet.as_bytes()),
        ("xl/media/image1.png", b"\x89PNG\r\n\x1a\n-datos-".as_slice()),
    ])
}

/// Paquete con las partes tal como las escribe Excel, protegido a nivel de hoja y de libro.
pub(crate) fn excel_protected_workbook() -> Vec<u8> {
    let protected_sheet = excel_sheet_xml(EXCEL_SHEET_PROTECTION);
    let open_sheet = excel_sheet_xml("");
    let workbook = excel_workbook_xml(EXCEL_FILE_SHARING, EXCEL_WORKBOOK_PROTECTION);

    build_zip(&[
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", ROOT_RELS.as_bytes()),
        ("xl/workbook.xml", workbook.as_bytes()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
        ("xl/worksheets/sheet1.xml", protected_sheet.as_bytes()),
        ("xl/worksheets/sheet2.xml", open_sheet.as_bytes()),
    ])
}
