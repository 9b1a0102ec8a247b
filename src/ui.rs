use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row, Table};
use console::style;
use std::path::Path;

use sheetunlock::{ProcessedFile, UnlockError};

const HEADER_WIDTH: usize = 74;

pub fn render_header() {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{}┐", border)).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            "▸ SheetUnlock · Desbloqueo de libros de Excel ◂",
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{}┘", border)).cyan());
}

pub fn render_file_input_hint() {
    let hint_lines = [
        "┌─ Puedes ingresar:",
        "│   • Un libro con extensión (ej. presupuesto.xlsx)",
        "│   • Una ruta relativa (ej. ./informes/ventas.xlsm)",
        "│   • Un directorio para desbloquear todos sus libros",
        "│   Escribe 'salir' o 'exit' para terminar.",
        "└─",
    ];

    for line in hint_lines.iter() {
        println!("{}", style(line).cyan().dim());
    }

    println!();
}

pub fn render_success(source: &Path, output: &Path, processed: &ProcessedFile) {
    let summary = &processed.summary;
    println!("\n{}", style("┌─ Protección Eliminada ─").green());
    println!(
        "{}",
        style(format!("│ Archivo: {}", source.display())).green().bold()
    );
    println!(
        "{}",
        style(format!(
            "│ Hojas: {} · Libro: {} · Uso compartido: {}",
            summary.sheet_protections_removed,
            summary.workbook_protections_removed,
            summary.file_sharing_removed
        ))
        .green()
    );
    if !summary.worksheets_skipped.is_empty() {
        println!(
            "{}",
            style(format!(
                "│ Hojas omitidas (XML ilegible): {}",
                summary.worksheets_skipped.join(", ")
            ))
            .yellow()
        );
    }
    println!(
        "{}",
        style(format!("│ Guardado en: {}", output.display())).green()
    );
    println!("{}", style("└─").green());
}

pub fn render_failure(source: &Path, error: &UnlockError) {
    println!("\n{}", style("┌─ No se pudo desbloquear ─").red());
    println!("{}", style(format!("│ Archivo: {}", source.display())).red().bold());
    println!("{}", style(format!("│ {}", error)).red());
    println!("{}", style("└─").red());
}

/// Resultado de un archivo dentro de un directorio procesado.
pub struct BatchRow {
    pub name: String,
    pub outcome: Result<usize, String>,
}

pub fn render_batch_table(rows: &[BatchRow]) {
    if rows.is_empty() {
        println!(
            "\n{}\n",
            style("No se encontraron libros .xlsx o .xlsm en el directorio.").dim()
        );
        return;
    }

    let mut table = base_table();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Archivo"),
        header_cell("Resultado"),
    ]);

    for (index, row) in rows.iter().enumerate() {
        let (detail, color) = match &row.outcome {
            Ok(0) => ("Sin protecciones".to_string(), Color::Yellow),
            Ok(count) => (format!("{count} marcadores eliminados"), Color::Green),
            Err(message) => (message.clone(), Color::Red),
        };
        table.add_row(Row::from(vec![
            Cell::new(format!("{:>2}", index + 1)).fg(Color::White),
            Cell::new(&row.name).fg(Color::White),
            Cell::new(detail).fg(color),
        ]));
    }

    println!("\n{table}\n");
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Underlined)
}
