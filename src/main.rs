mod directory;
mod ui;

use console::style;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use sheetunlock::{ProcessedFile, UnlockConfig, UnlockError, Unlocker};

fn main() {
    if env::args().len() > 1 {
        eprintln!(
            "SheetUnlock es interactivo y no acepta argumentos. Ejecuta solo `cargo run` o el binario sin parámetros."
        );
        std::process::exit(1);
    }

    init_tracing();

    let unlocker = match UnlockConfig::load().and_then(Unlocker::new) {
        Ok(unlocker) => unlocker,
        Err(error) => {
            eprintln!("No se pudo inicializar SheetUnlock: {error}");
            std::process::exit(1);
        }
    };

    ui::render_header();
    ui::render_file_input_hint();

    let mut input = String::new();
    loop {
        match read_user_input(&mut input) {
            Ok(None) => {
                println!("\n{}", style("Fin de la entrada. ¡Hasta luego!").dim());
                break;
            }
            Ok(Some(line)) => {
                if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("salir") {
                    println!("{}", style("Hasta luego!").dim());
                    break;
                }

                if line.is_empty() {
                    continue;
                }

                match handle_path(&unlocker, Path::new(&line)) {
                    Ok(()) => println!("{}\n", style("Operación completada.").dim()),
                    Err(message) => eprintln!("{message}"),
                }
            }
            Err(error) => {
                eprintln!("Error al leer la entrada: {error}");
            }
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn read_user_input(buffer: &mut String) -> io::Result<Option<String>> {
    print!("{} ", style("Ruta").bold().cyan());
    print!("{} ", style("›").cyan());
    io::stdout().flush()?;

    buffer.clear();
    let bytes_read = io::stdin().read_line(buffer)?;
    if bytes_read == 0 {
        return Ok(None);
    }

    Ok(Some(buffer.trim().to_string()))
}

fn handle_path(unlocker: &Unlocker, path: &Path) -> Result<(), String> {
    let metadata = fs::metadata(path)
        .map_err(|error| format!("No se pudo acceder a `{}`: {error}", path.display()))?;

    if metadata.is_dir() {
        let files = directory::collect_candidate_files(path, &unlocker.config().output_suffix)?;
        let rows: Vec<ui::BatchRow> = files
            .iter()
            .map(|file| ui::BatchRow {
                name: file
                    .strip_prefix(path)
                    .unwrap_or(file)
                    .display()
                    .to_string(),
                outcome: unlock_file(unlocker, file)
                    .map(|(_, processed)| processed.summary.markers_removed())
                    .map_err(|error| error.to_string()),
            })
            .collect();
        ui::render_batch_table(&rows);
        return Ok(());
    }

    match unlock_file(unlocker, path) {
        Ok((output, processed)) => {
            ui::render_success(path, &output, &processed);
            Ok(())
        }
        Err(error) => {
            ui::render_failure(path, &error);
            Err(format!("Se conservó el archivo original `{}`.", path.display()))
        }
    }
}

/// Desbloquea `path` y guarda el resultado junto al original con el sufijo configurado.
fn unlock_file(unlocker: &Unlocker, path: &Path) -> Result<(PathBuf, ProcessedFile), UnlockError> {
    let bytes = fs::read(path)?;
    let original_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let processed = unlocker.process(&bytes, &original_name)?;
    let output = path.with_file_name(&processed.filename);
    fs::write(&output, &processed.bytes)?;
    Ok((output, processed))
}
