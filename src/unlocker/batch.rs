//! Procesamiento por lote: cada archivo se trata de forma independiente y un fallo
//! nunca interrumpe al resto.

use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Sender};

use super::artifacts::Scope;
use super::error::ErrorKind;
use super::service::{DownloadTicket, Unlocker};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub filename: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Resultados agregados de un lote: descargas disponibles y errores por archivo.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub downloads: Vec<DownloadTicket>,
    pub errors: Vec<FileFailure>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum UnlockEvent {
    Started {
        total: usize,
    },
    Processing {
        index: usize,
        total: usize,
        filename: String,
    },
    Success {
        filename: String,
        download_filename: String,
        markers_removed: usize,
    },
    Failure {
        filename: String,
        kind: ErrorKind,
        error: String,
    },
    Finished {
        successes: usize,
        failures: usize,
    },
}

impl Unlocker {
    pub fn submit_batch(&self, scope: &Scope, files: Vec<UploadedFile>) -> BatchReport {
        let (sender, _receiver) = mpsc::channel();
        self.run_batch_with_sender(scope, files, &sender)
    }

    /// Procesa el lote emitiendo eventos de progreso por `sender`.
    pub fn run_batch_with_sender(
        &self,
        scope: &Scope,
        files: Vec<UploadedFile>,
        sender: &Sender<UnlockEvent>,
    ) -> BatchReport {
        let total = files.len();
        let _ = sender.send(UnlockEvent::Started { total });

        let mut report = BatchReport::default();
        for (index, file) in files.into_iter().enumerate() {
            let _ = sender.send(UnlockEvent::Processing {
                index: index + 1,
                total,
                filename: file.filename.clone(),
            });

            match self.submit(scope, &file.bytes, &file.filename) {
                Ok(ticket) => {
                    let _ = sender.send(UnlockEvent::Success {
                        filename: file.filename,
                        download_filename: ticket.download_filename.clone(),
                        markers_removed: ticket.summary.markers_removed(),
                    });
                    report.downloads.push(ticket);
                }
                Err(error) => {
                    let failure = FileFailure {
                        filename: file.filename,
                        kind: error.kind(),
                        message: error.to_string(),
                    };
                    let _ = sender.send(UnlockEvent::Failure {
                        filename: failure.filename.clone(),
                        kind: failure.kind,
                        error: failure.message.clone(),
                    });
                    report.errors.push(failure);
                }
            }
        }

        let _ = sender.send(UnlockEvent::Finished {
            successes: report.downloads.len(),
            failures: report.errors.len(),
        });
        report
    }
}
