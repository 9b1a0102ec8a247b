//! SheetUnlock: elimina las protecciones de hoja, de libro y de uso compartido de
//! paquetes de hoja de cálculo OOXML sin alterar el resto de su contenido.

pub mod unlocker;

pub use unlocker::{
    ArtifactId, ArtifactStore, BatchReport, DownloadTicket, ProcessedFile, Scope, UnlockConfig,
    UnlockError, UnlockEvent, Unlocker, UploadedFile,
};
