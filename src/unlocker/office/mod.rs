//! Validación, limpieza y reempaquetado de paquetes OOXML de hoja de cálculo.

mod archive;
mod strip;
mod validate;
mod verify;
mod xml;

pub use archive::{Extraction, Member, extract_to, read_parts, repack};
pub use strip::{StripOptions, StripSummary, strip, strip_into};
pub use validate::{check_package, validate};
pub use verify::verify_protection_removed;
pub use xml::{NodePath, XmlDocument, count_matches, parse_document, prune, serialize_document};
