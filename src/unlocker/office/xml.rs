//! Eliminación de nodos XML seleccionados por rutas con espacio de nombres.
//!
//! El documento se conserva como la secuencia de eventos leída con `quick-xml`. Podar
//! un nodo quita sus eventos y deja el resto tal como venía: prefijos de atributos,
//! espacios en blanco y orden incluidos.

use std::ops::RangeInclusive;

use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::unlocker::constants::{MAIN_PREFIX, SPREADSHEET_MAIN_NS, XML_DECLARATION};
use crate::unlocker::error::{Result, UnlockError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NameTest {
    Any,
    Qualified {
        namespace: String,
        local_name: String,
    },
}

impl NameTest {
    fn matches(&self, element: &ElementName) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Qualified {
                namespace,
                local_name,
            } => {
                element.local_name == *local_name
                    && element.namespace.as_deref() == Some(namespace.as_str())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    axis: Axis,
    test: NameTest,
}

/// Ruta compilada del estilo `//main:sheetProtection` o `/main:worksheet/main:sheetProtection`.
///
/// Solo admite los ejes hijo (`/`) y descendiente (`//`) con nombres calificados o `*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodePath {
    expression: String,
    steps: Vec<Step>,
}

impl NodePath {
    /// Compila una expresión con el enlace fijo `main` → espacio principal de SpreadsheetML.
    pub fn parse(expression: &str) -> Result<Self> {
        Self::parse_with_namespaces(expression, &[(MAIN_PREFIX, SPREADSHEET_MAIN_NS)])
    }

    pub fn parse_with_namespaces(expression: &str, namespaces: &[(&str, &str)]) -> Result<Self> {
        let invalid = |reason: &str| UnlockError::Expression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        if !expression.starts_with('/') {
            return Err(invalid("debe comenzar con `/` o `//`"));
        }

        let mut steps = Vec::new();
        let mut rest = expression;
        while !rest.is_empty() {
            let (axis, after_axis) = if let Some(stripped) = rest.strip_prefix("//") {
                (Axis::Descendant, stripped)
            } else if let Some(stripped) = rest.strip_prefix('/') {
                (Axis::Child, stripped)
            } else {
                return Err(invalid("separador de paso inesperado"));
            };

            let end = after_axis.find('/').unwrap_or(after_axis.len());
            let raw_name = &after_axis[..end];
            rest = &after_axis[end..];
            if raw_name.is_empty() {
                return Err(invalid("paso vacío"));
            }

            let test = if raw_name == "*" {
                NameTest::Any
            } else {
                let (prefix, local_name) = raw_name
                    .split_once(':')
                    .ok_or_else(|| invalid("cada paso necesita un prefijo"))?;
                if local_name.is_empty() || local_name.contains(':') {
                    return Err(invalid("nombre local vacío o inválido"));
                }
                let namespace = namespaces
                    .iter()
                    .find(|(bound, _)| *bound == prefix)
                    .map(|(_, uri)| uri.to_string())
                    .ok_or_else(|| invalid(&format!("prefijo sin enlazar `{}`", prefix)))?;
                NameTest::Qualified {
                    namespace,
                    local_name: local_name.to_string(),
                }
            };
            steps.push(Step { axis, test });
        }

        Ok(Self {
            expression: expression.to_string(),
            steps,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    /// Indica si el último elemento de `chain` (raíz primero) es seleccionado por la ruta.
    fn selects(&self, chain: &[&ElementName]) -> bool {
        steps_match(&self.steps, chain)
    }
}

// Sin pasos pendientes solo queda el nodo documento, que no tiene ancestros.
fn steps_match(steps: &[Step], chain: &[&ElementName]) -> bool {
    let Some((step, earlier)) = steps.split_last() else {
        return chain.is_empty();
    };
    let Some((element, ancestors)) = chain.split_last() else {
        return false;
    };
    if !step.test.matches(element) {
        return false;
    }
    match step.axis {
        Axis::Child => steps_match(earlier, ancestors),
        Axis::Descendant => {
            (0..=ancestors.len()).any(|len| steps_match(earlier, &ancestors[..len]))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ElementName {
    namespace: Option<String>,
    local_name: String,
}

#[derive(Clone, Debug)]
struct Token {
    event: Event<'static>,
    /// Nombre resuelto, presente en `Start` y `Empty`.
    element: Option<ElementName>,
}

/// Documento XML leído como secuencia de eventos.
#[derive(Clone, Debug)]
pub struct XmlDocument {
    tokens: Vec<Token>,
}

/// Tramo de eventos ocupado por un elemento coincidente.
struct Span {
    depth: usize,
    events: RangeInclusive<usize>,
}

impl XmlDocument {
    /// Tramos de cada elemento que `path` selecciona, en orden de documento.
    fn matching_spans(&self, path: &NodePath) -> Vec<Span> {
        // (nombre, índice del `Start`, coincide)
        let mut open: Vec<(&ElementName, usize, bool)> = Vec::new();
        let mut spans = Vec::new();

        for (index, token) in self.tokens.iter().enumerate() {
            match (&token.event, &token.element) {
                (Event::Start(_), Some(name)) => {
                    let mut chain: Vec<&ElementName> = open.iter().map(|(n, _, _)| *n).collect();
                    chain.push(name);
                    open.push((name, index, path.selects(&chain)));
                }
                (Event::Empty(_), Some(name)) => {
                    let mut chain: Vec<&ElementName> = open.iter().map(|(n, _, _)| *n).collect();
                    chain.push(name);
                    if path.selects(&chain) {
                        spans.push(Span {
                            depth: open.len(),
                            events: index..=index,
                        });
                    }
                }
                (Event::End(_), _) => {
                    if let Some((_, start, true)) = open.pop() {
                        spans.push(Span {
                            depth: open.len(),
                            events: start..=index,
                        });
                    }
                }
                _ => {}
            }
        }

        spans.sort_by_key(|span| *span.events.start());
        spans
    }
}

/// Elimina del documento cada elemento que coincide con `path`, junto con su subárbol.
///
/// El elemento raíz nunca se elimina aunque coincida. Devuelve cuántos nodos se separaron.
pub fn prune(document: &mut XmlDocument, path: &NodePath) -> usize {
    let mut detached: Vec<RangeInclusive<usize>> = Vec::new();
    for span in document.matching_spans(path) {
        if span.depth == 0 {
            continue;
        }
        // Los descendientes de un nodo eliminado desaparecen con él.
        if detached
            .last()
            .is_some_and(|outer| outer.contains(span.events.start()))
        {
            continue;
        }
        detached.push(span.events);
    }
    if detached.is_empty() {
        return 0;
    }

    let tokens = std::mem::take(&mut document.tokens);
    let mut pending = detached.iter().peekable();
    document.tokens = tokens
        .into_iter()
        .enumerate()
        .filter(|(index, _)| {
            while pending.next_if(|range| range.end() < index).is_some() {}
            !pending.peek().is_some_and(|range| range.contains(index))
        })
        .map(|(_, token)| token)
        .collect();

    detached.len()
}

/// Cuenta los elementos que coinciden con `path`, sin modificar el documento.
pub fn count_matches(document: &XmlDocument, path: &NodePath) -> usize {
    document.matching_spans(path).len()
}

/// Enlaces `xmlns` visibles en el elemento actual.
#[derive(Default)]
struct NamespaceScopes {
    bindings: Vec<(Vec<u8>, String)>,
    marks: Vec<usize>,
}

impl NamespaceScopes {
    fn enter(&mut self, element: &BytesStart<'_>) -> std::result::Result<(), String> {
        self.marks.push(self.bindings.len());
        for attribute in element.attributes() {
            let attribute = attribute.map_err(|e| e.to_string())?;
            let key = attribute.key.as_ref();
            let prefix = if key == b"xmlns" {
                Vec::new()
            } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
                prefix.to_vec()
            } else {
                continue;
            };
            let uri = attribute.unescape_value().map_err(|e| e.to_string())?;
            self.bindings.push((prefix, uri.into_owned()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.bindings.truncate(mark);
        }
    }

    fn resolve(&self, element: &BytesStart<'_>) -> ElementName {
        let qualified = element.name();
        let qualified = qualified.as_ref();
        let (prefix, local) = match qualified.iter().position(|&b| b == b':') {
            Some(colon) => (&qualified[..colon], &qualified[colon + 1..]),
            None => (&[][..], qualified),
        };
        let namespace = self
            .bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound.as_slice() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty());
        ElementName {
            namespace,
            local_name: String::from_utf8_lossy(local).into_owned(),
        }
    }
}

pub fn parse_document(part: &str, contents: &[u8]) -> Result<XmlDocument> {
    let malformed = |message: String| UnlockError::XmlParse {
        part: part.to_string(),
        message,
    };

    let mut reader = Reader::from_reader(contents);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut scopes = NamespaceScopes::default();
    let mut tokens = Vec::new();
    let mut depth: usize = 0;
    let mut seen_root = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| malformed(e.to_string()))?;
        let element = match &event {
            Event::Start(e) | Event::Empty(e) => {
                if depth == 0 {
                    if seen_root {
                        return Err(malformed("más de un elemento raíz".to_string()));
                    }
                    seen_root = true;
                }
                scopes.enter(e).map_err(&malformed)?;
                let name = scopes.resolve(e);
                if matches!(event, Event::Start(_)) {
                    depth += 1;
                } else {
                    scopes.leave();
                }
                Some(name)
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("etiqueta de cierre sin apertura".to_string()))?;
                scopes.leave();
                None
            }
            Event::Eof => break,
            _ => None,
        };
        tokens.push(Token {
            event: event.into_owned(),
            element,
        });
        buf.clear();
    }

    if depth != 0 {
        return Err(malformed(format!("{} elementos sin cerrar", depth)));
    }
    if !seen_root {
        return Err(malformed("no hay elemento raíz".to_string()));
    }
    Ok(XmlDocument { tokens })
}

/// Serializa en UTF-8 con la declaración `standalone="yes"` explícita.
///
/// La declaración original se sustituye; el resto de eventos se escribe sin cambios.
pub fn serialize_document(part: &str, document: &XmlDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(XML_DECLARATION.as_bytes().to_vec());
    for token in &document.tokens {
        if matches!(token.event, Event::Decl(_)) {
            continue;
        }
        writer
            .write_event(token.event.clone())
            .map_err(|e| UnlockError::XmlWrite {
                part: part.to_string(),
                message: e.to_string(),
            })?;
    }
    Ok(writer.into_inner())
}
