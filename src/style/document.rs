//! Declarative source model: parsed XML documents as identity-stable trees.
//!
//! Parsing assigns every element a [`SourceId`] from a shared arena, in
//! document order, exactly once. Those identities are the keys of the static
//! cache, so they must never be reassigned; linked documents parse into the
//! same store and therefore share the identity space.
//!
//! Attribute values stay raw strings here. Resolution (`$`/`@` substitution,
//! arithmetic, percent math) happens per frame in the compiler; the source
//! tree itself is immutable after parsing.

use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use slotmap::{new_key_type, SlotMap};

use crate::error::{Error, Result};

new_key_type! {
    /// Process-unique identity of one source element.
    pub struct SourceId;
}

/// What a source element is, with its type-specific raw attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of a window document.
    Window { kind: String },
    /// Root of a linked extension document.
    Extension { backend: String },
    Container,
    ListContainer,
    Label {
        text_size: String,
        valign: String,
        halign: String,
        bg_color: String,
        bold: String,
    },
    Texture { source: String, scale_down: String },
    Unicolor,
    /// Mount point for another extension document. The target path is the
    /// element's text content.
    Link,
}

/// One parsed element. All attribute fields hold the raw document text.
#[derive(Debug, Clone, Default)]
pub struct SourceNode {
    pub x: String,
    pub y: String,
    pub width: String,
    pub height: String,
    /// Raw `onevent` attribute, comma-separated `event:handler` pairs.
    pub on_event: String,
    /// Raw `static` attribute.
    pub static_attr: String,
    /// Raw `color` attribute (fill, foreground, or background depending on
    /// the element type).
    pub color: String,
    /// Element text content (label text).
    pub text: String,
    pub children: Vec<SourceId>,
}

/// A [`SourceNode`] plus its kind, as stored in the arena.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: NodeKind,
    pub node: SourceNode,
}

/// Shared arena of all parsed elements, across every loaded document.
#[derive(Default)]
pub struct SourceStore {
    nodes: SlotMap<SourceId, Element>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The element behind an identity. Identities are never removed, so a
    /// miss means the id came from a different store.
    pub fn get(&self, id: SourceId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parse a window document from a file.
    pub fn parse_window_file(&mut self, path: &Path) -> Result<Document> {
        let xml = read(path)?;
        self.parse(&xml, path, DocumentRole::Window)
    }

    /// Parse a linked extension document from a file.
    pub fn parse_extension_file(&mut self, path: &Path) -> Result<Document> {
        let xml = read(path)?;
        self.parse(&xml, path, DocumentRole::Extension)
    }

    /// Parse a window document from a string. `path` is used for error
    /// context and relative-path resolution.
    pub fn parse_window_str(&mut self, xml: &str, path: &Path) -> Result<Document> {
        self.parse(xml, path, DocumentRole::Window)
    }

    fn parse(&mut self, xml: &str, path: &Path, role: DocumentRole) -> Result<Document> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut root: Option<SourceId> = None;
        let mut stack: Vec<SourceId> = Vec::new();

        loop {
            let event = reader.read_event().map_err(|e| Error::Xml {
                path: path.to_owned(),
                message: e.to_string(),
            })?;

            match event {
                Event::Start(start) => {
                    let id = self.open_element(&start, path, role, &stack, &mut root)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    self.open_element(&start, path, role, &stack, &mut root)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    let content = text.unescape().map_err(|e| Error::Xml {
                        path: path.to_owned(),
                        message: e.to_string(),
                    })?;
                    if let Some(&id) = stack.last() {
                        self.nodes[id].node.text = content.into_owned();
                    }
                }
                Event::Eof => break,
                // Declarations and comments carry no structure.
                _ => {}
            }
        }

        let root = root.ok_or_else(|| {
            Error::Schema(format!("{}: document has no root element", path.display()))
        })?;

        let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_owned();
        Ok(Document { root, dir })
    }

    fn open_element(
        &mut self,
        start: &BytesStart<'_>,
        path: &Path,
        role: DocumentRole,
        stack: &[SourceId],
        root: &mut Option<SourceId>,
    ) -> Result<SourceId> {
        let element = build_element(start, path)?;

        let is_root_kind = matches!(
            element.kind,
            NodeKind::Window { .. } | NodeKind::Extension { .. }
        );

        if stack.is_empty() {
            match (role, &element.kind) {
                (DocumentRole::Window, NodeKind::Window { .. }) => {}
                (DocumentRole::Extension, NodeKind::Extension { .. }) => {}
                _ => {
                    return Err(Error::Schema(format!(
                        "{}: wrong root element {:?}",
                        path.display(),
                        element_name(start)
                    )))
                }
            }
        } else if is_root_kind {
            return Err(Error::Schema(format!(
                "{}: {:?} is only valid as the document root",
                path.display(),
                element_name(start)
            )));
        }

        let id = self.nodes.insert(element);
        match stack.last() {
            Some(&parent) => self.nodes[parent].node.children.push(id),
            None => *root = Some(id),
        }
        Ok(id)
    }
}

/// One parsed document: its root identity and the directory relative paths
/// resolve against.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: SourceId,
    pub dir: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum DocumentRole {
    Window,
    Extension,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_owned(), source })
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

/// Map one XML element onto its [`Element`], pulling the attributes each
/// element type understands. Unknown element names and unknown attributes
/// are schema errors; a typo'd attribute silently doing nothing would be
/// worse than failing loudly.
fn build_element(start: &BytesStart<'_>, path: &Path) -> Result<Element> {
    let name = start.name();
    let mut node = SourceNode::default();

    // Type-specific raw attributes, picked up in the loop below.
    let mut window_kind = String::new();
    let mut backend = String::new();
    let mut text_size = String::new();
    let mut valign = String::new();
    let mut halign = String::new();
    let mut bg_color = String::new();
    let mut bold = String::new();
    let mut source = String::new();
    let mut scale_down = String::new();

    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml {
            path: path.to_owned(),
            message: e.to_string(),
        })?;
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml { path: path.to_owned(), message: e.to_string() })?
            .into_owned();

        match attr.key.as_ref() {
            b"x" => node.x = value,
            b"y" => node.y = value,
            b"width" => node.width = value,
            b"height" => node.height = value,
            b"onevent" => node.on_event = value,
            b"static" => node.static_attr = value,
            b"color" => node.color = value,
            b"windowtype" => window_kind = value,
            b"backend" => backend = value,
            b"textsize" => text_size = value,
            b"valign" => valign = value,
            b"halign" => halign = value,
            b"bgcolor" => bg_color = value,
            b"bold" => bold = value,
            b"source" => source = value,
            b"scaledown" => scale_down = value,
            other => {
                return Err(Error::Schema(format!(
                    "{}: unknown attribute {:?} on <{}>",
                    path.display(),
                    String::from_utf8_lossy(other),
                    element_name(start)
                )))
            }
        }
    }

    let kind = match name.as_ref() {
        b"window" => NodeKind::Window { kind: window_kind },
        b"extension" => NodeKind::Extension { backend },
        b"container" => NodeKind::Container,
        b"listcontainer" => NodeKind::ListContainer,
        b"label" => NodeKind::Label { text_size, valign, halign, bg_color, bold },
        b"texture" => NodeKind::Texture { source, scale_down },
        b"unicolor" => NodeKind::Unicolor,
        b"link" => NodeKind::Link,
        _ => {
            return Err(Error::Schema(format!(
                "{}: unknown element <{}>",
                path.display(),
                element_name(start)
            )))
        }
    };

    Ok(Element { kind, node })
}

// ===========================================================================
// Tests
// ===========================================================================
