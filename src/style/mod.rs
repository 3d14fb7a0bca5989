//! Declarative style layer: the parsed source model and the typed attribute
//! resolver that turns raw document strings into concrete values.

mod attr;
mod document;

pub use attr::Resolver;
pub use document::{Document, Element, NodeKind, SourceId, SourceNode, SourceStore};
