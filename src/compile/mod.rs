//! Tree compiler: source model in, concrete item tree out.
//!
//! Compilation happens every frame. Each pass re-resolves every attribute
//! against the live extension modules, so a variable change shows up on the
//! next frame without any invalidation protocol. Three caches cut the cost:
//!
//! - the static cache keeps the first compiled item of any node whose
//!   `static` attribute resolves true, keyed by source identity;
//! - the link table parses each linked document at most once per process;
//! - the image cache decodes each texture file at most once per process.
//!
//! Any configuration error is fatal to the whole frame. There is no partial
//! compilation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use slotmap::SecondaryMap;

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::Vector;
use crate::host::{HostRegistry, ModuleId};
use crate::image::ImageCache;
use crate::item::{self, Container, Item, ItemCore, Label, Layout, Texture, Unicolor};
use crate::style::{Document, Element, NodeKind, Resolver, SourceId, SourceStore};
use crate::window::WindowFlags;

/// Compiles the loaded window document into an [`Item`] tree.
pub struct Compiler {
    store: SourceStore,
    main: Option<Document>,
    kind: String,
    statics: SecondaryMap<SourceId, Item>,
    links: HashMap<PathBuf, Document>,
    images: ImageCache,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            store: SourceStore::new(),
            main: None,
            kind: String::new(),
            statics: SecondaryMap::new(),
            links: HashMap::new(),
            images: ImageCache::new(),
        }
    }

    /// Parse the main window document. Assigns identities for every element
    /// up front; they stay fixed for the process lifetime.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let doc = self.store.parse_window_file(path)?;
        self.kind = match &self.element(doc.root)?.kind {
            NodeKind::Window { kind } => kind.clone(),
            _ => String::new(),
        };
        self.main = Some(doc);
        Ok(())
    }

    /// Like [`load`](Self::load), from an in-memory document. `path` gives
    /// the directory relative references resolve against.
    pub fn load_str(&mut self, xml: &str, path: &Path) -> Result<()> {
        let doc = self.store.parse_window_str(xml, path)?;
        self.kind = match &self.element(doc.root)?.kind {
            NodeKind::Window { kind } => kind.clone(),
            _ => String::new(),
        };
        self.main = Some(doc);
        Ok(())
    }

    /// OS window creation hints from the document's `windowtype`.
    pub fn window_flags(&self) -> WindowFlags {
        WindowFlags::from_kind(&self.kind)
    }

    /// Identity of the loaded document's root element.
    pub fn root_id(&self) -> Result<SourceId> {
        self.main.as_ref().map(|d| d.root).ok_or(Error::MissingRoot)
    }

    /// Compile the whole tree against a display size, with attribute
    /// references resolved through `module`.
    pub fn compile(
        &mut self,
        display: Vector,
        module: ModuleId,
        hosts: &mut HostRegistry,
    ) -> Result<Container> {
        let doc = self.main.clone().ok_or(Error::MissingRoot)?;
        self.compile_container(
            doc.root,
            SizeAttrs::Own,
            display,
            Layout::Overlay,
            module,
            &doc.dir,
            Color::TRANSPARENT,
            hosts,
        )
    }

    fn element(&self, id: SourceId) -> Result<&Element> {
        self.store
            .get(id)
            .ok_or_else(|| Error::Schema("unknown source identity".to_owned()))
    }

    /// Compile one container-like element (window root, extension root,
    /// container, or listcontainer).
    #[allow(clippy::too_many_arguments)]
    fn compile_container(
        &mut self,
        id: SourceId,
        size_attrs: SizeAttrs<'_>,
        parent_size: Vector,
        layout: Layout,
        module: ModuleId,
        dir: &Path,
        fallback: Color,
        hosts: &mut HostRegistry,
    ) -> Result<Container> {
        let element = self.element(id)?.clone();
        let (width, height) = match size_attrs {
            SizeAttrs::Own => (element.node.width.as_str(), element.node.height.as_str()),
            SizeAttrs::Override(w, h) => (w, h),
        };

        let (position, size, background, events) = {
            let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
            (
                resolver.position(&element.node.x, &element.node.y, parent_size)?,
                resolver.size(width, height, parent_size)?,
                resolver.color(&element.node.color)?,
                resolver.events(&element.node.on_event)?,
            )
        };

        let children =
            self.compile_children(&element.node.children, size, module, dir, background, hosts)?;

        Ok(Container {
            core: ItemCore::new(id, position, size, events),
            background,
            layout,
            children,
            is_link: false,
        })
    }

    /// Compile a child list in the fixed per-type order, assigning the
    /// deterministic `"<typeName><index>"` keys.
    fn compile_children(
        &mut self,
        ids: &[SourceId],
        parent_size: Vector,
        module: ModuleId,
        dir: &Path,
        fallback: Color,
        hosts: &mut HostRegistry,
    ) -> Result<Vec<Item>> {
        const TYPE_NAMES: [&str; 6] =
            ["label", "texture", "unicolor", "container", "listcontainer", "link"];

        let mut groups: [Vec<SourceId>; 6] = Default::default();
        for &id in ids {
            let slot = match self.element(id)?.kind {
                NodeKind::Label { .. } => 0,
                NodeKind::Texture { .. } => 1,
                NodeKind::Unicolor => 2,
                NodeKind::Container => 3,
                NodeKind::ListContainer => 4,
                NodeKind::Link => 5,
                NodeKind::Window { .. } | NodeKind::Extension { .. } => {
                    return Err(Error::Schema("document root nested as a child".to_owned()))
                }
            };
            groups[slot].push(id);
        }

        let mut out = Vec::with_capacity(ids.len());
        for (group, name) in groups.iter().zip(TYPE_NAMES) {
            for (index, &id) in group.iter().enumerate() {
                let mut child =
                    self.compile_cached(id, parent_size, module, dir, fallback, hosts)?;
                child.core_mut().key = format!("{name}{index}");
                out.push(child);
            }
        }
        Ok(out)
    }

    /// Compile one child, consulting the static cache first.
    ///
    /// A static node is compiled at most once per process; the cached item
    /// is reused even if the attributes it was built from have since changed
    /// meaning.
    fn compile_cached(
        &mut self,
        id: SourceId,
        parent_size: Vector,
        module: ModuleId,
        dir: &Path,
        fallback: Color,
        hosts: &mut HostRegistry,
    ) -> Result<Item> {
        let is_static = {
            let raw = self.element(id)?.node.static_attr.clone();
            Resolver::new(hosts.get(module)?, module, dir, fallback).boolean(&raw)?
        };

        if is_static {
            if let Some(cached) = self.statics.get(id) {
                return Ok(cached.clone());
            }
        }

        let item = self.compile_item(id, parent_size, module, dir, fallback, hosts)?;

        if is_static && !self.statics.contains_key(id) {
            log::debug!("static cache: storing first compile of {id:?}");
            self.statics.insert(id, item.clone());
        }
        Ok(item)
    }

    fn compile_item(
        &mut self,
        id: SourceId,
        parent_size: Vector,
        module: ModuleId,
        dir: &Path,
        fallback: Color,
        hosts: &mut HostRegistry,
    ) -> Result<Item> {
        let element = self.element(id)?.clone();

        match &element.kind {
            NodeKind::Container => Ok(Item::Container(self.compile_container(
                id,
                SizeAttrs::Own,
                parent_size,
                Layout::Overlay,
                module,
                dir,
                fallback,
                hosts,
            )?)),

            NodeKind::ListContainer => Ok(Item::Container(self.compile_container(
                id,
                SizeAttrs::Own,
                parent_size,
                Layout::List,
                module,
                dir,
                fallback,
                hosts,
            )?)),

            NodeKind::Link => {
                self.compile_link(id, &element, parent_size, module, dir, fallback, hosts)
            }

            NodeKind::Label { text_size, valign, halign, bg_color, bold } => {
                let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
                let node = &element.node;
                Ok(Item::Label(Label {
                    core: ItemCore::new(
                        id,
                        resolver.position(&node.x, &node.y, parent_size)?,
                        resolver.size(&node.width, &node.height, parent_size)?,
                        resolver.events(&node.on_event)?,
                    ),
                    text: resolver.text(&node.text)?,
                    text_size: label_text_size(&resolver, text_size)?,
                    halign: resolver.align(halign)?,
                    valign: resolver.align(valign)?,
                    color: resolver.color(&node.color)?,
                    background: resolver.color(bg_color)?,
                    bold: resolver.boolean(bold)?,
                }))
            }

            NodeKind::Texture { source, scale_down } => {
                let node = &element.node;
                let (core, path, scale) = {
                    let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
                    (
                        ItemCore::new(
                            id,
                            resolver.position(&node.x, &node.y, parent_size)?,
                            resolver.size(&node.width, &node.height, parent_size)?,
                            resolver.events(&node.on_event)?,
                        ),
                        resolver.path(source)?,
                        resolver.boolean(scale_down)?,
                    )
                };
                let pixels = self.images.load(&path, core.size, scale, fallback);
                Ok(Item::Texture(Texture { core, pixels }))
            }

            NodeKind::Unicolor => {
                let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
                let node = &element.node;
                Ok(Item::Unicolor(Unicolor {
                    core: ItemCore::new(
                        id,
                        resolver.position(&node.x, &node.y, parent_size)?,
                        resolver.size(&node.width, &node.height, parent_size)?,
                        resolver.events(&node.on_event)?,
                    ),
                    color: resolver.color(&node.color)?,
                }))
            }

            NodeKind::Window { .. } | NodeKind::Extension { .. } => {
                Err(Error::Schema("document root nested as a child".to_owned()))
            }
        }
    }

    /// Mount a linked extension document. The target path is the link
    /// element's text content, resolved under the host module.
    ///
    /// The linked subtree compiles under its own backend module, with the
    /// link's declared width/height standing in for the extension root's
    /// size attributes. Afterwards the link's position and size, resolved
    /// under the host module, override the compiled root; the subtree's
    /// event bindings stay with the extension's module.
    #[allow(clippy::too_many_arguments)]
    fn compile_link(
        &mut self,
        id: SourceId,
        link: &Element,
        parent_size: Vector,
        module: ModuleId,
        dir: &Path,
        fallback: Color,
        hosts: &mut HostRegistry,
    ) -> Result<Item> {
        let target_path = {
            let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
            resolver.path(&link.node.text)?
        };

        let doc = match self.links.get(&target_path) {
            Some(doc) => doc.clone(),
            None => {
                log::debug!("mounting linked document {}", target_path.display());
                let doc = self.store.parse_extension_file(&target_path)?;
                self.links.insert(target_path.clone(), doc.clone());
                doc
            }
        };

        let backend = match &self.element(doc.root)?.kind {
            NodeKind::Extension { backend } => backend.clone(),
            _ => {
                return Err(Error::Schema(format!(
                    "{}: linked document root is not an extension",
                    target_path.display()
                )))
            }
        };
        let backend_path = if Path::new(&backend).is_absolute() {
            PathBuf::from(&backend)
        } else {
            doc.dir.join(&backend)
        };
        let linked = hosts.ensure(&backend_path)?;

        let mut container = self.compile_container(
            doc.root,
            SizeAttrs::Override(&link.node.width, &link.node.height),
            parent_size,
            Layout::Overlay,
            linked,
            &doc.dir,
            fallback,
            hosts,
        )?;

        // The link's own placement always wins, under the host's module.
        let (position, size) = {
            let resolver = Resolver::new(hosts.get(module)?, module, dir, fallback);
            (
                resolver.position(&link.node.x, &link.node.y, parent_size)?,
                resolver.size(&link.node.width, &link.node.height, parent_size)?,
            )
        };
        container.core.position = position;
        container.core.size = size;
        container.is_link = true;

        Ok(Item::Container(container))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Which width/height strings a container compiles with: its own attributes
/// or, for an extension root, the mounting link's.
enum SizeAttrs<'a> {
    Own,
    Override(&'a str, &'a str),
}

/// Text size: one of the standard names, or a number.
fn label_text_size(resolver: &Resolver<'_>, raw: &str) -> Result<i32> {
    let value = resolver.text(raw)?;
    Ok(match value.as_str() {
        "title" => item::text_size::TITLE,
        "subtitle" => item::text_size::SUBTITLE,
        "header" => item::text_size::HEADER,
        "subheader" => item::text_size::SUBHEADER,
        "text" | "" => item::text_size::TEXT,
        "subtext" => item::text_size::SUBTEXT,
        _ => resolver.integer(&value)?,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
