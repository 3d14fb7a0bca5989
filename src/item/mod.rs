//! The item/container data model: the live tree produced by the compiler.
//!
//! Every node is an [`Item`] — positioned, sized, drawable, and optionally
//! event-bound. Leaf variants are [`Label`], [`Texture`], and [`Unicolor`];
//! [`Container`] owns children and comes in two layouts: overlay (children
//! keep independent positions and may overlap) and list (children stack
//! along the Y axis in declared order).
//!
//! All sizes here are concrete pixel vectors — percentage and fraction
//! values never survive the attribute resolution step.

use std::collections::HashMap;
use std::sync::Arc;

use crate::color::Color;
use crate::geometry::{Align, FractionVector, Vector};
use crate::host::Handler;
use crate::image::Pixels;
use crate::style::SourceId;

/// Event-name to handler bindings for one item. Keys are unique; insertion
/// order is irrelevant.
pub type EventMap = HashMap<String, Handler>;

/// Standard label text sizes.
pub mod text_size {
    pub const TITLE: i32 = 128;
    pub const SUBTITLE: i32 = 64;
    pub const HEADER: i32 = 32;
    pub const SUBHEADER: i32 = 24;
    pub const TEXT: i32 = 16;
    pub const SUBTEXT: i32 = 14;
}

// ---------------------------------------------------------------------------
// ItemCore
// ---------------------------------------------------------------------------

/// State shared by every item variant.
#[derive(Debug, Clone)]
pub struct ItemCore {
    /// Source-node identity this item was compiled from. Stable across
    /// recompiles for the process lifetime.
    pub uid: SourceId,
    /// Generated child key, `"<typeName><index>"` (empty for a root).
    pub key: String,
    /// Position relative to the parent container.
    pub position: Vector,
    /// Resolved pixel size.
    pub size: Vector,
    /// Bound event handlers.
    pub events: EventMap,
}

impl ItemCore {
    pub fn new(uid: SourceId, position: Vector, size: Vector, events: EventMap) -> Self {
        Self { uid, key: String::new(), position, size, events }
    }
}

// ---------------------------------------------------------------------------
// Leaf variants
// ---------------------------------------------------------------------------

/// Short single-line text.
#[derive(Debug, Clone)]
pub struct Label {
    pub core: ItemCore,
    pub text: String,
    pub text_size: i32,
    pub halign: Align,
    pub valign: Align,
    pub color: Color,
    pub background: Color,
    pub bold: bool,
}

/// A decoded (and possibly downscaled) image.
#[derive(Debug, Clone)]
pub struct Texture {
    pub core: ItemCore,
    pub pixels: Arc<Pixels>,
}

/// A single fill color.
#[derive(Debug, Clone)]
pub struct Unicolor {
    pub core: ItemCore,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Container
// ---------------------------------------------------------------------------

/// Child placement strategy of a container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Layout {
    /// Children keep independent positions; later children draw on top.
    #[default]
    Overlay,
    /// Children stack along the Y axis; each child's effective Y is the
    /// cumulative `y + height` of all earlier siblings.
    List,
}

/// An item that groups other items.
#[derive(Debug, Clone)]
pub struct Container {
    pub core: ItemCore,
    pub background: Color,
    pub layout: Layout,
    pub children: Vec<Item>,
    /// True only for the root of a subtree mounted via a link element.
    /// Affects event routing: a link container also sees events that pass
    /// through it on the way to a descendant.
    pub is_link: bool,
}

impl Container {
    /// Child by index.
    pub fn child(&self, index: usize) -> Option<&Item> {
        self.children.get(index)
    }

    /// Child by generated key, e.g. `"label0"`.
    pub fn child_by_key(&self, key: &str) -> Option<&Item> {
        self.children.iter().find(|c| c.core().key == key)
    }

    /// Move a child to an absolute pixel position.
    pub fn move_child(&mut self, index: usize, position: Vector) {
        if let Some(child) = self.children.get_mut(index) {
            child.core_mut().position = position;
        }
    }

    /// Move a child to a fraction of this container's own size.
    pub fn move_child_to_fraction(&mut self, index: usize, fraction: FractionVector) {
        let position = fraction.resolve(self.core.size);
        self.move_child(index, position);
    }

    /// Resize a child to an absolute pixel size.
    pub fn resize_child(&mut self, index: usize, size: Vector) {
        if let Some(child) = self.children.get_mut(index) {
            child.core_mut().size = size;
        }
    }

    /// Resize a child to a fraction of this container's own size.
    pub fn resize_child_to_fraction(&mut self, index: usize, fraction: FractionVector) {
        let size = fraction.resolve(self.core.size);
        self.resize_child(index, size);
    }

    /// Index of the first child whose rectangle contains `point` (in this
    /// container's local coordinate space), or `None` when the point only
    /// hits the container itself.
    ///
    /// For a list container each child's rectangle is offset by the
    /// cumulative Y extent of all earlier siblings. A child stacked past the
    /// container's height still takes part in the test; only drawing clips.
    pub fn hit(&self, point: Vector) -> Option<usize> {
        match self.layout {
            Layout::Overlay => self
                .children
                .iter()
                .position(|c| c.core().position.rect_contains(c.core().size, point)),
            Layout::List => {
                let mut offset = 0i32;
                for (i, child) in self.children.iter().enumerate() {
                    let core = child.core();
                    let shifted = Vector::new(core.position.x, core.position.y + offset);
                    if shifted.rect_contains(core.size, point) {
                        return Some(i);
                    }
                    offset += core.position.y + core.size.y;
                }
                None
            }
        }
    }

    /// Effective Y offset of each child when drawn: the declared positions
    /// for an overlay container, cumulative stacking for a list container.
    pub fn child_offsets(&self) -> Vec<Vector> {
        match self.layout {
            Layout::Overlay => self.children.iter().map(|c| c.core().position).collect(),
            Layout::List => {
                let mut offsets = Vec::with_capacity(self.children.len());
                let mut offset = 0i32;
                for child in &self.children {
                    let core = child.core();
                    offsets.push(Vector::new(core.position.x, core.position.y + offset));
                    offset += core.position.y + core.size.y;
                }
                offsets
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Any node of the compiled tree.
#[derive(Debug, Clone)]
pub enum Item {
    Container(Container),
    Label(Label),
    Texture(Texture),
    Unicolor(Unicolor),
}

impl Item {
    /// Shared state of whichever variant this is.
    pub fn core(&self) -> &ItemCore {
        match self {
            Item::Container(c) => &c.core,
            Item::Label(l) => &l.core,
            Item::Texture(t) => &t.core,
            Item::Unicolor(u) => &u.core,
        }
    }

    pub fn core_mut(&mut self) -> &mut ItemCore {
        match self {
            Item::Container(c) => &mut c.core,
            Item::Label(l) => &mut l.core,
            Item::Texture(t) => &mut t.core,
            Item::Unicolor(u) => &mut u.core,
        }
    }

    /// Position relative to the parent container.
    pub fn position(&self) -> Vector {
        self.core().position
    }

    /// Resolved pixel size.
    pub fn size(&self) -> Vector {
        self.core().size
    }

    /// Handler bound to `event`, if any.
    pub fn event(&self, event: &str) -> Option<&Handler> {
        self.core().events.get(event)
    }

    /// The container inside, if this item is one.
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Item::Container(c) => Some(c),
            _ => None,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn fresh_uid() -> SourceId {
        // Identities come from the source store at parse time; for unit
        // tests a throwaway arena produces valid keys.
        let mut arena: SlotMap<SourceId, ()> = SlotMap::with_key();
        arena.insert(())
    }

    fn unicolor(pos: Vector, size: Vector) -> Item {
        Item::Unicolor(Unicolor {
            core: ItemCore::new(fresh_uid(), pos, size, EventMap::new()),
            color: Color::TRANSPARENT,
        })
    }

    fn container(layout: Layout, size: Vector, children: Vec<Item>) -> Container {
        Container {
            core: ItemCore::new(fresh_uid(), Vector::ZERO, size, EventMap::new()),
            background: Color::TRANSPARENT,
            layout,
            children,
            is_link: false,
        }
    }

    // ── Overlay hit testing ──────────────────────────────────────────

    #[test]
    fn overlay_hit_first_match_wins() {
        let cont = container(
            Layout::Overlay,
            Vector::new(100, 100),
            vec![
                unicolor(Vector::new(0, 0), Vector::new(50, 50)),
                unicolor(Vector::new(25, 25), Vector::new(50, 50)),
            ],
        );
        assert_eq!(cont.hit(Vector::new(30, 30)), Some(0));
        assert_eq!(cont.hit(Vector::new(60, 60)), Some(1));
        assert_eq!(cont.hit(Vector::new(90, 90)), None);
    }

    // ── List stacking ────────────────────────────────────────────────

    #[test]
    fn list_offsets_accumulate() {
        let cont = container(
            Layout::List,
            Vector::new(100, 100),
            vec![
                unicolor(Vector::new(0, 0), Vector::new(100, 10)),
                unicolor(Vector::new(0, 0), Vector::new(100, 20)),
                unicolor(Vector::new(0, 0), Vector::new(100, 30)),
            ],
        );
        let ys: Vec<i32> = cont.child_offsets().iter().map(|v| v.y).collect();
        assert_eq!(ys, vec![0, 10, 30]);
    }

    #[test]
    fn list_hit_uses_cumulative_offset() {
        let cont = container(
            Layout::List,
            Vector::new(100, 100),
            vec![
                unicolor(Vector::new(0, 0), Vector::new(100, 10)),
                unicolor(Vector::new(0, 0), Vector::new(100, 20)),
            ],
        );
        assert_eq!(cont.hit(Vector::new(5, 5)), Some(0));
        assert_eq!(cont.hit(Vector::new(5, 15)), Some(1));
        assert_eq!(cont.hit(Vector::new(5, 40)), None);
    }

    #[test]
    fn list_hit_reaches_children_past_container_height() {
        // Stacked children past the bottom edge are skipped when drawing but
        // still occupy routing space.
        let cont = container(
            Layout::List,
            Vector::new(100, 30),
            vec![
                unicolor(Vector::new(0, 0), Vector::new(100, 25)),
                unicolor(Vector::new(0, 0), Vector::new(100, 25)),
            ],
        );
        assert_eq!(cont.hit(Vector::new(5, 40)), Some(1));
    }

    // ── Fraction placement ───────────────────────────────────────────

    #[test]
    fn move_child_to_fraction_of_own_size() {
        let mut cont = container(
            Layout::Overlay,
            Vector::new(200, 100),
            vec![unicolor(Vector::ZERO, Vector::new(10, 10))],
        );
        cont.move_child_to_fraction(0, FractionVector::new(0.5, 0.5));
        assert_eq!(cont.children[0].position(), Vector::new(100, 50));
    }

    #[test]
    fn resize_child_to_fraction_of_own_size() {
        let mut cont = container(
            Layout::Overlay,
            Vector::new(200, 100),
            vec![unicolor(Vector::ZERO, Vector::new(10, 10))],
        );
        cont.resize_child_to_fraction(0, FractionVector::new(0.25, 1.0));
        assert_eq!(cont.children[0].size(), Vector::new(50, 100));
    }

    #[test]
    fn child_by_key_lookup() {
        let mut child = unicolor(Vector::ZERO, Vector::new(10, 10));
        child.core_mut().key = "unicolor0".to_owned();
        let cont = container(Layout::Overlay, Vector::new(100, 100), vec![child]);
        assert!(cont.child_by_key("unicolor0").is_some());
        assert!(cont.child_by_key("label0").is_none());
    }
}
