//! Drawing: walking the compiled tree against an abstract backend.
//!
//! The crate never touches a real surface. [`Backend`] is the seam a window
//! front end implements; [`draw`] walks the tree and issues surface, fill,
//! draw, and blit calls in back-to-front order. Each child renders onto its
//! own surface, pre-filled with the parent's background, and is then blitted
//! at its resolved position.

use crate::geometry::Vector;
use crate::item::{Container, Item, Label, Layout, Texture};

/// Surface operations a window front end provides.
pub trait Backend {
    type Surface;

    /// Allocate a surface of the given pixel size.
    fn surface(&mut self, size: Vector) -> Self::Surface;

    /// Flood a surface with one color.
    fn fill(&mut self, surface: &mut Self::Surface, color: crate::color::Color);

    /// Copy `src` onto `dst` with its top-left corner at `at`.
    fn blit(&mut self, src: &Self::Surface, dst: &mut Self::Surface, at: Vector);

    fn draw_label(&mut self, surface: &mut Self::Surface, label: &Label);

    fn draw_texture(&mut self, surface: &mut Self::Surface, texture: &Texture);
}

/// Render `container` and everything below it onto `target`.
pub fn draw<B: Backend>(container: &Container, backend: &mut B, target: &mut B::Surface) {
    backend.fill(target, container.background);

    match container.layout {
        Layout::Overlay => {
            for child in &container.children {
                draw_child(container, child, child.core().position, backend, target);
            }
        }
        Layout::List => {
            let mut offset = 0i32;
            for child in &container.children {
                let core = child.core();
                let at = Vector::new(core.position.x, core.position.y + offset);
                // A child stacked past the bottom edge is not drawn and does
                // not advance the stacking offset. It still participates in
                // hit-testing.
                if at.y > container.core.size.y {
                    continue;
                }
                draw_child(container, child, at, backend, target);
                offset += core.position.y + core.size.y;
            }
        }
    }
}

fn draw_child<B: Backend>(
    parent: &Container,
    child: &Item,
    at: Vector,
    backend: &mut B,
    target: &mut B::Surface,
) {
    let mut surface = backend.surface(child.size());
    backend.fill(&mut surface, parent.background);

    match child {
        Item::Container(inner) => draw(inner, backend, &mut surface),
        Item::Label(label) => backend.draw_label(&mut surface, label),
        Item::Texture(texture) => backend.draw_texture(&mut surface, texture),
        Item::Unicolor(unicolor) => backend.fill(&mut surface, unicolor.color),
    }

    backend.blit(&surface, target, at);
}

// ===========================================================================
// Tests
// ===========================================================================
