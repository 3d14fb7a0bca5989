//! # winlet
//!
//! A declarative framework for low-interaction desktop windows: overlays,
//! popups, notification panels. A window is described by an XML document and
//! backed by an external logic module; every frame the document is
//! recompiled against the module's live state, so the tree is always a pure
//! function of document plus module.
//!
//! winlet deliberately stops at the window edge. It parses, compiles,
//! routes, and walks the draw tree; creating the OS window, polling input,
//! and presenting surfaces belong to the embedding front end.
//!
//! ## Core Systems
//!
//! - **[`style`]** — XML source model and typed attribute resolution
//! - **[`eval`]** — Infix arithmetic evaluator for attribute expressions
//! - **[`host`]** — Extension modules: `$variable` / `@function` substitution,
//!   module registry, handler dispatch
//! - **[`item`]** — Compiled item tree: labels, textures, fills, containers
//! - **[`compile`]** — Per-frame tree compiler with static, link, and image
//!   caches
//! - **[`route`]** — Point-based event routing with link pass-through
//! - **[`render`]** — Backend trait and back-to-front draw walk
//! - **[`image`]** — Best-effort texture decoding and caching
//! - **[`window`]** — OS window creation hints
//! - **[`input`]** — Event vocabulary and pointer debouncing
//! - **[`app`]** — Application struct tying everything together
//! - **[`geometry`]**, **[`color`]** — Vector, fraction, align, RGBA
//!   primitives

// Foundation
pub mod color;
pub mod error;
pub mod geometry;

// Declarative source and resolution
pub mod eval;
pub mod host;
pub mod style;

// Compiled tree
pub mod compile;
pub mod item;

// Events and rendering
pub mod image;
pub mod input;
pub mod render;
pub mod route;

// Application
pub mod app;
pub mod window;

pub use app::{App, Hooks};
pub use color::Color;
pub use error::{Error, Result};
pub use geometry::{Align, FractionVector, Vector};
pub use item::{Container, Item};
pub use window::WindowFlags;
