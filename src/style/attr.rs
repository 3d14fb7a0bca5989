//! Typed attribute resolution.
//!
//! Every raw attribute string goes through the same pipeline: clean
//! (whitespace and control characters stripped), `$`/`@` pre-parse against
//! the active extension module, then type-specific interpretation. The
//! resolver is rebuilt per use; it only borrows the pieces it needs.

use std::path::{Path, PathBuf};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::eval;
use crate::geometry::{Align, Vector};
use crate::host::{Handler, HostAdapter, ModuleId};
use crate::item::EventMap;

/// Resolves raw attribute strings under one extension module, one document
/// directory, and one inherited fallback color.
pub struct Resolver<'a> {
    host: &'a HostAdapter,
    module: ModuleId,
    dir: &'a Path,
    fallback: Color,
}

impl<'a> Resolver<'a> {
    pub fn new(host: &'a HostAdapter, module: ModuleId, dir: &'a Path, fallback: Color) -> Self {
        Self { host, module, dir, fallback }
    }

    /// Clean and pre-parse, the shared front half of every method here.
    fn prepared(&self, raw: &str) -> Result<String> {
        self.host.pre_parse(&clean(raw))
    }

    /// Clean, pre-parse, and run the evaluator when the value looks like an
    /// arithmetic expression.
    fn prepared_numeric(&self, raw: &str) -> Result<String> {
        let value = self.prepared(raw)?;
        if eval::is_expression(&value) {
            self.host.evaluate(&value)
        } else {
            Ok(value)
        }
    }

    /// Hex color; empty resolves to the inherited fallback.
    pub fn color(&self, raw: &str) -> Result<Color> {
        let value = self.prepared(raw)?;
        if value.is_empty() {
            return Ok(self.fallback);
        }
        Color::from_hex(&value)
    }

    /// `true` / `false`; empty is false.
    pub fn boolean(&self, raw: &str) -> Result<bool> {
        let value = self.prepared(raw)?;
        match value.as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            _ => Err(Error::InvalidBool(value)),
        }
    }

    /// Axis-independent alignment; empty is centered.
    pub fn align(&self, raw: &str) -> Result<Align> {
        let value = self.prepared(raw)?;
        match value.as_str() {
            "top" | "left" => Ok(Align::Start),
            "center" | "" => Ok(Align::Center),
            "bottom" | "right" => Ok(Align::End),
            _ => Err(Error::InvalidAlign(value)),
        }
    }

    /// A position pair. Each component is an integer pixel count or a
    /// percentage of the matching parent component; empty is 0.
    pub fn position(&self, x: &str, y: &str, parent: Vector) -> Result<Vector> {
        Ok(Vector::new(
            self.component(x, parent.x, 0)?,
            self.component(y, parent.y, 0)?,
        ))
    }

    /// A size pair. Like [`position`](Self::position), except a component
    /// that resolves to zero (including empty) takes the full parent extent.
    pub fn size(&self, width: &str, height: &str, parent: Vector) -> Result<Vector> {
        let w = self.component(width, parent.x, parent.x)?;
        let h = self.component(height, parent.y, parent.y)?;
        Ok(Vector::new(
            if w == 0 { parent.x } else { w },
            if h == 0 { parent.y } else { h },
        ))
    }

    fn component(&self, raw: &str, parent: i32, empty_default: i32) -> Result<i32> {
        let value = self.prepared_numeric(raw)?;
        if value.is_empty() {
            return Ok(empty_default);
        }

        if let Some(percent) = value.strip_suffix('%') {
            let n: i32 = percent
                .parse()
                .map_err(|_| Error::InvalidNumber(value.clone()))?;
            // Truncating, matching FractionVector::resolve.
            return Ok((parent as f32 * n as f32 / 100.0) as i32);
        }

        value.parse().map_err(|_| Error::InvalidNumber(value))
    }

    /// A plain integer; empty is 0, expressions are evaluated.
    pub fn integer(&self, raw: &str) -> Result<i32> {
        let value = self.prepared_numeric(raw)?;
        if value.is_empty() {
            return Ok(0);
        }
        value.parse().map_err(|_| Error::InvalidNumber(value))
    }

    /// A filesystem path, resolved against the document's directory when
    /// relative.
    pub fn path(&self, raw: &str) -> Result<PathBuf> {
        let value = self.prepared(raw)?;
        let p = Path::new(&value);
        if p.is_absolute() {
            Ok(p.to_owned())
        } else {
            Ok(self.dir.join(p))
        }
    }

    /// Display text.
    pub fn text(&self, raw: &str) -> Result<String> {
        self.prepared(raw)
    }

    /// Event bindings: comma-separated `event:handler` pairs. A pair without
    /// exactly one colon is dropped.
    pub fn events(&self, raw: &str) -> Result<EventMap> {
        let value = self.prepared(raw)?;
        let mut map = EventMap::new();
        for pair in value.split(',') {
            let parts: Vec<&str> = pair.split(':').collect();
            if let [event, handler] = parts[..] {
                if !event.is_empty() && !handler.is_empty() {
                    map.insert(
                        event.to_owned(),
                        Handler { module: self.module, name: handler.to_owned() },
                    );
                }
            }
        }
        Ok(map)
    }
}

/// Trim surrounding whitespace and strip control characters (newlines, tabs,
/// carriage returns from document formatting) wherever they appear. Interior
/// spaces survive; label text depends on that.
fn clean(raw: &str) -> String {
    raw.trim().chars().filter(|c| !c.is_control()).collect()
}

// ===========================================================================
// Tests
// ===========================================================================
