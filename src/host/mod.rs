//! Extension host: the bridge between declarative attributes and external
//! logic modules.
//!
//! A module exposes exactly two kinds of symbols — string variables and
//! callables — behind the narrow [`ExtensionModule`] trait. The core never
//! introspects a module beyond those two lookups; how a module gets into the
//! process (dynamic library, scripting bridge, in-process table) is the
//! loader's business.
//!
//! [`HostAdapter`] wraps one module and implements the `$variable` /
//! `@function(...)` substitution rules used everywhere an attribute value is
//! resolved.

mod registry;

pub use registry::{Handler, HostRegistry, ModuleId};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::eval;

// ---------------------------------------------------------------------------
// ExtensionModule / ModuleLoader
// ---------------------------------------------------------------------------

/// External logic consumed by the declarative layer.
///
/// Both lookups return `None` for an unresolvable name, which the adapter
/// treats as a fatal configuration error. A callable that produces no usable
/// return value should yield `Some(String::new())`.
pub trait ExtensionModule {
    /// Current value of a string variable.
    fn variable(&self, name: &str) -> Option<String>;

    /// Invoke a callable with already-evaluated string arguments.
    fn call(&self, name: &str, args: &[String]) -> Option<String>;
}

/// Loads an [`ExtensionModule`] for a resolved module path.
///
/// The loading mechanism is deliberately outside the core; the compiler only
/// asks the registry to `ensure` a module when a linked document names one.
pub trait ModuleLoader {
    fn load(&mut self, path: &Path) -> Result<Box<dyn ExtensionModule>>;
}

/// Adapter turning a closure into a [`ModuleLoader`].
pub struct FnLoader<F>(pub F);

impl<F> ModuleLoader for FnLoader<F>
where
    F: FnMut(&Path) -> Result<Box<dyn ExtensionModule>>,
{
    fn load(&mut self, path: &Path) -> Result<Box<dyn ExtensionModule>> {
        (self.0)(path)
    }
}

// ---------------------------------------------------------------------------
// MapModule
// ---------------------------------------------------------------------------

/// In-memory [`ExtensionModule`] backed by hash maps.
///
/// Useful for tests and for applications whose logic lives in the same
/// process as the window.
#[derive(Default)]
pub struct MapModule {
    variables: HashMap<String, String>,
    #[allow(clippy::type_complexity)]
    functions: HashMap<String, Box<dyn Fn(&[String]) -> Option<String>>>,
}

impl MapModule {
    /// Create an empty module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a variable (builder).
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Add a callable (builder). Return `None` from the closure for a
    /// callable that yields no value; the adapter substitutes an empty
    /// string.
    pub fn with_function(
        mut self,
        name: impl Into<String>,
        f: impl Fn(&[String]) -> Option<String> + 'static,
    ) -> Self {
        self.functions.insert(name.into(), Box::new(f));
        self
    }
}

impl ExtensionModule for MapModule {
    fn variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn call(&self, name: &str, args: &[String]) -> Option<String> {
        let f = self.functions.get(name)?;
        Some(f(args).unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// HostAdapter
// ---------------------------------------------------------------------------

/// One live extension module plus the substitution rules over it.
pub struct HostAdapter {
    path: PathBuf,
    module: Box<dyn ExtensionModule>,
}

impl HostAdapter {
    /// Wrap a loaded module. `path` is the module identity used in error
    /// messages and registry lookups.
    pub fn new(path: impl Into<PathBuf>, module: Box<dyn ExtensionModule>) -> Self {
        Self { path: path.into(), module }
    }

    /// The module path this adapter was registered under.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value of a variable. Unresolvable names are fatal.
    pub fn variable(&self, name: &str) -> Result<String> {
        self.module.variable(name).ok_or_else(|| Error::UnknownVariable {
            module: self.path.clone(),
            name: name.to_owned(),
        })
    }

    /// Invoke a callable given a `name` or `name(arg1, arg2, ...)` spec.
    ///
    /// Leading whitespace is trimmed from each argument, empty arguments are
    /// dropped, and any argument that looks like an arithmetic expression is
    /// evaluated first. A callable without a usable return value yields an
    /// empty string.
    pub fn call_function(&self, spec: &str) -> Result<String> {
        let spec = spec.trim();
        let (name, args) = match spec.find('(') {
            None => (spec, Vec::new()),
            Some(open) => {
                let inner = spec[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| Error::MalformedCall(spec.to_owned()))?;

                let mut args = Vec::new();
                for raw in inner.split(',') {
                    let arg = raw.trim_start();
                    if arg.is_empty() {
                        continue;
                    }
                    if eval::is_expression(arg) {
                        args.push(self.evaluate(arg)?);
                    } else {
                        args.push(arg.to_owned());
                    }
                }
                (&spec[..open], args)
            }
        };

        if name.is_empty() {
            return Err(Error::MalformedCall(spec.to_owned()));
        }

        self.module.call(name, &args).ok_or_else(|| Error::UnknownFunction {
            module: self.path.clone(),
            name: name.to_owned(),
        })
    }

    /// The `$` / `@` preprocessing pass applied to every raw attribute value:
    /// `$name` resolves a variable, `@name(...)` calls a function, anything
    /// else passes through unchanged.
    pub fn pre_parse(&self, raw: &str) -> Result<String> {
        match raw.as_bytes().first() {
            Some(b'$') => self.variable(&raw[1..]),
            Some(b'@') => self.call_function(&raw[1..]),
            _ => Ok(raw.to_owned()),
        }
    }

    /// Evaluate an arithmetic expression that may embed `$name` and
    /// `@name(...)` references, e.g. `(4/3)*@pi()*($r^3)`.
    pub fn evaluate(&self, expr: &str) -> Result<String> {
        let expanded = self.expand(expr)?;
        Ok(eval::evaluate(&expanded)?)
    }

    /// Substitute every embedded `$variable` and `@function(...)` occurrence
    /// with its string value. Names are alphanumeric.
    fn expand(&self, expr: &str) -> Result<String> {
        let mut out = String::with_capacity(expr.len());
        let bytes = expr.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'$' => {
                    let end = alnum_end(bytes, i + 1);
                    out.push_str(&self.variable(&expr[i + 1..end])?);
                    i = end;
                }
                b'@' => {
                    let name_end = alnum_end(bytes, i + 1);
                    if bytes.get(name_end) == Some(&b'(') {
                        let close = matching_paren(bytes, name_end)
                            .ok_or_else(|| Error::MalformedCall(expr.to_owned()))?;
                        out.push_str(&self.call_function(&expr[i + 1..=close])?);
                        i = close + 1;
                    } else {
                        out.push_str(&self.call_function(&expr[i + 1..name_end])?);
                        i = name_end;
                    }
                }
                _ => {
                    // Copy one whole character, which may be multi-byte.
                    let ch = expr[i..].chars().next().unwrap_or('\0');
                    out.push(ch);
                    i += ch.len_utf8().max(1);
                }
            }
        }

        Ok(out)
    }
}

/// End index of an ASCII-alphanumeric run starting at `from`.
fn alnum_end(bytes: &[u8], from: usize) -> usize {
    let mut end = from;
    while end < bytes.len() && bytes[end].is_ascii_alphanumeric() {
        end += 1;
    }
    end
}

/// Index of the `)` matching the `(` at `open`, or `None` if unbalanced.
fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> HostAdapter {
        let module = MapModule::new()
            .with_variable("title", "Status")
            .with_variable("r", "3")
            .with_function("pi", |_| Some("3.14159".into()))
            .with_function("echo", |args: &[String]| Some(args.join("|")))
            .with_function("fire", |_| None);
        HostAdapter::new("/tmp/app.mod", Box::new(module))
    }

    // ── pre_parse ────────────────────────────────────────────────────

    #[test]
    fn pre_parse_variable() {
        assert_eq!(adapter().pre_parse("$title").unwrap(), "Status");
    }

    #[test]
    fn pre_parse_function() {
        assert_eq!(adapter().pre_parse("@echo(a, b)").unwrap(), "a|b");
    }

    #[test]
    fn pre_parse_passthrough() {
        assert_eq!(adapter().pre_parse("plain").unwrap(), "plain");
        assert_eq!(adapter().pre_parse("").unwrap(), "");
    }

    #[test]
    fn pre_parse_unknown_variable_is_fatal() {
        assert!(adapter().pre_parse("$nope").is_err());
    }

    // ── call_function ────────────────────────────────────────────────

    #[test]
    fn call_bare_name() {
        assert_eq!(adapter().call_function("pi").unwrap(), "3.14159");
    }

    #[test]
    fn call_void_function_yields_empty() {
        assert_eq!(adapter().call_function("fire()").unwrap(), "");
    }

    #[test]
    fn call_drops_empty_args_and_trims() {
        assert_eq!(adapter().call_function("echo(a, , b)").unwrap(), "a|b");
    }

    #[test]
    fn call_evaluates_arithmetic_args() {
        assert_eq!(adapter().call_function("echo(2*3, 10)").unwrap(), "6|10");
    }

    #[test]
    fn call_unknown_function_is_fatal() {
        assert!(adapter().call_function("missing()").is_err());
    }

    #[test]
    fn call_unbalanced_is_malformed() {
        assert!(adapter().call_function("echo(a").is_err());
    }

    // ── embedded evaluation ──────────────────────────────────────────

    #[test]
    fn evaluate_substitutes_variables_and_functions() {
        // (4/3) * pi * r^3 with r = 3.
        let result = adapter().evaluate("(4/3)*@pi()*($r^3)").unwrap();
        assert_eq!(result, "113");
    }

    #[test]
    fn evaluate_plain_expression() {
        assert_eq!(adapter().evaluate("2+2").unwrap(), "4");
    }

    #[test]
    fn evaluate_unknown_embedded_name_is_fatal() {
        assert!(adapter().evaluate("$missing*2").is_err());
    }
}
