//! Frame orchestration: one declarative window plus its logic module.
//!
//! [`App`] ties the compiler, the module registry, and the last compiled
//! tree together. The OS loop stays outside: the front end owns window
//! creation and input polling and calls [`App::frame`], [`App::dispatch`],
//! and [`App::draw`] from its own cadence. Reactivity is recompilation;
//! every frame re-resolves the whole document against the live modules.

use std::path::Path;

use crate::compile::Compiler;
use crate::error::{Error, Result};
use crate::geometry::Vector;
use crate::host::{HostRegistry, ModuleId, ModuleLoader};
use crate::item::Container;
use crate::render::{self, Backend};
use crate::route;
use crate::window::WindowFlags;

/// Optional application lifecycle callbacks. Both default to no-ops.
pub trait Hooks {
    /// Runs once before the first frame.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs before every recompilation.
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A loaded window document bound to its extension module.
pub struct App {
    compiler: Compiler,
    hosts: HostRegistry,
    module: ModuleId,
    display: Vector,
    root: Option<Container>,
}

impl App {
    /// Load the window document at `style` and register the main extension
    /// module at `module`.
    pub fn new(
        style: &Path,
        module: &Path,
        display: Vector,
        loader: Box<dyn ModuleLoader>,
    ) -> Result<Self> {
        let mut compiler = Compiler::new();
        compiler.load(style)?;
        let mut hosts = HostRegistry::new(loader);
        let module = hosts.ensure(module)?;
        log::debug!("app ready: {} under {}", style.display(), module_label(&hosts, module));
        Ok(Self { compiler, hosts, module, display, root: None })
    }

    /// OS window creation hints from the loaded document.
    pub fn window_flags(&self) -> WindowFlags {
        self.compiler.window_flags()
    }

    /// The tree compiled by the most recent frame.
    pub fn root(&self) -> Option<&Container> {
        self.root.as_ref()
    }

    /// Recompile the whole tree against the current module state.
    pub fn frame(&mut self) -> Result<&Container> {
        let root = self.compiler.compile(self.display, self.module, &mut self.hosts)?;
        Ok(&*self.root.insert(root))
    }

    /// Run `hooks.init`, then the first frame.
    pub fn start<H: Hooks>(&mut self, hooks: &mut H) -> Result<&Container> {
        hooks.init()?;
        self.frame()
    }

    /// Run `hooks.update`, then recompile.
    pub fn tick<H: Hooks>(&mut self, hooks: &mut H) -> Result<&Container> {
        hooks.update()?;
        self.frame()
    }

    /// Route an input event at `point` through the last compiled tree.
    pub fn dispatch(&self, event: &str, point: Vector) -> Result<()> {
        let root = self.root.as_ref().ok_or(Error::MissingRoot)?;
        route::route(root, point, event, &self.hosts)
    }

    /// Render the last compiled tree onto `target`.
    pub fn draw<B: Backend>(&self, backend: &mut B, target: &mut B::Surface) -> Result<()> {
        let root = self.root.as_ref().ok_or(Error::MissingRoot)?;
        render::draw(root, backend, target);
        Ok(())
    }
}

fn module_label(hosts: &HostRegistry, module: ModuleId) -> String {
    hosts
        .get(module)
        .map(|h| h.path().display().to_string())
        .unwrap_or_else(|_| "<unregistered>".to_owned())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;

    use super::*;
    use crate::host::{ExtensionModule, FnLoader, MapModule};
    use crate::input::event;
    use pretty_assertions::assert_eq;

    fn write_style(dir: &Path, xml: &str) -> std::path::PathBuf {
        let path = dir.join("style.xml");
        fs::write(&path, xml).unwrap();
        path
    }

    fn app_with(xml: &str, module: MapModule) -> App {
        let dir = tempfile::tempdir().unwrap();
        let style = write_style(dir.path(), xml);
        let module = Rc::new(RefCell::new(Some(module)));
        let loader = FnLoader(move |_: &Path| {
            let module = module.borrow_mut().take().unwrap();
            Ok(Box::new(module) as Box<dyn ExtensionModule>)
        });
        App::new(&style, Path::new("/app.mod"), Vector::new(200, 100), Box::new(loader)).unwrap()
    }

    #[test]
    fn frame_compiles_and_caches_the_root() {
        let mut app = app_with(
            r##"<window windowtype="tooltip"><unicolor color="#102030"/></window>"##,
            MapModule::new(),
        );

        assert!(app.root().is_none());
        let root = app.frame().unwrap();
        assert_eq!(root.core.size, Vector::new(200, 100));
        assert_eq!(app.window_flags(), WindowFlags::TOOLTIP);
        assert!(app.root().is_some());
    }

    #[test]
    fn dispatch_before_first_frame_is_fatal() {
        let app = app_with("<window/>", MapModule::new());
        assert!(matches!(
            app.dispatch(event::MOUSE_CLICK, Vector::ZERO),
            Err(Error::MissingRoot)
        ));
    }

    #[test]
    fn dispatch_reaches_document_handlers() {
        let clicks = Rc::new(RefCell::new(0u32));
        let counter = Rc::clone(&clicks);
        let module = MapModule::new().with_function("onClick", move |_| {
            *counter.borrow_mut() += 1;
            Some(String::new())
        });

        let mut app = app_with(
            r##"<window>
                 <unicolor color="#ffffff" width="50" height="50"
                           onevent="mouseclick:onClick"/>
               </window>"##,
            module,
        );

        app.frame().unwrap();
        app.dispatch(event::MOUSE_CLICK, Vector::new(10, 10)).unwrap();
        app.dispatch(event::MOUSE_CLICK, Vector::new(190, 90)).unwrap();
        assert_eq!(*clicks.borrow(), 1);
    }

    #[test]
    fn hooks_run_around_frames() {
        struct Counting {
            inits: u32,
            updates: u32,
        }
        impl Hooks for Counting {
            fn init(&mut self) -> Result<()> {
                self.inits += 1;
                Ok(())
            }
            fn update(&mut self) -> Result<()> {
                self.updates += 1;
                Ok(())
            }
        }

        let mut app = app_with("<window/>", MapModule::new());
        let mut hooks = Counting { inits: 0, updates: 0 };
        app.start(&mut hooks).unwrap();
        app.tick(&mut hooks).unwrap();
        app.tick(&mut hooks).unwrap();
        assert_eq!((hooks.inits, hooks.updates), (1, 2));
    }
}
