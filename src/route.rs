//! Event routing: point plus event name in, handler invocations out.
//!
//! Routing walks the compiled tree top-down. The root's handler always fires
//! first, whether or not the point hits anything below it; if the descent
//! then dead-ends on the root container itself, the root handler fires a
//! second time. Handlers on link containers additionally fire whenever an
//! event passes through them on the way to a descendant.

use crate::error::Result;
use crate::geometry::Vector;
use crate::host::HostRegistry;
use crate::item::{Container, Item};

/// Deliver `event` at `point` (window coordinates) into the tree under
/// `root`, dispatching every bound handler hit along the way.
pub fn route(root: &Container, point: Vector, event: &str, hosts: &HostRegistry) -> Result<()> {
    // The window root reacts to every event delivered to the window.
    dispatch_container(root, event, hosts)?;

    let mut current = root;
    let mut point = point;

    loop {
        let index = match current.hit(point) {
            Some(index) => index,
            None => {
                // Nothing below; the event lands on the container itself.
                return dispatch_container(current, event, hosts);
            }
        };

        match &current.children[index] {
            Item::Container(child) => {
                if current.is_link {
                    dispatch_container(current, event, hosts)?;
                }
                // Descend in the child's coordinate space. The translation
                // uses the declared position only, list stacking offsets do
                // not participate.
                point = point - child.core.position;
                current = child;
            }
            leaf => return dispatch_item(leaf, event, hosts),
        }
    }
}

fn dispatch_container(container: &Container, event: &str, hosts: &HostRegistry) -> Result<()> {
    if let Some(handler) = container.core.events.get(event) {
        log::debug!("dispatching {event} to {}", handler.name);
        hosts.invoke(handler)?;
    }
    Ok(())
}

fn dispatch_item(item: &Item, event: &str, hosts: &HostRegistry) -> Result<()> {
    if let Some(handler) = item.event(event) {
        log::debug!("dispatching {event} to {}", handler.name);
        hosts.invoke(handler)?;
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use slotmap::SlotMap;

    use super::*;
    use crate::color::Color;
    use crate::host::{ExtensionModule, FnLoader, Handler, ModuleId};
    use crate::item::{Container, EventMap, Item, ItemCore, Layout, Unicolor};
    use crate::style::SourceId;
    use pretty_assertions::assert_eq;

    struct Recorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ExtensionModule for Recorder {
        fn variable(&self, _name: &str) -> Option<String> {
            None
        }
        fn call(&self, name: &str, _args: &[String]) -> Option<String> {
            self.calls.borrow_mut().push(name.to_owned());
            Some(String::new())
        }
    }

    fn recording_registry() -> (HostRegistry, ModuleId, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let shared = Rc::clone(&calls);
        let loader = FnLoader(move |_: &Path| {
            Ok(Box::new(Recorder { calls: Rc::clone(&shared) }) as Box<dyn ExtensionModule>)
        });
        let mut hosts = HostRegistry::new(Box::new(loader));
        let module = hosts.ensure(Path::new("/app.mod")).unwrap();
        (hosts, module, calls)
    }

    fn uid() -> SourceId {
        let mut arena: SlotMap<SourceId, ()> = SlotMap::with_key();
        arena.insert(())
    }

    fn events(module: ModuleId, handler: &str) -> EventMap {
        let mut map = EventMap::new();
        map.insert(
            "mouseclick".to_owned(),
            Handler { module, name: handler.to_owned() },
        );
        map
    }

    fn leaf(pos: Vector, size: Vector, events: EventMap) -> Item {
        Item::Unicolor(Unicolor {
            core: ItemCore::new(uid(), pos, size, events),
            color: Color::TRANSPARENT,
        })
    }

    fn container(
        pos: Vector,
        size: Vector,
        events: EventMap,
        children: Vec<Item>,
        is_link: bool,
    ) -> Container {
        Container {
            core: ItemCore::new(uid(), pos, size, events),
            background: Color::TRANSPARENT,
            layout: Layout::Overlay,
            children,
            is_link,
        }
    }

    // ── Root behavior ────────────────────────────────────────────────

    #[test]
    fn root_handler_fires_unconditionally_before_the_hit() {
        let (hosts, module, calls) = recording_registry();
        let child = leaf(Vector::new(10, 10), Vector::new(20, 20), events(module, "onChild"));
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            events(module, "onRoot"),
            vec![child],
            false,
        );

        route(&root, Vector::new(15, 15), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onRoot", "onChild"]);
    }

    #[test]
    fn miss_everything_fires_root_twice() {
        let (hosts, module, calls) = recording_registry();
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            events(module, "onRoot"),
            vec![leaf(Vector::new(10, 10), Vector::new(5, 5), EventMap::new())],
            false,
        );

        route(&root, Vector::new(90, 90), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onRoot", "onRoot"]);
    }

    #[test]
    fn unbound_event_dispatches_nothing() {
        let (hosts, module, calls) = recording_registry();
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            events(module, "onRoot"),
            vec![],
            false,
        );

        route(&root, Vector::new(5, 5), "keydown", &hosts).unwrap();
        assert!(calls.borrow().is_empty());
    }

    // ── Coordinate translation ───────────────────────────────────────

    #[test]
    fn descent_translates_by_child_position_only() {
        let (hosts, module, calls) = recording_registry();
        // Leaf at (5, 5) inside a container at (20, 10); window point
        // (27, 18) becomes (7, 8) inside the container, hitting the leaf.
        let inner = leaf(Vector::new(5, 5), Vector::new(10, 10), events(module, "onLeaf"));
        let mid = container(
            Vector::new(20, 10),
            Vector::new(50, 50),
            EventMap::new(),
            vec![inner],
            false,
        );
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            EventMap::new(),
            vec![Item::Container(mid)],
            false,
        );

        route(&root, Vector::new(27, 18), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onLeaf"]);
    }

    #[test]
    fn event_settles_on_deepest_container_when_no_leaf_hit() {
        let (hosts, module, calls) = recording_registry();
        let mid = container(
            Vector::new(10, 10),
            Vector::new(50, 50),
            events(module, "onMid"),
            vec![],
            false,
        );
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            EventMap::new(),
            vec![Item::Container(mid)],
            false,
        );

        route(&root, Vector::new(30, 30), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onMid"]);
    }

    // ── Link pass-through ────────────────────────────────────────────

    #[test]
    fn link_container_sees_events_passing_through_it() {
        let (hosts, module, calls) = recording_registry();
        let inner = container(
            Vector::new(5, 5),
            Vector::new(20, 20),
            events(module, "onInner"),
            vec![],
            false,
        );
        let linked = container(
            Vector::new(10, 10),
            Vector::new(50, 50),
            events(module, "onLink"),
            vec![Item::Container(inner)],
            true,
        );
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            EventMap::new(),
            vec![Item::Container(linked)],
            false,
        );

        route(&root, Vector::new(20, 20), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onLink", "onInner"]);
    }

    #[test]
    fn non_link_container_stays_silent_on_pass_through() {
        let (hosts, module, calls) = recording_registry();
        let inner = container(
            Vector::new(5, 5),
            Vector::new(20, 20),
            events(module, "onInner"),
            vec![],
            false,
        );
        let mid = container(
            Vector::new(10, 10),
            Vector::new(50, 50),
            events(module, "onMid"),
            vec![Item::Container(inner)],
            false,
        );
        let root = container(
            Vector::ZERO,
            Vector::new(100, 100),
            EventMap::new(),
            vec![Item::Container(mid)],
            false,
        );

        route(&root, Vector::new(20, 20), "mouseclick", &hosts).unwrap();
        assert_eq!(*calls.borrow(), vec!["onInner"]);
    }
}
