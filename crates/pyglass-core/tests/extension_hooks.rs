//! Extension hooks fired across a full load, observed through shared
//! state and through mutations left in the tree.

use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use pyglass_core::loader::{LoadOptions, Loader};
use pyglass_core::{Extension, Extensions, HookContext};
use pyglass_model::Object;
use tempfile::TempDir;

#[derive(Default)]
struct Recorder {
    events: Rc<RefCell<Vec<String>>>,
}

impl Extension for Recorder {
    fn on_function_instance(&mut self, object: &mut Object, _ctx: &HookContext) {
        object.labels.insert("recorded".to_string());
        self.events
            .borrow_mut()
            .push(format!("function {}", object.path));
    }

    fn on_class_members(&mut self, object: &mut Object, _ctx: &HookContext) {
        self.events
            .borrow_mut()
            .push(format!("class members {}", object.path));
    }

    fn on_alias_instance(&mut self, object: &mut Object, _ctx: &HookContext) {
        self.events
            .borrow_mut()
            .push(format!("alias {}", object.name));
    }

    fn on_wildcard_expansion(&mut self, alias: &mut Object, _ctx: &HookContext) {
        self.events
            .borrow_mut()
            .push(format!("expanded {}", alias.path));
    }

    fn on_package_loaded(&mut self, root: &mut Object, _ctx: &HookContext) {
        self.events
            .borrow_mut()
            .push(format!("loaded {}", root.name));
    }
}

#[test]
fn test_hooks_fire_through_load_and_resolution() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(
        dir.path().join("pkg/__init__.py"),
        "from pkg._impl import *\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("pkg/_impl.py"),
        "class Widget:\n    def draw(self): ...\n\ndef helper(): ...\n",
    )
    .unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder {
        events: Rc::clone(&events),
    };
    let options = LoadOptions {
        search_paths: vec![dir.path().to_path_buf()],
        resolve_aliases: true,
        resolve_implicit: true,
        ..LoadOptions::default()
    };
    let mut loader = Loader::new(options).with_extensions(Extensions::new().with(recorder));
    loader.load("pkg").unwrap();

    let events = events.borrow();
    assert!(events.contains(&"function pkg._impl.Widget.draw".to_string()));
    assert!(events.contains(&"function pkg._impl.helper".to_string()));
    assert!(events.contains(&"class members pkg._impl.Widget".to_string()));
    assert!(events.contains(&"alias *pkg._impl".to_string()));
    assert!(events.contains(&"expanded pkg.Widget".to_string()));
    assert!(events.contains(&"expanded pkg.helper".to_string()));
    assert!(events.contains(&"loaded pkg".to_string()));

    // The instance-hook mutation survived into the loaded tree.
    let draw = loader.collection.get("pkg._impl.Widget.draw").unwrap();
    assert!(draw.has_label("recorded"));
}

#[test]
fn test_package_loaded_fires_once_per_load() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("pkg")).unwrap();
    fs::write(dir.path().join("pkg/__init__.py"), "x = 1\n").unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let recorder = Recorder {
        events: Rc::clone(&events),
    };
    let options = LoadOptions {
        search_paths: vec![dir.path().to_path_buf()],
        ..LoadOptions::default()
    };
    let mut loader = Loader::new(options).with_extensions(Extensions::new().with(recorder));
    loader.load("pkg").unwrap();
    loader.load("pkg").unwrap();

    let events = events.borrow();
    let loaded = events.iter().filter(|e| e.starts_with("loaded")).count();
    // The second call reuses the already-loaded package without firing
    // the event again.
    assert_eq!(loaded, 1);
}
