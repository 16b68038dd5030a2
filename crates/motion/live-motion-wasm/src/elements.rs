//! Element <-> id mapping.
//!
//! The core runtime only knows [`ElementId`]s. This table hands them out per
//! DOM node (a `WeakMap` keyed by the node) and keeps the node plus its
//! motion event forwarders alive until the adapter forgets the id.

use std::cell::RefCell;

use hashbrown::HashMap;
use js_sys::{Object, WeakMap};
use live_motion_core::{ElementId, IdAllocator};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event};

pub(crate) type Listener = Closure<dyn FnMut(Event)>;

struct Entry {
    node: Element,
    listeners: Vec<(&'static str, Listener)>,
}

pub(crate) struct ElementTable {
    ids: WeakMap,
    entries: RefCell<HashMap<ElementId, Entry>>,
    alloc: RefCell<IdAllocator>,
}

fn key(node: &Element) -> &Object {
    node.unchecked_ref::<Object>()
}

impl ElementTable {
    pub fn new() -> Self {
        Self {
            ids: WeakMap::new(),
            entries: RefCell::new(HashMap::new()),
            alloc: RefCell::new(IdAllocator::new()),
        }
    }

    /// Id of `node`, registering it on first sight.
    pub fn intern(&self, node: &Element) -> ElementId {
        let id = match self.lookup(node) {
            Some(id) => id,
            None => {
                let id = self.alloc.borrow_mut().alloc_element();
                self.ids.set(key(node), &JsValue::from(id.0));
                id
            }
        };
        self.entries.borrow_mut().entry(id).or_insert_with(|| Entry {
            node: node.clone(),
            listeners: Vec::new(),
        });
        id
    }

    pub fn lookup(&self, node: &Element) -> Option<ElementId> {
        self.ids
            .get(key(node))
            .as_f64()
            .map(|raw| ElementId(raw as u32))
    }

    pub fn node(&self, id: ElementId) -> Option<Element> {
        self.entries.borrow().get(&id).map(|e| e.node.clone())
    }

    pub fn is_bound(&self, id: ElementId) -> bool {
        self.entries
            .borrow()
            .get(&id)
            .is_some_and(|e| !e.listeners.is_empty())
    }

    /// Attach `listeners` to the node; they stay until [`Self::forget`].
    pub fn bind(&self, id: ElementId, listeners: Vec<(&'static str, Listener)>) -> Result<(), JsValue> {
        let mut entries = self.entries.borrow_mut();
        let Some(entry) = entries.get_mut(&id) else {
            return Ok(());
        };
        for (name, listener) in listeners {
            entry
                .node
                .add_event_listener_with_callback(name, listener.as_ref().unchecked_ref())?;
            entry.listeners.push((name, listener));
        }
        Ok(())
    }

    /// Detach listeners and drop every reference to the node.
    pub fn forget(&self, id: ElementId) {
        let Some(entry) = self.entries.borrow_mut().remove(&id) else {
            return;
        };
        for (name, listener) in &entry.listeners {
            let _ = entry
                .node
                .remove_event_listener_with_callback(name, listener.as_ref().unchecked_ref());
        }
        self.ids.delete(key(&entry.node));
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
