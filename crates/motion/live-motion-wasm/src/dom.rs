//! [`Dom`] over `web_sys` elements.

use std::rc::Rc;

use live_motion_core::{Dom, ElementId, NodeAttributes};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

use crate::elements::ElementTable;

pub(crate) struct WebDom {
    elements: Rc<ElementTable>,
    presence_selector: String,
}

impl WebDom {
    pub fn new(elements: Rc<ElementTable>, presence_attribute: &str) -> Self {
        Self {
            elements,
            presence_selector: format!("[{presence_attribute}]"),
        }
    }
}

impl Dom for WebDom {
    fn attribute(&self, element: ElementId, name: &str) -> Option<String> {
        self.elements.node(element)?.get_attribute(name)
    }

    fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        if let Some(node) = self.elements.node(element) {
            if let Err(err) = node.set_attribute(name, value) {
                log::warn!("live_motion: cannot set {name} on {element:?}: {err:?}");
            }
        }
    }

    fn remove_attribute(&self, element: ElementId, name: &str) {
        if let Some(node) = self.elements.node(element) {
            let _ = node.remove_attribute(name);
        }
    }

    fn set_style(&self, element: ElementId, property: &str, value: Option<&str>) {
        let Some(node) = self.elements.node(element) else {
            return;
        };
        let Some(html) = node.dyn_ref::<HtmlElement>() else {
            log::debug!("{element:?} has no inline style");
            return;
        };
        let style = html.style();
        let res = match value {
            Some(v) => style.set_property(property, v),
            None => style.remove_property(property).map(|_| ()),
        };
        if let Err(err) = res {
            log::warn!("live_motion: cannot set style {property} on {element:?}: {err:?}");
        }
    }

    fn presence_parent(&self, element: ElementId) -> Option<ElementId> {
        let parent = self.elements.node(element)?.parent_element()?;
        let marker = parent.closest(&self.presence_selector).ok()??;
        Some(self.elements.intern(&marker))
    }
}

/// A raw node seen during a DOM patch, before any hook ran on it.
pub(crate) struct PatchNode<'a>(pub &'a Element);

impl NodeAttributes for PatchNode<'_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) {
        let _ = self.0.remove_attribute(name);
    }
}
