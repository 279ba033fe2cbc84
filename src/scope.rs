use tracing::warn;
use wasm_bindgen::JsCast;
use web_sys::{Document, DocumentFragment, Element, HtmlTemplateElement, Node, ShadowRoot};

/// One step of the scope chain: a lookup root that is either the owner document,
/// a shadow root, or a plain detached fragment (template content and the like).
pub(crate) enum ScopeRoot {
	Document(Document),
	Shadow(ShadowRoot),
	Fragment(DocumentFragment),
}

impl ScopeRoot {
	pub fn of(node: &Node) -> Option<Self> {
		let root = node.get_root_node();
		if let Some(shadow) = root.dyn_ref::<ShadowRoot>() {
			Some(Self::Shadow(shadow.clone()))
		} else if let Some(document) = root.dyn_ref::<Document>() {
			Some(Self::Document(document.clone()))
		} else if let Some(fragment) = root.dyn_ref::<DocumentFragment>() {
			Some(Self::Fragment(fragment.clone()))
		} else {
			None
		}
	}

	fn query_selector(&self, selector: &str) -> Result<Option<Element>, wasm_bindgen::JsValue> {
		match self {
			Self::Document(document) => document.query_selector(selector),
			Self::Shadow(shadow) => shadow.query_selector(selector),
			Self::Fragment(fragment) => fragment.query_selector(selector),
		}
	}

	fn get_element_by_id(&self, id: &str) -> Option<Element> {
		match self {
			Self::Document(document) => document.get_element_by_id(id),
			Self::Shadow(shadow) => shadow.get_element_by_id(id),
			Self::Fragment(fragment) => fragment.get_element_by_id(id),
		}
	}

	/// The element hosting this root, i.e. the anchor for the next step outward.
	/// Documents and detached fragments terminate the chain.
	fn host(&self) -> Option<Element> {
		match self {
			Self::Shadow(shadow) => Some(shadow.host()),
			Self::Document(_) | Self::Fragment(_) => None,
		}
	}
}

/// Walks outward from `start`'s root through each enclosing shadow boundary and returns
/// the first element matching `selector`, or `None` when no step of the chain has one.
pub(crate) fn query_in_scope_chain(start: &Node, selector: &str) -> Option<Element> {
	let mut scope = ScopeRoot::of(start)?;
	loop {
		match scope.query_selector(selector) {
			Ok(Some(element)) => return Some(element),
			Ok(None) => {}
			Err(error) => {
				warn!("Invalid selector {:?}: {:?}", selector, error);
				return None;
			}
		}
		scope = ScopeRoot::of(scope.host()?.as_ref())?;
	}
}

/// Like [`query_in_scope_chain`], but looks up a `<template>` by id.
/// An id match that is not a template is skipped and the search continues outward.
pub(crate) fn template_in_scope_chain(start: &Node, id: &str) -> Option<HtmlTemplateElement> {
	let mut scope = ScopeRoot::of(start)?;
	loop {
		if let Some(element) = scope.get_element_by_id(id) {
			match element.dyn_into::<HtmlTemplateElement>() {
				Ok(template) => return Some(template),
				Err(element) => warn!("Id {:?} matched non-template <{}>; continuing outward.", id, element.tag_name()),
			}
		}
		scope = ScopeRoot::of(scope.host()?.as_ref())?;
	}
}
