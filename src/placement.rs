//! Maps a symbolic placement descriptor to a concrete insertion point, lazily at
//! insertion time: the target may not exist yet, or may have changed since the last
//! import.

use crate::scope;
use tracing::warn;
use wasm_bindgen::JsValue;
use web_sys::{Element, Node, ShadowRoot, ShadowRootInit, ShadowRootMode};

/// Where an imported fragment goes, relative to the widget element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Placement {
	/// Append into the widget element itself.
	#[default]
	Into,
	/// Insert as the widget's preceding sibling.
	Before,
	/// Insert as the widget's following sibling.
	After,
	/// Append into the widget's shadow root, creating an open one on first use.
	ShadowRoot,
	/// Append into the first match of this selector anywhere in the scope chain.
	/// No match anywhere is a valid no-insertion outcome, not an error.
	Query(String),
}

pub(crate) enum InsertionPoint {
	Append(Node),
	BeforeAnchor { parent: Node, anchor: Node },
}

impl InsertionPoint {
	pub fn insert(&self, fragment: &Node) -> Result<(), JsValue> {
		match self {
			Self::Append(container) => container.append_child(fragment)?,
			Self::BeforeAnchor { parent, anchor } => parent.insert_before(fragment, Some(anchor))?,
		};
		Ok(())
	}
}

pub(crate) fn resolve(placement: &Placement, widget: &Element) -> Option<InsertionPoint> {
	match placement {
		Placement::Into => Some(InsertionPoint::Append(widget.clone().into())),
		Placement::Before => widget.parent_node().map(|parent| InsertionPoint::BeforeAnchor {
			parent,
			anchor: widget.clone().into(),
		}),
		Placement::After => widget.parent_node().map(|parent| match widget.next_sibling() {
			Some(anchor) => InsertionPoint::BeforeAnchor { parent, anchor },
			None => InsertionPoint::Append(parent),
		}),
		Placement::ShadowRoot => shadow_root_of(widget).map(|root| InsertionPoint::Append(root.into())),
		Placement::Query(selector) => scope::query_in_scope_chain(widget.as_ref(), selector).map(|element| InsertionPoint::Append(element.into())),
	}
}

fn shadow_root_of(widget: &Element) -> Option<ShadowRoot> {
	if let Some(root) = widget.shadow_root() {
		return Some(root);
	}
	match widget.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open)) {
		Ok(root) => Some(root),
		Err(error) => {
			warn!("<{}> cannot host a shadow root: {:?}", widget.tag_name(), error);
			None
		}
	}
}
