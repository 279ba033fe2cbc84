//! Lifecycle notifications. `insert` fires on the widget *before* placement and
//! `attach` on the fragment *after* it; collaborators rely on mutating the fragment in
//! the window between the two, so that ordering is load-bearing.

use wasm_bindgen::UnwrapThrowExt;
use web_sys::{CustomEvent, CustomEventInit, DocumentFragment, EventTarget};

/// On the widget, bubbling and composed, before placement. `detail` is the fragment.
pub const INSERT: &str = "insert";
/// On the fragment, after placement.
pub const ATTACH: &str = "attach";
/// On the fragment, at removal.
pub const DETACH: &str = "detach";
/// On the widget, bubbling and composed, at removal. Mirrors [`INSERT`].
pub const REMOVE: &str = "remove";

/// `insert`/`remove`: bubbles out of any embedding boundary so ancestor listeners can
/// observe it, carrying the fragment as `detail`.
pub(crate) fn dispatch_carrying(target: &EventTarget, name: &'static str, fragment: &DocumentFragment) {
	let mut init = CustomEventInit::new();
	init.bubbles(true).composed(true).detail(fragment.as_ref());
	let event = CustomEvent::new_with_event_init_dict(name, &init).unwrap_throw();
	drop(target.dispatch_event(&event));
}

/// `attach`/`detach`: fired on the fragment itself, where directives registered their
/// observers.
pub(crate) fn dispatch_on_fragment(fragment: &DocumentFragment, name: &'static str) {
	let event = CustomEvent::new(name).unwrap_throw();
	drop(fragment.dispatch_event(&event));
}
