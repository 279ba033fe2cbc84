//! Rewrites relative resource references in a remotely fetched fragment to be absolute
//! against the URL the content was fetched from. Locally resolved templates are never
//! rerouted; their references are already contextual.

use tracing::{instrument, warn};
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{DocumentFragment, Element, Url};

const REFERENCE_BEARING: [(&str, &str); 2] = [("link[href]", "href"), ("script[src], img[src]", "src")];

/// Makes every reference-bearing attribute in `fragment` absolute against `base_url`.
/// Only the attribute that is a reference on that tag is touched; a stray `href` on a
/// `<script>`, say, stays as it is. Idempotent: an already absolute reference resolves
/// to itself.
#[instrument(skip(fragment))]
pub fn reroute(fragment: &DocumentFragment, base_url: &str) {
	for (selector, attribute) in REFERENCE_BEARING {
		let elements = fragment.query_selector_all(selector).unwrap_throw();
		for i in 0..elements.length() {
			let element: Element = elements.get(i).unwrap_throw().unchecked_into();
			let Some(value) = element.get_attribute(attribute) else {
				continue;
			};
			match Url::new_with_base(&value, base_url) {
				Ok(absolute) => element.set_attribute(attribute, &absolute.href()).unwrap_throw(),
				Err(error) => warn!("Not rerouting unresolvable reference {:?} against {:?}: {:?}", value, base_url, error),
			}
		}
	}
}
