//! The host-environment collaborators the engine consumes: network fetch and dynamic
//! module loading. Both are traits so headless callers and tests can substitute stubs;
//! [`WebHost`] is the browser-backed default.

use js_sys::{Function, Promise};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

/// One completed fetch: the status code, the body as text and the final
/// (post-redirect) URL the body came from.
#[derive(Debug, Clone)]
pub struct FetchedText {
	pub status: u16,
	pub body: String,
	pub url: String,
}

impl FetchedText {
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Network fetch as supplied by the host environment.
///
/// A non-2xx response is an `Ok` with its status; `Err` is reserved for transport
/// failures. Callers treat both the same way when walking fallback candidates.
#[allow(async_fn_in_trait)] // Single-threaded Wasm, futures need not be `Send`.
pub trait Fetch {
	async fn fetch_text(&self, url: &str) -> Result<FetchedText, JsValue>;
}

/// Dynamic module loading as supplied by the host environment.
/// Returns the module namespace object on success.
#[allow(async_fn_in_trait)]
pub trait ModuleLoader {
	async fn load_module(&self, url: &str) -> Result<JsValue, JsValue>;
}

/// The browser-backed host: `window.fetch` and native dynamic `import()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebHost;

impl Fetch for WebHost {
	async fn fetch_text(&self, url: &str) -> Result<FetchedText, JsValue> {
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("embed-dom: no `window` to fetch with"))?;
		let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.unchecked_into();
		let status = response.status();
		let final_url = response.url();
		let body = JsFuture::from(response.text()?).await?.as_string().unwrap_or_default();
		Ok(FetchedText { status, body, url: final_url })
	}
}

impl ModuleLoader for WebHost {
	async fn load_module(&self, url: &str) -> Result<JsValue, JsValue> {
		// `import()` is syntax rather than a callable binding, so it has no direct
		// `js-sys` import and gets wrapped once here.
		let import: Function = Function::new_with_args("specifier", "return import(specifier)");
		let promise: Promise = import.call1(&JsValue::UNDEFINED, &JsValue::from_str(url))?.unchecked_into();
		JsFuture::from(promise).await
	}
}
