//! Executes the executable directives embedded in a fragment: every `<script>`, in
//! document order, strictly one at a time so a later directive observes the side effects
//! of an earlier one. Failures are per-directive; one bad script never blocks the rest
//! of the fragment.

use crate::{
	error::ImportError,
	host::{Fetch, ModuleLoader},
};
use js_sys::{Function, Promise, Reflect};
use tracing::{error, instrument, trace_span, Instrument};
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};
use wasm_bindgen_futures::JsFuture;
use web_sys::{DocumentFragment, HtmlScriptElement};

enum DirectiveFailure {
	NotInvocable(String),
	Threw(JsValue),
}

#[instrument(skip(host, fragment, context))]
pub(crate) async fn execute_all<H: Fetch + ModuleLoader>(host: &H, fragment: &DocumentFragment, context: &JsValue) {
	let scripts = fragment.query_selector_all("script").unwrap_throw();
	for i in 0..scripts.length() {
		let script: HtmlScriptElement = scripts.get(i).unwrap_throw().unchecked_into();
		let span = trace_span!("Executing directive", i);
		match execute_one(host, &script, context).instrument(span).await {
			Ok(()) => {}
			Err(DirectiveFailure::NotInvocable(unit)) => error!("Skipping directive #{}: {}", i, ImportError::InvalidScript(unit)),
			Err(DirectiveFailure::Threw(thrown)) => error!("Directive #{} threw: {:?}", i, thrown),
		}
	}
}

async fn execute_one<H: Fetch + ModuleLoader>(host: &H, script: &HtmlScriptElement, context: &JsValue) -> Result<(), DirectiveFailure> {
	let src = script.get_attribute("src").unwrap_or_default();
	let function = if script.type_() == "module" {
		module_unit(host, &src).await?
	} else {
		let body = if src.is_empty() {
			script.text_content().unwrap_or_default()
		} else {
			fetch_body(host, &src).await?
		};
		compile_classic(&body)?
	};
	// The binding context is both receiver and argument, so directives can register
	// `attach`/`detach` listeners on the fragment for their own cleanup.
	let returned = function.call1(context, context).map_err(DirectiveFailure::Threw)?;
	if let Some(promise) = returned.dyn_ref::<Promise>() {
		JsFuture::from(promise.clone()).await.map_err(DirectiveFailure::Threw)?;
	}
	Ok(())
}

/// A module directive's sole externally visible output is its default export, which
/// must be callable.
async fn module_unit<H: ModuleLoader>(host: &H, src: &str) -> Result<Function, DirectiveFailure> {
	let exports = host.load_module(src).await.map_err(DirectiveFailure::Threw)?;
	let default = Reflect::get(&exports, &JsValue::from_str("default")).map_err(DirectiveFailure::Threw)?;
	default.dyn_into().map_err(|_| DirectiveFailure::NotInvocable(src.to_owned()))
}

async fn fetch_body<H: Fetch>(host: &H, src: &str) -> Result<String, DirectiveFailure> {
	let fetched = host.fetch_text(src).await.map_err(DirectiveFailure::Threw)?;
	if fetched.is_success() {
		Ok(fetched.body)
	} else {
		Err(DirectiveFailure::Threw(JsValue::from_str(&format!("embed-dom: fetching script {src:?} answered {}", fetched.status))))
	}
}

fn compile_classic(body: &str) -> Result<Function, DirectiveFailure> {
	let wrapped = format!("(function (fragment) {{\n{body}\n}})");
	// `eval` rather than the `Function` constructor so a syntax error is a catchable `Err`.
	let compiled = js_sys::eval(&wrapped).map_err(DirectiveFailure::Threw)?;
	compiled.dyn_into().map_err(|_| DirectiveFailure::NotInvocable("inline directive".to_owned()))
}
