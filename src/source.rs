//! Content source resolution: local `<template>` lookup through the scope chain, or a
//! remote fetch with fixed-order file-stem fallbacks.

use crate::{
	error::ImportError,
	host::Fetch,
	scope,
};
use tracing::{instrument, trace};
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{Document, DocumentFragment, Element, HtmlTemplateElement};

/// Where a widget's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
	/// Id of a `<template>` in the nearest enclosing document/shadow-tree chain.
	Template(String),
	/// A resource to fetch, with `.html`/`.htm` stem fallbacks tried in that order.
	Url(String),
}

/// A freshly constructed, detached fragment. The caller takes exclusive ownership.
pub(crate) struct ResolvedContent {
	pub fragment: DocumentFragment,
	/// The URL the content was actually fetched from; `None` for local templates.
	pub base_url: Option<String>,
}

#[instrument(skip(fetch, widget))]
pub(crate) async fn resolve<F: Fetch>(fetch: &F, source: &SourceDescriptor, widget: &Element, text: bool) -> Result<ResolvedContent, ImportError> {
	match source {
		SourceDescriptor::Template(id) => resolve_template(widget, id),
		SourceDescriptor::Url(url) => resolve_url(fetch, widget, url, text).await,
	}
}

fn resolve_template(widget: &Element, id: &str) -> Result<ResolvedContent, ImportError> {
	let template = scope::template_in_scope_chain(widget.as_ref(), id).ok_or_else(|| ImportError::NotFound(id.to_owned()))?;
	// Copy by re-parsing the template's markup rather than cloning its live content:
	// cloned template scripts never had their already-started flag set, so the browser
	// would run them natively on insertion, behind the script pass's back.
	let fragment = parse_markup(&owner_document(widget), &template.inner_html());
	Ok(ResolvedContent { fragment, base_url: None })
}

async fn resolve_url<F: Fetch>(fetch: &F, widget: &Element, url: &str, text: bool) -> Result<ResolvedContent, ImportError> {
	for candidate in fallback_candidates(url) {
		match fetch.fetch_text(&candidate).await {
			Ok(fetched) if fetched.is_success() => {
				let base_url = if fetched.url.is_empty() { candidate } else { fetched.url };
				trace!("Resolved {:?} via {:?}", url, base_url);
				let document = owner_document(widget);
				let fragment = if text {
					literal_text_fragment(&document, &fetched.body)
				} else {
					parse_markup(&document, &fetched.body)
				};
				return Ok(ResolvedContent { fragment, base_url: Some(base_url) });
			}
			Ok(fetched) => trace!("Candidate {:?} answered {}", candidate, fetched.status),
			Err(error) => trace!("Candidate {:?} failed: {:?}", candidate, error),
		}
	}
	Err(ImportError::LoadFailed(url.to_owned()))
}

/// The exact path first, then `stem + ".html"`, then `stem + ".htm"`, where the stem is
/// the path with any query and fragment suffix stripped.
fn fallback_candidates(url: &str) -> [String; 3] {
	let stem = file_stem(url);
	[url.to_owned(), format!("{stem}.html"), format!("{stem}.htm")]
}

fn file_stem(url: &str) -> &str {
	let end = url.find(['?', '#']).unwrap_or(url.len());
	&url[..end]
}

fn owner_document(widget: &Element) -> Document {
	widget.owner_document().expect_throw("embed-dom: no owner document found for widget element")
}

/// Parses markup into an inert fragment. Going through a `<template>` keeps scripts
/// from executing on parse; the script pass decides what runs.
fn parse_markup(document: &Document, html: &str) -> DocumentFragment {
	let template: HtmlTemplateElement = document
		.create_element("template")
		.expect_throw("embed-dom: creating a template element failed")
		.unchecked_into();
	template.set_inner_html(html);
	template.content()
}

/// Text mode: the body becomes a single text node, displayed verbatim.
fn literal_text_fragment(document: &Document, body: &str) -> DocumentFragment {
	let fragment = document.create_document_fragment();
	fragment
		.append_child(document.create_text_node(body).as_ref())
		.expect_throw("embed-dom: appending a text node failed");
	fragment
}
