use embed_dom::{reroute::reroute, FragmentController, ImportConfig, ImportError, LifecycleState, Placement, SourceDescriptor};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlTemplateElement;

wasm_bindgen_test_configure!(run_in_browser);

use stub_host_::{document, init_log, widget_in_body, StubHost};

fn url_config(url: &str) -> ImportConfig {
	ImportConfig {
		source: Some(SourceDescriptor::Url(url.to_owned())),
		target: Placement::Into,
		..ImportConfig::default()
	}
}

#[wasm_bindgen_test]
async fn exact_path_wins_without_fallback() {
	init_log();
	let widget = widget_in_body();
	let host = StubHost::new();
	host.respond("part", 200, "<p>exact</p>");

	let controller = FragmentController::with_host(host.clone(), widget.clone(), url_config("part"));
	controller.import().await.unwrap();
	assert_eq!(host.requests(), ["part"]);
	assert_eq!(widget.text_content().unwrap(), "exact");
	widget.remove();
}

#[wasm_bindgen_test]
async fn stem_fallbacks_are_tried_in_fixed_order() {
	init_log();
	let widget = widget_in_body();
	let host = StubHost::new();
	host.respond("part.htm", 200, "<p>third try</p>");

	let controller = FragmentController::with_host(host.clone(), widget.clone(), url_config("part?version=2"));
	controller.import().await.unwrap();
	assert_eq!(host.requests(), ["part?version=2", "part.html", "part.htm"]);
	assert_eq!(widget.text_content().unwrap(), "third try");
	widget.remove();
}

#[wasm_bindgen_test]
async fn exhausted_fallbacks_fail_with_load_failed() {
	init_log();
	let widget = widget_in_body();
	let controller = FragmentController::with_host(StubHost::new(), widget.clone(), url_config("missing"));

	assert_eq!(controller.import().await, Err(ImportError::LoadFailed("missing".to_owned())));
	assert_eq!(controller.state(), LifecycleState::Idle);
	assert_eq!(widget.child_nodes().length(), 0);
	widget.remove();
}

#[wasm_bindgen_test]
async fn text_mode_displays_markup_verbatim() {
	init_log();
	let widget = widget_in_body();
	let host = StubHost::new();
	host.respond("snippet", 200, "<b>not bold</b>");

	let mut config = url_config("snippet");
	config.text = true;
	let controller = FragmentController::with_host(host, widget.clone(), config);
	controller.import().await.unwrap();

	// One text node, no parsed elements.
	assert_eq!(widget.child_nodes().length(), 1);
	assert!(widget.query_selector("b").unwrap().is_none());
	assert_eq!(widget.text_content().unwrap(), "<b>not bold</b>");
	widget.remove();
}

#[wasm_bindgen_test]
async fn remote_content_is_rerouted_against_its_origin() {
	init_log();
	let widget = widget_in_body();
	let host = StubHost::new();
	host.respond(
		"https://example.com/assets/part",
		200,
		r#"<link rel="stylesheet" href="style.css"><img src="../logo.png">"#,
	);

	let mut config = url_config("https://example.com/assets/part");
	config.reroute = true;
	let controller = FragmentController::with_host(host, widget.clone(), config);
	controller.import().await.unwrap();

	let link = widget.query_selector("link").unwrap().unwrap();
	assert_eq!(link.get_attribute("href").unwrap(), "https://example.com/assets/style.css");
	let img = widget.query_selector("img").unwrap().unwrap();
	assert_eq!(img.get_attribute("src").unwrap(), "https://example.com/logo.png");
	widget.remove();
}

#[wasm_bindgen_test]
fn reroute_is_idempotent() {
	init_log();
	let template: HtmlTemplateElement = document().create_element("template").unwrap().unchecked_into();
	template.set_inner_html(r#"<script src="lib.js"></script><link href="a/b.css">"#);
	let fragment = template.content();

	reroute(&fragment, "https://example.com/nested/page.html");
	let first: Vec<_> = ["script", "link"]
		.iter()
		.map(|tag| {
			let element = fragment.query_selector(tag).unwrap().unwrap();
			element.get_attribute(if *tag == "link" { "href" } else { "src" }).unwrap()
		})
		.collect();
	assert_eq!(first, ["https://example.com/nested/lib.js", "https://example.com/nested/a/b.css"]);

	reroute(&fragment, "https://example.com/nested/page.html");
	let second: Vec<_> = ["script", "link"]
		.iter()
		.map(|tag| {
			let element = fragment.query_selector(tag).unwrap().unwrap();
			element.get_attribute(if *tag == "link" { "href" } else { "src" }).unwrap()
		})
		.collect();
	assert_eq!(first, second);
}

#[wasm_bindgen_test]
fn only_the_reference_attribute_of_a_tag_is_rewritten() {
	init_log();
	let template: HtmlTemplateElement = document().create_element("template").unwrap().unchecked_into();
	template.set_inner_html(r#"<script src="lib.js" href="marker"></script><link href="a.css" src="marker">"#);
	let fragment = template.content();

	reroute(&fragment, "https://example.com/base/page");

	let script = fragment.query_selector("script").unwrap().unwrap();
	assert_eq!(script.get_attribute("src").unwrap(), "https://example.com/base/lib.js");
	assert_eq!(script.get_attribute("href").unwrap(), "marker");
	let link = fragment.query_selector("link").unwrap().unwrap();
	assert_eq!(link.get_attribute("href").unwrap(), "https://example.com/base/a.css");
	assert_eq!(link.get_attribute("src").unwrap(), "marker");
}

#[wasm_bindgen_test]
async fn local_templates_are_never_rerouted() {
	init_log();
	let document = document();
	let template = document.create_element("template").unwrap();
	template.set_id("tpl-no-reroute");
	template.set_inner_html(r#"<img src="relative.png">"#);
	document.body().unwrap().append_child(&template).unwrap();
	let widget = widget_in_body();

	let config = ImportConfig {
		source: Some(SourceDescriptor::Template("tpl-no-reroute".to_owned())),
		target: Placement::Into,
		reroute: true,
		..ImportConfig::default()
	};
	let controller = FragmentController::with_host(StubHost::new(), widget.clone(), config);
	controller.import().await.unwrap();

	let img = widget.query_selector("img").unwrap().unwrap();
	assert_eq!(img.get_attribute("src").unwrap(), "relative.png");
	widget.remove();
	template.remove();
}
