//! Behaviors shipped with the viewer, keyed by the panel they belong to.

use std::rc::Rc;

use log::debug;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{AbortController, AbortSignal, AddEventListenerOptions, Element, HtmlElement, Node, ResizeObserver};

use super::script_host::{BehaviorRegistry, Dispose, PanelBehavior, PanelContext, Teardown};
use super::web::js_message;
use crate::components::graph::GraphNode;
use crate::components::graph::types::non_empty;
use crate::error::BehaviorError;

const TYPING_MS: i32 = 15;
const BLOG_DESIGN: (f64, f64) = (1440.0, 810.0);

/// Registry with every built-in behavior.
pub fn builtin() -> BehaviorRegistry<Element> {
	BehaviorRegistry::default()
		.with("panels/home", ExpandableText)
		.with("panels/about", ExpandableText)
		.with("panels/blog", BlogScaler)
		.with("panels/templates/paper-preview", PaperPreview)
}

fn init_error(ctx: &PanelContext, err: &JsValue) -> BehaviorError {
	BehaviorError::Init {
		panel: ctx.panel.clone(),
		message: js_message(err),
	}
}

fn query(root: &Element, selector: &str) -> Option<Element> {
	root.query_selector(selector).ok().flatten()
}

/// `dots-3` pairs with `expandable-content-3`.
pub fn trigger_index(trigger_id: &str) -> &str {
	trigger_id.rsplit('-').next().unwrap_or_default()
}

/// Clicking an `.expandable-trigger` hides it and types out the matching
/// `.expandable-hidden` block one character at a time.
pub struct ExpandableText;

impl PanelBehavior<Element> for ExpandableText {
	fn init(&self, container: &Element, ctx: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
		let controller = AbortController::new().map_err(|e| init_error(ctx, &e))?;
		let signal = controller.signal();
		let options = AddEventListenerOptions::new();
		options.set_signal(&signal);

		let triggers = container
			.query_selector_all(".expandable-trigger")
			.map_err(|e| init_error(ctx, &e))?;
		let unbound = (0..triggers.length())
			.filter_map(|i| triggers.get(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()))
			.filter(|t| t.get_attribute("data-expandable-bound").as_deref() != Some("1"));
		let listeners = bind_each(
			unbound,
			|trigger| {
				let _ = trigger.set_attribute("data-expandable-bound", "1");
				let (root, target, signal) = (container.clone(), trigger.clone(), signal.clone());
				let on_click = Closure::<dyn FnMut()>::new(move || expand(&root, &target, &signal));
				trigger
					.add_event_listener_with_callback_and_add_event_listener_options(
						"click",
						on_click.as_ref().unchecked_ref(),
						&options,
					)
					.map_err(|e| init_error(ctx, &e))?;
				Ok(on_click)
			},
			|| controller.abort(),
		)?;
		debug!("{}: {} expandable trigger(s)", ctx.panel, listeners.len());

		Ok(Some(Teardown::callback(move || {
			controller.abort();
			drop(listeners);
		})))
	}
}

/// Binds every item in turn. On the first failure `abort` runs before the
/// already-bound listeners are dropped, so none stay attached.
fn bind_each<T, L, E>(
	items: impl IntoIterator<Item = T>,
	mut bind: impl FnMut(T) -> Result<L, E>,
	abort: impl FnOnce(),
) -> Result<Vec<L>, E> {
	let mut bound = Vec::new();
	for item in items {
		match bind(item) {
			Ok(listener) => bound.push(listener),
			Err(err) => {
				abort();
				return Err(err);
			}
		}
	}
	Ok(bound)
}

fn expand(root: &Element, trigger: &HtmlElement, signal: &AbortSignal) {
	let selector = format!("#expandable-content-{}", trigger_index(&trigger.id()));
	let Some(content) = query(root, &selector) else {
		return;
	};
	let classes = content.class_list();
	if !classes.contains("expandable-hidden") {
		return;
	}
	let _ = trigger.style().set_property("display", "none");

	let Some(full) = content
		.clone_node_with_deep(true)
		.ok()
		.and_then(|n| n.dyn_into::<Element>().ok())
	else {
		return;
	};
	let total = full.text_content().unwrap_or_default().chars().count();
	let _ = classes.remove_1("expandable-hidden");
	let _ = classes.add_1("expandable-visible");
	content.set_inner_html("");

	let typewriter = Typewriter {
		content,
		full,
		total,
		signal: signal.clone(),
	};
	type_next(Rc::new(typewriter), 0);
}

struct Typewriter {
	content: Element,
	full: Element,
	total: usize,
	signal: AbortSignal,
}

fn type_next(state: Rc<Typewriter>, shown: usize) {
	if state.signal.aborted() {
		return;
	}
	if shown >= state.total {
		state.content.set_inner_html(&state.full.inner_html());
		return;
	}
	let Some(partial) = state
		.full
		.clone_node_with_deep(true)
		.ok()
		.and_then(|n| n.dyn_into::<Element>().ok())
	else {
		return;
	};
	truncate_text(&partial, &mut (shown + 1));
	state.content.set_inner_html(&partial.inner_html());

	let Some(window) = web_sys::window() else {
		return;
	};
	let tick = Closure::once_into_js(move || type_next(state, shown + 1));
	let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(tick.unchecked_ref(), TYPING_MS);
}

/// Keeps the first `budget` characters of text under `node`, dropping
/// everything after them.
fn truncate_text(node: &Node, budget: &mut usize) {
	let children = node.child_nodes();
	let children: Vec<Node> = (0..children.length()).filter_map(|i| children.get(i)).collect();
	for child in children {
		if *budget == 0 {
			let _ = node.remove_child(&child);
			continue;
		}
		match child.node_type() {
			Node::TEXT_NODE => {
				let text = child.text_content().unwrap_or_default();
				let len = text.chars().count();
				if len > *budget {
					let kept: String = text.chars().take(*budget).collect();
					child.set_text_content(Some(&kept));
					*budget = 0;
				} else {
					*budget -= len;
				}
			}
			Node::ELEMENT_NODE => truncate_text(&child, budget),
			_ => {}
		}
	}
}

/// Scale and offset that fit a fixed design size inside a frame without
/// ever enlarging it.
pub fn design_fit(frame: (f64, f64), design: (f64, f64)) -> Option<(f64, f64, f64)> {
	let (fw, fh) = frame;
	if fw <= 0.0 || fh <= 0.0 {
		return None;
	}
	let scale = (fw / design.0).min(fh / design.1).min(1.0);
	Some((scale, (fw - design.0 * scale) / 2.0, (fh - design.1 * scale) / 2.0))
}

/// Scales the blog's fixed-size layout into its frame.
pub struct BlogScaler;

struct BlogScaling {
	observer: ResizeObserver,
	on_resize: Closure<dyn FnMut()>,
}

impl Dispose for BlogScaling {
	fn dispose(self: Box<Self>) -> Result<(), BehaviorError> {
		self.observer.disconnect();
		if let Some(window) = web_sys::window() {
			window
				.remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
				.map_err(|e| BehaviorError::Teardown {
					panel: "panels/blog".into(),
					message: js_message(&e),
				})?;
		}
		Ok(())
	}
}

impl PanelBehavior<Element> for BlogScaler {
	fn init(&self, container: &Element, ctx: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
		let frame = query(container, ".blog-panel__frame");
		let scaled = query(container, ".blog-panel__scaled").and_then(|e| e.dyn_into::<HtmlElement>().ok());
		let (Some(frame), Some(scaled)) = (frame, scaled) else {
			return Ok(None);
		};

		let apply = {
			let frame = frame.clone();
			move || {
				let rect = frame.get_bounding_client_rect();
				let Some((scale, left, top)) = design_fit((rect.width(), rect.height()), BLOG_DESIGN) else {
					return;
				};
				let style = scaled.style();
				let _ = style.set_property("transform", &format!("scale({scale})"));
				let _ = style.set_property("left", &format!("{left}px"));
				let _ = style.set_property("top", &format!("{top}px"));
			}
		};
		apply();

		let on_resize = Closure::<dyn FnMut()>::new(apply);
		let observer = ResizeObserver::new(on_resize.as_ref().unchecked_ref()).map_err(|e| init_error(ctx, &e))?;
		observer.observe(&frame);
		if let Some(window) = web_sys::window() {
			window
				.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
				.map_err(|e| init_error(ctx, &e))?;
		}
		Ok(Some(Teardown::handle(BlogScaling { observer, on_resize })))
	}
}

/// Links and labels filled into the paper-preview template.
#[derive(Clone, Debug, PartialEq)]
pub struct PaperLinks {
	pub preview_src: String,
	pub alt: String,
	pub href: String,
	pub download_href: String,
	pub download_label: String,
	pub new_tab: bool,
}

impl PaperLinks {
	/// Reads the node's `panelData`, falling back to `paper.webp` and
	/// `paper.pdf` next to the panel's own files.
	pub fn for_node(node: &GraphNode, panel_base: &str) -> Self {
		let data = node.panel_data.as_ref().and_then(Value::as_object);
		let field = |keys: &[&str]| {
			keys.iter().find_map(|k| {
				data.and_then(|d| d.get(*k))
					.and_then(Value::as_str)
					.filter(|s| !s.is_empty())
					.map(str::to_string)
			})
		};

		let href = field(&["link", "href", "url"]).unwrap_or_else(|| format!("{panel_base}/paper.pdf"));
		Self {
			preview_src: field(&["image", "previewImage"])
				.unwrap_or_else(|| format!("{panel_base}/paper.webp")),
			alt: field(&["alt", "imageAlt"])
				.or_else(|| non_empty(node.title.as_deref()).map(str::to_string))
				.or_else(|| non_empty(node.label.as_deref()).map(str::to_string))
				.unwrap_or_else(|| "Paper preview thumbnail".into()),
			download_href: field(&["download", "pdf"]).unwrap_or_else(|| href.clone()),
			download_label: field(&["downloadLabel"]).unwrap_or_else(|| "Download PDF".into()),
			new_tab: data
				.and_then(|d| d.get("openInNewTab"))
				.and_then(Value::as_bool)
				.unwrap_or(true),
			href,
		}
	}
}

fn open_externally(link: &Element, new_tab: bool) {
	if new_tab {
		let _ = link.set_attribute("target", "_blank");
		let _ = link.set_attribute("rel", "noopener noreferrer");
	} else {
		let _ = link.set_attribute("target", "_self");
		let _ = link.remove_attribute("rel");
	}
}

/// Fills the shared paper-preview template from the node's settings.
pub struct PaperPreview;

impl PanelBehavior<Element> for PaperPreview {
	fn init(&self, container: &Element, ctx: &PanelContext) -> Result<Option<Teardown>, BehaviorError> {
		let links = PaperLinks::for_node(&ctx.node, &ctx.panel);

		if let Some(image) = query(container, ".paper-panel__image") {
			let _ = image.set_attribute("src", &links.preview_src);
			let _ = image.set_attribute("alt", &links.alt);
		}
		if let Some(preview) = query(container, ".paper-panel__preview") {
			let _ = preview.set_attribute("href", &links.href);
			open_externally(&preview, links.new_tab);
		}
		if let (Some(actions), Some(download)) = (
			query(container, ".paper-panel__actions"),
			query(container, ".paper-panel__action--download"),
		) {
			let _ = actions.remove_attribute("hidden");
			let _ = download.set_attribute("href", &links.download_href);
			download.set_text_content(Some(&links.download_label));
			open_externally(&download, true);
		}
		Ok(None)
	}
}
