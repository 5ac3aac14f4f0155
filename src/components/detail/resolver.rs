//! Selection-driven loading of the detail surface.
//!
//! Every call to [`ContentResolver::resolve`] takes a new request token. Each
//! await point re-checks it, and a result whose token is no longer current is
//! dropped without touching the surface. In-flight loads are never aborted;
//! they complete into the cache and are simply ignored.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use url::Url;

use super::cache::ContentCaches;
use super::content::{ContentDescriptor, PanelSource};
use super::fit::FitObserver;
use super::markdown::{normalize_citation_links, render_markdown};
use super::platform::ContentPlatform;
use super::script_host::{BehaviorRegistry, PanelContext, ScriptHost};
use super::view::{DetailSurface, DetailView, Metadata};
use crate::components::graph::GraphNode;
use crate::config::ViewerConfig;
use crate::error::ResourceError;

pub struct ResolverOptions {
	/// Fraction of the host a fitted panel may fill.
	pub fit_margin: f64,
	/// Base relative website sources are resolved against.
	pub base_url: Option<Url>,
}

impl ResolverOptions {
	pub fn from_config(config: &ViewerConfig, base_url: Option<Url>) -> Self {
		Self {
			fit_margin: config.panel_fit_margin,
			base_url,
		}
	}
}

impl Default for ResolverOptions {
	fn default() -> Self {
		Self::from_config(&ViewerConfig::default(), None)
	}
}

/// How a single `resolve` call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
	/// The node's content (or its metadata, for untyped nodes) is on screen.
	Rendered,
	/// Loading failed; metadata with a diagnostic is on screen.
	Fallback,
	/// The source was rejected before any request.
	Unavailable,
	/// A newer selection took over; nothing from this call was applied.
	Superseded,
}

enum Interrupt {
	Superseded,
	Failed(ResourceError),
}

impl From<ResourceError> for Interrupt {
	fn from(err: ResourceError) -> Self {
		Self::Failed(err)
	}
}

/// Sole writer of the detail surface.
pub struct ContentResolver<P: ContentPlatform, S: DetailSurface> {
	platform: P,
	surface: S,
	caches: Rc<ContentCaches>,
	behaviors: BehaviorRegistry<P::Container>,
	scripts: RefCell<ScriptHost>,
	fit: RefCell<Option<FitObserver>>,
	token: Cell<u64>,
	options: ResolverOptions,
}

impl<P: ContentPlatform, S: DetailSurface> ContentResolver<P, S> {
	pub fn new(platform: P, surface: S, options: ResolverOptions) -> Self {
		Self {
			platform,
			surface,
			caches: Rc::default(),
			behaviors: BehaviorRegistry::default(),
			scripts: RefCell::new(ScriptHost::new()),
			fit: RefCell::new(None),
			token: Cell::new(0),
			options,
		}
	}

	pub fn with_behaviors(mut self, behaviors: BehaviorRegistry<P::Container>) -> Self {
		self.behaviors = behaviors;
		self
	}

	/// Loads and shows the content for `node`.
	pub async fn resolve(&self, node: &GraphNode) -> ResolveOutcome {
		let token = self.token.get() + 1;
		self.token.set(token);
		self.release_panel();

		let label = node.display_label().to_string();
		let descriptor = match ContentDescriptor::for_node(node, self.options.base_url.as_ref()) {
			Ok(descriptor) => descriptor,
			Err(err) => {
				warn!("node {}: {err}", node.id);
				self.surface.show(DetailView::Unavailable {
					label,
					reason: err.to_string(),
				});
				return ResolveOutcome::Unavailable;
			}
		};
		debug!("request {token}: resolving {} ({:?})", node.id, descriptor);

		if descriptor.is_async() {
			self.surface.show(DetailView::Loading {
				label: label.clone(),
				message: "loading...".into(),
			});
		}

		let (context, result) = match &descriptor {
			ContentDescriptor::None => {
				self.surface.show(DetailView::Metadata(Metadata::for_node(node)));
				return ResolveOutcome::Rendered;
			}
			ContentDescriptor::EmbeddedSite { url } => {
				self.surface.show(DetailView::Website {
					label,
					url: url.to_string(),
				});
				return ResolveOutcome::Rendered;
			}
			ContentDescriptor::HtmlFragment(panel) => {
				("panel", self.load_panel(token, node, panel).await)
			}
			ContentDescriptor::Markdown { source } => {
				("markdown", self.load_markdown(token, source).await)
			}
			ContentDescriptor::Image { source, reference } => (
				"image",
				self.load_image(token, source, reference.as_deref(), &label).await,
			),
		};

		match result {
			Ok(()) => ResolveOutcome::Rendered,
			Err(Interrupt::Superseded) => {
				debug!("request {token}: discarding stale result for {}", node.id);
				ResolveOutcome::Superseded
			}
			Err(Interrupt::Failed(err)) => {
				warn!("node {}: {err}", node.id);
				let meta = Metadata::for_node(node).with_diagnostic(format!("{context} error: {err}"));
				self.surface.show(DetailView::Metadata(meta));
				ResolveOutcome::Fallback
			}
		}
	}

	/// Tears down mounted behaviors and stops fitting the old panel.
	fn release_panel(&self) {
		self.scripts.borrow_mut().teardown_all();
		let observer = self.fit.borrow_mut().take();
		drop(observer);
	}

	fn ensure_current(&self, token: u64) -> Result<(), Interrupt> {
		if self.token.get() == token {
			Ok(())
		} else {
			Err(Interrupt::Superseded)
		}
	}

	async fn stylesheet(&self, href: &str) -> Result<(), ResourceError> {
		self.caches
			.stylesheets
			.get_or_load(href, || self.platform.load_stylesheet(href))
			.await
	}

	async fn fragment(&self, url: &str) -> Result<String, ResourceError> {
		self.caches
			.fragments
			.get_or_load(url, || self.platform.fetch_text(url))
			.await
	}

	async fn load_panel(&self, token: u64, node: &GraphNode, panel: &PanelSource) -> Result<(), Interrupt> {
		if let Some(template) = &panel.template {
			let loaded = self.stylesheet(&PanelSource::css_url(template)).await;
			self.ensure_current(token)?;
			if let Err(err) = loaded {
				debug!("template stylesheet skipped: {err}");
			}
		}
		let loaded = self.stylesheet(&PanelSource::css_url(&panel.base)).await;
		self.ensure_current(token)?;
		loaded?;

		let mut html = None;
		let mut last_error = None;
		for base in panel.bases() {
			let fetched = self.fragment(&PanelSource::html_url(base)).await;
			self.ensure_current(token)?;
			match fetched {
				Ok(text) => {
					html = Some(text);
					break;
				}
				Err(err) => last_error = Some(err),
			}
		}
		let html = match (html, last_error) {
			(Some(html), _) => html,
			(None, Some(err)) => return Err(err.into()),
			(None, None) => String::new(),
		};
		self.surface.show(DetailView::Panel {
			source: panel.base.clone(),
			html,
		});

		self.platform.next_frame().await;
		self.ensure_current(token)?;
		let Some(container) = self.platform.panel_container() else {
			warn!("panel {} mounted without a container", panel.base);
			return Ok(());
		};
		*self.fit.borrow_mut() = Some(self.platform.observe_fit(&container, self.options.fit_margin));

		for base in panel.bases() {
			let behavior = self.behaviors.lookup(base).await;
			self.ensure_current(token)?;
			let Some(behavior) = behavior else {
				continue;
			};
			let ctx = PanelContext {
				request: token,
				panel: panel.base.clone(),
				template: panel.template.clone(),
				node: node.clone(),
			};
			self.scripts.borrow_mut().run(&*behavior, &container, &ctx);
		}
		Ok(())
	}

	async fn load_markdown(&self, token: u64, source: &str) -> Result<(), Interrupt> {
		let text = self
			.caches
			.markdown
			.get_or_load(source, || self.platform.fetch_text(source))
			.await;
		self.ensure_current(token)?;
		let html = render_markdown(&normalize_citation_links(&text?));
		self.surface.show(DetailView::Markdown { html });
		Ok(())
	}

	async fn load_image(
		&self,
		token: u64,
		source: &str,
		reference: Option<&str>,
		label: &str,
	) -> Result<(), Interrupt> {
		let decoded = self
			.caches
			.images
			.get_or_load(source, || self.platform.preload_image(source))
			.await;
		self.ensure_current(token)?;
		decoded?;
		self.surface.show(DetailView::Image {
			src: source.to_string(),
			alt: label.to_string(),
			href: reference.map(str::to_string),
		});
		Ok(())
	}
}
