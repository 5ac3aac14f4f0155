//! Host capabilities the content resolver needs.

use futures::future::LocalBoxFuture;

use super::fit::FitObserver;
use crate::error::ResourceError;

/// Everything the resolver asks of its environment.
///
/// The browser implementation lives in `web`; tests drive the resolver with
/// a scripted fake.
pub trait ContentPlatform {
	/// Handle to the mounted panel element.
	type Container: 'static;

	/// Body of `url` as text, bypassing the http cache.
	fn fetch_text(&self, url: &str) -> LocalBoxFuture<'static, Result<String, ResourceError>>;

	/// Installs the stylesheet at `href` once and waits for it to apply.
	fn load_stylesheet(&self, href: &str) -> LocalBoxFuture<'static, Result<(), ResourceError>>;

	/// Loads and decodes the image at `url`.
	fn preload_image(&self, url: &str) -> LocalBoxFuture<'static, Result<(), ResourceError>>;

	/// Resolves after the next layout pass.
	fn next_frame(&self) -> LocalBoxFuture<'static, ()>;

	/// The panel element the surface mounted last, if any.
	fn panel_container(&self) -> Option<Self::Container>;

	/// Keeps `container` scaled to fit its host until the observer is dropped.
	fn observe_fit(&self, container: &Self::Container, margin: f64) -> FitObserver;
}
