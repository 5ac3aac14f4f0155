//! Browser implementation of [`ContentPlatform`].

use std::cell::RefCell;
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use log::{debug, warn};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
	Document, Element, HtmlElement, HtmlImageElement, HtmlLinkElement, Request, RequestCache,
	RequestInit, ResizeObserver, Response,
};

use super::fit::{FitObserver, fit_scale};
use super::platform::ContentPlatform;
use crate::error::ResourceError;

/// Selector of the element a mounted panel is fitted into.
pub const PANEL_CONTAINER: &str = "#detailHost .detail__panelFitInner";

/// Readable text for a thrown JS value.
pub fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.or_else(|| value.dyn_ref::<js_sys::Error>().map(|e| e.message().into()))
		.unwrap_or_else(|| format!("{value:?}"))
}

fn network(url: &str, message: impl Into<String>) -> ResourceError {
	ResourceError::Network {
		url: url.to_string(),
		message: message.into(),
	}
}

fn decode(url: &str, message: impl Into<String>) -> ResourceError {
	ResourceError::Decode {
		url: url.to_string(),
		message: message.into(),
	}
}

fn document() -> Option<Document> {
	web_sys::window()?.document()
}

/// Location of the page, used as the base for relative urls.
pub fn page_url() -> Option<Url> {
	let href = web_sys::window()?.location().href().ok()?;
	Url::parse(&href).ok()
}

/// GETs `url` with the http cache bypassed and returns the body as text.
pub async fn fetch_text(url: String) -> Result<String, ResourceError> {
	let window = web_sys::window().ok_or_else(|| network(&url, "no window"))?;
	let init = RequestInit::new();
	init.set_method("GET");
	init.set_cache(RequestCache::NoStore);
	let request =
		Request::new_with_str_and_init(&url, &init).map_err(|e| network(&url, js_message(&e)))?;

	let response: Response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| network(&url, js_message(&e)))?
		.dyn_into()
		.map_err(|_| decode(&url, "not a response"))?;
	if !response.ok() {
		return Err(ResourceError::Status {
			url,
			status: response.status(),
		});
	}

	let body = response.text().map_err(|e| decode(&url, js_message(&e)))?;
	JsFuture::from(body)
		.await
		.map_err(|e| decode(&url, js_message(&e)))?
		.as_string()
		.ok_or_else(|| decode(&url, "body is not text"))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WebPlatform;

impl WebPlatform {
	fn install_stylesheet(href: &str) -> Result<oneshot::Receiver<Result<(), ResourceError>>, ResourceError> {
		let document = document().ok_or_else(|| network(href, "no document"))?;
		let id = format!("panel-css:{href}");
		let (tx, rx) = oneshot::channel();
		if document.get_element_by_id(&id).is_some() {
			let _ = tx.send(Ok(()));
			return Ok(rx);
		}

		let link: HtmlLinkElement = document
			.create_element("link")
			.map_err(|e| network(href, js_message(&e)))?
			.unchecked_into();
		link.set_id(&id);
		link.set_rel("stylesheet");
		link.set_href(href);

		let tx = Rc::new(RefCell::new(Some(tx)));
		let (tx_load, tx_error, url) = (tx.clone(), tx, href.to_string());
		let onload = Closure::once_into_js(move || {
			if let Some(tx) = tx_load.borrow_mut().take() {
				let _ = tx.send(Ok(()));
			}
		});
		let onerror = Closure::once_into_js(move || {
			if let Some(tx) = tx_error.borrow_mut().take() {
				let _ = tx.send(Err(network(&url, "stylesheet failed to load")));
			}
		});
		link.set_onload(Some(onload.unchecked_ref()));
		link.set_onerror(Some(onerror.unchecked_ref()));

		let head = document.head().ok_or_else(|| network(href, "no <head>"))?;
		head.append_child(&link)
			.map_err(|e| network(href, js_message(&e)))?;
		Ok(rx)
	}
}

impl ContentPlatform for WebPlatform {
	type Container = Element;

	fn fetch_text(&self, url: &str) -> LocalBoxFuture<'static, Result<String, ResourceError>> {
		fetch_text(url.to_string()).boxed_local()
	}

	fn load_stylesheet(&self, href: &str) -> LocalBoxFuture<'static, Result<(), ResourceError>> {
		let url = href.to_string();
		match Self::install_stylesheet(href) {
			Ok(rx) => async move {
				rx.await
					.unwrap_or_else(|_| Err(network(&url, "stylesheet load abandoned")))
			}
			.boxed_local(),
			Err(err) => future::ready(Err(err)).boxed_local(),
		}
	}

	fn preload_image(&self, url: &str) -> LocalBoxFuture<'static, Result<(), ResourceError>> {
		let url = url.to_string();
		async move {
			let image = HtmlImageElement::new().map_err(|e| network(&url, js_message(&e)))?;
			image.set_src(&url);
			JsFuture::from(image.decode())
				.await
				.map_err(|e| decode(&url, js_message(&e)))?;
			debug!("decoded image {url}");
			Ok(())
		}
		.boxed_local()
	}

	fn next_frame(&self) -> LocalBoxFuture<'static, ()> {
		let Some(window) = web_sys::window() else {
			return future::ready(()).boxed_local();
		};
		let (tx, rx) = oneshot::channel::<()>();
		let callback = Closure::once_into_js(move || {
			let _ = tx.send(());
		});
		if window.request_animation_frame(callback.unchecked_ref()).is_err() {
			return future::ready(()).boxed_local();
		}
		rx.map(|_| ()).boxed_local()
	}

	fn panel_container(&self) -> Option<Element> {
		document()?.query_selector(PANEL_CONTAINER).ok().flatten()
	}

	fn observe_fit(&self, container: &Element, margin: f64) -> FitObserver {
		let Some(host) = container.parent_element() else {
			return FitObserver::inert();
		};
		let Some(inner) = container.dyn_ref::<HtmlElement>().cloned() else {
			return FitObserver::inert();
		};

		let apply = {
			let host = host.clone();
			move || {
				let style = inner.style();
				let _ = style.set_property("transform", "none");
				let natural = (inner.scroll_width() as f64, inner.scroll_height() as f64);
				let available = (host.client_width() as f64, host.client_height() as f64);
				if let Some(scale) = fit_scale(available, natural, margin) {
					let _ = style.set_property("transform-origin", "center center");
					let _ = style.set_property("transform", &format!("scale({scale})"));
				}
			}
		};
		apply();

		let callback = Closure::<dyn FnMut()>::new(apply);
		let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
			Ok(observer) => observer,
			Err(e) => {
				warn!("panel fit disabled: {}", js_message(&e));
				return FitObserver::inert();
			}
		};
		observer.observe(&host);
		observer.observe(container);
		FitObserver::new(move || {
			observer.disconnect();
			drop(callback);
		})
	}
}
