use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::debug;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::model::GraphModel;
use super::render::{self, IconCache};
use super::state::{ClickTarget, GraphCanvasState};
use super::types::GraphNode;
use crate::config::ViewerConfig;

/// Called with the node whose detail should be shown.
pub type SelectHandler = Rc<dyn Fn(&GraphNode)>;

fn window_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(
		read(window.inner_width(), 800.0),
		read(window.inner_height(), 600.0),
	)
}

/// Size of the element hosting the canvas, or the window before layout.
fn host_size(canvas: &HtmlCanvasElement, window: &Window) -> (f64, f64) {
	match canvas.parent_element() {
		Some(host) if host.client_width() > 0 && host.client_height() > 0 => {
			(host.client_width() as f64, host.client_height() as f64)
		}
		_ => window_size(window),
	}
}

fn canvas_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

#[component]
pub fn GraphCanvas(
	model: Rc<GraphModel>,
	config: ViewerConfig,
	on_select: SelectHandler,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<GraphCanvasState>>> = Rc::new(RefCell::new(None));
	let icons: Rc<RefCell<IconCache>> = Rc::new(RefCell::new(IconCache::default()));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = host_size(&canvas, &window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			return;
		};
		let (window_width, _) = window_size(&window);
		*state_init.borrow_mut() = Some(GraphCanvasState::new(
			model.clone(),
			config.clone(),
			w,
			h,
			window_width,
		));
		debug!("graph canvas mounted at {w}x{h}");

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = host_size(&canvas_resize, &win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *state_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner, icons_anim) =
			(state_init.clone(), animate_init.clone(), icons.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.viewport.tick(now);
				render::render(s, &mut icons_anim.borrow_mut(), &ctx);
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.press(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.drag(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		// Resolve the click while borrowed, notify after the borrow ends.
		let selected = {
			let mut guard = state_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			match s.release(x, y) {
				Some(ClickTarget::Node(id)) => s
					.activate_node(&id)
					.then(|| s.engine.selected().clone()),
				Some(ClickTarget::Background) => {
					s.activate_background();
					Some(s.engine.selected().clone())
				}
				None => None,
			}
		};
		if let Some(node) = selected {
			on_select(&node);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.cancel_press();
		}
	};

	let state_dc = state.clone();
	let on_dblclick = move |ev: MouseEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *state_dc.borrow_mut() {
			s.reset_view();
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = canvas_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
