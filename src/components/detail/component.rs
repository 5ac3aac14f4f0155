use leptos::prelude::*;

use super::view::{DetailSurface, DetailView};

impl DetailSurface for RwSignal<DetailView> {
	fn show(&self, view: DetailView) {
		self.set(view);
	}
}

fn heading(title: &'static str, label: String) -> impl IntoView {
	view! {
		<div class="detail__title">{title}</div>
		<div class="detail__label">{label}</div>
	}
}

/// Sandboxed preview frame. `loading` goes on before `src` so the browser
/// defers the fetch.
#[component]
fn WebFrame(url: String) -> impl IntoView {
	let frame = NodeRef::<leptos::html::Iframe>::new();
	Effect::new(move |_| {
		if let Some(frame) = frame.get() {
			let _ = frame.set_attribute("loading", "lazy");
			frame.set_src(&url);
		}
	});
	view! {
		<iframe
			node_ref=frame
			class="detail__webFrame"
			referrerpolicy="no-referrer"
			tabindex="-1"
			sandbox="allow-forms allow-scripts allow-same-origin allow-popups"
		></iframe>
	}
}

fn render(content: DetailView) -> AnyView {
	match content {
		DetailView::Loading { label, message } => view! {
			{heading("Selected Node", label)}
			<div class="detail__loading" aria-live="polite">{message}</div>
		}
		.into_any(),
		DetailView::Panel { source, html } => view! {
			<div class="detail__panelFit" data-panel=source>
				<div class="detail__panelFitInner" inner_html=html></div>
			</div>
		}
		.into_any(),
		DetailView::Markdown { html } => view! {
			<div class="detail__markdown md" inner_html=html></div>
		}
		.into_any(),
		DetailView::Image { src, alt, href } => {
			let image = view! {
				<img class="detail__img" src=src alt=alt loading="eager" decoding="async" />
			};
			match href {
				Some(href) => view! {
					<div class="detail__imgFit">
						<a class="detail__imgLink" href=href target="_blank" rel="noopener noreferrer">
							{image}
						</a>
					</div>
				}
				.into_any(),
				None => view! { <div class="detail__imgFit">{image}</div> }.into_any(),
			}
		}
		DetailView::Website { label, url } => view! {
			{heading("Website", label)}
			<a class="detail__webCard" href=url.clone() target="_blank" rel="noopener noreferrer">
				<div class="detail__webCardTop">
					<div class="detail__webUrl">{url.clone()}</div>
					<div class="detail__webHint">"Click to open ↗"</div>
				</div>
				// Non-interactive so a click always lands on the card link.
				<div class="detail__webPreview">
					<WebFrame url=url.clone() />
				</div>
			</a>
		}
		.into_any(),
		DetailView::Metadata(meta) => {
			let text = meta.text();
			view! {
				{heading("Selected Node", meta.label)}
				<div class="detail__meta">{text}</div>
			}
			.into_any()
		}
		DetailView::Unavailable { label, reason } => view! {
			{heading("Selected Node", label)}
			<div class="panel-error">{reason}</div>
		}
		.into_any(),
		DetailView::Failed { message } => view! {
			<div class="detail__title">"Failed to load graph"</div>
			<pre class="detail__meta">{message}</pre>
		}
		.into_any(),
	}
}

/// The detail surface. Only the content resolver writes `content`.
#[component]
pub fn DetailPanel(content: RwSignal<DetailView>) -> impl IntoView {
	let kind = move || content.with(DetailView::kind);
	view! {
		<aside id="detail-panel" class="detail-panel">
			<div id="detailHost" class=move || format!("detail detail--{}", kind())>
				{move || render(content.get())}
			</div>
		</aside>
	}
}
