use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info};

use crate::components::detail::{
	ContentResolver, DetailPanel, DetailView, ResolverOptions, WebPlatform, behaviors, web,
};
use crate::components::graph::{GraphCanvas, GraphModel, GraphNode, SelectHandler};
use crate::config::ViewerConfig;
use crate::error::LoadError;

type Resolver = ContentResolver<WebPlatform, RwSignal<DetailView>>;

/// Fetches and validates the dataset. Any failure here is fatal.
async fn load_graph(defaults: ViewerConfig) -> Result<(Rc<GraphModel>, ViewerConfig), LoadError> {
	if let Some(page) = web::page_url().filter(|url| url.scheme() == "file") {
		return Err(LoadError::UnsupportedProtocol {
			protocol: format!("{}:", page.scheme()),
			dataset: defaults.dataset_url,
		});
	}
	let url = defaults.dataset_url.clone();
	let text = web::fetch_text(url.clone())
		.await
		.map_err(|e| LoadError::Fetch {
			url,
			message: e.to_string(),
		})?;
	let (model, config) = GraphModel::from_dataset(&text, &defaults)?;
	info!(
		"loaded {} nodes and {} links, root \"{}\"",
		model.nodes().len(),
		model.links().len(),
		model.root_id()
	);
	Ok((Rc::new(model), config))
}

fn select_handler(resolver: Rc<Resolver>) -> SelectHandler {
	Rc::new(move |node: &GraphNode| {
		let (resolver, node) = (resolver.clone(), node.clone());
		spawn_local(async move {
			let outcome = resolver.resolve(&node).await;
			debug!("detail for {}: {outcome:?}", node.id);
		});
	})
}

#[component]
pub fn Home() -> impl IntoView {
	let detail = RwSignal::new(DetailView::default());
	let graph = RwSignal::new_local(None::<(Rc<GraphModel>, ViewerConfig)>);

	spawn_local(async move {
		match load_graph(ViewerConfig::default()).await {
			Ok(loaded) => graph.set(Some(loaded)),
			Err(err) => {
				error!("{err}");
				detail.set(DetailView::Failed {
					message: err.to_string(),
				});
			}
		}
	});

	let canvas = move || {
		graph.get().map(|(model, config)| {
			let options = ResolverOptions::from_config(&config, web::page_url());
			let resolver = ContentResolver::new(WebPlatform, detail, options)
				.with_behaviors(behaviors::builtin());
			let on_select = select_handler(Rc::new(resolver));
			on_select(model.root());
			view! { <GraphCanvas model=model config=config on_select=on_select /> }
		})
	};

	view! {
		<div class="app">
			<main class="graph-host">{canvas}</main>
			<DetailPanel content=detail />
		</div>
	}
}
