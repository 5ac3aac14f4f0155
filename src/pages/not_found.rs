use leptos::prelude::*;

/// 404 Not Found Page
#[component]
pub fn NotFound() -> impl IntoView {
	view! { <h1>"Nothing here. The graph lives at the site root."</h1> }
}
