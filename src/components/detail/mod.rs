//! Detail panel: content dispatch, caching and panel behaviors.

pub mod behaviors;
pub mod cache;
mod component;
pub mod content;
pub mod fit;
pub mod markdown;
pub mod platform;
pub mod resolver;
pub mod script_host;
pub mod view;
pub mod web;

pub use component::DetailPanel;
pub use resolver::{ContentResolver, ResolveOutcome, ResolverOptions};
pub use view::{DetailSurface, DetailView};
pub use web::WebPlatform;
