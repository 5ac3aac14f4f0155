mod component;
pub mod disclosure;
pub mod model;
pub mod path;
mod render;
pub mod state;
pub mod types;
pub mod viewport;

pub use component::{GraphCanvas, SelectHandler};
pub use disclosure::{DisclosureEngine, Highlight};
pub use model::GraphModel;
pub use types::{GraphData, GraphLink, GraphNode};
