pub mod detail;
pub mod graph;
