//! Error taxonomy for the viewer.
//!
//! Only [`LoadError`] is fatal. Everything else is recovered where it happens.

use thiserror::Error;

/// Dataset could not be turned into a graph; the app shows a message and stops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
	/// The dataset request failed.
	#[error("failed to load {url}: {message}")]
	Fetch { url: String, message: String },

	/// The dataset is not valid JSON of the expected shape.
	#[error("malformed graph dataset: {0}")]
	Parse(String),

	/// No node carries the configured root id.
	#[error("root node not found (expected id \"{0}\")")]
	MissingRoot(String),

	/// Two nodes share an id.
	#[error("duplicate node id \"{0}\"")]
	DuplicateNode(String),

	/// The page was opened from a location that cannot fetch the dataset.
	#[error(
		"this app loads \"{dataset}\" via fetch(), which browsers block on {protocol} pages; serve the directory over http (e.g. `python3 -m http.server`)"
	)]
	UnsupportedProtocol { protocol: String, dataset: String },
}

/// A stylesheet, fragment, markdown file or image could not be loaded.
///
/// `Clone` because one cached failure is handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
	/// Server answered with a non-success status.
	#[error("request for {url} failed with status {status}")]
	Status { url: String, status: u16 },

	/// The request never produced a response.
	#[error("request for {url} failed: {message}")]
	Network { url: String, message: String },

	/// A response arrived but its body could not be used.
	#[error("could not decode {url}: {message}")]
	Decode { url: String, message: String },
}

/// Content source rejected before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
	/// Panel sources are `/`-separated `[A-Za-z0-9_-]` segments.
	#[error("panel \"{0}\" is not available")]
	MalformedPanelId(String),

	/// Only http and https pages may be embedded.
	#[error("unsupported url scheme \"{scheme}\" in {url}")]
	UnsupportedScheme { url: String, scheme: String },

	/// The source does not parse as a url.
	#[error("invalid url \"{url}\": {message}")]
	InvalidUrl { url: String, message: String },
}

/// A panel behavior failed while mounting or tearing down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BehaviorError {
	/// `init` reported an error.
	#[error("behavior for panel {panel} failed to initialize: {message}")]
	Init { panel: String, message: String },

	/// A teardown callback reported an error.
	#[error("teardown for panel {panel} failed: {message}")]
	Teardown { panel: String, message: String },

	/// The behavior panicked; the panic was contained.
	#[error("behavior for panel {panel} panicked: {message}")]
	Panicked { panel: String, message: String },
}

/// Rejected disclosure operation. State is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisclosureError {
	/// The id is not part of the dataset.
	#[error("unknown node \"{0}\"")]
	UnknownNode(String),

	/// The node exists but has not been revealed yet.
	#[error("node \"{0}\" is not visible and cannot be selected")]
	NotSelectable(String),
}
