//! Per-node content descriptors.

use url::Url;

use crate::components::graph::GraphNode;
use crate::components::graph::types::non_empty;
use crate::error::SourceError;

/// Where shared panel templates live.
pub const TEMPLATE_ROOT: &str = "panels/templates";

/// A validated html panel location, plus an optional shared template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelSource {
	pub base: String,
	pub template: Option<String>,
}

impl PanelSource {
	pub fn parse(source: &str, template: Option<&str>) -> Result<Self, SourceError> {
		let base = normalize_panel_path(source)?;
		let template = match non_empty(template) {
			Some(t) if is_panel_segment(t) => Some(format!("{TEMPLATE_ROOT}/{t}")),
			Some(t) => return Err(SourceError::MalformedPanelId(t.to_string())),
			None => None,
		};
		Ok(Self { base, template })
	}

	/// Template first, then the panel itself.
	pub fn bases(&self) -> impl Iterator<Item = &str> {
		self.template
			.as_deref()
			.into_iter()
			.chain(std::iter::once(self.base.as_str()))
	}

	pub fn html_url(base: &str) -> String {
		format!("{base}/panel.html")
	}

	pub fn css_url(base: &str) -> String {
		format!("{base}/panel.css")
	}
}

fn is_panel_segment(segment: &str) -> bool {
	!segment.is_empty()
		&& segment
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Drops trailing slashes and checks every segment.
fn normalize_panel_path(source: &str) -> Result<String, SourceError> {
	let trimmed = source.trim().trim_end_matches('/');
	if trimmed.is_empty() || !trimmed.split('/').all(is_panel_segment) {
		return Err(SourceError::MalformedPanelId(source.to_string()));
	}
	Ok(trimmed.to_string())
}

/// Accepts absolute http(s) urls, or paths relative to `base`.
pub fn validate_site_url(source: &str, base: Option<&Url>) -> Result<Url, SourceError> {
	let source = source.trim();
	let parsed = match (Url::parse(source), base) {
		(Ok(url), _) => url,
		(Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => {
			base.join(source).map_err(|e| invalid(source, e))?
		}
		(Err(e), _) => return Err(invalid(source, e)),
	};
	match parsed.scheme() {
		"http" | "https" => Ok(parsed),
		scheme => Err(SourceError::UnsupportedScheme {
			url: source.to_string(),
			scheme: scheme.to_string(),
		}),
	}
}

fn invalid(source: &str, e: url::ParseError) -> SourceError {
	SourceError::InvalidUrl {
		url: source.to_string(),
		message: e.to_string(),
	}
}

/// Content kind of a node, decided from its `panel-type` and `source`.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentDescriptor {
	None,
	Markdown { source: String },
	HtmlFragment(PanelSource),
	Image { source: String, reference: Option<String> },
	EmbeddedSite { url: Url },
}

impl ContentDescriptor {
	/// A typed node without a source shows its metadata, like an untyped one.
	pub fn for_node(node: &GraphNode, base: Option<&Url>) -> Result<Self, SourceError> {
		let Some(kind) = non_empty(node.panel_type.as_deref()) else {
			return Ok(Self::None);
		};
		let Some(source) = non_empty(node.source.as_deref()) else {
			return Ok(Self::None);
		};
		Ok(match kind {
			"html" | "panel" => {
				Self::HtmlFragment(PanelSource::parse(source, node.template.as_deref())?)
			}
			"markdown" | "md" => Self::Markdown {
				source: source.to_string(),
			},
			"img" | "image" => Self::Image {
				source: source.to_string(),
				reference: non_empty(node.reference.as_deref()).map(str::to_string),
			},
			"website" | "site" => Self::EmbeddedSite {
				url: validate_site_url(source, base)?,
			},
			_ => Self::None,
		})
	}

	pub fn is_async(&self) -> bool {
		matches!(
			self,
			Self::Markdown { .. } | Self::HtmlFragment(_) | Self::Image { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(json: &str) -> GraphNode {
		serde_json::from_str(json).unwrap()
	}

	#[test]
	fn panel_paths_are_normalized() {
		let p = PanelSource::parse("panels/about//", None).unwrap();
		assert_eq!(p.base, "panels/about");
		assert_eq!(p.bases().collect::<Vec<_>>(), ["panels/about"]);
	}

	#[test]
	fn template_is_tried_first() {
		let p = PanelSource::parse("panels/paper-1", Some("paper-preview")).unwrap();
		assert_eq!(
			p.bases().collect::<Vec<_>>(),
			["panels/templates/paper-preview", "panels/paper-1"]
		);
	}

	#[test]
	fn malformed_panel_ids_are_rejected() {
		for bad in ["../secret", "panels/a b", "panels/<x>", "/", "panels//about"] {
			assert!(
				matches!(PanelSource::parse(bad, None), Err(SourceError::MalformedPanelId(_))),
				"{bad} should be rejected"
			);
		}
		assert!(PanelSource::parse("panels/about", Some("../x")).is_err());
	}

	#[test]
	fn only_http_sites_are_embedded() {
		assert!(validate_site_url("https://example.org/a", None).is_ok());
		assert_eq!(
			validate_site_url("ftp://x", None),
			Err(SourceError::UnsupportedScheme {
				url: "ftp://x".into(),
				scheme: "ftp".into()
			})
		);
		assert!(matches!(
			validate_site_url("javascript:alert(1)", None),
			Err(SourceError::UnsupportedScheme { .. })
		));
		assert!(matches!(
			validate_site_url("notes/page.html", None),
			Err(SourceError::InvalidUrl { .. })
		));
	}

	#[test]
	fn relative_sites_resolve_against_base() {
		let base = Url::parse("https://me.example/graph/").unwrap();
		let url = validate_site_url("demo/index.html", Some(&base)).unwrap();
		assert_eq!(url.as_str(), "https://me.example/graph/demo/index.html");
	}

	#[test]
	fn descriptor_dispatch() {
		let md = node(r#"{ "id": "a", "panel-type": "markdown", "source": "notes/a.md" }"#);
		assert_eq!(
			ContentDescriptor::for_node(&md, None).unwrap(),
			ContentDescriptor::Markdown { source: "notes/a.md".into() }
		);
		let img = node(r#"{ "id": "a", "panel-type": "img", "source": "a.png", "ref": " " }"#);
		assert_eq!(
			ContentDescriptor::for_node(&img, None).unwrap(),
			ContentDescriptor::Image { source: "a.png".into(), reference: None }
		);
		let empty = node(r#"{ "id": "a", "panel-type": "html", "source": "" }"#);
		assert_eq!(ContentDescriptor::for_node(&empty, None).unwrap(), ContentDescriptor::None);
		let ftp = node(r#"{ "id": "a", "panel-type": "website", "source": "ftp://x" }"#);
		assert!(ContentDescriptor::for_node(&ftp, None).is_err());
	}
}
