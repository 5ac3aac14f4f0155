//! Markdown to display html.
//!
//! Raw html in the source is shown as text, links open in a new tab, and
//! link targets with script-capable schemes are dropped.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use pulldown_cmark_escape::{escape_href, escape_html};
use regex::Regex;

static CITATION: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\[\[([^\]]+)\]\(([^)]+)\)\]").expect("valid citation pattern"));

/// `[[1](url)]` becomes a link whose visible text is `[1]`.
pub fn normalize_citation_links(markdown: &str) -> String {
	CITATION
		.replace_all(markdown, r"[\[$1\]]($2)")
		.into_owned()
}

fn is_safe_href(href: &str) -> bool {
	let lower = href.trim().to_ascii_lowercase();
	!["javascript:", "vbscript:", "data:"]
		.iter()
		.any(|scheme| lower.starts_with(scheme))
}

fn open_link(dest_url: &str, title: &str) -> String {
	let mut tag = String::from("<a");
	// Writing into a String cannot fail.
	if is_safe_href(dest_url) {
		tag.push_str(" href=\"");
		let _ = escape_href(&mut tag, dest_url);
		tag.push('"');
	}
	if !title.is_empty() {
		tag.push_str(" title=\"");
		let _ = escape_html(&mut tag, title);
		tag.push('"');
	}
	tag.push_str(" target=\"_blank\" rel=\"noopener noreferrer\">");
	tag
}

pub fn render_markdown(markdown: &str) -> String {
	let mut options = Options::empty();
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_STRIKETHROUGH);

	let events = Parser::new_ext(markdown, options).map(|event| match event {
		Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
		Event::Start(Tag::Link { dest_url, title, .. }) => {
			Event::InlineHtml(CowStr::from(open_link(&dest_url, &title)))
		}
		Event::End(TagEnd::Link) => Event::InlineHtml(CowStr::Borrowed("</a>")),
		other => other,
	});

	let mut out = String::with_capacity(markdown.len() * 3 / 2);
	html::push_html(&mut out, events);
	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn citations_become_bracketed_link_text() {
		let md = "As shown before [[1](https://doi.org/10.1/x)].";
		assert_eq!(
			normalize_citation_links(md),
			r"As shown before [\[1\]](https://doi.org/10.1/x)."
		);
		let html = render_markdown(&normalize_citation_links(md));
		assert!(html.contains(">[1]</a>"), "{html}");
		assert!(html.contains("href=\"https://doi.org/10.1/x\""));
	}

	#[test]
	fn links_open_in_new_tab() {
		let html = render_markdown("[site](https://example.org \"Ex\")");
		assert_eq!(
			html,
			"<p><a href=\"https://example.org\" title=\"Ex\" target=\"_blank\" rel=\"noopener noreferrer\">site</a></p>\n"
		);
	}

	#[test]
	fn link_attributes_are_escaped() {
		let html = render_markdown(r#"[a](https://x.org/?a=1&b=2 "say \"hi\"")"#);
		assert!(html.contains(r#"href="https://x.org/?a=1&amp;b=2""#), "{html}");
		assert!(html.contains(r#"title="say &quot;hi&quot;""#), "{html}");
	}

	#[test]
	fn raw_html_is_escaped() {
		let html = render_markdown("hello <script>alert(1)</script>");
		assert!(!html.contains("<script>"));
		assert!(html.contains("&lt;script&gt;"));
	}

	#[test]
	fn script_links_lose_their_target() {
		let html = render_markdown("[x](javascript:alert(1))");
		assert!(!html.contains("href"));
		assert!(html.contains(">x</a>"));
	}

	#[test]
	fn headings_and_lists_render() {
		let html = render_markdown("# Title\n\n- one\n- two\n");
		assert!(html.starts_with("<h1>Title</h1>"));
		assert!(html.contains("<li>one</li>"));
	}
}
