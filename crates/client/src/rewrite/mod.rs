//! Page HTML transform.
//!
//! Remote page bodies reference embedded images by absolute API URLs that need
//! a bearer token. The rewriter swaps those for local `/resources/<id>` paths
//! served through the resource cache, and derives the summary and cover image
//! stored alongside the page.

mod serialize;

use onesync_core::AppConfig;
use scraper::{ElementRef, Html};
use url::Url;

use serialize::Serializer;

/// Maximum summary length in characters.
pub const SUMMARY_CHARS: usize = 800;

/// Local path prefix rewritten image sources point at.
pub const RESOURCE_PATH: &str = "/resources/";

/// Result of rewriting one page body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RewrittenContent {
    /// Inner HTML of `<body>` with resource images rewritten.
    pub content: String,
    /// Collapsed visible text, at most [`SUMMARY_CHARS`] characters.
    pub summary: String,
    /// Rewritten src of the first resource image, or empty.
    pub cover: String,
}

#[derive(Debug, Clone)]
pub struct ContentRewriter {
    /// `None` when the configured base is not an absolute URL; nothing is rewritten then.
    resource_base: Option<Url>,
}

impl ContentRewriter {
    /// `resource_base` is the remote API root image sources must live under.
    pub fn new(resource_base: impl AsRef<str>) -> Self {
        let resource_base = Url::parse(resource_base.as_ref())
            .inspect_err(|e| tracing::warn!(error = %e, "invalid resource base, images will not be rewritten"))
            .ok();
        Self { resource_base }
    }

    pub fn rewrite(&self, raw_html: &str) -> RewrittenContent {
        let document = Html::parse_document(raw_html);
        let Some(body) = find_body(&document) else {
            return RewrittenContent::default();
        };

        let mut cover = None;
        let mut serializer = Serializer::new(|src: &str| {
            let local = self.local_src(src)?;
            cover.get_or_insert_with(|| local.clone());
            Some(local)
        });
        serializer.children(body);

        let summary = summarize(&serializer.text);
        let content = std::mem::take(&mut serializer.html);
        drop(serializer);

        RewrittenContent { content, summary, cover: cover.unwrap_or_default() }
    }

    /// Local path for a remote resource image source, if it is one.
    fn local_src(&self, src: &str) -> Option<String> {
        let base = self.resource_base.as_ref()?;
        let url = Url::parse(src).ok()?;
        let under_base = url
            .path()
            .strip_prefix(base.path().trim_end_matches('/'))
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'));
        if url.origin() != base.origin() || !under_base {
            return None;
        }
        let segments: Vec<&str> = url.path_segments()?.collect();
        if segments.len() < 2 || !segments.contains(&"resources") {
            return None;
        }
        let id = segments[segments.len() - 2];
        if id.is_empty() || id == "resources" {
            return None;
        }
        Some(format!("{RESOURCE_PATH}{id}"))
    }
}

impl From<&AppConfig> for ContentRewriter {
    fn from(config: &AppConfig) -> Self {
        Self::new(&config.graph_base_url)
    }
}

fn find_body(document: &Html) -> Option<ElementRef<'_>> {
    document
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "body")
}

fn summarize(text: &str) -> String {
    let mut summary = String::new();
    for word in text.split_whitespace() {
        if !summary.is_empty() {
            summary.push(' ');
        }
        summary.push_str(word);
    }
    summary.chars().take(SUMMARY_CHARS).collect()
}
