//! Per-source markup parsers.
//!
//! Every monitored site exposes its catalog in a different markup shape, so
//! each source gets its own heuristic strategy behind the common
//! [`SourceParser`] contract: raw page markup in, ordered candidate records
//! out. Parsers prune locally (price is a hard requirement; a candidate
//! without one is never emitted) but final acceptance belongs to
//! `gmw_core::is_valid_record`.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use gmw_core::{extract_price, StoreKey};
use scraper::{ElementRef, Html, Selector};
use url::Url;

mod ikebe;
mod jguitar;
mod kurosawa;
mod qsic;
mod shimamura;

pub use ikebe::IkebeParser;
pub use jguitar::JguitarParser;
pub use kurosawa::KurosawaParser;
pub use qsic::QsicParser;
pub use shimamura::ShimamuraParser;

pub const CRATE_NAME: &str = "gmw-adapters";

/// Per-fetch inputs shared by every parser: where relative links resolve to
/// and when the extraction happened.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub base_url: Url,
    pub fetched_at: DateTime<Utc>,
}

impl ParseContext {
    pub fn new(base_url: Url, fetched_at: DateTime<Utc>) -> Self {
        Self {
            base_url,
            fetched_at,
        }
    }
}

/// Strategy converting one fetched page into candidate records.
pub trait SourceParser: Send + Sync {
    fn store(&self) -> StoreKey;
    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<gmw_core::ProductRecord>;
}

/// Registry keyed by source identifier; total over the five keys.
pub fn parser_for_store(store: StoreKey) -> &'static dyn SourceParser {
    match store {
        StoreKey::Ikebe => &IkebeParser,
        StoreKey::Kurosawa => &KurosawaParser,
        StoreKey::Shimamura => &ShimamuraParser,
        StoreKey::Qsic => &QsicParser,
        StoreKey::Jguitar => &JguitarParser,
    }
}

pub(crate) static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").unwrap());

pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// Resolves an href against the page base; absolute hrefs pass through. An
/// unresolvable href is returned verbatim and left for the validator.
pub(crate) fn resolve_link(base: &Url, href: &str) -> String {
    base.join(href)
        .map(Into::into)
        .unwrap_or_else(|_| href.to_string())
}

/// "Nearby price" search: walks up to three ancestor elements of a product
/// link and returns the first price-pattern match in their text.
pub(crate) fn nearby_price(link: ElementRef) -> Option<String> {
    let mut checked = 0usize;
    for node in link.ancestors() {
        if checked >= 3 {
            break;
        }
        let Some(el) = ElementRef::wrap(node) else {
            continue;
        };
        checked += 1;
        if let Some(price) = extract_price(&element_text(el)) {
            return Some(price);
        }
    }
    None
}

/// Flattens a page to trimmed, non-empty text lines. Each text node
/// contributes its own lines, so line-window scans see the same shape
/// regardless of markup indentation.
pub(crate) fn text_lines(document: &Html) -> Vec<String> {
    document
        .root_element()
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) fn test_context(base_url: &str) -> ParseContext {
    ParseContext::new(Url::parse(base_url).unwrap(), Utc::now())
}
