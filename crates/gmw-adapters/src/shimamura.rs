//! 島村楽器: direct-link heuristic.
//!
//! Listing pages link straight to `/ec/pro/disp/` product URLs; the link text
//! is the listing name, and the price comes from the nearby-price ancestor
//! search.

use std::sync::LazyLock;

use gmw_core::{ProductRecord, StoreKey};
use scraper::{Html, Selector};

use crate::{element_text, nearby_price, resolve_link, ParseContext, SourceParser};

static PRODUCT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"a[href*="/ec/pro/disp/"]"#).unwrap());

/// Shipping/consignment/platform noise that shows up as link text.
const SKIP_TEXT_TERMS: &[&str] = &["送料", "出品", "webshop"];

pub struct ShimamuraParser;

impl SourceParser for ShimamuraParser {
    fn store(&self) -> StoreKey {
        StoreKey::Shimamura
    }

    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for link in document.select(&PRODUCT_LINK) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let text = element_text(link).trim().to_string();
            if text.chars().count() <= 5 {
                continue;
            }
            let text_lower = text.to_lowercase();
            if SKIP_TEXT_TERMS.iter().any(|term| text_lower.contains(term)) {
                continue;
            }
            let Some(price) = nearby_price(link) else {
                continue;
            };
            records.push(ProductRecord::new(
                StoreKey::Shimamura,
                &text,
                price,
                resolve_link(&ctx.base_url, href),
                ctx.fetched_at,
            ));
        }

        records
    }
}
