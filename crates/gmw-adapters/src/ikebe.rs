//! イケベ楽器店: anchor-link heuristic.
//!
//! The catalog page has no usable listing container; product links are
//! recognized by URL shape (allow/deny substring lists) with a brand-mention
//! fallback for same-site links, and the price is pulled from the nearest
//! ancestor that carries one.

use gmw_core::{ProductRecord, StoreKey};
use scraper::Html;

use crate::{element_text, nearby_price, resolve_link, ParseContext, SourceParser, ANCHOR};

const PRODUCT_INDICATORS: &[&str] = &["pid=", "/detail", "productdetail", "/item/"];

const EXCLUDE_INDICATORS: &[&str] = &[
    "javascript:", "mailto:", "#", "/search", "/category", "/cart", "/login", "/register",
    "/help", "/contact", "/company", "/privacy", "facebook.com", "twitter.com",
    "instagram.com", "youtube.com", "sort=", "page=", "pno=", "img=", "dpcnt=",
];

const INSTRUMENT_BRANDS: &[&str] = &[
    "yamaha", "fender", "gibson", "martin", "taylor", "hernandez", "yacopi", "yairi",
];

pub struct IkebeParser;

impl SourceParser for IkebeParser {
    fn store(&self) -> StoreKey {
        StoreKey::Ikebe
    }

    fn parse(&self, html: &str, ctx: &ParseContext) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for link in document.select(&ANCHOR) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let text = element_text(link).trim().to_string();
            if !is_product_link(href, &text) {
                continue;
            }
            let Some(price) = nearby_price(link) else {
                continue;
            };
            records.push(ProductRecord::new(
                StoreKey::Ikebe,
                &text,
                price,
                resolve_link(&ctx.base_url, href),
                ctx.fetched_at,
            ));
        }

        records
    }
}

fn is_product_link(href: &str, text: &str) -> bool {
    let href_lower = href.to_lowercase();
    if EXCLUDE_INDICATORS
        .iter()
        .any(|needle| href_lower.contains(needle))
    {
        return false;
    }
    if PRODUCT_INDICATORS
        .iter()
        .any(|needle| href_lower.contains(needle))
    {
        return true;
    }
    // Fallback: a same-site link whose text mentions a known brand.
    if text.chars().count() > 1 {
        let text_lower = text.to_lowercase();
        if INSTRUMENT_BRANDS.iter().any(|brand| text_lower.contains(brand))
            && (href.starts_with('/') || href.contains("ikebe-gakki.com"))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_context;

    // Links sit three containers deep, so the ancestor search tops out at the
    // per-product card and never reaches a sibling card's price.
    const PAGE: &str = r#"
        <html><body>
          <nav><a href="/cart">カート</a><a href="/login">ログイン</a></nav>
          <div class="product">
            <div class="info"><div class="title">
              <a href="/item/detail.aspx?pid=12345">Juan Hernandez Concierto Cedar</a>
            </div></div>
            <span class="price">¥398,000(税込)</span>
          </div>
          <div class="product">
            <div class="info"><div class="title">
              <a href="/item/detail.aspx?pid=67890">Gibson J-45 Standard</a>
            </div></div>
            <span>価格確認中</span>
          </div>
          <div class="pickup">
            <div class="info"><div class="title">
              <a href="/guitars/used/yamaha-gc71">YAMAHA GC71 1985</a>
            </div></div>
            <p>中古特価 ¥275,000 (税込)</p>
          </div>
          <a href="https://facebook.com/ikebe">Follow us</a>
          <a href="/Form/Product/ProductList.aspx?sort=07&pno=2">次へ</a>
        </body></html>"#;

    #[test]
    fn extracts_product_links_with_nearby_prices() {
        let records = IkebeParser.parse(PAGE, &test_context("https://www.ikebe-gakki.com"));
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Juan Hernandez Concierto Cedar", "YAMAHA GC71 1985"]
        );
        assert_eq!(records[0].price, "¥398,000");
        assert_eq!(
            records[0].link,
            "https://www.ikebe-gakki.com/item/detail.aspx?pid=12345"
        );
        assert_eq!(records[1].price, "¥275,000");
    }

    #[test]
    fn discards_product_link_without_price() {
        let records = IkebeParser.parse(PAGE, &test_context("https://www.ikebe-gakki.com"));
        assert!(records.iter().all(|r| r.name != "Gibson J-45 Standard"));
    }

    #[test]
    fn link_classifier_applies_deny_list_first() {
        assert!(!is_product_link("/cart?pid=1", ""));
        assert!(!is_product_link("/Form/Product/ProductList.aspx?sort=07", "YAMAHA"));
        assert!(is_product_link("/item/detail.aspx?pid=1", ""));
    }

    #[test]
    fn brand_fallback_requires_same_site_link() {
        assert!(is_product_link("/guitars/used/gc71", "YAMAHA GC71"));
        assert!(is_product_link(
            "https://www.ikebe-gakki.com/guitars/used/gc71",
            "YAMAHA GC71"
        ));
        assert!(!is_product_link("https://other.example/gc71", "YAMAHA GC71"));
        assert!(!is_product_link("/guitars/used/gc71", "中古ギター"));
    }
}
