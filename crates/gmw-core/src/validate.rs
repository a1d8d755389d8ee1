//! Record validation: the pure predicate separating listings from scrape
//! noise before a record may enter the snapshot.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::ProductRecord;

/// Sentinel some sites show in place of a price.
pub const PLACEHOLDER_PRICE: &str = "価格確認中";

static VALID_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"¥\s*[\d,]+|[\d,]+円").unwrap());

/// Navigation/UI chrome and status vocabulary. Short terms that also occur
/// inside legitimate listing names (e.g. `トップ` inside `ダブルトップ`), so
/// they only reject on exact match or leading-word match.
const NOISE_EXACT: &[&str] = &[
    "more", "loading", "...", "詳細", "detail", "next", "prev", "previous", "次へ", "前へ",
    "ページ", "page", "カート", "cart", "ログイン", "login", "menu", "メニュー", "search",
    "検索", "category", "カテゴリ", "home", "ホーム", "top", "トップ", "back", "戻る", "help",
    "ヘルプ", "contact", "お問い合わせ", "unknown", "不明", "n/a", "none", "null", "送料",
    "出品", "webshop", "ポイント", "全件", "件数",
];

/// Phrase-length noise that never appears inside a real listing name;
/// rejected on containment.
const NOISE_CONTAINS: &[&str] = &[
    "読み込み中", "もっと見る", "view more", "show more", "続きを見る", "キャンペーン",
    "発送予定", "買い取り", "下取り", "査定", "商品ピックアップ情報", "pickup item",
    "検索該当件数", "全17件",
];

const PUNCTUATION_ONLY: &str = ".,;:!?()-[]{}/*+=・";

/// Structural validity of a candidate record. Never errors.
pub fn is_valid_record(record: &ProductRecord) -> bool {
    let name = record.name.trim();
    if name.chars().count() < 5 {
        return false;
    }

    if !record.link.starts_with("http") {
        return false;
    }

    let price = record.price.trim();
    if price.is_empty() || price == PLACEHOLDER_PRICE {
        return false;
    }
    if !VALID_PRICE.is_match(price) {
        return false;
    }

    let name_lower = name.to_lowercase();
    for term in NOISE_EXACT {
        if name_lower == *term || name_lower.starts_with(&format!("{term} ")) {
            return false;
        }
    }
    for term in NOISE_CONTAINS {
        if name_lower.contains(term) {
            return false;
        }
    }

    let packed: String = name.chars().filter(|c| !c.is_whitespace()).collect();
    if packed.chars().count() < 5 {
        return false;
    }
    if packed.chars().all(|c| PUNCTUATION_ONLY.contains(c)) {
        return false;
    }

    true
}
