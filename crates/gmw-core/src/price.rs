//! Price normalization for free-text fragments scraped out of catalog markup.
//!
//! The sites disagree on how a price is written (`¥128,000`, `128,000円`,
//! `価格: ¥128,000`, `128,000円(税込)`, full-width `￥`); everything downstream
//! works on one canonical rendering, `¥` + thousands-grouped digits.

use std::sync::LazyLock;

use regex::Regex;

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\d,]+").unwrap());

/// Price fragment patterns, tried in order; the first match wins.
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"¥([^\s]+)",
        r"(\d{1,3}(?:,\d{3})+)円",
        r"価格[：:]?\s*¥?([^\s]+)",
        r"(\d{1,3}(?:,\d{3})+)\s*\(税込\)",
        r"￥([^\s]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).unwrap())
    .collect()
});

/// Parses the numeric value out of a price string.
///
/// Scans for the first run of digits and commas, strips the separators and
/// parses. Returns 0 when nothing parseable is found; never errors.
pub fn extract_price_value(text: &str) -> u64 {
    let Some(run) = DIGIT_RUN.find(text) else {
        return 0;
    };
    run.as_str().replace(',', "").parse().unwrap_or(0)
}

/// Extracts a price from arbitrary text and renders it canonically.
///
/// Returns `None` when no pattern matches or the matched fragment carries no
/// digits.
pub fn extract_price(text: &str) -> Option<String> {
    for pattern in PRICE_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let digits: String = caps[1].chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            continue;
        }
        let Ok(value) = digits.parse::<u64>() else {
            continue;
        };
        return Some(format!("¥{}", group_thousands(value)));
    }
    None
}

/// Renders an integer with comma thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_value_strips_separators() {
        assert_eq!(extract_price_value("¥120,000"), 120_000);
        assert_eq!(extract_price_value("1,280,000円(税込)"), 1_280_000);
        assert_eq!(extract_price_value("税込 98000 円"), 98_000);
    }

    #[test]
    fn price_value_is_zero_when_absent() {
        assert_eq!(extract_price_value(""), 0);
        assert_eq!(extract_price_value("価格確認中"), 0);
    }

    #[test]
    fn extracts_symbol_prefixed_price() {
        assert_eq!(extract_price("特価 ¥128,000 送料無料"), Some("¥128,000".into()));
    }

    #[test]
    fn extracts_yen_suffixed_price() {
        assert_eq!(extract_price("128,000円"), Some("¥128,000".into()));
    }

    #[test]
    fn extracts_labelled_price() {
        assert_eq!(extract_price("価格: 98,000"), Some("¥98,000".into()));
        assert_eq!(extract_price("価格：¥1,200,000"), Some("¥1,200,000".into()));
    }

    #[test]
    fn extracts_tax_inclusive_price() {
        assert_eq!(extract_price("328,000 (税込)"), Some("¥328,000".into()));
    }

    #[test]
    fn extracts_full_width_symbol_price() {
        assert_eq!(extract_price("￥450,000"), Some("¥450,000".into()));
    }

    #[test]
    fn absent_when_no_pattern_matches() {
        assert_eq!(extract_price("お問い合わせください"), None);
        assert_eq!(extract_price(""), None);
    }

    #[test]
    fn regroups_unseparated_digits() {
        assert_eq!(extract_price("¥1280000"), Some("¥1,280,000".into()));
    }

    #[test]
    fn canonical_string_round_trips_to_value() {
        let canonical = extract_price("128,000円(税込)").unwrap();
        assert_eq!(extract_price_value(&canonical), 128_000);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(123_456_789), "123,456,789");
    }
}
