//! Plain-text report composition.
//!
//! The report format mirrors what long-time recipients of the monitor are
//! used to reading: an optional keyword-highlight header, one section per
//! source with high-value novelty, and a footer with the run metadata.

use chrono::{DateTime, Utc};
use gmw_core::{group_thousands, has_special_keyword, KeywordHit, Snapshot};

/// Fixed scope tag carried in every subject line.
const SCOPE_TAG: &str = "5サイト統合監視（毎日・10万円以上のみ）";

/// A composed notification, ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
    pub high_value_total: usize,
}

/// Composes the consolidated report.
///
/// Returns `None` when there is no high-value novelty at all; the caller
/// skips submission entirely in that case. Keyword hits come from the full
/// novelty set, so a below-threshold keyword find still makes the header
/// when something else triggers the send.
pub fn compose_report(
    high_value: &Snapshot,
    keyword_hits: &[KeywordHit],
    run_time: DateTime<Utc>,
) -> Option<Report> {
    let total: usize = high_value.values().map(Vec::len).sum();
    if total == 0 {
        return None;
    }

    let subject = format!("🎸 高価格新商品が{total}件見つかりました - {SCOPE_TAG}");

    let mut body = String::new();

    if !keyword_hits.is_empty() {
        let banner = "🌟".repeat(50);
        body.push_str(&banner);
        body.push('\n');
        body.push_str("🔥 【特別注目商品】ダブルトップ・ラティス構造の商品を発見！ 🔥\n");
        body.push_str(&banner);
        body.push_str("\n\n");
        for hit in keyword_hits {
            body.push_str(&format!("🏪 {}: {} ({})\n", hit.store_name, hit.name, hit.price));
        }
        body.push('\n');
        body.push_str(&"=".repeat(60));
        body.push_str("\n\n");
    }

    body.push_str(&format!(
        "5つの楽器店サイトで高価格新商品 {total}件を検出しました！\n（10万円以上の商品のみ・価格情報付き）\n\n"
    ));
    body.push_str(&"=".repeat(60));
    body.push_str("\n\n");

    for (store, records) in high_value {
        body.push_str(&format!(
            "🏪 【{}】 新商品 {}件\n",
            store.display_name(),
            records.len()
        ));
        body.push_str(&"-".repeat(40));
        body.push_str("\n\n");

        for (idx, record) in records.iter().enumerate() {
            body.push_str(&format!("{}. 📦 {}\n", idx + 1, record.name));
            body.push_str(&format!(
                "   💰 {} (¥{})\n",
                record.price,
                group_thousands(record.price_value())
            ));
            if has_special_keyword(&record.name) {
                body.push_str("   🌟 ダブルトップ/ラティス構造商品\n");
            }
            body.push_str(&format!("   🔗 {}\n\n", record.link));
        }
        body.push('\n');
    }

    body.push_str(&"=".repeat(60));
    body.push('\n');
    body.push_str(&format!(
        "実行時刻: {} (UTC)\n",
        run_time.format("%Y年%m月%d日 %H:%M:%S")
    ));
    body.push_str("対象サイト: イケベ楽器店、黒澤楽器店、島村楽器、QSic、J-Guitar\n");
    body.push_str("実行頻度: 毎日\n");
    body.push_str("価格制限: 10万円以上のみ通知");

    Some(Report {
        subject,
        body,
        high_value_total: total,
    })
}
