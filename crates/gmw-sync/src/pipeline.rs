//! The run pipeline: fetch → parse → validate → diff → filter → notify →
//! persist, strictly sequential over the fixed source order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use gmw_adapters::{parser_for_store, ParseContext};
use gmw_core::{is_valid_record, ProductRecord, Snapshot, StoreInfo, SOURCES};
use gmw_notify::{compose_report, Mailer};
use gmw_storage::{HttpClientConfig, HttpFetcher, SnapshotStore};
use serde::Serialize;
use tracing::{error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::novelty::{detect_keyword_matches, diff_snapshots, filter_high_value};

/// Counters for one completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub fetched_records: usize,
    pub new_records: usize,
    pub high_value_records: usize,
    pub keyword_hits: usize,
    pub mail_sent: bool,
}

pub struct MonitorPipeline {
    config: MonitorConfig,
    fetcher: HttpFetcher,
    snapshots: SnapshotStore,
    mailer: Mailer,
}

impl MonitorPipeline {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(HttpClientConfig {
            timeout: config.http_timeout,
            user_agent: config.user_agent.clone(),
        })?;
        let snapshots = SnapshotStore::new(config.data_file.clone());
        let mailer = Mailer::new(&config.email)?;
        Ok(Self {
            config,
            fetcher,
            snapshots,
            mailer,
        })
    }

    pub async fn run_once(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, sources = SOURCES.len(), "starting monitor run");

        let previous = self.snapshots.load().await;
        let current = self.build_snapshot().await;
        let fetched_records: usize = current.values().map(Vec::len).sum();
        info!(records = fetched_records, "all sources collected");

        if fetched_records == 0 {
            // A total outage must not wipe the persisted state; the next
            // healthy run would otherwise report the whole market as new.
            warn!("every source came back empty; keeping the previous snapshot");
            return Ok(RunSummary {
                run_id,
                started_at,
                finished_at: Utc::now(),
                fetched_records,
                new_records: 0,
                high_value_records: 0,
                keyword_hits: 0,
                mail_sent: false,
            });
        }

        let novelty = diff_snapshots(&current, &previous);
        let new_records: usize = novelty.values().map(Vec::len).sum();
        let high_value = filter_high_value(&novelty);
        let high_value_records: usize = high_value.values().map(Vec::len).sum();
        let keyword_hits = detect_keyword_matches(&novelty);
        info!(
            new = new_records,
            high_value = high_value_records,
            keywords = keyword_hits.len(),
            "novelty detected"
        );

        let mut mail_sent = false;
        match compose_report(&high_value, &keyword_hits, Utc::now()) {
            Some(report) => match self.mailer.send(&report).await {
                Ok(()) => mail_sent = true,
                Err(err) => {
                    error!(error = ?err, "notification mail failed; continuing to persist");
                }
            },
            None => info!("no high-value novelty; skipping notification mail"),
        }

        if let Err(err) = self.snapshots.save(&current).await {
            error!(error = ?err, "snapshot persistence failed; this run's results are lost");
        }

        Ok(RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            fetched_records,
            new_records,
            high_value_records,
            keyword_hits: keyword_hits.len(),
            mail_sent,
        })
    }

    /// Fetches and parses every source in fixed order. A failed source
    /// contributes an empty list and the run continues.
    async fn build_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for info in &SOURCES {
            info!(store = info.key.as_str(), "fetching {}", info.display_name);
            let records = match self.collect_source(info).await {
                Ok(records) => records,
                Err(err) => {
                    error!(
                        store = info.key.as_str(),
                        error = ?err,
                        "source failed; contributing an empty list"
                    );
                    Vec::new()
                }
            };
            info!(
                store = info.key.as_str(),
                count = records.len(),
                "valid records extracted"
            );
            for record in records.iter().take(3) {
                info!(
                    store = info.key.as_str(),
                    "  {} ({})",
                    sample_name(record),
                    record.price
                );
            }
            snapshot.insert(info.key, records);
        }
        snapshot
    }

    async fn collect_source(&self, info: &StoreInfo) -> Result<Vec<ProductRecord>> {
        let html = self
            .fetcher
            .fetch_page(info.key, info.catalog_url)
            .await
            .with_context(|| format!("fetching {}", info.display_name))?;

        let base_url = Url::parse(info.base_url).context("parsing source base url")?;
        let ctx = ParseContext::new(base_url, Utc::now());
        let candidates = parser_for_store(info.key).parse(&html, &ctx);
        let records: Vec<_> = candidates
            .into_iter()
            .filter(is_valid_record)
            .collect();

        // Politeness pause before the next source.
        tokio::time::sleep(self.config.source_pause).await;
        Ok(records)
    }
}

fn sample_name(record: &ProductRecord) -> String {
    record.name.chars().take(50).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gmw_core::StoreKey;

    fn record(store: StoreKey, name: &str, price: &str) -> ProductRecord {
        ProductRecord::new(
            store,
            name,
            price.to_string(),
            "https://x/1".to_string(),
            Utc::now(),
        )
    }

    fn snapshot_of(store: StoreKey, records: Vec<ProductRecord>) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(store, records);
        snapshot
    }

    #[test]
    fn first_run_high_value_record_composes_report() {
        let current = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        let novelty = diff_snapshots(&current, &Snapshot::new());
        let high_value = filter_high_value(&novelty);
        let hits = detect_keyword_matches(&novelty);
        let report = compose_report(&high_value, &hits, Utc::now()).expect("report");
        assert_eq!(report.high_value_total, 1);
        assert!(report.subject.contains("1件"));
    }

    #[test]
    fn unchanged_snapshot_composes_nothing() {
        let current = snapshot_of(
            StoreKey::Ikebe,
            vec![record(StoreKey::Ikebe, "Gibson J-45 Vintage", "¥120,000")],
        );
        let previous = current.clone();
        let novelty = diff_snapshots(&current, &previous);
        assert!(novelty.is_empty());
        let report = compose_report(
            &filter_high_value(&novelty),
            &detect_keyword_matches(&novelty),
            Utc::now(),
        );
        assert_eq!(report, None);
    }

    #[test]
    fn below_threshold_novelty_composes_nothing() {
        let current = snapshot_of(
            StoreKey::Qsic,
            vec![record(StoreKey::Qsic, "ARIA A-30 Student Model", "¥80,000")],
        );
        let novelty = diff_snapshots(&current, &Snapshot::new());
        assert_eq!(novelty.values().map(Vec::len).sum::<usize>(), 1);
        let report = compose_report(
            &filter_high_value(&novelty),
            &detect_keyword_matches(&novelty),
            Utc::now(),
        );
        assert_eq!(report, None);
    }

    // A high-value keyword record lands in both the highlight header and
    // the per-source listing.
    #[test]
    fn keyword_record_appears_twice_in_report() {
        let name = "Ramirez 1970s ダブルトップ Classical";
        let current = snapshot_of(StoreKey::Jguitar, vec![record(StoreKey::Jguitar, name, "¥200,000")]);
        let novelty = diff_snapshots(&current, &Snapshot::new());
        let report = compose_report(
            &filter_high_value(&novelty),
            &detect_keyword_matches(&novelty),
            Utc::now(),
        )
        .expect("report");
        assert_eq!(report.body.matches(name).count(), 2);
    }
}
