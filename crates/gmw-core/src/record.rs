//! Canonical listing record and the per-run snapshot shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::price::extract_price_value;
use crate::source::StoreKey;

/// Notification price floor, in yen.
pub const HIGH_VALUE_THRESHOLD: u64 = 100_000;

/// One catalog listing observed in one run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub name: String,
    /// Canonical display price (`¥` + grouped digits); never the placeholder
    /// for validated records.
    pub price: String,
    pub link: String,
    pub store: StoreKey,
    pub store_name: String,
    /// Extraction timestamp; informational only, never part of identity.
    pub found_date: DateTime<Utc>,
}

/// Full observation of all sources in a single run, keyed by source.
///
/// `BTreeMap` keeps the persisted document's key order stable across runs.
pub type Snapshot = BTreeMap<StoreKey, Vec<ProductRecord>>;

impl ProductRecord {
    pub fn new(
        store: StoreKey,
        name: &str,
        price: String,
        link: String,
        found_date: DateTime<Utc>,
    ) -> Self {
        let name = name.trim().to_string();
        Self {
            id: record_id(store, &name),
            store_name: store.display_name().to_string(),
            name,
            price,
            link,
            store,
            found_date,
        }
    }

    /// Numeric value parsed from the canonical price string.
    pub fn price_value(&self) -> u64 {
        extract_price_value(&self.price)
    }

    pub fn is_high_value(&self) -> bool {
        self.price_value() >= HIGH_VALUE_THRESHOLD
    }
}

/// Stable identity for a listing within one source's catalog.
///
/// SHA-256 over the source key and the whitespace-normalized name, truncated
/// to 12 hex characters. The digest is deterministic across process
/// invocations, so novelty detection keeps working between runs. The link is
/// deliberately not hashed: two of the parsers can only assign listing URLs
/// positionally, which would shift ids whenever the catalog reorders.
pub fn record_id(store: StoreKey, name: &str) -> String {
    let normalized = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(store.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(normalized.as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("{}_{}", store.as_str(), &digest[..12])
}
