//! Core domain model for Guitar Market Watch: the monitored sources, the
//! canonical listing record, price normalization and record validation.

pub mod keywords;
pub mod price;
pub mod record;
pub mod source;
pub mod validate;

pub const CRATE_NAME: &str = "gmw-core";

pub use keywords::{has_special_keyword, KeywordHit, SPECIAL_KEYWORDS};
pub use price::{extract_price, extract_price_value, group_thousands};
pub use record::{record_id, ProductRecord, Snapshot, HIGH_VALUE_THRESHOLD};
pub use source::{StoreInfo, StoreKey, SOURCES};
pub use validate::is_valid_record;
