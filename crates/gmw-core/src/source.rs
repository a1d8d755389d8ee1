//! The five monitored retail catalog pages.
//!
//! The source set is fixed: parsers are written against each site's concrete
//! markup shape, so adding a source means writing a parser for it.

use serde::{Deserialize, Serialize};

/// Identifier of one monitored source.
///
/// Serialized as the lowercase key (`ikebe`, `kurosawa`, ...) both in the
/// persisted snapshot document and in record ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKey {
    Ikebe,
    Kurosawa,
    Shimamura,
    Qsic,
    Jguitar,
}

/// Static description of one source: where its catalog lives and how it is
/// presented to humans.
#[derive(Debug, Clone, Copy)]
pub struct StoreInfo {
    pub key: StoreKey,
    pub display_name: &'static str,
    pub catalog_url: &'static str,
    pub base_url: &'static str,
}

/// All monitored sources, in the fixed fetch order.
pub const SOURCES: [StoreInfo; 5] = [
    StoreInfo {
        key: StoreKey::Ikebe,
        display_name: "イケベ楽器店",
        catalog_url: "https://www.ikebe-gakki.com/Form/Product/ProductList.aspx?shop=0&cat=agt003&bid=ec&dpcnt=20&img=1&sort=07&udns=1&fpfl=0&sfl=0&pno=1",
        base_url: "https://www.ikebe-gakki.com",
    },
    StoreInfo {
        key: StoreKey::Kurosawa,
        display_name: "黒澤楽器店",
        catalog_url: "https://shop.kurosawagakki.com/items/search/classic-guitar",
        base_url: "https://shop.kurosawagakki.com",
    },
    StoreInfo {
        key: StoreKey::Shimamura,
        display_name: "島村楽器",
        catalog_url: "https://store.shimamura.co.jp/ec/Facet?category_0=11040000000",
        base_url: "https://store.shimamura.co.jp",
    },
    StoreInfo {
        key: StoreKey::Qsic,
        display_name: "QSic",
        catalog_url: "https://www.qsic.jp/?mode=cate&cbid=790427&csid=0&sort=n",
        base_url: "https://www.qsic.jp",
    },
    StoreInfo {
        key: StoreKey::Jguitar,
        display_name: "J-Guitar",
        catalog_url: "https://www.j-guitar.com/products/list.php?category_id=103&category_id1=1",
        base_url: "https://www.j-guitar.com",
    },
];

impl StoreKey {
    /// The lowercase key used in ids and in the persisted document.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Ikebe => "ikebe",
            StoreKey::Kurosawa => "kurosawa",
            StoreKey::Shimamura => "shimamura",
            StoreKey::Qsic => "qsic",
            StoreKey::Jguitar => "jguitar",
        }
    }

    pub fn info(&self) -> &'static StoreInfo {
        match self {
            StoreKey::Ikebe => &SOURCES[0],
            StoreKey::Kurosawa => &SOURCES[1],
            StoreKey::Shimamura => &SOURCES[2],
            StoreKey::Qsic => &SOURCES[3],
            StoreKey::Jguitar => &SOURCES[4],
        }
    }

    pub fn display_name(&self) -> &'static str {
        self.info().display_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_table_is_consistent() {
        for info in &SOURCES {
            assert_eq!(info.key.info().catalog_url, info.catalog_url);
            assert!(info.catalog_url.starts_with(info.base_url));
        }
    }

    #[test]
    fn store_key_serializes_as_lowercase_key() {
        let json = serde_json::to_string(&StoreKey::Jguitar).unwrap();
        assert_eq!(json, "\"jguitar\"");
        let back: StoreKey = serde_json::from_str("\"kurosawa\"").unwrap();
        assert_eq!(back, StoreKey::Kurosawa);
    }
}
