//! Read-only projections of host inventory records.
//!
//! The host record store owns these rows. The sync service only reads fields
//! off them to build documents.

use serde::{Deserialize, Serialize};

/// Product referenced by a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: i64,
    /// Display name of the product.
    pub name: Option<String>,
    /// Internal reference (SKU).
    pub default_code: Option<String>,
}

/// A production lot / serial number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotRecord {
    pub id: i64,
    /// Lot name as typed by users, e.g. `LOT-2024/07`.
    pub name: Option<String>,
    /// Product the lot belongs to, absent for orphaned rows.
    pub product: Option<ProductRef>,
}

impl LotRecord {
    /// Create a lot with a name and no product.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            product: None,
        }
    }

    /// Create a lot that only carries its identifier.
    ///
    /// This is enough to remove the lot from an index.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            name: None,
            product: None,
        }
    }

    /// Attach a product.
    pub fn with_product(mut self, product: ProductRef) -> Self {
        self.product = Some(product);
        self
    }
}

impl ProductRef {
    /// Create a product reference.
    pub fn new(id: i64, name: Option<String>, default_code: Option<String>) -> Self {
        Self {
            id,
            name,
            default_code,
        }
    }
}
