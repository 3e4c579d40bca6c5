use meili_sync_shared::{IndexDocument, IndexSettings, LotRecord};

use super::DocumentAdapter;

/// Index holding production lots.
pub const LOTS_INDEX: &str = "lots";

const SEARCHABLE_ATTRIBUTES: [&str; 5] = [
    "lot_name",
    "lot_name_digits",
    "sku",
    "product_name",
    "searchable_text",
];
const FILTERABLE_ATTRIBUTES: [&str; 2] = ["product_id", "sku"];
const SEPARATOR_TOKENS: [&str; 4] = ["-", "/", "_", "."];

/// Numeric-only projection of a free-text value.
///
/// Every run of non-digit characters becomes a single space and the result is
/// trimmed, so `"LOT-2024/07"` becomes `"2024 07"`. Lets users find a lot by
/// typing only the numbers in its name.
pub fn digits_only(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Adapter for production lots.
///
/// Emits `id`, `lot_id`, `lot_name`, `lot_name_digits`, `product_id`,
/// `product_name`, `sku` and `searchable_text`, all as strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct LotAdapter;

impl LotAdapter {
    pub fn new() -> Self {
        Self
    }

    fn document(&self, lot: &LotRecord) -> IndexDocument {
        let lot_name = lot.name.clone().unwrap_or_default();
        let (product_id, product_name, sku) = match &lot.product {
            Some(product) => (
                product.id.to_string(),
                product.name.clone().unwrap_or_default(),
                product.default_code.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };
        let searchable_text = format!("{} {}", lot_name, sku).trim().to_string();

        IndexDocument::new(self.document_id(lot))
            .with_field("lot_id", lot.id.to_string())
            .with_field("lot_name_digits", digits_only(&lot_name))
            .with_field("lot_name", lot_name)
            .with_field("product_id", product_id)
            .with_field("product_name", product_name)
            .with_field("sku", sku)
            .with_field("searchable_text", searchable_text)
    }
}

impl DocumentAdapter for LotAdapter {
    type Record = LotRecord;

    fn index_id(&self) -> &str {
        LOTS_INDEX
    }

    fn record_label(&self) -> &str {
        "lots"
    }

    fn document_id(&self, record: &LotRecord) -> String {
        record.id.to_string()
    }

    fn produce_documents(&self, records: &[LotRecord]) -> Vec<IndexDocument> {
        records.iter().map(|lot| self.document(lot)).collect()
    }

    fn index_settings(&self) -> Option<IndexSettings> {
        Some(
            IndexSettings::new()
                .with_default_ranking_rules()
                .with_searchable_attributes(&SEARCHABLE_ATTRIBUTES)
                .with_filterable_attributes(&FILTERABLE_ATTRIBUTES)
                .with_separator_tokens(&SEPARATOR_TOKENS),
        )
    }
}
