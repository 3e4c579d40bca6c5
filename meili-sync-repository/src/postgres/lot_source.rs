use async_trait::async_trait;
use meili_sync_shared::{LotRecord, ProductRef};
use sqlx::PgPool;
use tracing::debug;

use crate::errors::RecordSourceError;
use crate::interfaces::RecordSource;

const SELECT_LOTS: &str = "\
SELECT l.id AS lot_id, l.name AS lot_name, \
       pp.id AS product_id, pt.name AS product_name, pp.default_code AS default_code \
FROM stock_production_lot l \
LEFT JOIN product_product pp ON pp.id = l.product_id \
LEFT JOIN product_template pt ON pt.id = pp.product_tmpl_id";

/// Row shape of the lot query.
#[derive(Debug, Clone, sqlx::FromRow)]
struct LotRow {
    lot_id: i32,
    lot_name: Option<String>,
    product_id: Option<i32>,
    product_name: Option<String>,
    default_code: Option<String>,
}

impl From<LotRow> for LotRecord {
    fn from(row: LotRow) -> Self {
        let product = row.product_id.map(|id| {
            ProductRef::new(i64::from(id), row.product_name, row.default_code)
        });

        LotRecord {
            id: i64::from(row.lot_id),
            name: row.lot_name,
            product,
        }
    }
}

/// Reads production lots with their product from PostgreSQL.
///
/// Joins `stock_production_lot` to `product_product` and `product_template`.
/// Lots without a product are returned with `product: None`.
pub struct PostgresLotSource {
    pool: PgPool,
}

impl PostgresLotSource {
    /// Creates a new lot source over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordSource for PostgresLotSource {
    type Record = LotRecord;

    async fn fetch_all(&self) -> Result<Vec<LotRecord>, RecordSourceError> {
        let query = format!("{} ORDER BY l.id", SELECT_LOTS);
        let rows: Vec<LotRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Fetched all lots");
        Ok(rows.into_iter().map(LotRecord::from).collect())
    }

    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<LotRecord>, RecordSourceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = ids
            .iter()
            .map(|id| {
                i32::try_from(*id)
                    .map_err(|_| RecordSourceError::invalid_record(format!("Lot id {} out of range", id)))
            })
            .collect::<Result<Vec<i32>, _>>()?;

        let query = format!("{} WHERE l.id = ANY($1) ORDER BY l.id", SELECT_LOTS);
        let rows: Vec<LotRow> = sqlx::query_as(&query)
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        debug!(requested = ids.len(), found = rows.len(), "Fetched lots by id");
        Ok(rows.into_iter().map(LotRecord::from).collect())
    }
}
