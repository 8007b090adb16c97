//! Admin stock tools and the best-effort audit path.

use chrono::Utc;
use common::{ProductId, UserId};
use domain::{AuditRecord, StockError, StockRecord};
use store::{Store, UnitOfWork};

use crate::error::CheckoutError;
use crate::service::CheckoutService;

impl<S: Store> CheckoutService<S> {
    /// Returns the stock record for a product.
    #[tracing::instrument(skip(self))]
    pub async fn stock_level(&self, product_id: ProductId) -> Result<StockRecord, CheckoutError> {
        let mut uow = self.begin().await?;
        let record = uow
            .stock_for_update(product_id)
            .await?
            .ok_or(CheckoutError::NotFound("stock record"))?;
        uow.commit().await?;
        Ok(record)
    }

    /// Sets a product's stock to an absolute quantity (admin).
    ///
    /// Creates the stock record when the product is stocked for the first
    /// time. Fails with `InvalidArgument` on a negative target.
    #[tracing::instrument(skip(self))]
    pub async fn set_stock(
        &self,
        admin_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<StockRecord, CheckoutError> {
        let mut uow = self.begin().await?;

        if uow.product(product_id).await?.is_none() {
            return Err(CheckoutError::NotFound("product"));
        }

        let (record, old_quantity) = match uow.stock_for_update(product_id).await? {
            Some(mut record) => {
                let old = record.quantity;
                record.set_quantity(quantity).map_err(invalid_argument)?;
                (record, Some(old))
            }
            None => {
                let quantity =
                    u32::try_from(quantity).map_err(|_| invalid_argument(StockError::NegativeQuantity(quantity)))?;
                (StockRecord::new(product_id, quantity), None)
            }
        };
        uow.upsert_stock(&record).await?;
        uow.commit().await?;

        metrics::counter!("stock_manual_edits_total").increment(1);
        self.audit_stock_edit(admin_id, product_id, old_quantity, record.quantity)
            .await;
        Ok(record)
    }

    /// Adjusts a product's stock by a signed delta (admin).
    ///
    /// Fails with `InvalidArgument` when the result would be negative.
    #[tracing::instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        admin_id: UserId,
        product_id: ProductId,
        delta: i64,
    ) -> Result<StockRecord, CheckoutError> {
        let mut uow = self.begin().await?;

        let mut record = uow
            .stock_for_update(product_id)
            .await?
            .ok_or(CheckoutError::NotFound("stock record"))?;
        let old_quantity = record.quantity;
        record.adjust(delta).map_err(invalid_argument)?;
        uow.upsert_stock(&record).await?;
        uow.commit().await?;

        metrics::counter!("stock_manual_edits_total").increment(1);
        self.audit_stock_edit(admin_id, product_id, Some(old_quantity), record.quantity)
            .await;
        Ok(record)
    }

    /// Appends an audit entry for a manual stock edit, after the edit has
    /// committed.
    ///
    /// Deliberately non-fatal: the stock change is already durable, so an
    /// append failure is logged and swallowed rather than surfaced.
    async fn audit_stock_edit(
        &self,
        admin_id: UserId,
        product_id: ProductId,
        old_quantity: Option<u32>,
        new_quantity: u32,
    ) {
        let record = AuditRecord::new(
            Some(admin_id),
            Utc::now(),
            "manual stock edit",
            "stock_records",
            old_quantity.map(|q| q.to_string()),
            Some(new_quantity.to_string()),
        );

        let result: Result<(), CheckoutError> = async {
            let mut uow = self.begin().await?;
            uow.append_audit(&record).await?;
            uow.commit().await?;
            Ok(())
        }
        .await;

        if let Err(err) = result {
            tracing::warn!(%err, %product_id, "audit append failed; stock edit already committed");
        }
    }
}

fn invalid_argument(err: StockError) -> CheckoutError {
    CheckoutError::InvalidArgument(err.to_string())
}
