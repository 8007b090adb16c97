//! Cart operations.

use common::{CartLineId, ProductId, UserId};
use domain::CartLine;
use store::{Store, UnitOfWork};

use crate::error::CheckoutError;
use crate::service::{CartEntry, CheckoutService};

impl<S: Store> CheckoutService<S> {
    /// Adds a product to the caller's cart, merging into an existing line.
    ///
    /// The cart is created lazily on the first add.
    #[tracing::instrument(skip(self))]
    pub async fn add_to_cart(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartLine, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidArgument(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let mut uow = self.begin().await?;

        if uow.product(product_id).await?.is_none() {
            return Err(CheckoutError::NotFound("product"));
        }

        let cart = uow.ensure_cart(user_id).await?;
        let line = match uow.cart_line_for_product(cart.id, product_id).await? {
            Some(mut line) => {
                line.merge(quantity);
                uow.update_cart_line_quantity(line.id, line.quantity).await?;
                line
            }
            None => {
                let line = CartLine::new(cart.id, product_id, quantity);
                uow.insert_cart_line(&line).await?;
                line
            }
        };

        uow.commit().await?;
        Ok(line)
    }

    /// Lists the caller's cart lines with product snapshots.
    ///
    /// An absent cart is an empty cart, not an error.
    #[tracing::instrument(skip(self))]
    pub async fn list_cart(&self, user_id: UserId) -> Result<Vec<CartEntry>, CheckoutError> {
        let mut uow = self.begin().await?;

        let mut entries = Vec::new();
        for line in uow.cart_lines(user_id).await? {
            let product = uow
                .product(line.product_id)
                .await?
                .ok_or(CheckoutError::NotFound("product"))?;
            entries.push(CartEntry { line, product });
        }

        uow.commit().await?;
        Ok(entries)
    }

    /// Removes one line from the caller's cart.
    #[tracing::instrument(skip(self))]
    pub async fn remove_cart_line(
        &self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<(), CheckoutError> {
        let mut uow = self.begin().await?;

        let line = uow
            .cart_line_owned(user_id, line_id)
            .await?
            .ok_or(CheckoutError::NotFound("cart line"))?;
        uow.delete_cart_line(line.id).await?;

        uow.commit().await?;
        Ok(())
    }

    /// Empties the caller's cart. Idempotent.
    #[tracing::instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), CheckoutError> {
        let mut uow = self.begin().await?;
        uow.clear_cart(user_id).await?;
        uow.commit().await?;
        Ok(())
    }
}
