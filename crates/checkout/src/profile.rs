//! Catalog reads, profile CRUD and the audit-trail readout.
//!
//! Simple field-level persistence around the core workflow: products are
//! read (plus one admin create), addresses and payment methods are owned
//! by their user, and the audit trail is append-only elsewhere and
//! read-only here.

use chrono::Utc;
use common::{AddressId, Money, PaymentMethodId, PaymentMethodTypeId, ProductId, UserId};
use domain::{Address, AuditRecord, PaymentMethodType, Product, SavedPaymentMethod};
use store::{Store, UnitOfWork};

use crate::error::CheckoutError;
use crate::service::CheckoutService;

/// Input for creating a catalog product (admin).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price: Money,
    pub category: Option<String>,
}

/// Partial update of a catalog product (admin); `None` keeps the current
/// value.
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
}

/// Input for saving an address.
#[derive(Debug, Clone, Default)]
pub struct NewAddress {
    pub province: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub postal_code: Option<String>,
}

/// Input for saving a payment method.
#[derive(Debug, Clone)]
pub struct NewPaymentMethod {
    pub type_id: PaymentMethodTypeId,
    pub holder: Option<String>,
    pub last4: Option<String>,
    pub expiry: Option<String>,
}

impl<S: Store> CheckoutService<S> {
    /// Creates a catalog product (admin).
    #[tracing::instrument(skip(self, input))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, CheckoutError> {
        let product = Product::new(
            input.name,
            input.description,
            input.brand,
            input.price,
            input.category,
            Utc::now(),
        );

        let mut uow = self.begin().await?;
        uow.insert_product(&product).await?;
        uow.commit().await?;
        Ok(product)
    }

    /// Updates a catalog product's fields (admin).
    #[tracing::instrument(skip(self, changes))]
    pub async fn update_product(
        &self,
        id: ProductId,
        changes: UpdateProduct,
    ) -> Result<Product, CheckoutError> {
        let mut uow = self.begin().await?;

        let mut product = uow
            .product(id)
            .await?
            .ok_or(CheckoutError::NotFound("product"))?;
        if let Some(name) = changes.name {
            product.name = name;
        }
        if let Some(description) = changes.description {
            product.description = Some(description);
        }
        if let Some(brand) = changes.brand {
            product.brand = Some(brand);
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(category) = changes.category {
            product.category = Some(category);
        }

        uow.update_product(&product).await?;
        uow.commit().await?;
        Ok(product)
    }

    /// Lists the catalog.
    #[tracing::instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, CheckoutError> {
        let mut uow = self.begin().await?;
        let products = uow.products().await?;
        uow.commit().await?;
        Ok(products)
    }

    /// Returns one product.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CheckoutError> {
        let mut uow = self.begin().await?;
        let product = uow
            .product(id)
            .await?
            .ok_or(CheckoutError::NotFound("product"))?;
        uow.commit().await?;
        Ok(product)
    }

    /// Saves an address for the caller.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_address(
        &self,
        user_id: UserId,
        input: NewAddress,
    ) -> Result<Address, CheckoutError> {
        let address = Address {
            id: AddressId::new(),
            user_id,
            province: input.province,
            city: input.city,
            street: input.street,
            number: input.number,
            postal_code: input.postal_code,
        };

        let mut uow = self.begin().await?;
        uow.insert_address(&address).await?;
        uow.commit().await?;
        Ok(address)
    }

    /// Lists the caller's saved addresses.
    #[tracing::instrument(skip(self))]
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, CheckoutError> {
        let mut uow = self.begin().await?;
        let addresses = uow.addresses_for_user(user_id).await?;
        uow.commit().await?;
        Ok(addresses)
    }

    /// Saves a payment method for the caller.
    ///
    /// The type must be one of the seeded payment-method types.
    #[tracing::instrument(skip(self, input))]
    pub async fn create_payment_method(
        &self,
        user_id: UserId,
        input: NewPaymentMethod,
    ) -> Result<SavedPaymentMethod, CheckoutError> {
        let mut uow = self.begin().await?;

        uow.payment_method_type(input.type_id)
            .await?
            .ok_or(CheckoutError::NotFound("payment method type"))?;

        let method = SavedPaymentMethod {
            id: PaymentMethodId::new(),
            user_id,
            type_id: input.type_id,
            holder: input.holder,
            last4: input.last4,
            expiry: input.expiry,
        };
        uow.insert_payment_method(&method).await?;
        uow.commit().await?;
        Ok(method)
    }

    /// Lists the caller's saved payment methods.
    #[tracing::instrument(skip(self))]
    pub async fn list_payment_methods(
        &self,
        user_id: UserId,
    ) -> Result<Vec<SavedPaymentMethod>, CheckoutError> {
        let mut uow = self.begin().await?;
        let methods = uow.payment_methods_for_user(user_id).await?;
        uow.commit().await?;
        Ok(methods)
    }

    /// Lists the seeded payment-method types.
    #[tracing::instrument(skip(self))]
    pub async fn list_payment_method_types(
        &self,
    ) -> Result<Vec<PaymentMethodType>, CheckoutError> {
        let mut uow = self.begin().await?;
        let types = uow.payment_method_types().await?;
        uow.commit().await?;
        Ok(types)
    }

    /// Lists the audit trail, newest first (admin).
    #[tracing::instrument(skip(self))]
    pub async fn audit_trail(&self) -> Result<Vec<AuditRecord>, CheckoutError> {
        let mut uow = self.begin().await?;
        let records = uow.audit_records().await?;
        uow.commit().await?;
        Ok(records)
    }
}
