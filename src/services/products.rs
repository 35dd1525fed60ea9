#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::{into_validation_error, require};
use crate::collect::{combine_all, traverse, traverse_async, traverse_batch};
use crate::domain::{NewProduct, Product, ProductId};
use crate::error::{AppError, AppOutcome};
use crate::outcome::{failure, Outcome, Unit};
use crate::store::{StockRule, Storage};
use std::sync::Arc;
use tap::Pipe;
use tracing::{debug, info};

pub struct ProductService {
    store: Arc<dyn Storage>,
}

fn validate_new_product(input: NewProduct) -> AppOutcome<NewProduct> {
    combine_all([
        require(!input.name.trim().is_empty(), "name", "Name is required"),
        require(input.price_cents > 0, "price", "Price must be positive"),
    ])
    .map_error(into_validation_error)
    .map(|_| input)
}

impl ProductService {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    pub async fn create_product(&self, input: NewProduct) -> AppOutcome<Product> {
        validate_new_product(input)
            .into_async()
            .bind(|input| self.insert_unique(input))
            .await
    }

    pub async fn get_product(&self, id: ProductId) -> AppOutcome<Product> {
        self.store
            .get_product(id)
            .await
            .pipe(|found| Outcome::from_option(found, || AppError::not_found("Product", id)))
    }

    pub async fn list_products(&self) -> Vec<Product> {
        self.store.list_products().await
    }

    pub async fn delete_product(&self, id: ProductId) -> AppOutcome<Unit> {
        if self.store.delete_product(id).await {
            Outcome::unit()
        } else {
            failure(AppError::not_found("Product", id))
        }
    }

    pub async fn restock(&self, id: ProductId, quantity: u32) -> AppOutcome<Product> {
        combine_all([require(quantity > 0, "quantity", "Quantity must be positive")])
            .map_error(into_validation_error)
            .into_async()
            .bind(|_| self.release_stock(id, quantity))
            .await
    }

    /// Creates products in chunks of `batch_size`. Each chunk is validated as
    /// a whole before any of its products is stored; the first failing chunk
    /// stops the import.
    pub async fn import_products(
        &self,
        products: Vec<NewProduct>,
        batch_size: usize,
    ) -> AppOutcome<Vec<Product>> {
        let total = products.len();
        traverse_batch(products, |batch| self.import_batch(batch), batch_size)
            .await
            .tap(|imported| info!(imported = imported.len(), total, "products imported"))
    }

    async fn import_batch(&self, batch: Vec<NewProduct>) -> AppOutcome<Vec<Product>> {
        traverse(batch, validate_new_product)
            .into_async()
            .bind(|valid| traverse_async(valid, |input| self.insert_unique(input)))
            .await
    }

    async fn insert_unique(&self, input: NewProduct) -> AppOutcome<Product> {
        let name = input.name.clone();
        Outcome::from_option(self.store.insert_product(input).await, || {
            AppError::duplicate("name", name)
        })
        .tap(|product| info!(product_id = %product.id, name = %product.name, "product created"))
    }

    /// Takes `quantity` units out of stock.
    pub(crate) async fn reserve_stock(&self, id: ProductId, quantity: u32) -> AppOutcome<Product> {
        self.update_stock(
            id,
            Box::new(move |product: &Product| -> AppOutcome<u32> {
                Outcome::success(product.stock)
                    .ensure(
                        |stock| *stock >= quantity,
                        |stock| AppError::insufficient_stock(&product.name, quantity, *stock),
                    )
                    .map(|stock| stock - quantity)
            }),
        )
        .await
    }

    /// Puts `quantity` units back into stock.
    pub(crate) async fn release_stock(&self, id: ProductId, quantity: u32) -> AppOutcome<Product> {
        self.update_stock(
            id,
            Box::new(move |product: &Product| -> AppOutcome<u32> {
                Outcome::success(product.stock.saturating_add(quantity))
            }),
        )
        .await
    }

    async fn update_stock(&self, id: ProductId, rule: StockRule<'_>) -> AppOutcome<Product> {
        let adjusted = self.store.adjust_stock(id, rule).await;
        Outcome::from_option(adjusted, || AppError::not_found("Product", id))
            .flatten()
            .tap(|product| debug!(product_id = %id, stock = product.stock, "stock updated"))
    }
}
