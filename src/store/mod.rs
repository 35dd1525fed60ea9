#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Storage collaborator.
//!
//! Every call is atomic with respect to concurrent callers and may take a
//! while to complete. Absence is reported as `None`/`false`, never as an
//! error.

mod memory;

pub use memory::InMemoryStore;

use crate::domain::{NewProduct, NewUser, Order, OrderId, Product, ProductId, User, UserId};
use crate::error::AppOutcome;
use std::future::Future;
use std::pin::Pin;

pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Computes a product's new stock level from its current record.
pub type StockRule<'a> = Box<dyn FnOnce(&Product) -> AppOutcome<u32> + Send + 'a>;

pub trait Storage: Send + Sync {
    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>>;
    fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>>;
    fn list_users(&self) -> StoreFuture<'_, Vec<User>>;
    /// Stores a new user under a freshly assigned id. `None` when another
    /// user already holds the same email, compared case-insensitively.
    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, Option<User>>;
    /// Replaces an existing user; `None` when the id is unknown.
    fn update_user(&self, user: User) -> StoreFuture<'_, Option<User>>;
    fn delete_user(&self, id: UserId) -> StoreFuture<'_, bool>;

    fn get_product(&self, id: ProductId) -> StoreFuture<'_, Option<Product>>;
    fn find_product_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<Product>>;
    fn list_products(&self) -> StoreFuture<'_, Vec<Product>>;
    /// `None` when the name is already taken, compared case-insensitively.
    fn insert_product(&self, product: NewProduct) -> StoreFuture<'_, Option<Product>>;
    fn update_product(&self, product: Product) -> StoreFuture<'_, Option<Product>>;
    /// Applies `rule` to the current record and stores the stock it yields,
    /// all under one write. A failing rule leaves the record untouched and
    /// its failure is handed back. `None` when the id is unknown.
    fn adjust_stock<'a>(
        &'a self,
        id: ProductId,
        rule: StockRule<'a>,
    ) -> StoreFuture<'a, Option<AppOutcome<Product>>>;
    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, bool>;

    fn get_order(&self, id: OrderId) -> StoreFuture<'_, Option<Order>>;
    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>>;
    fn insert_order(&self, order: Order) -> StoreFuture<'_, Order>;
    fn update_order(&self, order: Order) -> StoreFuture<'_, Option<Order>>;
}
