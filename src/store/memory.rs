#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

use super::{StockRule, Storage, StoreFuture};
use crate::domain::{NewProduct, NewUser, Order, OrderId, Product, ProductId, User, UserId};
use crate::error::AppOutcome;
use crate::outcome::Outcome;
use chrono::Utc;
use rpds::RedBlackTreeMapSync;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct Tables {
    users: RedBlackTreeMapSync<UserId, User>,
    products: RedBlackTreeMapSync<ProductId, Product>,
    orders: RedBlackTreeMapSync<OrderId, Order>,
    next_user_id: u64,
    next_product_id: u64,
}

impl Tables {
    fn empty() -> Self {
        Self {
            users: RedBlackTreeMapSync::new_sync(),
            products: RedBlackTreeMapSync::new_sync(),
            orders: RedBlackTreeMapSync::new_sync(),
            next_user_id: 1,
            next_product_id: 1,
        }
    }

    fn add_user(&mut self, user: NewUser) -> User {
        let id = UserId::new(self.next_user_id);
        self.next_user_id += 1;
        let user = User {
            id,
            name: user.name,
            email: user.email,
            created_at: Utc::now(),
        };
        self.users.insert_mut(id, user.clone());
        user
    }

    fn email_taken(&self, email: &str) -> bool {
        self.users
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(email))
    }

    fn name_taken(&self, name: &str) -> bool {
        self.products
            .values()
            .any(|product| product.name.eq_ignore_ascii_case(name))
    }

    fn add_product(&mut self, product: NewProduct) -> Product {
        let id = ProductId::new(self.next_product_id);
        self.next_product_id += 1;
        let product = Product {
            id,
            name: product.name,
            price_cents: product.price_cents,
            stock: product.stock,
        };
        self.products.insert_mut(id, product.clone());
        product
    }
}

/// In-memory storage. Tables are persistent maps, so a reader clones a
/// whole snapshot under the lock and never sees a half-applied write.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    latency: Duration,
}

impl InMemoryStore {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::empty()),
            latency,
        }
    }

    /// A store pre-filled with three users and four products.
    #[must_use]
    pub fn seeded(latency: Duration) -> Self {
        let mut tables = Tables::empty();
        for (name, email) in [
            ("Alice Johnson", "alice@example.com"),
            ("Bob Smith", "bob@example.com"),
            ("Carol White", "carol@example.com"),
        ] {
            tables.add_user(NewUser::new(name, email));
        }
        for (name, price_cents, stock) in [
            ("Laptop", 99_999, 5),
            ("Mouse", 2_500, 50),
            ("Keyboard", 7_500, 20),
            ("Monitor", 24_999, 3),
        ] {
            tables.add_product(NewProduct::new(name, price_cents, stock));
        }

        Self {
            tables: RwLock::new(tables),
            latency,
        }
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn snapshot(&self) -> Tables {
        self.pause().await;
        self.tables.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Storage for InMemoryStore {
    fn get_user(&self, id: UserId) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move { self.snapshot().await.users.get(&id).cloned() })
    }

    fn find_user_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Option<User>> {
        Box::pin(async move {
            self.snapshot()
                .await
                .users
                .values()
                .find(|user| user.email.eq_ignore_ascii_case(email))
                .cloned()
        })
    }

    fn list_users(&self) -> StoreFuture<'_, Vec<User>> {
        Box::pin(async move { self.snapshot().await.users.values().cloned().collect() })
    }

    fn insert_user(&self, user: NewUser) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            if tables.email_taken(&user.email) {
                debug!(email = %user.email, "user insert refused, email taken");
                return None;
            }
            let user = tables.add_user(user);
            debug!(user_id = %user.id, "user inserted");
            Some(user)
        })
    }

    fn update_user(&self, user: User) -> StoreFuture<'_, Option<User>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            if tables.users.contains_key(&user.id) {
                tables.users.insert_mut(user.id, user.clone());
                Some(user)
            } else {
                None
            }
        })
    }

    fn delete_user(&self, id: UserId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.pause().await;
            self.tables.write().await.users.remove_mut(&id)
        })
    }

    fn get_product(&self, id: ProductId) -> StoreFuture<'_, Option<Product>> {
        Box::pin(async move { self.snapshot().await.products.get(&id).cloned() })
    }

    fn find_product_by_name<'a>(&'a self, name: &'a str) -> StoreFuture<'a, Option<Product>> {
        Box::pin(async move {
            self.snapshot()
                .await
                .products
                .values()
                .find(|product| product.name.eq_ignore_ascii_case(name))
                .cloned()
        })
    }

    fn list_products(&self) -> StoreFuture<'_, Vec<Product>> {
        Box::pin(async move { self.snapshot().await.products.values().cloned().collect() })
    }

    fn insert_product(&self, product: NewProduct) -> StoreFuture<'_, Option<Product>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            if tables.name_taken(&product.name) {
                debug!(name = %product.name, "product insert refused, name taken");
                return None;
            }
            let product = tables.add_product(product);
            debug!(product_id = %product.id, "product inserted");
            Some(product)
        })
    }

    fn update_product(&self, product: Product) -> StoreFuture<'_, Option<Product>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            if tables.products.contains_key(&product.id) {
                tables.products.insert_mut(product.id, product.clone());
                Some(product)
            } else {
                None
            }
        })
    }

    fn adjust_stock<'a>(
        &'a self,
        id: ProductId,
        rule: StockRule<'a>,
    ) -> StoreFuture<'a, Option<AppOutcome<Product>>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            let current = tables.products.get(&id).cloned()?;
            let adjusted = rule(&current).map(|stock| Product { stock, ..current });
            if let Outcome::Success(product) = &adjusted {
                tables.products.insert_mut(id, product.clone());
                debug!(product_id = %id, stock = product.stock, "stock adjusted");
            }
            Some(adjusted)
        })
    }

    fn delete_product(&self, id: ProductId) -> StoreFuture<'_, bool> {
        Box::pin(async move {
            self.pause().await;
            self.tables.write().await.products.remove_mut(&id)
        })
    }

    fn get_order(&self, id: OrderId) -> StoreFuture<'_, Option<Order>> {
        Box::pin(async move { self.snapshot().await.orders.get(&id).cloned() })
    }

    fn list_orders(&self) -> StoreFuture<'_, Vec<Order>> {
        Box::pin(async move { self.snapshot().await.orders.values().cloned().collect() })
    }

    fn insert_order(&self, order: Order) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            self.pause().await;
            self.tables
                .write()
                .await
                .orders
                .insert_mut(order.id, order.clone());
            debug!(order_id = %order.id, "order inserted");
            order
        })
    }

    fn update_order(&self, order: Order) -> StoreFuture<'_, Option<Order>> {
        Box::pin(async move {
            self.pause().await;
            let mut tables = self.tables.write().await;
            if tables.orders.contains_key(&order.id) {
                tables.orders.insert_mut(order.id, order.clone());
                Some(order)
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn take_one() -> StockRule<'static> {
        Box::new(|product: &Product| Outcome::success(product.stock - 1))
    }

    #[tokio::test]
    async fn seeded_store_has_users_and_products() {
        let store = InMemoryStore::seeded(Duration::ZERO);
        assert_eq!(store.list_users().await.len(), 3);
        assert_eq!(store.list_products().await.len(), 4);
        let laptop = store.find_product_by_name("laptop").await.unwrap();
        assert_eq!(laptop.stock, 5);
    }

    #[tokio::test]
    async fn missing_records_are_absent_not_errors() {
        let store = InMemoryStore::default();
        assert!(store.get_user(UserId::new(99)).await.is_none());
        assert!(!store.delete_product(ProductId::new(99)).await);
        let ghost = Product {
            id: ProductId::new(42),
            name: "Ghost".into(),
            price_cents: 1,
            stock: 1,
        };
        assert!(store.update_product(ghost).await.is_none());
    }

    #[tokio::test]
    async fn inserts_assign_increasing_ids() {
        let store = InMemoryStore::default();
        let first = store.insert_user(NewUser::new("A", "a@x.io")).await.unwrap();
        let second = store.insert_user(NewUser::new("B", "b@x.io")).await.unwrap();
        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert!(store.delete_user(first.id).await);
        assert_eq!(store.list_users().await, vec![second]);
    }

    #[tokio::test]
    async fn inserts_refuse_taken_emails_and_names() {
        let store = InMemoryStore::seeded(Duration::ZERO);
        assert!(store
            .insert_user(NewUser::new("Imposter", "BOB@example.com"))
            .await
            .is_none());
        assert!(store
            .insert_product(NewProduct::new("mouse", 1, 1))
            .await
            .is_none());
        assert_eq!(store.list_users().await.len(), 3);
        assert_eq!(store.list_products().await.len(), 4);
    }

    #[tokio::test]
    async fn adjust_stock_applies_rule_or_leaves_record_alone() {
        let store = InMemoryStore::seeded(Duration::ZERO);
        let taken = store
            .adjust_stock(ProductId::new(2), take_one())
            .await
            .unwrap()
            .value();
        assert_eq!(taken.stock, 49);

        let refused = store
            .adjust_stock(
                ProductId::new(2),
                Box::new(|p: &Product| -> AppOutcome<u32> {
                    Outcome::failure(AppError::insufficient_stock(&p.name, 100, p.stock))
                }),
            )
            .await
            .unwrap();
        assert_eq!(refused, Outcome::failure(AppError::insufficient_stock("Mouse", 100, 49)));
        assert_eq!(store.get_product(ProductId::new(2)).await.unwrap().stock, 49);

        assert!(store
            .adjust_stock(ProductId::new(99), take_one())
            .await
            .is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adjustments_are_all_applied() {
        let store = std::sync::Arc::new(InMemoryStore::seeded(Duration::from_millis(1)));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..10 {
            let store = store.clone();
            tasks.spawn(async move {
                store
                    .adjust_stock(ProductId::new(2), take_one())
                    .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            assert!(joined.unwrap().unwrap().is_success());
        }
        assert_eq!(store.get_product(ProductId::new(2)).await.unwrap().stock, 40);
    }

    #[tokio::test]
    async fn snapshots_taken_before_a_write_are_unaffected_by_it() {
        let store = InMemoryStore::seeded(Duration::ZERO);
        let before = store.snapshot().await;
        let mut laptop = before.products.get(&ProductId::new(1)).cloned().unwrap();
        laptop.stock = 0;
        store.update_product(laptop).await.unwrap();

        assert_eq!(before.products.get(&ProductId::new(1)).unwrap().stock, 5);
        assert_eq!(store.get_product(ProductId::new(1)).await.unwrap().stock, 0);
    }
}
