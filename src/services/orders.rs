#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Order workflows.
//!
//! `create_order` runs validation, user lookup, stock checks, reservation
//! and persistence as one outcome pipeline. Every stock check happens before
//! the first reservation, so a request that cannot be fulfilled leaves all
//! stock untouched.

use super::{into_validation_error, require, ProductService, UserService};
use crate::collect::{combine_all, traverse_async, traverse_parallel};
use crate::domain::{
    Order, OrderId, OrderLine, OrderRequest, OrderStatus, RequestedItem, UserId,
};
use crate::error::{AppError, AppOutcome};
use crate::outcome::{failure, Outcome, OutcomeFutureExt};
use crate::store::Storage;
use chrono::Utc;
use itertools::Itertools;
use std::iter;
use std::sync::Arc;
use tracing::{info, warn};

const MAX_LINE_QUANTITY: u32 = 1000;

pub struct OrderService {
    store: Arc<dyn Storage>,
    users: UserService,
    products: ProductService,
}

fn validate_order_request(request: OrderRequest) -> AppOutcome<OrderRequest> {
    let quantity_checks = request.items.iter().enumerate().map(|(index, item)| {
        require(
            (1..=MAX_LINE_QUANTITY).contains(&item.quantity),
            format!("items[{index}].quantity"),
            format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
        )
    });
    let checks = iter::once(require(
        !request.items.is_empty(),
        "items",
        "Order must contain at least one item",
    ))
    .chain(quantity_checks);

    combine_all(checks)
        .map_error(into_validation_error)
        .map(|_| request)
}

/// Merges repeated products into one line each, keeping first-seen order.
fn merge_items(items: &[RequestedItem]) -> Vec<RequestedItem> {
    items
        .iter()
        .map(|item| item.product_id)
        .unique()
        .map(|product_id| {
            let quantity = items
                .iter()
                .filter(|item| item.product_id == product_id)
                .fold(0u32, |sum, item| sum.saturating_add(item.quantity));
            RequestedItem::new(product_id, quantity)
        })
        .collect()
}

fn new_order(user_id: UserId, lines: Vec<OrderLine>) -> Order {
    let total_cents = lines
        .iter()
        .map(OrderLine::subtotal_cents)
        .fold(0u64, u64::saturating_add);
    Order {
        id: OrderId::generate(),
        user_id,
        lines,
        total_cents,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    }
}

impl OrderService {
    #[must_use]
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self {
            users: UserService::new(Arc::clone(&store)),
            products: ProductService::new(Arc::clone(&store)),
            store,
        }
    }

    pub async fn create_order(&self, request: OrderRequest) -> AppOutcome<Order> {
        validate_order_request(request)
            .into_async()
            .bind(|request| async move {
                self.users
                    .get_user(request.user_id)
                    .await
                    .map(|user| (user.id, merge_items(&request.items)))
            })
            .bind(|(user_id, items)| async move {
                traverse_async(items, |item| self.check_stock(item))
                    .await
                    .map(|lines| (user_id, lines))
            })
            .bind(|(user_id, lines)| async move {
                self.reserve_lines(lines)
                    .await
                    .map(|lines| new_order(user_id, lines))
            })
            .map_async(|order| self.store.insert_order(order))
            .tap(|order| {
                info!(
                    order_id = %order.id,
                    user_id = %order.user_id,
                    total_cents = order.total_cents,
                    "order created"
                );
            })
            .tap_error(|error| warn!(code = error.code(), %error, "order rejected"))
            .await
    }

    /// Submits every request with at most `max_concurrency` in flight.
    ///
    /// All requests run to completion even when an earlier one fails, so
    /// orders after the reported failure may still have been stored.
    pub async fn create_orders_bulk(
        &self,
        requests: Vec<OrderRequest>,
        max_concurrency: usize,
    ) -> AppOutcome<Vec<Order>> {
        traverse_parallel(
            requests,
            |request| self.create_order(request),
            max_concurrency,
        )
        .await
    }

    pub async fn get_order(&self, id: OrderId) -> AppOutcome<Order> {
        let found = self.store.get_order(id).await;
        Outcome::from_option(found, || AppError::not_found("Order", id))
    }

    pub async fn orders_for_user(&self, user_id: UserId) -> AppOutcome<Vec<Order>> {
        self.users
            .get_user(user_id)
            .async_outcome()
            .map_async(|user| async move {
                self.store
                    .list_orders()
                    .await
                    .into_iter()
                    .filter(|order| order.user_id == user.id)
                    .collect::<Vec<_>>()
            })
            .await
    }

    /// Moves an order one step forward in its lifecycle.
    pub async fn advance_status(&self, id: OrderId) -> AppOutcome<Order> {
        self.get_order(id)
            .async_outcome()
            .bind_sync(|order| {
                Outcome::from_option(order.status.next(), || {
                    AppError::invalid_operation(
                        "advance order",
                        format!("order is already {}", order.status),
                    )
                })
                .map(|status| Order { status, ..order })
            })
            .bind(|order| self.save(order))
            .tap(|order| info!(order_id = %order.id, status = %order.status, "order advanced"))
            .await
    }

    /// Cancels a pending or confirmed order and puts its stock back.
    pub async fn cancel_order(&self, id: OrderId) -> AppOutcome<Order> {
        self.get_order(id)
            .async_outcome()
            .ensure(
                |order| order.status.is_cancellable(),
                |order| {
                    AppError::invalid_operation("cancel order", format!("order is {}", order.status))
                },
            )
            .bind(|order| async move {
                self.release_lines(&order.lines).await;
                self.save(Order {
                    status: OrderStatus::Cancelled,
                    ..order
                })
                .await
            })
            .tap(|order| info!(order_id = %order.id, "order cancelled"))
            .await
    }

    async fn check_stock(&self, item: RequestedItem) -> AppOutcome<OrderLine> {
        self.products
            .get_product(item.product_id)
            .await
            .ensure(
                |product| product.has_stock_for(item.quantity),
                |product| AppError::insufficient_stock(&product.name, item.quantity, product.stock),
            )
            .map(|product| OrderLine {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                unit_price_cents: product.price_cents,
            })
    }

    /// Reserves stock line by line. When a line cannot be reserved, the
    /// lines already reserved are released before the error is returned.
    async fn reserve_lines(&self, lines: Vec<OrderLine>) -> AppOutcome<Vec<OrderLine>> {
        for (reserved, line) in lines.iter().enumerate() {
            let outcome = self
                .products
                .reserve_stock(line.product_id, line.quantity)
                .await;
            if let Outcome::Failure(error) = outcome {
                warn!(product_id = %line.product_id, %error, "reservation failed, rolling back");
                self.release_lines(&lines[..reserved]).await;
                return failure(error);
            }
        }
        Outcome::success(lines)
    }

    async fn release_lines(&self, lines: &[OrderLine]) {
        for line in lines {
            let outcome = self
                .products
                .release_stock(line.product_id, line.quantity)
                .await;
            if let Outcome::Failure(error) = outcome {
                warn!(product_id = %line.product_id, %error, "could not release stock");
            }
        }
    }

    async fn save(&self, order: Order) -> AppOutcome<Order> {
        let id = order.id;
        let saved = self.store.update_order(order).await;
        Outcome::from_option(saved, || AppError::not_found("Order", id))
    }
}
