#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! The order pipeline against the in-memory store.

use railway::domain::{OrderRequest, OrderStatus, Product, ProductId, RequestedItem, UserId};
use railway::services::{OrderService, ProductService};
use railway::store::{InMemoryStore, Storage};
use railway::transport::{respond, CREATED};
use railway::AppError;
use std::sync::Arc;
use std::time::Duration;

const LAPTOP: ProductId = ProductId::new(1);
const MOUSE: ProductId = ProductId::new(2);
const KEYBOARD: ProductId = ProductId::new(3);
const ALICE: UserId = UserId::new(1);

fn given_services(latency: Duration) -> (Arc<InMemoryStore>, OrderService, ProductService) {
    let store = Arc::new(InMemoryStore::seeded(latency));
    let shared: Arc<dyn Storage> = store.clone();
    (
        store,
        OrderService::new(Arc::clone(&shared)),
        ProductService::new(shared),
    )
}

async fn stock_of(products: &ProductService, id: ProductId) -> Result<u32, String> {
    products
        .get_product(id)
        .await
        .map(|product| product.stock)
        .into_result()
        .map_err(|error| error.to_string())
}

#[tokio::test]
async fn when_order_exceeds_stock_then_insufficient_stock_and_stock_is_unchanged() -> Result<(), String>
{
    let (_, orders, products) = given_services(Duration::ZERO);

    let outcome = orders
        .create_order(OrderRequest::new(ALICE, vec![RequestedItem::new(LAPTOP, 10)]))
        .await;

    let error = outcome.clone().err().ok_or("expected a failure")?;
    assert_eq!(error, AppError::insufficient_stock("Laptop", 10, 5));
    assert_eq!(stock_of(&products, LAPTOP).await?, 5);

    let response = respond(outcome, CREATED);
    assert_eq!(response.status, 400);
    assert_eq!(response.body["error"]["code"], "INSUFFICIENT_STOCK");
    Ok(())
}

#[tokio::test]
async fn when_order_succeeds_then_stock_is_reserved_and_order_is_pending() -> Result<(), String> {
    let (_, orders, products) = given_services(Duration::ZERO);

    let order = orders
        .create_order(OrderRequest::new(
            ALICE,
            vec![RequestedItem::new(KEYBOARD, 3), RequestedItem::new(MOUSE, 1)],
        ))
        .await
        .into_result()
        .map_err(|error| error.to_string())?;

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.total_cents, 3 * 7_500 + 2_500);
    assert_eq!(stock_of(&products, KEYBOARD).await?, 17);
    assert_eq!(stock_of(&products, MOUSE).await?, 49);
    Ok(())
}

#[tokio::test]
async fn concurrent_orders_against_ample_stock_all_succeed() -> Result<(), String> {
    let (_, orders, products) = given_services(Duration::from_millis(1));
    let requests = (0..10)
        .map(|_| OrderRequest::new(ALICE, vec![RequestedItem::new(MOUSE, 1)]))
        .collect();

    let placed = orders
        .create_orders_bulk(requests, 10)
        .await
        .into_result()
        .map_err(|error| error.to_string())?;

    assert_eq!(placed.len(), 10);
    assert_eq!(stock_of(&products, MOUSE).await?, 40);
    Ok(())
}

#[tokio::test]
async fn concurrent_orders_never_oversell() -> Result<(), String> {
    let (_, orders, products) = given_services(Duration::from_millis(1));
    let requests = (0..8)
        .map(|_| OrderRequest::new(ALICE, vec![RequestedItem::new(LAPTOP, 1)]))
        .collect();

    let outcome = orders.create_orders_bulk(requests, 4).await;

    let error = outcome.err().ok_or("expected a failure")?;
    assert_eq!(error.code(), "INSUFFICIENT_STOCK");
    assert_eq!(stock_of(&products, LAPTOP).await?, 0);
    let placed = orders
        .orders_for_user(ALICE)
        .await
        .into_result()
        .map_err(|error| error.to_string())?;
    assert_eq!(placed.len(), 5);
    Ok(())
}

fn is_whole(product: &Product) -> bool {
    let original = product.name == "Laptop" && product.price_cents == 99_999 && product.stock == 5;
    let rewritten = product.name == format!("Laptop v{}", product.stock)
        && product.price_cents == u64::from(product.stock) * 1_000;
    original || rewritten
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reads_during_writes_observe_whole_records() -> Result<(), String> {
    let (store, _, _) = given_services(Duration::from_millis(1));

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for version in 10..40u32 {
                let product = Product {
                    id: LAPTOP,
                    name: format!("Laptop v{version}"),
                    price_cents: u64::from(version) * 1_000,
                    stock: version,
                };
                store.update_product(product).await;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut seen = Vec::new();
                for _ in 0..25 {
                    seen.extend(store.get_product(LAPTOP).await);
                    seen.extend(
                        store
                            .list_products()
                            .await
                            .into_iter()
                            .filter(|product| product.id == LAPTOP),
                    );
                }
                seen
            })
        })
        .collect();

    writer.await.map_err(|error| error.to_string())?;
    for reader in readers {
        let seen = reader.await.map_err(|error| error.to_string())?;
        assert_eq!(seen.len(), 50);
        if let Some(torn) = seen.iter().find(|product| !is_whole(product)) {
            return Err(format!("observed a partially written record: {torn:?}"));
        }
    }
    Ok(())
}
