#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

//! Demo scenarios. Each one runs against a freshly seeded store and prints
//! one JSON line per response.

use crate::cli::Scenario;
use itertools::Itertools;
use railway::config::DemoConfig;
use railway::domain::{NewProduct, NewUser, OrderId, OrderRequest, ProductId, RequestedItem, UserId};
use railway::services::{OrderService, ProductService, UserService};
use railway::store::{InMemoryStore, Storage};
use railway::transport::{respond, respond_rich, HttpResponse, CREATED, OK};
use railway::{
    combine, combine_all, success, traverse_indexed, traverse_parallel_tasks, AppError, Outcome,
    RichError,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const LAPTOP: ProductId = ProductId::new(1);
const MOUSE: ProductId = ProductId::new(2);
const KEYBOARD: ProductId = ProductId::new(3);
const MONITOR: ProductId = ProductId::new(4);

#[derive(Serialize)]
struct Line<'a> {
    scenario: &'a str,
    step: &'a str,
    #[serde(flatten)]
    response: HttpResponse,
}

fn emit(scenario: &str, step: &str, response: HttpResponse) -> anyhow::Result<()> {
    let line = serde_json::to_string(&Line {
        scenario,
        step,
        response,
    })?;
    println!("{line}");
    Ok(())
}

fn seeded_store(config: &DemoConfig) -> Arc<dyn Storage> {
    Arc::new(InMemoryStore::seeded(config.latency()))
}

pub async fn run(scenario: Scenario, config: &DemoConfig) -> anyhow::Result<()> {
    match scenario {
        Scenario::Orders => orders(config).await,
        Scenario::Scores => scores(),
        Scenario::Parallel => parallel(config).await,
        Scenario::Batch => batch(config).await,
        Scenario::All => {
            orders(config).await?;
            scores()?;
            parallel(config).await?;
            batch(config).await
        }
    }
}

async fn orders(config: &DemoConfig) -> anyhow::Result<()> {
    const NAME: &str = "orders";
    let store = seeded_store(config);
    let users = UserService::new(Arc::clone(&store));
    let products = ProductService::new(Arc::clone(&store));
    let orders = OrderService::new(store);

    let created = users
        .create_user(NewUser::new("Dave Brown", "dave@example.com"))
        .await;
    emit(NAME, "create_user", respond(created, CREATED))?;

    let duplicate = users
        .create_user(NewUser::new("Alice Again", "alice@example.com"))
        .await;
    emit(NAME, "duplicate_user", respond(duplicate, CREATED))?;

    let invalid = users.create_user(NewUser::new("", "not-an-email")).await;
    emit(NAME, "invalid_user", respond(invalid, CREATED))?;

    let placed = orders
        .create_order(OrderRequest::new(
            UserId::new(1),
            vec![RequestedItem::new(LAPTOP, 1), RequestedItem::new(MOUSE, 2)],
        ))
        .await;
    let placed_id = placed.as_ref().ok().map(|order| order.id);
    emit(NAME, "create_order", respond(placed, CREATED))?;

    let too_many = orders
        .create_order(OrderRequest::new(
            UserId::new(2),
            vec![RequestedItem::new(LAPTOP, 10)],
        ))
        .await;
    emit(NAME, "insufficient_stock", respond(too_many, CREATED))?;

    let laptop = products.get_product(LAPTOP).await.map(|p| json!({"stock": p.stock}));
    emit(NAME, "laptop_stock", respond(laptop, OK))?;

    if let Some(id) = placed_id {
        emit(NAME, "advance_order", respond(orders.advance_status(id).await, OK))?;
        emit(NAME, "cancel_order", respond(orders.cancel_order(id).await, OK))?;
    }

    let missing = orders.get_order(OrderId::generate()).await;
    emit(NAME, "missing_order", respond(missing, OK))
}

fn validate_score(score: i32) -> Outcome<i32, AppError> {
    Outcome::success(score).ensure(
        |score| (0..=100).contains(score),
        |score| AppError::validation("score", format!("{score} is outside 0..100")),
    )
}

fn scores() -> anyhow::Result<()> {
    const NAME: &str = "scores";
    let first_batch = [85, 90, 102, 75];
    let second_batch = [85, 150, 200, 75];

    let valid = combine([85, 90, 75].map(validate_score));
    emit(NAME, "combine_valid", respond(valid, OK))?;

    let fail_fast = combine(first_batch.map(validate_score));
    emit(NAME, "combine_first_failure", respond(fail_fast, OK))?;

    let indexed = traverse_indexed(first_batch, validate_score).map_error(|failed| {
        let index = failed.index();
        RichError::new(failed.into_error()).with_meta("index", index)
    });
    emit(NAME, "traverse_indexed", respond_rich(indexed, OK))?;

    let accumulated = combine_all(second_batch.map(validate_score)).map_error(|errors| {
        let message = errors.iter().map(AppError::message).join("; ");
        RichError::new(AppError::validation("scores", message)).with_meta("failures", errors.len())
    });
    emit(NAME, "combine_all_failures", respond_rich(accumulated, OK))
}

async fn parallel(config: &DemoConfig) -> anyhow::Result<()> {
    const NAME: &str = "parallel";
    let store = seeded_store(config);
    let products = ProductService::new(Arc::clone(&store));
    let orders = OrderService::new(store);
    let (alice, bob, carol) = (UserId::new(1), UserId::new(2), UserId::new(3));

    let requests = vec![
        OrderRequest::new(alice, vec![RequestedItem::new(MOUSE, 2)]),
        OrderRequest::new(bob, vec![RequestedItem::new(KEYBOARD, 1)]),
        OrderRequest::new(carol, vec![RequestedItem::new(MONITOR, 1)]),
        OrderRequest::new(alice, vec![RequestedItem::new(LAPTOP, 1)]),
        OrderRequest::new(bob, vec![RequestedItem::new(MOUSE, 1)]),
        OrderRequest::new(carol, vec![RequestedItem::new(KEYBOARD, 2)]),
    ];
    let placed = orders
        .create_orders_bulk(requests, config.max_concurrency)
        .await
        .map(|placed| {
            json!({
                "orders": placed.len(),
                "total_cents": placed.iter().map(|order| order.total_cents).sum::<u64>(),
            })
        });
    emit(NAME, "bulk_orders", respond(placed, CREATED))?;

    let mixed = vec![
        OrderRequest::new(bob, vec![RequestedItem::new(LAPTOP, 10)]),
        OrderRequest::new(carol, vec![RequestedItem::new(MONITOR, 1)]),
    ];
    let rejected = orders
        .create_orders_bulk(mixed, config.max_concurrency)
        .await;
    emit(NAME, "bulk_with_failure", respond(rejected, CREATED))?;

    // The monitor order after the failing one still ran.
    let monitor = products.get_product(MONITOR).await.map(|p| json!({"stock": p.stock}));
    emit(NAME, "monitor_stock", respond(monitor, OK))?;

    let latency = config.latency();
    let squares = traverse_parallel_tasks(
        1u64..=8,
        move |n| async move {
            tokio::time::sleep(latency).await;
            success::<u64, AppError>(n * n)
        },
        config.max_concurrency,
    )
    .await;
    emit(NAME, "squares", respond(squares, OK))
}

async fn batch(config: &DemoConfig) -> anyhow::Result<()> {
    const NAME: &str = "batch";
    let products = ProductService::new(seeded_store(config));

    let catalogue = (1..=25)
        .map(|n| NewProduct::new(format!("Widget {n:02}"), 100 * n, 10))
        .collect_vec();
    let imported = products
        .import_products(catalogue, config.batch_size)
        .await
        .map(|imported| json!({"imported": imported.len()}));
    emit(NAME, "import", respond(imported, CREATED))?;

    let mut broken = (1..=5)
        .map(|n| NewProduct::new(format!("Gadget {n}"), 250, 1))
        .collect_vec();
    broken.push(NewProduct::new("", 0, 1));
    let rejected = products.import_products(broken, 2).await;
    emit(NAME, "import_with_invalid", respond(rejected, CREATED))?;

    let count = products.list_products().await.len();
    info!(count, "catalogue size after imports");
    emit(NAME, "catalogue_size", respond(Outcome::<_, AppError>::success(count), OK))
}
