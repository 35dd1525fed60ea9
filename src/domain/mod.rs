#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![forbid(unsafe_code)]

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderId, OrderLine, OrderRequest, OrderStatus, RequestedItem};
pub use product::{NewProduct, Product, ProductId};
pub use user::{NewUser, User, UserId};
