//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate the database and the session authority.

mod account;
mod order;

pub use account::AccountService;
pub use order::{OrderDetails, OrderService};
