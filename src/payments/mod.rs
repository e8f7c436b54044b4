mod stripe;

pub use stripe::*;

/// Event type the reconciliation core consumes. Everything else is
/// acknowledged without touching the store.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
