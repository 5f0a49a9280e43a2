//! Business operations. Handlers parse and authenticate; everything that
//! decides whether a request is allowed, and what it changes, lives here.

pub mod carts;
pub mod checkout;
pub mod offers;
pub mod orders;
pub mod reorder;
pub mod tasks;
pub mod vouchers;
