//! Order status transitions.
//!
//! ```text
//! scheduled ──► placed ──► completed
//!     │            │
//!     └──────┬─────┘
//!            ▼
//!        cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal.

use crate::errors::AppError;
use crate::models::orders::OrderStatus;

/// How the caller relates to the order being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Owner,
    Provider,
    Admin,
}

/// Whether `from -> to` is an edge of the lifecycle graph at all.
pub fn is_forward_edge(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
        (from, to),
        (Scheduled, Placed) | (Scheduled, Cancelled) | (Placed, Completed) | (Placed, Cancelled)
    )
}

/// Whether `actor` may take the edge `from -> to`. Illegal edges are never allowed.
pub fn can_transition(from: OrderStatus, to: OrderStatus, actor: Actor) -> bool {
    if !is_forward_edge(from, to) {
        return false;
    }

    match actor {
        Actor::Admin | Actor::Provider => true,
        // Customers may only withdraw an order nobody has picked up yet.
        Actor::Owner => from == OrderStatus::Scheduled && to == OrderStatus::Cancelled,
    }
}

/// Like [`can_transition`], but says why not.
pub fn check_transition(from: OrderStatus, to: OrderStatus, actor: Actor) -> Result<(), AppError> {
    if !is_forward_edge(from, to) {
        return Err(AppError::state(format!(
            "Cannot move order from {} to {}.",
            label(from),
            label(to)
        )));
    }
    if !can_transition(from, to, actor) {
        return Err(AppError::forbidden(
            "You are not allowed to change this order's status.",
        ));
    }
    Ok(())
}

fn label(status: OrderStatus) -> &'static str {
    match status {
        OrderStatus::Scheduled => "scheduled",
        OrderStatus::Placed => "placed",
        OrderStatus::Completed => "completed",
        OrderStatus::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    #[test]
    fn terminal_states_have_no_exits() {
        for to in [Scheduled, Placed, Completed, Cancelled] {
            assert!(!is_forward_edge(Completed, to));
            assert!(!is_forward_edge(Cancelled, to));
        }
    }

    #[test]
    fn no_backward_or_self_edges() {
        assert!(!is_forward_edge(Placed, Scheduled));
        assert!(!is_forward_edge(Placed, Placed));
        assert!(!is_forward_edge(Scheduled, Completed));
    }

    #[test]
    fn provider_drives_the_lifecycle() {
        assert!(can_transition(Scheduled, Placed, Actor::Provider));
        assert!(can_transition(Placed, Completed, Actor::Provider));
        assert!(can_transition(Placed, Cancelled, Actor::Provider));
    }

    #[test]
    fn owner_can_only_cancel_scheduled_orders() {
        assert!(can_transition(Scheduled, Cancelled, Actor::Owner));
        assert!(!can_transition(Placed, Cancelled, Actor::Owner));
        assert!(!can_transition(Scheduled, Placed, Actor::Owner));
    }

    #[test]
    fn check_distinguishes_illegal_edge_from_wrong_actor() {
        assert!(matches!(
            check_transition(Completed, Placed, Actor::Admin),
            Err(AppError::State(_))
        ));
        assert!(matches!(
            check_transition(Placed, Completed, Actor::Owner),
            Err(AppError::Authorization(_))
        ));
        assert!(check_transition(Placed, Completed, Actor::Admin).is_ok());
    }
}
