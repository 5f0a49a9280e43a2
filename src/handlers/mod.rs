pub mod carts;
pub mod offers;
pub mod orders;
pub mod tasks;
pub mod vouchers;

use actix_web::{HttpRequest, error, web};

use crate::errors::AppError;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Cart routes (all protected, require valid JWT) ──
    cfg.service(
        web::scope("/cart")
            .route("", web::get().to(carts::get_cart))
            .route("/add", web::post().to(carts::add_item))
            .route("/update", web::put().to(carts::update_item))
            .route("/{item_id}", web::delete().to(carts::remove_item)),
    );

    // ── Voucher routes ──
    cfg.service(
        web::resource("/voucher/apply").route(web::post().to(vouchers::apply_voucher)),
    );

    // ── Task routes ──
    cfg.service(
        web::scope("/tasks")
            .route("", web::get().to(tasks::get_my_tasks))
            .route("", web::post().to(tasks::create_task))
            .route("/open", web::get().to(tasks::get_open_tasks))
            .route("/{id}", web::get().to(tasks::get_task))
            .route("/{id}/cancel", web::post().to(tasks::cancel_task))
            .route("/{id}/status", web::patch().to(tasks::update_task_status))
            .route("/{id}/offers", web::get().to(tasks::get_task_offers))
            .route("/{id}/checkout", web::post().to(tasks::checkout_task)),
    );

    // ── Offer routes ──
    cfg.service(
        web::scope("/offers")
            .route("", web::post().to(offers::create_offer))
            .route("/{id}/price", web::put().to(offers::update_price))
            .route("/{id}/accept", web::post().to(offers::accept_offer))
            .route("/{id}/decline", web::post().to(offers::decline_offer)),
    );

    // ── Order routes ──
    cfg.service(
        web::scope("/orders")
            .route("", web::get().to(orders::get_my_orders))
            .route("/place", web::post().to(orders::place_order))
            .route("/schedule", web::post().to(orders::schedule_order))
            .route("/reorder", web::post().to(orders::reorder))
            .route("/provider", web::get().to(orders::get_provider_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/track", web::get().to(orders::track_order))
            .route("/{id}/qr", web::post().to(orders::attach_qr))
            .route("/{id}/rate", web::post().to(orders::rate_order))
            .route("/{id}/accept", web::post().to(orders::accept_order))
            .route("/{id}/reject", web::post().to(orders::reject_order))
            .route("/{id}/cancel", web::post().to(orders::cancel_order))
            .route("/{id}/status", web::patch().to(orders::update_status)),
    );
}

/// Body, path and query extraction failures become validation envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _req: &HttpRequest| {
        AppError::validation(format!("Invalid request body: {err}")).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err: error::PathError, _req: &HttpRequest| {
        AppError::validation(format!("Invalid path parameter: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _req: &HttpRequest| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    })
}
