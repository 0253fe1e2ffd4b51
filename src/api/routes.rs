use actix_web::web;

use super::handlers;

/// Configures the API routes
///
/// `/getBlocks/` stays at the root for existing readers; everything else
/// lives under `/api/v1`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/getBlocks/", web::get().to(handlers::get_blocks))
        .service(
            web::scope("/api/v1")
                .route("/blocks/{index}", web::get().to(handlers::get_block))
                .route("/transactions/pending", web::get().to(handlers::get_pending_transactions))
                .route("/transactions/new", web::post().to(handlers::new_transaction))
                .route("/mine", web::post().to(handlers::mine_block))
                .route("/balance/{address}", web::get().to(handlers::get_balance))
                .route("/validate", web::get().to(handlers::validate_chain)),
        );
}
