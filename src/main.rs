use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod blockchain;
mod config;

use blockchain::{Blockchain, SharedBlockchain, Token};
use config::NodeConfig;

// Build the ledger and mint the configured supply into its genesis block
fn initialize_blockchain(config: &NodeConfig) -> SharedBlockchain {
    let token = Token::new(config.token_name.clone(), config.total_supply);
    let blockchain = Blockchain::with_token(token);

    let token = blockchain.token();
    let supply = token.supply_wallet();
    info!("Supply minted from origin address: {}", token.origin_address());
    info!("Supply wallet address: {}", supply.address());
    info!("Supply wallet private key: {}", hex::encode(supply.export_secret_key()));

    SharedBlockchain::new(blockchain)
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::get_blocks,
        api::handlers::get_block,
        api::handlers::get_pending_transactions,
        api::handlers::new_transaction,
        api::handlers::mine_block,
        api::handlers::get_balance,
        api::handlers::validate_chain
    ),
    components(
        schemas(
            blockchain::Block,
            blockchain::Transaction,
            api::handlers::TransactionRequest,
            api::handlers::TransactionResponse,
            api::handlers::MineResponse,
            api::handlers::BalanceResponse
        )
    ),
    tags(
        (name = "blockchain", description = "Ledger API endpoints")
    ),
    info(
        title = "RarCoin Ledger API",
        version = "1.0.0",
        description = "A minimal proof-of-work ledger",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
struct ApiDoc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = NodeConfig::from_env()?;

    let blockchain = web::Data::new(initialize_blockchain(&config));
    let miner = web::Data::new(config.miner()?);
    info!("Node miner address: {}", miner.address());

    let bind_address = (config.host.clone(), config.port);
    let config = web::Data::new(config);

    info!("Starting HTTP server at http://{}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        let openapi = ApiDoc::openapi();

        App::new()
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .app_data(blockchain.clone())
            .app_data(miner.clone())
            .app_data(config.clone())
            .configure(api::configure_routes)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
    })
    .bind(bind_address.clone())
    .with_context(|| format!("Failed to bind {}:{}", bind_address.0, bind_address.1))?
    .run()
    .await
    .context("HTTP server terminated with an error")
}
