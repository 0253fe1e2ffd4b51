use actix_web::{web, HttpResponse, Responder};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::blockchain::{Address, Block, Miner, SharedBlockchain, Transaction, Wallet};
use crate::config::NodeConfig;

/// Data structure for the blockchain state
pub type BlockchainData = web::Data<SharedBlockchain>;

/// Request for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionRequest {
    /// The sender's address (base58)
    pub sender: String,

    /// The recipient's address (base58)
    pub recipient: String,

    /// The amount to transfer
    pub amount: u64,

    /// The sender's private key (hex, for signing)
    pub private_key: String,
}

/// Response for the transaction endpoint
#[derive(Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub message: String,

    /// The index of the block that will include this transaction
    pub block_index: u64,
}

/// Response for the mine endpoint
#[derive(Serialize, ToSchema)]
pub struct MineResponse {
    pub message: String,

    /// The newly mined block
    pub block: Block,
}

/// Response for the balance endpoint
#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    pub address: String,

    /// Balance replayed from the mined blocks
    #[schema(value_type = i64)]
    pub balance: i128,
}

/// Get all blocks
///
/// Returns every block in chain order
#[utoipa::path(
    get,
    path = "/getBlocks/",
    responses(
        (status = 200, description = "Blocks retrieved successfully", body = Vec<Block>)
    )
)]
pub async fn get_blocks(blockchain: BlockchainData) -> impl Responder {
    let blocks: Vec<serde_json::Value> = blockchain.chain().iter().map(Block::to_json).collect();
    HttpResponse::Ok().json(blocks)
}

/// Get a block by index
#[utoipa::path(
    get,
    path = "/api/v1/blocks/{index}",
    params(
        ("index" = u64, Path, description = "Position of the block in the chain")
    ),
    responses(
        (status = 200, description = "Block retrieved successfully", body = Block),
        (status = 404, description = "No block at this index")
    )
)]
pub async fn get_block(blockchain: BlockchainData, index: web::Path<u64>) -> impl Responder {
    match blockchain.block_at(index.into_inner()) {
        Ok(block) => HttpResponse::Ok().json(block.to_json()),
        Err(err) => HttpResponse::NotFound().json(serde_json::json!({
            "error": err.to_string()
        })),
    }
}

/// Get all pending transactions
///
/// Returns all transactions waiting to be included in a block
#[utoipa::path(
    get,
    path = "/api/v1/transactions/pending",
    responses(
        (status = 200, description = "Pending transactions retrieved successfully", body = Vec<Transaction>)
    )
)]
pub async fn get_pending_transactions(blockchain: BlockchainData) -> impl Responder {
    let transactions: Vec<serde_json::Value> = blockchain
        .open_transactions()
        .iter()
        .map(Transaction::to_json)
        .collect();
    HttpResponse::Ok().json(transactions)
}

/// Create a new transaction
///
/// Signs the transfer with the given private key and adds it to the pending transactions
#[utoipa::path(
    post,
    path = "/api/v1/transactions/new",
    request_body = TransactionRequest,
    responses(
        (status = 201, description = "Transaction accepted", body = TransactionResponse),
        (status = 400, description = "Invalid or rejected transaction")
    )
)]
pub async fn new_transaction(
    blockchain: BlockchainData,
    transaction_req: web::Json<TransactionRequest>,
) -> impl Responder {
    let sender: Address = match transaction_req.sender.parse() {
        Ok(address) => address,
        Err(err) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid sender address: {}", err)
            }));
        }
    };

    let recipient: Address = match transaction_req.recipient.parse() {
        Ok(address) => address,
        Err(err) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid recipient address: {}", err)
            }));
        }
    };

    let private_key_bytes = match hex::decode(&transaction_req.private_key) {
        Ok(bytes) => bytes,
        Err(_) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Invalid private key format. Must be a hex string."
            }));
        }
    };

    let wallet = match Wallet::from_secret_key(&private_key_bytes) {
        Ok(wallet) => wallet,
        Err(err) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid private key: {}", err)
            }));
        }
    };

    let mut transaction = Transaction::new(sender, recipient, transaction_req.amount);
    transaction.sign(&wallet);

    match blockchain.try_submit(transaction) {
        Ok(()) => HttpResponse::Created().json(TransactionResponse {
            message: "Transaction will be added to Block".to_string(),
            block_index: blockchain.last_block().index + 1,
        }),
        Err(err) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Failed to add transaction: {}", err)
        })),
    }
}

/// Mine a new block
///
/// Seals all pending transactions into a new block. When a mining reward is
/// configured, a reward for the node's miner is added to the block first.
#[utoipa::path(
    post,
    path = "/api/v1/mine",
    responses(
        (status = 200, description = "Block mined, or nothing to mine", body = MineResponse),
        (status = 500, description = "Mining worker failed")
    )
)]
pub async fn mine_block(
    blockchain: BlockchainData,
    miner: web::Data<Miner>,
    config: web::Data<NodeConfig>,
) -> impl Responder {
    if !blockchain.has_open_transactions() {
        return HttpResponse::Ok().json(serde_json::json!({
            "message": "No open transactions to mine"
        }));
    }

    if config.mining_reward > 0 {
        let reward = miner.create_mining_transaction(&blockchain.supply_wallet(), config.mining_reward);
        if !blockchain.submit(reward) {
            warn!("Mining reward for {} was rejected", miner.address());
        }
    }

    let ledger = blockchain.get_ref().clone();
    match web::block(move || ledger.mine()).await {
        Ok(Some(block)) => HttpResponse::Ok().json(MineResponse {
            message: "New Block Mined".to_string(),
            block,
        }),
        Ok(None) => HttpResponse::Ok().json(serde_json::json!({
            "message": "No open transactions to mine"
        })),
        Err(err) => {
            error!("Mining worker failed: {}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to mine block: {}", err)
            }))
        }
    }
}

/// Get the balance of an address
#[utoipa::path(
    get,
    path = "/api/v1/balance/{address}",
    params(
        ("address" = String, Path, description = "Base58 address")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Invalid address")
    )
)]
pub async fn get_balance(blockchain: BlockchainData, address: web::Path<String>) -> impl Responder {
    let address: Address = match address.parse() {
        Ok(address) => address,
        Err(err) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid address: {}", err)
            }));
        }
    };

    HttpResponse::Ok().json(BalanceResponse {
        address: address.to_string(),
        balance: blockchain.balance_of(&address),
    })
}

/// Check if the blockchain is valid
#[utoipa::path(
    get,
    path = "/api/v1/validate",
    responses(
        (status = 200, description = "Blockchain validation status", body = bool)
    )
)]
pub async fn validate_chain(blockchain: BlockchainData) -> impl Responder {
    HttpResponse::Ok().json(blockchain.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::configure_routes;
    use crate::blockchain::Blockchain;
    use actix_web::{http::StatusCode, test, App};

    fn app_data(mining_reward: u64) -> (BlockchainData, web::Data<Miner>, web::Data<NodeConfig>) {
        let config = NodeConfig {
            mining_reward,
            ..NodeConfig::default()
        };
        (
            web::Data::new(SharedBlockchain::new(Blockchain::new())),
            web::Data::new(Miner::new()),
            web::Data::new(config),
        )
    }

    #[actix_web::test]
    async fn test_get_blocks_returns_genesis() {
        let (blockchain, miner, config) = app_data(0);
        let app = test::init_service(
            App::new()
                .app_data(blockchain.clone())
                .app_data(miner)
                .app_data(config)
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/getBlocks/").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        let blocks = body.as_array().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["index"], 0);
        assert_eq!(blocks[0]["merkle_root"], blockchain.last_block().transactions_digest);
        assert_eq!(blocks[0]["transactions"][0]["amount"], 1000);
        assert!(blocks[0]["timestamp"].is_string());
    }

    #[actix_web::test]
    async fn test_submit_mine_and_balance() {
        let (blockchain, miner, config) = app_data(5);
        let miner_address = miner.address().to_string();
        let app = test::init_service(
            App::new()
                .app_data(blockchain.clone())
                .app_data(miner)
                .app_data(config)
                .configure(configure_routes),
        )
        .await;

        let supply = blockchain.supply_wallet();
        let recipient = Wallet::new();

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new")
            .set_json(TransactionRequest {
                sender: supply.address().to_string(),
                recipient: recipient.address().to_string(),
                amount: 200,
                private_key: hex::encode(supply.export_secret_key()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let req = test::TestRequest::get().uri("/api/v1/transactions/pending").to_request();
        let pending: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        let mined: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(mined["block"]["index"], 1);
        assert_eq!(mined["block"]["transactions"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/balance/{}", recipient.address()))
            .to_request();
        let balance: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(balance["balance"], 200);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/balance/{}", miner_address))
            .to_request();
        let balance: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(balance["balance"], 5);

        let req = test::TestRequest::get().uri("/api/v1/validate").to_request();
        let valid: bool = test::call_and_read_body_json(&app, req).await;
        assert!(valid);
    }

    #[actix_web::test]
    async fn test_rejected_transaction_and_empty_mine() {
        let (blockchain, miner, config) = app_data(0);
        let app = test::init_service(
            App::new()
                .app_data(blockchain.clone())
                .app_data(miner)
                .app_data(config)
                .configure(configure_routes),
        )
        .await;

        let poor = Wallet::new();
        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new")
            .set_json(TransactionRequest {
                sender: poor.address().to_string(),
                recipient: Wallet::new().address().to_string(),
                amount: 1,
                private_key: hex::encode(poor.export_secret_key()),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post().uri("/api/v1/mine").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(blockchain.chain().len(), 1);
    }

    #[actix_web::test]
    async fn test_lookup_errors() {
        let (blockchain, miner, config) = app_data(0);
        let app = test::init_service(
            App::new()
                .app_data(blockchain)
                .app_data(miner)
                .app_data(config)
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/blocks/0").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/v1/blocks/7").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/v1/balance/not-an-address").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
