//! Client pipelines against an in-process gateway

use mesh_client::fake::{
    FakeAccessControl, FakeContract, FakeDecryptionSdk, FakeWallet,
};
use mesh_client::{
    ClientError, MarketApi, MarketClient, OneshotHttpClient, PurchasePipeline, PurchaseServices,
    UploadForm, UploadPipeline, UploadStep,
};
use mesh_server::db::MemoryRecordStore;
use mesh_server::storage::MemoryStorage;
use mesh_server::{AppState, CredentialSource, api};
use shared::ErrorCode;
use shared::models::{Category, Currency, ExchangeRates, RequestStatus};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

struct Market {
    api: Arc<dyn MarketApi>,
    storage: MemoryStorage,
}

fn market(api_key: Option<&str>) -> Market {
    let storage = MemoryStorage::new();
    let state = AppState::from_parts(
        Arc::new(MemoryRecordStore::new()),
        Arc::new(storage.clone()),
        CredentialSource::Fixed(api_key.map(String::from)),
    );
    let client = MarketClient::new(OneshotHttpClient::new(api::router(state)));
    Market {
        api: Arc::new(client),
        storage,
    }
}

fn dataset_file(contents: &str) -> (tempfile::TempDir, UploadForm) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("air-quality.json");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(contents.as_bytes())
        .unwrap();
    let form = UploadForm {
        file: Some(path),
        name: "Air Quality".into(),
        description: "Hourly PM2.5 readings".into(),
        category: "Environmental".into(),
        price_eth: "0.1".into(),
        price_usdc: "10".into(),
        company: Some("Clean Air Co".into()),
    };
    (dir, form)
}

#[tokio::test]
async fn upload_register_and_list() {
    let market = market(Some("test-key"));
    let contract = Arc::new(FakeContract::new());
    let mut upload = UploadPipeline::new(
        market.api.clone(),
        contract.clone(),
        Arc::new(FakeWallet::connected("0xpublisher")),
    );
    let (_dir, form) = dataset_file(r#"{"pm25": [12, 15, 9]}"#);

    let status = upload.run(&form).await.unwrap();
    assert_eq!(status.step, UploadStep::Completed);
    let cid = status.content_id.unwrap();

    assert_eq!(
        market.storage.get(&cid).unwrap(),
        serde_json::to_vec(&serde_json::json!({"pm25": [12, 15, 9]})).unwrap()
    );
    assert_eq!(contract.registrations().await[0].content_id, cid);

    let listings = market
        .api
        .list_datasets(Some(Category::Environmental))
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].content_id, cid);
    assert_eq!(listings[0].company, "Clean Air Co");
    assert_eq!(listings[0].publisher, "0xpublisher");
}

#[tokio::test]
async fn upload_without_storage_credential_never_registers() {
    let market = market(None);
    let contract = Arc::new(FakeContract::new());
    let mut upload = UploadPipeline::new(
        market.api.clone(),
        contract.clone(),
        Arc::new(FakeWallet::connected("0xpublisher")),
    );
    let (_dir, form) = dataset_file("plain text");

    assert!(upload.run(&form).await.is_err());
    let status = upload.status();
    assert_eq!(status.step, UploadStep::Error);
    assert_eq!(status.error.as_deref(), Some("Storage API key not configured"));
    assert!(status.content_id.is_none());
    assert!(contract.registrations().await.is_empty());
    assert!(market.storage.is_empty());
}

#[tokio::test]
async fn request_approval_flow() {
    let market = market(Some("test-key"));
    let services = PurchaseServices {
        api: market.api.clone(),
        contract: Arc::new(FakeContract::new()),
        access: Arc::new(FakeAccessControl::new()),
        wallet: Arc::new(FakeWallet::connected("0xbuyer")),
        sdk: Arc::new(FakeDecryptionSdk::new()),
    };
    let buyer = PurchasePipeline::new(services, ExchangeRates::new(), Duration::from_secs(5));

    let listing = market.api.list_datasets(Some(Category::Pharmacy)).await.unwrap()[0].clone();
    let request = buyer.request_dataset(&listing, "0xbuyer").await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.price.unit, Currency::Oyd);

    let inbox = market.api.list_requests(&listing.publisher).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].id, request.id);

    let approved = market
        .api
        .update_request_status(&request.id, RequestStatus::Approved)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert!(approved.updated_at.is_some());

    match market
        .api
        .update_request_status(&request.id, RequestStatus::Pending)
        .await
    {
        Err(err @ ClientError::Api(_)) => {
            assert_eq!(err.code(), Some(ErrorCode::InvalidTransition))
        }
        other => panic!("Expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn buy_seed_listing() {
    let market = market(None);
    let contract = Arc::new(FakeContract::new());
    let services = PurchaseServices {
        api: market.api.clone(),
        contract: contract.clone(),
        access: Arc::new(FakeAccessControl::new()),
        wallet: Arc::new(FakeWallet::connected("0xbuyer")),
        sdk: Arc::new(FakeDecryptionSdk::new()),
    };
    let mut buyer = PurchasePipeline::new(services, ExchangeRates::new(), Duration::from_secs(5));

    let listing = market.api.list_datasets(None).await.unwrap()[0].clone();
    let receipt = buyer.buy(&listing, Currency::Oyd).await.unwrap();
    assert_eq!(receipt.price, listing.price);
    assert!(buyer.is_purchased(&listing.id));
    assert_eq!(contract.purchases().await, vec![(listing.id.clone(), listing.price)]);
}
