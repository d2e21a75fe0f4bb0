use std::future::IntoFuture;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::Client;
use aws_sdk_sqs::config::Credentials;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use parking_lot::Mutex;
use serde_json::{Value, json};
use sqs_exporter_queues::{QueueAttribute, QueueService};
use sqs_exporter_queues_sqs::SqsQueueService;

const ORDERS: &str = "http://localhost:4566/000000000000/orders";
const ORDERS_DLQ: &str = "http://localhost:4566/000000000000/orders-dlq";
const ORDERS_RETRY: &str = "http://localhost:4566/000000000000/orders-retry";

/// Answers the SQS JSON protocol with canned responses and records every request.
#[derive(Clone, Default)]
struct FakeSqs {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl FakeSqs {
    fn requests(&self, operation: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|(target, _)| target == &format!("AmazonSQS.{operation}"))
            .map(|(_, body)| body.clone())
            .collect()
    }
}

async fn handle(State(fake): State<FakeSqs>, headers: HeaderMap, body: String) -> Response {
    let target = headers
        .get("x-amz-target")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request: Value = serde_json::from_str(&body).unwrap_or(Value::Null);

    fake.requests.lock().push((target.clone(), request.clone()));

    let reply = match target.as_str() {
        "AmazonSQS.ListQueues" => match request.get("NextToken").and_then(Value::as_str) {
            None => json!({ "QueueUrls": [ORDERS, ORDERS_DLQ], "NextToken": "page-2" }),
            Some(_) => json!({ "QueueUrls": [ORDERS_RETRY], "NextToken": "" }),
        },
        "AmazonSQS.GetQueueAttributes" => json!({
            "Attributes": {
                "ApproximateNumberOfMessages": "3",
                "ApproximateNumberOfMessagesNotVisible": "1",
            }
        }),
        "AmazonSQS.ListQueueTags" => json!({ "Tags": { "team": "checkout" } }),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/x-amz-json-1.0")],
                json!({ "__type": "InvalidAction", "message": target }).to_string(),
            )
                .into_response();
        }
    };

    (
        [(header::CONTENT_TYPE, "application/x-amz-json-1.0")],
        reply.to_string(),
    )
        .into_response()
}

async fn start_fake() -> (FakeSqs, SocketAddr) {
    let fake = FakeSqs::default();
    let router = Router::new()
        .route("/", post(handle))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(axum::serve(listener, router).into_future());

    (fake, addr)
}

async fn service(addr: SocketAddr) -> SqsQueueService {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url(format!("http://{addr}"))
        .retry_config(RetryConfig::disabled())
        .load()
        .await;

    SqsQueueService::from_client(Client::new(&config))
}

#[tokio::test]
async fn test_list_follows_pages_until_token_is_empty() {
    let (fake, addr) = start_fake().await;
    let service = service(addr).await;

    let urls = service.list_queue_urls(Some("orders")).await.unwrap();

    assert_eq!(urls, vec![ORDERS, ORDERS_DLQ, ORDERS_RETRY]);

    let requests = fake.requests("ListQueues");
    assert_eq!(requests.len(), 2);

    assert_eq!(requests[0]["QueueNamePrefix"], "orders");
    assert_eq!(requests[0]["MaxResults"], 1000);
    assert!(requests[0].get("NextToken").is_none());

    assert_eq!(requests[1]["QueueNamePrefix"], "orders");
    assert_eq!(requests[1]["NextToken"], "page-2");
}

#[tokio::test]
async fn test_list_without_prefix_omits_filter() {
    let (fake, addr) = start_fake().await;
    let service = service(addr).await;

    service.list_queue_urls(None).await.unwrap();

    let requests = fake.requests("ListQueues");
    assert!(requests[0].get("QueueNamePrefix").is_none());
}

#[tokio::test]
async fn test_attributes_omit_what_the_service_did_not_return() {
    let (fake, addr) = start_fake().await;
    let service = service(addr).await;

    let attributes = service
        .get_queue_attributes(ORDERS, &QueueAttribute::ALL)
        .await
        .unwrap();

    assert_eq!(attributes.len(), 2);
    assert_eq!(
        attributes
            .get(&QueueAttribute::ApproximateNumberOfMessages)
            .map(String::as_str),
        Some("3")
    );
    assert_eq!(
        attributes
            .get(&QueueAttribute::ApproximateNumberOfMessagesNotVisible)
            .map(String::as_str),
        Some("1")
    );
    assert!(!attributes.contains_key(&QueueAttribute::ApproximateNumberOfMessagesDelayed));

    let requests = fake.requests("GetQueueAttributes");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["QueueUrl"], ORDERS);
    assert_eq!(
        requests[0]["AttributeNames"],
        json!([
            "ApproximateNumberOfMessages",
            "ApproximateNumberOfMessagesDelayed",
            "ApproximateNumberOfMessagesNotVisible",
        ])
    );
}

#[tokio::test]
async fn test_list_tags() {
    let (_fake, addr) = start_fake().await;
    let service = service(addr).await;

    let tags = service.list_queue_tags(ORDERS).await.unwrap();

    assert_eq!(tags.get("team").map(String::as_str), Some("checkout"));
}
