use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use http::{Method, Request, Response, StatusCode};
use raffle_api::{HttpExec, RestStorefrontClient, StorefrontApiError, StorefrontClient};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct ScriptedExec {
    replies: Mutex<VecDeque<(StatusCode, String)>>,
    seen: Mutex<Vec<Seen>>,
}

impl ScriptedExec {
    fn reply(self: &Arc<Self>, status: StatusCode, body: &str) -> Arc<Self> {
        self.replies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
        Arc::clone(self)
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpExec for ScriptedExec {
    async fn execute(&self, req: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let (parts, body) = req.into_parts();
        self.seen.lock().unwrap().push(Seen {
            method: parts.method,
            uri: parts.uri.to_string(),
            content_type: parts
                .headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
            body,
        });
        let (status, body) = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((StatusCode::OK, "[]".to_string()));
        Ok(Response::builder().status(status).body(body.into_bytes())?)
    }
}

fn client(exec: Arc<ScriptedExec>) -> RestStorefrontClient {
    RestStorefrontClient::new(exec, "https://api.rifa.test/v1/", "test-agent".into()).unwrap()
}

#[tokio::test]
async fn builds_paths_and_query_strings() {
    let exec = Arc::new(ScriptedExec::default());
    let api = client(exec.clone());

    api.list_raffles().await.unwrap();
    api.list_winners("r 1").await.unwrap();
    api.purchase_status("p-9").await.unwrap();
    api.my_numbers("u-1").await.unwrap();

    let uris: Vec<String> = exec.seen().into_iter().map(|s| s.uri).collect();
    assert_eq!(
        uris,
        vec![
            "https://api.rifa.test/v1/raffles",
            "https://api.rifa.test/v1/winners?raffleId=r+1",
            "https://api.rifa.test/v1/purchases/p-9/status",
            "https://api.rifa.test/v1/meus-numeros?userId=u-1",
        ]
    );
}

#[tokio::test]
async fn empty_raffle_id_skips_instant_prize_request() {
    let exec = Arc::new(ScriptedExec::default());
    let api = client(exec.clone());

    let prizes = api.list_instant_prizes("  ").await.unwrap();
    assert_eq!(prizes, json!([]));
    assert!(exec.seen().is_empty());

    api.list_instant_prizes("r1").await.unwrap();
    assert_eq!(
        exec.seen()[0].uri,
        "https://api.rifa.test/v1/instantprizes?raffleId=r1"
    );
}

#[tokio::test]
async fn unknown_phone_maps_to_none() {
    let exec = Arc::new(ScriptedExec::default())
        .reply(StatusCode::NOT_FOUND, "")
        .reply(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Usuário não encontrado."}"#,
        )
        .reply(StatusCode::OK, r#"{"id":"u-1","phone":"11999990000"}"#);
    let api = client(exec.clone());

    assert!(api.find_user_by_phone("11999990000").await.unwrap().is_none());
    assert!(api.find_user_by_phone("11999990000").await.unwrap().is_none());
    let found = api.find_user_by_phone("11999990000").await.unwrap();
    assert_eq!(found.unwrap()["id"], "u-1");
    assert_eq!(
        exec.seen()[0].uri,
        "https://api.rifa.test/v1/user?phone=11999990000"
    );
}

#[tokio::test]
async fn server_errors_keep_backend_message() {
    let exec = Arc::new(ScriptedExec::default()).reply(
        StatusCode::UNPROCESSABLE_ENTITY,
        r#"{"message":"Quantidade mínima é 4"}"#,
    );
    let api = client(exec);

    let err = api
        .create_purchase(&json!({"quantity": 1}))
        .await
        .unwrap_err();
    let api_err = err.downcast_ref::<StorefrontApiError>().unwrap();
    assert_eq!(api_err.status_code(), Some(StatusCode::UNPROCESSABLE_ENTITY));
    assert!(matches!(
        api_err,
        StorefrontApiError::Http { endpoint, .. } if endpoint == "create_purchase"
    ));
    assert_eq!(api_err.message(), Some("Quantidade mínima é 4"));
    assert!(!api_err.is_not_found());
}

#[tokio::test]
async fn post_sends_json_body() {
    let exec = Arc::new(ScriptedExec::default())
        .reply(StatusCode::OK, r#"{"id":"u-1","token":"t"}"#);
    let api = client(exec.clone());

    let reply = api.authenticate_user("11999990000", "segredo").await.unwrap();
    assert_eq!(reply["token"], "t");

    let seen = exec.seen();
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].uri, "https://api.rifa.test/v1/login");
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));
    let body: Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(body, json!({"phone": "11999990000", "password": "segredo"}));
}

#[tokio::test]
async fn empty_success_body_is_null_and_garbage_is_decode_error() {
    let exec = Arc::new(ScriptedExec::default())
        .reply(StatusCode::NO_CONTENT, "")
        .reply(StatusCode::OK, "<html>oops</html>");
    let api = client(exec);

    assert_eq!(api.dashboard().await.unwrap(), Value::Null);
    let err = api.dashboard().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<StorefrontApiError>(),
        Some(StorefrontApiError::Decode { .. })
    ));
}
