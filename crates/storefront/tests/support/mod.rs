#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use common::config::{CheckoutConfig, StoreConfig};
use raffle_api::StorefrontClient;
use serde_json::{json, Value};
use storefront::{Checkout, Gateway, PrizeStore};

/// Canned backend. `None` on a list endpoint makes it fail; `my_numbers` and
/// `dashboard` answer empty instead.
#[derive(Default)]
pub struct StubClient {
    pub raffles: Option<Value>,
    pub instant_prizes: Option<Value>,
    pub winners: Option<Value>,
    pub purchases: HashMap<String, Value>,
    pub users: HashMap<String, Value>,
    pub statuses: Mutex<VecDeque<Result<Value, String>>>,
    pub status_delay: Duration,
    pub prize_delay: Duration,
    pub status_calls: AtomicUsize,
    pub purchase_calls: AtomicUsize,
    pub orders: Mutex<Vec<Value>>,
    pub my_numbers: Option<Value>,
    pub dashboard: Option<Value>,
    pub numbers_requested: Mutex<Vec<String>>,
}

impl StubClient {
    pub fn with_board(instant_prizes: Value, winners: Value) -> Self {
        Self {
            raffles: Some(json!([
                {"id": "old", "name": "Antigo", "status": "concluido"},
                {"id": "r1", "name": "Adv 2025", "status": "ativo", "pricePerTicket": 0.99}
            ])),
            instant_prizes: Some(instant_prizes),
            winners: Some(winners),
            ..Self::default()
        }
    }

    pub fn script_statuses(&self, replies: Vec<Result<Value, String>>) {
        *self.statuses.lock().unwrap() = replies.into();
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

fn or_fail(value: &Option<Value>, what: &str) -> Result<Value> {
    value
        .clone()
        .ok_or_else(|| anyhow!("{what} unavailable"))
}

#[async_trait]
impl StorefrontClient for StubClient {
    async fn authenticate_user(&self, phone: &str, _password: &str) -> Result<Value> {
        self.users
            .get(phone)
            .cloned()
            .ok_or_else(|| anyhow!("invalid credentials"))
    }

    async fn register_user(&self, registration: &Value) -> Result<Value> {
        Ok(json!({"user": {"id": "new-user", "fullName": registration["fullName"]}}))
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<Value>> {
        Ok(self.users.get(phone).cloned())
    }

    async fn list_raffles(&self) -> Result<Value> {
        or_fail(&self.raffles, "raffles")
    }

    async fn list_instant_prizes(&self, _raffle_id: &str) -> Result<Value> {
        if !self.prize_delay.is_zero() {
            tokio::time::sleep(self.prize_delay).await;
        }
        or_fail(&self.instant_prizes, "instant prizes")
    }

    async fn list_winners(&self, _raffle_id: &str) -> Result<Value> {
        or_fail(&self.winners, "winners")
    }

    async fn create_purchase(&self, order: &Value) -> Result<Value> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(json!({"purchaseId": "p-100", "pixCode": "00020126PIX", "paymentId": 55}))
    }

    async fn purchase_status(&self, _purchase_id: &str) -> Result<Value> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front();
        match next {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(json!({"status": "pending"})),
        }
    }

    async fn get_purchase(&self, purchase_id: &str) -> Result<Value> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        self.purchases
            .get(purchase_id)
            .cloned()
            .ok_or_else(|| anyhow!("purchase {purchase_id} not found"))
    }

    async fn my_numbers(&self, user_id: &str) -> Result<Value> {
        self.numbers_requested
            .lock()
            .unwrap()
            .push(user_id.to_string());
        Ok(self
            .my_numbers
            .clone()
            .unwrap_or_else(|| json!({"purchases": []})))
    }

    async fn dashboard(&self) -> Result<Value> {
        Ok(self.dashboard.clone().unwrap_or_else(|| json!({})))
    }
}

pub fn store(client: Arc<StubClient>) -> PrizeStore {
    PrizeStore::new(
        Gateway::new(client),
        StoreConfig {
            refresh_interval_secs: 60,
            run_once: true,
        },
    )
}

pub fn checkout(client: Arc<StubClient>, config: CheckoutConfig) -> Checkout {
    Checkout::new(Gateway::new(client), config)
}
