use std::sync::Arc;

use anyhow::Result;
use common::AppError;
use normalizer::models::{
    Dashboard, InstantPrize, OrderRequest, PixPayment, Purchase, PurchaseStatus, Raffle,
    Registration, User, WinnerRecord,
};
use normalizer::payloads::{
    decode_list, decode_one, DashboardPayload, InstantPrizePayload, PixPaymentPayload,
    PurchasePayload, PurchaseStatusPayload, RafflePayload, UserPayload, WinnerPayload,
};
use normalizer::transform::{
    normalize_dashboard, normalize_instant_prize, normalize_pix_payment, normalize_purchase,
    normalize_purchase_status, normalize_raffle, normalize_user, normalize_winner,
};
use raffle_api::StorefrontClient;
use tracing::debug;

/// Typed view over [`StorefrontClient`]. Every response passes through the
/// normalizer exactly once, here.
#[derive(Clone)]
pub struct Gateway {
    client: Arc<dyn StorefrontClient>,
}

impl Gateway {
    pub fn new(client: Arc<dyn StorefrontClient>) -> Self {
        Self { client }
    }

    pub async fn authenticate(&self, phone: &str, password: &str) -> Result<User> {
        let raw = self.client.authenticate_user(phone, password).await?;
        // some deployments wrap the account under `user`
        let body = raw.get("user").unwrap_or(&raw);
        decode_one::<UserPayload>(body, "user")
            .and_then(|payload| normalize_user(&payload, Some(phone)))
            .ok_or(AppError::NotFound("user id in login response"))
            .map_err(Into::into)
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let body = serde_json::to_value(registration)?;
        let raw = self.client.register_user(&body).await?;
        let body = raw.get("user").unwrap_or(&raw);
        decode_one::<UserPayload>(body, "user")
            .and_then(|payload| normalize_user(&payload, Some(registration.phone.as_str())))
            .ok_or(AppError::NotFound("user id in registration response"))
            .map_err(Into::into)
    }

    pub async fn find_user(&self, phone: &str) -> Result<Option<User>> {
        let Some(raw) = self.client.find_user_by_phone(phone).await? else {
            return Ok(None);
        };
        let body = raw.get("user").unwrap_or(&raw);
        Ok(decode_one::<UserPayload>(body, "user")
            .and_then(|payload| normalize_user(&payload, Some(phone))))
    }

    pub async fn raffles(&self) -> Result<Vec<Raffle>> {
        let raw = self.client.list_raffles().await?;
        Ok(decode_list::<RafflePayload>(&raw, "raffle")
            .iter()
            .filter_map(normalize_raffle)
            .collect())
    }

    pub async fn instant_prizes(&self, raffle_id: &str) -> Result<Vec<InstantPrize>> {
        let raw = self.client.list_instant_prizes(raffle_id).await?;
        let prizes: Vec<InstantPrize> = decode_list::<InstantPrizePayload>(&raw, "instant_prize")
            .iter()
            .map(normalize_instant_prize)
            .collect();
        debug!(raffle_id, count = prizes.len(), "instant prizes decoded");
        Ok(prizes)
    }

    pub async fn winners(&self, raffle_id: &str) -> Result<Vec<WinnerRecord>> {
        let raw = self.client.list_winners(raffle_id).await?;
        Ok(decode_list::<WinnerPayload>(&raw, "winner")
            .iter()
            .filter_map(normalize_winner)
            .collect())
    }

    pub async fn create_purchase(&self, order: &OrderRequest) -> Result<PixPayment> {
        let body = serde_json::to_value(order)?;
        let raw = self.client.create_purchase(&body).await?;
        decode_one::<PixPaymentPayload>(&raw, "pix_payment")
            .and_then(|payload| normalize_pix_payment(&payload))
            .ok_or(AppError::NotFound("purchase id in reservation response"))
            .map_err(Into::into)
    }

    pub async fn purchase_status(&self, purchase_id: &str) -> Result<PurchaseStatus> {
        let raw = self.client.purchase_status(purchase_id).await?;
        let payload = decode_one::<PurchaseStatusPayload>(&raw, "purchase_status")
            .unwrap_or_default();
        Ok(normalize_purchase_status(&payload, purchase_id))
    }

    pub async fn purchase(&self, purchase_id: &str) -> Result<Option<Purchase>> {
        let raw = self.client.get_purchase(purchase_id).await?;
        Ok(decode_one::<PurchasePayload>(&raw, "purchase")
            .and_then(|payload| normalize_purchase(&payload)))
    }

    pub async fn my_purchases(&self, user_id: &str) -> Result<Vec<Purchase>> {
        let raw = self.client.my_numbers(user_id).await?;
        Ok(decode_list::<PurchasePayload>(&raw, "purchase")
            .iter()
            .filter_map(normalize_purchase)
            .collect())
    }

    pub async fn dashboard(&self) -> Result<Dashboard> {
        let raw = self.client.dashboard().await?;
        let payload = decode_one::<DashboardPayload>(&raw, "dashboard").unwrap_or_default();
        Ok(normalize_dashboard(&payload))
    }
}
