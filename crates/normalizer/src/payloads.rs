//! Wire shapes as the backend sends them.
//!
//! Field spellings drift between backend revisions, so each payload accepts
//! every alias seen so far. Fields whose type drifts too (ids, tickets,
//! flags, money) stay as raw [`Value`]s; text fields degrade to `None` on a
//! type mismatch instead of failing the record.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{serde_as, DefaultOnError};
use tracing::warn;

const LIST_KEYS: [&str; 7] = [
    "items",
    "data",
    "winners",
    "raffles",
    "purchases",
    "instantPrizes",
    "results",
];

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RafflePayload {
    pub id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub title: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub description: Option<String>,
    #[serde(rename = "imageURL", alias = "imageUrl")]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub image_url: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub image: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub image_alt: Option<String>,
    pub price_per_ticket: Value,
    pub unit_price: Value,
    pub title_options: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub status: Option<String>,
    pub active: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TitleOptionPayload {
    #[serde(alias = "quantity")]
    pub titles: Value,
    pub price: Value,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstantPrizePayload {
    pub ticket_number: Value,
    pub ticket: Value,
    pub id: Value,
    pub awarded: Value,
    pub is_awarded: Value,
    pub awarded_at: Value,
    pub winner_id: Value,
    pub purchase_id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub prize_name: Option<String>,
    pub prize_amount: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub winner_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub customer_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WinnerPayload {
    pub ticket: Value,
    pub ticket_number: Value,
    pub id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub winner_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub customer_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PixPaymentPayload {
    pub purchase_id: Value,
    pub reservation_id: Value,
    pub payment_id: Value,
    #[serde(alias = "copy_paste")]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub copy_paste: Option<String>,
    #[serde(rename = "pix_code", alias = "pixCode")]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub pix_code: Option<String>,
    #[serde(rename = "qr_code", alias = "qrCode")]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub qr_code: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchaseStatusPayload {
    pub purchase_id: Value,
    pub reservation_id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub status: Option<String>,
    pub numbers: Value,
    pub purchased_numbers: Value,
    pub winning_ticket: Value,
    pub winning_tickets: Value,
    pub instant_prizes: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub instant_prize_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstantPrizeHitPayload {
    pub ticket: Value,
    pub ticket_number: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub prize_name: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PurchasePayload {
    pub id: Value,
    pub purchase_id: Value,
    pub reservation_id: Value,
    pub raffle_id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub product_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub title: Option<String>,
    pub quantity: Value,
    pub unit_price: Value,
    pub total_price: Value,
    pub user_id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub buyer_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub customer_name: Option<String>,
    pub customer: Value,
    pub numbers: Value,
    pub purchased_numbers: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub status: Option<String>,
    #[serde(alias = "date")]
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub created_at: Option<String>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPayload {
    pub id: Value,
    pub user_id: Value,
    pub phone: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub full_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub social_name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardTotalsPayload {
    pub total_sales: Value,
    pub total_tickets: Value,
    pub total_users: Value,
    pub total_affiliate_sales: Value,
    pub progress_percent: Value,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopBuyerPayload {
    pub user_id: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub name: Option<String>,
    pub tickets: Value,
    pub sales: Value,
}

#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardPayload {
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub totals: DashboardTotalsPayload,
    pub top_buyers: Value,
    pub top_buyers_by_day: Value,
    #[serde_as(deserialize_as = "DefaultOnError")]
    pub generated_at: Option<String>,
}

/// Records carried by a list response. Accepts a bare array, an object that
/// wraps the array under a known key, or a single record object.
pub fn list_items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => {
            if let Some(items) = LIST_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array))
            {
                items.iter().collect()
            } else if map.is_empty() {
                Vec::new()
            } else {
                vec![value]
            }
        }
        _ => Vec::new(),
    }
}

pub fn decode_one<T: DeserializeOwned>(value: &Value, kind: &'static str) -> Option<T> {
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            warn!(kind, error = %err, "skipping malformed record");
            None
        }
    }
}

pub fn decode_list<T: DeserializeOwned>(value: &Value, kind: &'static str) -> Vec<T> {
    list_items(value)
        .into_iter()
        .filter_map(|item| decode_one(item, kind))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrong_typed_text_fields_degrade_to_none() {
        let payload: InstantPrizePayload = serde_json::from_value(json!({
            "ticketNumber": 3,
            "prizeName": 500,
            "winnerName": ["nope"],
            "awarded": "yes"
        }))
        .unwrap();
        assert_eq!(payload.ticket_number, json!(3));
        assert!(payload.prize_name.is_none());
        assert!(payload.winner_name.is_none());
        assert_eq!(payload.awarded, json!("yes"));
    }

    #[test]
    fn list_items_unwraps_known_envelopes() {
        assert_eq!(list_items(&json!([1, 2])).len(), 2);
        assert_eq!(list_items(&json!({"winners": [{"ticket": "1"}]})).len(), 1);
        assert_eq!(list_items(&json!({"winners": []})).len(), 0);
        assert_eq!(list_items(&json!({"id": "r1"})).len(), 1);
        assert_eq!(list_items(&json!({})).len(), 0);
        assert!(list_items(&json!("oops")).is_empty());
        assert!(list_items(&Value::Null).is_empty());
    }

    #[test]
    fn decode_list_skips_non_objects() {
        let winners: Vec<WinnerPayload> =
            decode_list(&json!([{"ticket": "0003", "winnerName": "Ana"}, "junk", 7]), "winner");
        assert_eq!(winners.len(), 1);
        assert_eq!(winners[0].winner_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn pix_payload_accepts_snake_and_camel_spellings() {
        let payload: PixPaymentPayload = serde_json::from_value(json!({
            "reservationId": "res-1",
            "pix_code": "000201...",
            "qrCode": "data:image/png;base64,AAA"
        }))
        .unwrap();
        assert_eq!(payload.reservation_id, json!("res-1"));
        assert!(payload.purchase_id.is_null());
        assert_eq!(payload.pix_code.as_deref(), Some("000201..."));
        assert!(payload.qr_code.is_some());
    }
}
