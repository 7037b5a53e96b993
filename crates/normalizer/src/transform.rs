use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use common::text::parse_amount;
use serde_json::Value;

use crate::models::{
    Dashboard, DashboardTotals, InstantPrize, InstantPrizeHit, PaymentStatus, PixPayment,
    Purchase, PurchaseStatus, Raffle, RaffleStatus, TitleOption, TopBuyer, User, WinnerRecord,
    DEFAULT_INSTANT_PRIZE_NAME, DEFAULT_RAFFLE_NAME,
};
use crate::payloads::{
    decode_list, DashboardPayload, InstantPrizeHitPayload, InstantPrizePayload,
    PixPaymentPayload, PurchasePayload, PurchaseStatusPayload, RafflePayload, TitleOptionPayload,
    TopBuyerPayload, UserPayload, WinnerPayload,
};
use crate::ticket::{canonical_form, is_awarded_flag, TicketFaces, TicketSource};

static NULL: Value = Value::Null;

pub fn normalize_raffle(payload: &RafflePayload) -> Option<Raffle> {
    let id = value_text(&payload.id)?;
    let name = non_empty(&payload.name)
        .or_else(|| non_empty(&payload.title))
        .unwrap_or_else(|| DEFAULT_RAFFLE_NAME.to_string());
    let status = payload
        .status
        .as_deref()
        .and_then(RaffleStatus::parse)
        .or(match payload.active {
            Value::Bool(true) => Some(RaffleStatus::Active),
            Value::Bool(false) => Some(RaffleStatus::Completed),
            _ => None,
        })
        .unwrap_or_default();

    Some(Raffle {
        id,
        description: non_empty(&payload.description).unwrap_or_default(),
        image_url: non_empty(&payload.image_url)
            .or_else(|| non_empty(&payload.image))
            .unwrap_or_default(),
        image_alt: non_empty(&payload.image_alt).unwrap_or_else(|| name.clone()),
        price_per_ticket: value_number(&payload.price_per_ticket)
            .or_else(|| value_number(&payload.unit_price))
            .unwrap_or(0.0),
        title_options: normalize_title_options(&payload.title_options),
        status,
        name,
    })
}

fn normalize_title_options(value: &Value) -> Vec<TitleOption> {
    decode_list::<TitleOptionPayload>(value, "title_option")
        .iter()
        .filter_map(|option| {
            let titles = value_count(&option.titles).filter(|titles| *titles > 0)?;
            Some(TitleOption {
                titles: u32::try_from(titles).ok()?,
                price: value_number(&option.price),
            })
        })
        .collect()
}

/// The raffle the storefront should feature: the first active one, else the
/// first one listed.
pub fn pick_active_raffle(raffles: &[Raffle]) -> Option<&Raffle> {
    raffles
        .iter()
        .find(|raffle| raffle.status == RaffleStatus::Active)
        .or_else(|| raffles.first())
}

pub fn normalize_instant_prize(payload: &InstantPrizePayload) -> InstantPrize {
    let raw_ticket = first_present(&[&payload.ticket_number, &payload.ticket, &payload.id]);
    let faces = TicketFaces::of(raw_ticket);
    let award_signal = first_present(&[
        &payload.awarded,
        &payload.is_awarded,
        &payload.awarded_at,
        &payload.winner_id,
    ]);
    let prize_name = non_empty(&payload.prize_name);
    let prize_amount = value_number(&payload.prize_amount)
        .or_else(|| prize_name.as_deref().and_then(parse_amount));

    InstantPrize {
        ticket: faces.canonical.clone(),
        faces,
        prize_name: prize_name.unwrap_or_else(|| DEFAULT_INSTANT_PRIZE_NAME.to_string()),
        prize_amount,
        awarded: is_awarded_flag(award_signal),
        awarded_at: value_text(&payload.awarded_at).and_then(|text| parse_timestamp(&text)),
        winner_name: non_empty(&payload.name)
            .or_else(|| non_empty(&payload.winner_name))
            .or_else(|| non_empty(&payload.customer_name)),
        purchaser_id: value_text(&payload.purchase_id).or_else(|| value_text(&payload.winner_id)),
    }
}

pub fn normalize_winner(payload: &WinnerPayload) -> Option<WinnerRecord> {
    let ticket = value_text(first_present(&[
        &payload.ticket,
        &payload.ticket_number,
        &payload.id,
    ]))?;
    let name = non_empty(&payload.winner_name)
        .or_else(|| non_empty(&payload.name))
        .or_else(|| non_empty(&payload.customer_name))?;
    Some(WinnerRecord { ticket, name })
}

pub fn normalize_pix_payment(payload: &PixPaymentPayload) -> Option<PixPayment> {
    let purchase_id =
        value_text(&payload.purchase_id).or_else(|| value_text(&payload.reservation_id))?;
    Some(PixPayment {
        purchase_id,
        payment_id: value_text(&payload.payment_id),
        copy_paste: non_empty(&payload.copy_paste).or_else(|| non_empty(&payload.pix_code)),
        qr_code: non_empty(&payload.qr_code),
    })
}

pub fn normalize_purchase_status(
    payload: &PurchaseStatusPayload,
    requested_id: &str,
) -> PurchaseStatus {
    let purchase_id = value_text(&payload.purchase_id)
        .or_else(|| value_text(&payload.reservation_id))
        .unwrap_or_else(|| requested_id.to_string());
    let numbers = {
        let numbers = value_strings(&payload.numbers);
        if numbers.is_empty() {
            value_strings(&payload.purchased_numbers)
        } else {
            numbers
        }
    };
    let mut winning_tickets: Vec<String> = value_strings(&payload.winning_tickets)
        .iter()
        .map(|ticket| canonical_form(ticket))
        .filter(|ticket| !ticket.is_empty())
        .collect();
    if winning_tickets.is_empty() {
        let single = canonical_form(&payload.winning_ticket);
        if !single.is_empty() {
            winning_tickets.push(single);
        }
    }
    let instant_prizes = decode_list::<InstantPrizeHitPayload>(&payload.instant_prizes, "hit")
        .iter()
        .filter_map(|hit| {
            let ticket = canonical_form(first_present(&[&hit.ticket, &hit.ticket_number]));
            if ticket.is_empty() {
                return None;
            }
            Some(InstantPrizeHit {
                ticket,
                prize_name: non_empty(&hit.prize_name)
                    .unwrap_or_else(|| DEFAULT_INSTANT_PRIZE_NAME.to_string()),
            })
        })
        .collect();

    PurchaseStatus {
        purchase_id,
        status: payload
            .status
            .as_deref()
            .map(PaymentStatus::parse)
            .unwrap_or_default(),
        numbers,
        winning_tickets,
        instant_prizes,
        instant_prize_name: non_empty(&payload.instant_prize_name),
    }
}

pub fn normalize_purchase(payload: &PurchasePayload) -> Option<Purchase> {
    let id = value_text(&payload.purchase_id)
        .or_else(|| value_text(&payload.reservation_id))
        .or_else(|| value_text(&payload.id))?;
    let numbers = {
        let numbers = value_strings(&payload.numbers);
        if numbers.is_empty() {
            value_strings(&payload.purchased_numbers)
        } else {
            numbers
        }
    };
    let quantity = value_count(&payload.quantity)
        .and_then(|quantity| u32::try_from(quantity).ok())
        .unwrap_or(numbers.len() as u32);
    let buyer_name = non_empty(&payload.buyer_name)
        .or_else(|| non_empty(&payload.customer_name))
        .or_else(|| non_empty(&payload.name))
        .or_else(|| payload.customer.get("name").and_then(value_text));

    Some(Purchase {
        id,
        raffle_id: value_text(&payload.raffle_id),
        product_name: non_empty(&payload.product_name).or_else(|| non_empty(&payload.title)),
        quantity,
        unit_price: value_number(&payload.unit_price),
        total_price: value_number(&payload.total_price),
        user_id: value_text(&payload.user_id),
        buyer_name,
        numbers,
        status: payload
            .status
            .as_deref()
            .map(PaymentStatus::parse)
            .unwrap_or_default(),
        created_at: payload.created_at.as_deref().and_then(parse_timestamp),
    })
}

pub fn normalize_user(payload: &UserPayload, phone_hint: Option<&str>) -> Option<User> {
    let id = value_text(&payload.id).or_else(|| value_text(&payload.user_id))?;
    Some(User {
        id,
        phone: value_text(&payload.phone)
            .or_else(|| phone_hint.map(str::to_string))
            .unwrap_or_default(),
        name: non_empty(&payload.name)
            .or_else(|| non_empty(&payload.full_name))
            .or_else(|| non_empty(&payload.social_name))
            .unwrap_or_default(),
        email: non_empty(&payload.email),
    })
}

pub fn normalize_dashboard(payload: &DashboardPayload) -> Dashboard {
    let totals = &payload.totals;
    let top_buyers_by_day = match &payload.top_buyers_by_day {
        Value::Object(days) => days
            .iter()
            .map(|(day, buyers)| (day.clone(), normalize_top_buyers(buyers)))
            .collect(),
        _ => BTreeMap::new(),
    };

    Dashboard {
        totals: DashboardTotals {
            total_sales: value_number(&totals.total_sales).unwrap_or(0.0),
            total_tickets: value_count(&totals.total_tickets).unwrap_or(0),
            total_users: value_count(&totals.total_users).unwrap_or(0),
            total_affiliate_sales: value_number(&totals.total_affiliate_sales).unwrap_or(0.0),
            progress_percent: value_number(&totals.progress_percent).unwrap_or(0.0),
        },
        top_buyers: normalize_top_buyers(&payload.top_buyers),
        top_buyers_by_day,
        generated_at: payload.generated_at.as_deref().and_then(parse_timestamp),
    }
}

fn normalize_top_buyers(value: &Value) -> Vec<TopBuyer> {
    decode_list::<TopBuyerPayload>(value, "top_buyer")
        .iter()
        .filter_map(|buyer| {
            Some(TopBuyer {
                user_id: value_text(&buyer.user_id)?,
                // the backend sends "—" for buyers without a name
                name: non_empty(&buyer.name).filter(|name| name != "—"),
                tickets: value_count(&buyer.tickets).unwrap_or(0),
                sales: value_number(&buyer.sales).unwrap_or(0.0),
            })
        })
        .collect()
}

/// First field that is not null, the way `a ?? b ?? c` reads.
pub fn first_present<'a>(candidates: &[&'a Value]) -> &'a Value {
    candidates
        .iter()
        .copied()
        .find(|value| !value.is_null())
        .unwrap_or(&NULL)
}

/// Text of a scalar id-like field; blank strings count as absent.
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(_) | Value::Number(_) => {
            let text = value.ticket_text();
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }
}

pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

pub fn value_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n >= 0.0).map(|n| n as u64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

pub fn value_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(value_text).collect(),
        _ => Vec::new(),
    }
}

pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%d/%m/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
