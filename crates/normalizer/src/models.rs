use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::{tickets_equal, TicketFaces, TicketSource};

pub const DEFAULT_RAFFLE_NAME: &str = "Sorteio";
pub const DEFAULT_INSTANT_PRIZE_NAME: &str = "Prêmio Instantâneo";
pub const DEFAULT_WINNER_NAME: &str = "Vencedor";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum RaffleStatus {
    #[default]
    Active,
    Completed,
    Upcoming,
}

impl RaffleStatus {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "active" | "ativo" | "ativos" | "open" | "aberto" | "em andamento" => {
                Some(RaffleStatus::Active)
            }
            "completed" | "complete" | "concluido" | "concluído" | "concluidos" | "concluídos"
            | "finalizado" | "encerrado" | "closed" | "finished" | "done" => {
                Some(RaffleStatus::Completed)
            }
            "upcoming" | "em breve" | "soon" | "scheduled" | "agendado" | "pending" => {
                Some(RaffleStatus::Upcoming)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RaffleStatus::Active => "active",
            RaffleStatus::Completed => "completed",
            RaffleStatus::Upcoming => "upcoming",
        }
    }
}

/// A bundle shortcut: buy `titles` numbers for `price`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TitleOption {
    pub titles: u32,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Raffle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub image_alt: String,
    pub price_per_ticket: f64,
    pub title_options: Vec<TitleOption>,
    pub status: RaffleStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstantPrize {
    /// Canonical ticket number, the join key across endpoints.
    pub ticket: String,
    pub faces: TicketFaces,
    pub prize_name: String,
    pub prize_amount: Option<f64>,
    pub awarded: bool,
    pub awarded_at: Option<DateTime<Utc>>,
    pub winner_name: Option<String>,
    pub purchaser_id: Option<String>,
}

impl InstantPrize {
    pub fn matches<T: TicketSource + ?Sized>(&self, ticket: &T) -> bool {
        tickets_equal(self.faces.raw.as_str(), ticket) || tickets_equal(self.ticket.as_str(), ticket)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WinnerRecord {
    pub ticket: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "paid" | "approved" | "pago" | "confirmed" | "completed" => PaymentStatus::Paid,
            "failed" | "cancelled" | "canceled" | "rejected" | "expired" | "falhou"
            | "cancelado" | "expirado" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

/// PIX payload returned when a reservation is created. The code is opaque.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PixPayment {
    pub purchase_id: String,
    pub payment_id: Option<String>,
    pub copy_paste: Option<String>,
    pub qr_code: Option<String>,
}

impl PixPayment {
    /// Text a buyer pastes into their banking app.
    pub fn pix_code(&self) -> Option<&str> {
        self.copy_paste.as_deref().or(self.qr_code.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstantPrizeHit {
    pub ticket: String,
    pub prize_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseStatus {
    pub purchase_id: String,
    pub status: PaymentStatus,
    pub numbers: Vec<String>,
    pub winning_tickets: Vec<String>,
    pub instant_prizes: Vec<InstantPrizeHit>,
    pub instant_prize_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Purchase {
    pub id: String,
    pub raffle_id: Option<String>,
    pub product_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Option<f64>,
    pub total_price: Option<f64>,
    pub user_id: Option<String>,
    pub buyer_name: Option<String>,
    pub numbers: Vec<String>,
    pub status: PaymentStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub phone: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_name: Option<String>,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub birth_date: String,
    pub cep: String,
    pub address: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub uf: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub raffle_id: String,
    pub user_id: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    pub product_name: String,
    pub customer: Customer,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardTotals {
    pub total_sales: f64,
    pub total_tickets: u64,
    pub total_users: u64,
    pub total_affiliate_sales: f64,
    pub progress_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopBuyer {
    pub user_id: String,
    pub name: Option<String>,
    pub tickets: u64,
    pub sales: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub totals: DashboardTotals,
    pub top_buyers: Vec<TopBuyer>,
    pub top_buyers_by_day: BTreeMap<String, Vec<TopBuyer>>,
    pub generated_at: Option<DateTime<Utc>>,
}

/// The active raffle together with its instant-prize tickets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrizeBoard {
    pub raffle: Raffle,
    pub instant_prizes: Vec<InstantPrize>,
}

impl PrizeBoard {
    pub fn total_count(&self) -> usize {
        self.instant_prizes.len()
    }

    pub fn awarded_count(&self) -> usize {
        self.instant_prizes.iter().filter(|p| p.awarded).count()
    }

    pub fn available_count(&self) -> usize {
        self.total_count() - self.awarded_count()
    }

    pub fn find_by_ticket<T: TicketSource + ?Sized>(&self, ticket: &T) -> Option<&InstantPrize> {
        self.instant_prizes.iter().find(|prize| prize.matches(ticket))
    }

    /// Marks every entry matching `ticket` as awarded. Returns how many changed.
    pub fn award<T: TicketSource + ?Sized>(
        &mut self,
        ticket: &T,
        winner_name: Option<&str>,
        now: DateTime<Utc>,
    ) -> usize {
        let mut updated = 0;
        for prize in self.instant_prizes.iter_mut().filter(|p| p.matches(ticket)) {
            prize.awarded = true;
            let name = winner_name
                .filter(|name| !name.trim().is_empty())
                .map(str::to_string)
                .or_else(|| prize.winner_name.clone())
                .unwrap_or_else(|| DEFAULT_WINNER_NAME.to_string());
            prize.winner_name = Some(name);
            prize.awarded_at.get_or_insert(now);
            updated += 1;
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prize(ticket: &str, awarded: bool) -> InstantPrize {
        let faces = TicketFaces::of(ticket);
        InstantPrize {
            ticket: faces.canonical.clone(),
            faces,
            prize_name: DEFAULT_INSTANT_PRIZE_NAME.into(),
            prize_amount: None,
            awarded,
            awarded_at: None,
            winner_name: None,
            purchaser_id: None,
        }
    }

    fn board() -> PrizeBoard {
        PrizeBoard {
            raffle: Raffle {
                id: "r1".into(),
                name: DEFAULT_RAFFLE_NAME.into(),
                description: String::new(),
                image_url: String::new(),
                image_alt: DEFAULT_RAFFLE_NAME.into(),
                price_per_ticket: 0.5,
                title_options: Vec::new(),
                status: RaffleStatus::Active,
            },
            instant_prizes: vec![prize("0000012", false), prize("345", true)],
        }
    }

    #[test]
    fn raffle_status_parses_mixed_spellings() {
        assert_eq!(RaffleStatus::parse(" Ativos "), Some(RaffleStatus::Active));
        assert_eq!(RaffleStatus::parse("Concluídos"), Some(RaffleStatus::Completed));
        assert_eq!(RaffleStatus::parse("em breve"), Some(RaffleStatus::Upcoming));
        assert_eq!(RaffleStatus::parse("???"), None);
    }

    #[test]
    fn payment_status_defaults_to_pending() {
        assert_eq!(PaymentStatus::parse("PAID"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::parse("pago"), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::parse("rejected"), PaymentStatus::Failed);
        assert_eq!(PaymentStatus::parse("waiting"), PaymentStatus::Pending);
        assert!(!PaymentStatus::Pending.is_terminal());
    }

    #[test]
    fn board_counts_and_lookup() {
        let board = board();
        assert_eq!(board.total_count(), 2);
        assert_eq!(board.awarded_count(), 1);
        assert_eq!(board.available_count(), 1);
        assert!(board.find_by_ticket("12").is_some());
        assert!(board.find_by_ticket("000345").is_some());
        assert!(board.find_by_ticket("999").is_none());
    }

    #[test]
    fn award_defaults_name_and_stamps_time() {
        let mut board = board();
        let now = Utc::now();
        assert_eq!(board.award("12", None, now), 1);
        let entry = board.find_by_ticket("12").unwrap();
        assert!(entry.awarded);
        assert_eq!(entry.winner_name.as_deref(), Some(DEFAULT_WINNER_NAME));
        assert_eq!(entry.awarded_at, Some(now));

        assert_eq!(board.award("0012", Some("Ana"), Utc::now()), 1);
        let entry = board.find_by_ticket("12").unwrap();
        assert_eq!(entry.winner_name.as_deref(), Some("Ana"));
        assert_eq!(entry.awarded_at, Some(now));
    }
}
