use common::text::parse_amount;
use normalizer::models::{PrizeBoard, PurchaseStatus, DEFAULT_INSTANT_PRIZE_NAME};
use normalizer::ticket::tickets_equal;
use serde::Serialize;
use tracing::info;

use crate::store::PrizeStore;

/// A ticket from a paid purchase that also wins an instant prize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstantWin {
    pub ticket: String,
    pub prize_name: String,
    pub prize_amount: Option<f64>,
}

/// Names the prize behind every winning ticket of a settled purchase.
/// Board entries win over the names carried by the status itself.
pub fn resolve_instant_wins(status: &PurchaseStatus, board: Option<&PrizeBoard>) -> Vec<InstantWin> {
    status
        .winning_tickets
        .iter()
        .map(|ticket| {
            if let Some(entry) = board.and_then(|board| board.find_by_ticket(ticket.as_str())) {
                return InstantWin {
                    ticket: ticket.clone(),
                    prize_name: entry.prize_name.clone(),
                    prize_amount: entry
                        .prize_amount
                        .or_else(|| parse_amount(&entry.prize_name)),
                };
            }
            let prize_name = status
                .instant_prizes
                .iter()
                .find(|hit| tickets_equal(hit.ticket.as_str(), ticket.as_str()))
                .map(|hit| hit.prize_name.clone())
                .or_else(|| status.instant_prize_name.clone())
                .unwrap_or_else(|| DEFAULT_INSTANT_PRIZE_NAME.to_string());
            InstantWin {
                ticket: ticket.clone(),
                prize_amount: parse_amount(&prize_name),
                prize_name,
            }
        })
        .collect()
}

/// Resolves the wins of a paid purchase and marks them on the store's board
/// under the buyer's name.
pub async fn claim_instant_wins(
    store: &PrizeStore,
    status: &PurchaseStatus,
    buyer_name: Option<&str>,
) -> Vec<InstantWin> {
    if status.winning_tickets.is_empty() {
        return Vec::new();
    }
    let board = store.board().await;
    let wins = resolve_instant_wins(status, board.as_ref());
    for win in &wins {
        store.award_prize(&win.ticket, buyer_name).await;
    }
    info!(
        purchase_id = %status.purchase_id,
        wins = wins.len(),
        "instant prizes claimed"
    );
    wins
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalizer::models::{InstantPrizeHit, PaymentStatus};

    fn status(winning: &[&str]) -> PurchaseStatus {
        PurchaseStatus {
            purchase_id: "p1".into(),
            status: PaymentStatus::Paid,
            numbers: Vec::new(),
            winning_tickets: winning.iter().map(|t| t.to_string()).collect(),
            instant_prizes: vec![InstantPrizeHit {
                ticket: "12".into(),
                prize_name: "R$ 500".into(),
            }],
            instant_prize_name: None,
        }
    }

    #[test]
    fn names_come_from_hits_then_generic_fields() {
        let wins = resolve_instant_wins(&status(&["12", "77"]), None);
        assert_eq!(wins[0].prize_name, "R$ 500");
        assert_eq!(wins[0].prize_amount, Some(500.0));
        assert_eq!(wins[1].prize_name, DEFAULT_INSTANT_PRIZE_NAME);
        assert_eq!(wins[1].prize_amount, None);

        let mut with_name = status(&["77"]);
        with_name.instant_prize_name = Some("R$ 1.000".into());
        let wins = resolve_instant_wins(&with_name, None);
        assert_eq!(wins[0].prize_amount, Some(1000.0));
    }

    #[test]
    fn no_winning_tickets_means_no_wins() {
        assert!(resolve_instant_wins(&status(&[]), None).is_empty());
    }
}
