use std::collections::HashMap;

use crate::models::{InstantPrize, WinnerRecord};
use crate::ticket::equivalent_keys;

/// Winner names keyed by every equivalent face of their ticket.
#[derive(Debug, Clone, Default)]
pub struct WinnerIndex {
    names: HashMap<String, String>,
}

impl WinnerIndex {
    pub fn build(winners: &[WinnerRecord]) -> Self {
        let mut names = HashMap::new();
        for winner in winners {
            for key in equivalent_keys(winner.ticket.as_str()) {
                names.entry(key).or_insert_with(|| winner.name.clone());
            }
        }
        Self { names }
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn lookup(&self, prize: &InstantPrize) -> Option<&str> {
        prize
            .faces
            .lookup_keys()
            .iter()
            .find_map(|key| self.names.get(key))
            .map(String::as_str)
    }
}

/// Attaches names to awarded prizes from the record itself or the winners
/// index. Prizes that are not awarded never carry a name.
pub fn attach_winner_names(prizes: Vec<InstantPrize>, index: &WinnerIndex) -> Vec<InstantPrize> {
    prizes
        .into_iter()
        .map(|mut prize| {
            if !prize.awarded {
                prize.winner_name = None;
                return prize;
            }
            if prize.winner_name.is_none() {
                prize.winner_name = index.lookup(&prize).map(str::to_string);
            }
            prize
        })
        .collect()
}

/// Awarded prizes still nameless after [`attach_winner_names`], paired with
/// the purchase id worth fetching for a buyer name.
pub fn pending_purchase_lookups(prizes: &[InstantPrize]) -> Vec<(usize, String)> {
    prizes
        .iter()
        .enumerate()
        .filter(|(_, prize)| prize.awarded && prize.winner_name.is_none())
        .filter_map(|(idx, prize)| prize.purchaser_id.clone().map(|id| (idx, id)))
        .collect()
}
