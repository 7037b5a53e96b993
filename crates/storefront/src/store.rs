use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use normalizer::models::{InstantPrize, PrizeBoard};
use normalizer::reconcile::{attach_winner_names, pending_purchase_lookups, WinnerIndex};
use normalizer::transform::pick_active_raffle;
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::gateway::Gateway;
use crate::metrics;
use common::config::StoreConfig;

/// Holds the featured raffle and its instant-prize board. Readers get
/// snapshots; only `refresh` and `award_prize` write.
pub struct PrizeStore {
    gateway: Gateway,
    config: StoreConfig,
    board: RwLock<Option<PrizeBoard>>,
    loading: AtomicBool,
    // awards made while a refresh is building; replayed onto its board
    late_awards: Mutex<Vec<LateAward>>,
}

struct LateAward {
    ticket: String,
    winner_name: Option<String>,
    at: DateTime<Utc>,
}

struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn new(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PrizeStore {
    pub fn new(gateway: Gateway, config: StoreConfig) -> Self {
        Self {
            gateway,
            config,
            board: RwLock::new(None),
            loading: AtomicBool::new(false),
            late_awards: Mutex::new(Vec::new()),
        }
    }

    pub async fn run(&self) -> Result<()> {
        loop {
            self.refresh().await;
            if self.config.run_once {
                break;
            }
            sleep(Duration::from_secs(self.config.refresh_interval_secs)).await;
        }
        Ok(())
    }

    pub async fn load(&self) -> Option<PrizeBoard> {
        self.refresh().await
    }

    /// Rebuilds the board from the backend and publishes it. Never fails:
    /// a raffle-list error clears the board, every later error degrades to
    /// missing data. Awards recorded while the rebuild runs are re-applied
    /// to the new board.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Option<PrizeBoard> {
        let _loading = LoadingGuard::new(&self.loading);
        let _timer = metrics::STORE_LOAD_DURATION.start_timer();
        self.late_awards.lock().await.clear();

        let mut board = self.build_board().await;

        let mut published = self.board.write().await;
        let late_awards = std::mem::take(&mut *self.late_awards.lock().await);
        if let Some(board) = board.as_mut() {
            for award in &late_awards {
                board.award(award.ticket.as_str(), award.winner_name.as_deref(), award.at);
            }
            if !late_awards.is_empty() {
                debug!(count = late_awards.len(), "replayed awards made during load");
            }
        }

        let outcome = match &board {
            Some(board) => {
                metrics::publish_board_counts(board.total_count(), board.awarded_count());
                info!(
                    raffle_id = %board.raffle.id,
                    status = board.raffle.status.as_str(),
                    prizes = board.total_count(),
                    awarded = board.awarded_count(),
                    "prize board published"
                );
                "loaded"
            }
            None => {
                metrics::publish_board_counts(0, 0);
                "empty"
            }
        };
        metrics::STORE_LOADS_TOTAL
            .with_label_values(&[outcome])
            .inc();

        *published = board.clone();
        board
    }

    async fn build_board(&self) -> Option<PrizeBoard> {
        let raffles = match self.gateway.raffles().await {
            Ok(raffles) => raffles,
            Err(err) => {
                warn!(error = ?err, "failed to load raffles");
                return None;
            }
        };
        let Some(raffle) = pick_active_raffle(&raffles).cloned() else {
            info!("backend lists no raffle");
            return None;
        };

        let prizes = self
            .gateway
            .instant_prizes(&raffle.id)
            .await
            .unwrap_or_else(|err| {
                warn!(raffle_id = %raffle.id, error = ?err, "failed to load instant prizes");
                Vec::new()
            });
        let winners = self.gateway.winners(&raffle.id).await.unwrap_or_else(|err| {
            warn!(raffle_id = %raffle.id, error = ?err, "failed to load winners");
            Vec::new()
        });

        let direct = named_awarded(&prizes);
        let index = WinnerIndex::build(&winners);
        let mut prizes = attach_winner_names(prizes, &index);
        let indexed = named_awarded(&prizes).saturating_sub(direct);

        let lookups = pending_purchase_lookups(&prizes);
        let names = join_all(
            lookups
                .into_iter()
                .map(|(idx, purchase_id)| async move { (idx, self.buyer_name(&purchase_id).await) }),
        )
        .await;
        let mut from_purchase = 0;
        for (idx, name) in names {
            if let Some(name) = name {
                prizes[idx].winner_name = Some(name);
                from_purchase += 1;
            }
        }

        metrics::WINNER_NAMES_RESOLVED_TOTAL
            .with_label_values(&["prize"])
            .inc_by(direct as u64);
        metrics::WINNER_NAMES_RESOLVED_TOTAL
            .with_label_values(&["winners"])
            .inc_by(indexed as u64);
        metrics::WINNER_NAMES_RESOLVED_TOTAL
            .with_label_values(&["purchase"])
            .inc_by(from_purchase);

        Some(PrizeBoard {
            raffle,
            instant_prizes: prizes,
        })
    }

    async fn buyer_name(&self, purchase_id: &str) -> Option<String> {
        match self.gateway.purchase(purchase_id).await {
            Ok(purchase) => purchase.and_then(|purchase| purchase.buyer_name),
            Err(err) => {
                debug!(purchase_id, error = ?err, "purchase lookup for winner name failed");
                None
            }
        }
    }

    pub async fn board(&self) -> Option<PrizeBoard> {
        self.board.read().await.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Marks the board entry for `ticket` as won. Returns how many entries
    /// of the current board changed; zero when nothing is loaded or no entry
    /// matches. During a refresh the award is also kept for the board being
    /// built.
    pub async fn award_prize(&self, ticket: &str, winner_name: Option<&str>) -> usize {
        let now = Utc::now();
        let mut guard = self.board.write().await;
        if self.is_loading() {
            self.late_awards.lock().await.push(LateAward {
                ticket: ticket.to_string(),
                winner_name: winner_name.map(str::to_string),
                at: now,
            });
        }
        let Some(board) = guard.as_mut() else {
            return 0;
        };
        let updated = board.award(ticket, winner_name, now);
        if updated > 0 {
            metrics::publish_board_counts(board.total_count(), board.awarded_count());
        } else {
            debug!(ticket, "award for a ticket missing from the board");
        }
        updated
    }

    /// Board entry for `ticket`, matched across padding variants. The entry
    /// may still be unawarded; check `awarded` before treating it as a win.
    pub async fn find_winner_by_ticket(&self, ticket: &str) -> Option<InstantPrize> {
        self.board
            .read()
            .await
            .as_ref()?
            .find_by_ticket(ticket)
            .cloned()
    }
}

fn named_awarded(prizes: &[InstantPrize]) -> usize {
    prizes
        .iter()
        .filter(|prize| prize.awarded && prize.winner_name.is_some())
        .count()
}
