pub mod checkout;
pub mod gateway;
pub mod instant;
pub mod metrics;
pub mod store;

pub use checkout::{CancelHandle, Checkout, Countdown, Identification, OrderDraft, PaymentOutcome};
pub use gateway::Gateway;
pub use instant::{claim_instant_wins, resolve_instant_wins, InstantWin};
pub use store::PrizeStore;
