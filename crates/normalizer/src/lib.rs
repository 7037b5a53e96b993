pub mod models;
pub mod payloads;
pub mod reconcile;
pub mod ticket;
pub mod transform;

pub use models::{
    Dashboard, InstantPrize, OrderRequest, PaymentStatus, PixPayment, PrizeBoard, Purchase,
    PurchaseStatus, Raffle, RaffleStatus, Registration, User, WinnerRecord,
};
pub use payloads::{
    decode_list, decode_one, DashboardPayload, InstantPrizePayload, PixPaymentPayload,
    PurchasePayload, PurchaseStatusPayload, RafflePayload, UserPayload, WinnerPayload,
};
pub use reconcile::{attach_winner_names, pending_purchase_lookups, WinnerIndex};
pub use ticket::{
    canonical_form, digits_only, equivalent_keys, is_awarded_flag, padded_form, tickets_equal,
    TicketFaces,
};
pub use transform::{
    normalize_dashboard, normalize_instant_prize, normalize_pix_payment, normalize_purchase,
    normalize_purchase_status, normalize_raffle, normalize_user, normalize_winner,
    pick_active_raffle,
};
