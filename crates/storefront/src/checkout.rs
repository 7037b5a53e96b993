use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use common::config::CheckoutConfig;
use common::text::{first_two_names, format_brl, format_countdown};
use futures::future::{BoxFuture, Fuse, FusedFuture, FutureExt};
use normalizer::models::{
    Customer, OrderRequest, PaymentStatus, PixPayment, PurchaseStatus, Raffle, Registration,
    TitleOption, User,
};
use normalizer::ticket::digits_only;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::gateway::Gateway;
use crate::metrics;

/// Quantity and price of an order before it is sent. Quantity always stays
/// inside the configured bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub raffle_id: String,
    pub product_name: String,
    pub unit_price: f64,
    quantity: u32,
    bundle_price: Option<f64>,
    min_quantity: u32,
    max_quantity: u32,
}

impl OrderDraft {
    pub fn new(raffle: &Raffle, quantity: u32, limits: &CheckoutConfig) -> Self {
        let min_quantity = limits.min_quantity.max(1);
        let max_quantity = limits.max_quantity.max(min_quantity);
        Self {
            raffle_id: raffle.id.clone(),
            product_name: raffle.name.clone(),
            unit_price: raffle.price_per_ticket,
            quantity: quantity.clamp(min_quantity, max_quantity),
            bundle_price: None,
            min_quantity,
            max_quantity,
        }
    }

    /// Starts from a bundle shortcut. The bundle's own price holds only while
    /// its quantity is kept.
    pub fn from_option(raffle: &Raffle, option: &TitleOption, limits: &CheckoutConfig) -> Self {
        let mut draft = Self::new(raffle, option.titles, limits);
        if draft.quantity == option.titles {
            draft.bundle_price = option.price;
        }
        draft
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity.clamp(self.min_quantity, self.max_quantity);
        self.bundle_price = None;
    }

    pub fn increment(&mut self, by: u32) {
        self.set_quantity(self.quantity.saturating_add(by));
    }

    pub fn decrement(&mut self, by: u32) {
        self.set_quantity(self.quantity.saturating_sub(by));
    }

    pub fn total(&self) -> f64 {
        let total = self
            .bundle_price
            .unwrap_or(self.unit_price * f64::from(self.quantity));
        (total * 100.0).round() / 100.0
    }

    pub fn to_order(&self, user: &User, contact_email: &str) -> OrderRequest {
        let email = user
            .email
            .clone()
            .filter(|email| !email.trim().is_empty())
            .unwrap_or_else(|| contact_email.to_string());
        OrderRequest {
            raffle_id: self.raffle_id.clone(),
            user_id: user.id.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total(),
            product_name: self.product_name.clone(),
            customer: Customer {
                name: first_two_names(&user.name),
                email,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Identification {
    Identified(User),
    NeedsRegistration { phone: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    Paid(PurchaseStatus),
    Failed(PurchaseStatus),
    Expired,
    Cancelled,
}

impl PaymentOutcome {
    fn label(&self) -> &'static str {
        match self {
            PaymentOutcome::Paid(_) => "paid",
            PaymentOutcome::Failed(_) => "failed",
            PaymentOutcome::Expired => "expired",
            PaymentOutcome::Cancelled => "cancelled",
        }
    }
}

/// Cancels a payment wait from outside, e.g. when the payment dialog closes.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Reservation countdown shown next to the PIX code. Cosmetic only; the
/// backend decides when a reservation really lapses.
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    deadline: Instant,
}

impl Countdown {
    pub fn start(total: Duration) -> Self {
        Self {
            deadline: Instant::now() + total,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining().as_secs()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    pub fn display(&self) -> String {
        format_countdown(self.remaining_secs())
    }
}

pub struct Checkout {
    gateway: Gateway,
    config: CheckoutConfig,
}

impl Checkout {
    pub fn new(gateway: Gateway, config: CheckoutConfig) -> Self {
        Self { gateway, config }
    }

    pub fn draft(&self, raffle: &Raffle, quantity: u32) -> OrderDraft {
        OrderDraft::new(raffle, quantity, &self.config)
    }

    pub async fn identify(&self, phone: &str) -> Result<Identification> {
        let phone = digits_only(phone);
        if phone.is_empty() {
            return Err(anyhow!("phone number has no digits"));
        }
        Ok(match self.gateway.find_user(&phone).await? {
            Some(user) => Identification::Identified(user),
            None => Identification::NeedsRegistration { phone },
        })
    }

    pub async fn login(&self, phone: &str, password: &str) -> Result<User> {
        self.gateway.authenticate(&digits_only(phone), password).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<User> {
        let mut registration = registration.clone();
        registration.phone = digits_only(registration.phone.as_str());
        self.gateway.register(&registration).await
    }

    #[instrument(skip(self, user, draft), fields(user_id = %user.id, quantity = draft.quantity()))]
    pub async fn reserve(&self, user: &User, draft: &OrderDraft) -> Result<PixPayment> {
        let order = draft.to_order(user, &self.config.contact_email);
        let payment = self.gateway.create_purchase(&order).await?;
        if payment.pix_code().is_none() {
            warn!(purchase_id = %payment.purchase_id, "reservation returned no pix code");
        }
        info!(
            purchase_id = %payment.purchase_id,
            total = %format_brl(order.total_price),
            "reservation created"
        );
        Ok(payment)
    }

    /// Polls the purchase status until it settles, the countdown runs out or
    /// `cancel` fires. The first poll happens one interval after the call.
    #[instrument(skip(self, cancel))]
    pub async fn await_payment(&self, purchase_id: &str, cancel: &CancelHandle) -> PaymentOutcome {
        let countdown = Countdown::start(Duration::from_secs(self.config.countdown_secs));
        let outcome = self.poll_until_settled(purchase_id, &countdown, cancel).await;
        metrics::PAYMENT_OUTCOMES_TOTAL
            .with_label_values(&[outcome.label()])
            .inc();
        info!(outcome = outcome.label(), "payment wait finished");
        outcome
    }

    async fn poll_until_settled(
        &self,
        purchase_id: &str,
        countdown: &Countdown,
        cancel: &CancelHandle,
    ) -> PaymentOutcome {
        let period = Duration::from_secs(self.config.poll_interval_secs.max(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let expiry = sleep_until(countdown.deadline());
        tokio::pin!(expiry);
        let mut cancelled = cancel.subscribe();
        // at most one status request in flight; it races cancel and expiry
        let in_flight: Fuse<BoxFuture<'_, Result<PurchaseStatus>>> = Fuse::terminated();
        tokio::pin!(in_flight);

        loop {
            tokio::select! {
                biased;
                _ = cancelled.wait_for(|flag| *flag) => return PaymentOutcome::Cancelled,
                _ = &mut expiry => return PaymentOutcome::Expired,
                polled = &mut in_flight, if !in_flight.is_terminated() => {
                    if cancel.is_cancelled() {
                        debug!("status arrived after cancellation, discarded");
                        return PaymentOutcome::Cancelled;
                    }
                    match polled {
                        Ok(status) => {
                            metrics::PAYMENT_POLLS_TOTAL
                                .with_label_values(&[status_label(status.status)])
                                .inc();
                            match status.status {
                                PaymentStatus::Paid => return PaymentOutcome::Paid(status),
                                PaymentStatus::Failed => return PaymentOutcome::Failed(status),
                                PaymentStatus::Pending => {}
                            }
                        }
                        Err(err) => {
                            metrics::PAYMENT_POLLS_TOTAL
                                .with_label_values(&["error"])
                                .inc();
                            debug!(error = ?err, "payment status poll failed");
                        }
                    }
                }
                _ = ticker.tick(), if in_flight.is_terminated() => {
                    in_flight.set(self.gateway.purchase_status(purchase_id).boxed().fuse());
                }
            }
        }
    }
}

fn status_label(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
        PaymentStatus::Failed => "failed",
    }
}
