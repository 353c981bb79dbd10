//! The checkout state machine.
//!
//! One orchestrator sequences the cart store, address book, eligibility gate
//! and payment gateway into a single checkout attempt:
//!
//! ```text
//! Idle -> AddressPending -> AddressConfirmed -> Submitting -> Settled
//!                                                         \-> Failed
//! ```
//!
//! The session is ephemeral and never persisted. Entering the flow copies the
//! live cart into a snapshot, so mutations from other surfaces cannot corrupt
//! an in-flight submission. The cart is cleared on the `Settled` transition
//! and on no other path.
//!
//! A second submission request while one is in flight is suppressed without a
//! second remote call; this is the load-bearing correctness property of the
//! whole subsystem, since a double tap on "pay" must never create two orders.
//!
//! Known gap: a session abandoned mid-`Submitting` (process killed after the
//! remote call went out) is not reconciled against server state on the next
//! launch. The session is deliberately not persisted, so a fresh launch
//! starts at `Idle`; the server-side order, if one was created, surfaces
//! through the remote order history instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use swiftcart_core::PaymentMethod;
use tokio::sync::Mutex;

use crate::address::AddressBook;
use crate::cart::CartStore;
use crate::error::CheckoutError;
use crate::ledger::OrderLedger;
use crate::models::{Address, Cart, Order, StructuredDetails};
use crate::payment::{PaymentError, PaymentGateway};

/// Where a checkout session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No active session.
    Idle,
    /// Session open, awaiting a confirmed delivery address.
    AddressPending,
    /// Address confirmed; awaiting payment-method choice and submission.
    AddressConfirmed,
    /// Remote submission in flight.
    Submitting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::AddressPending => write!(f, "address_pending"),
            Self::AddressConfirmed => write!(f, "address_confirmed"),
            Self::Submitting => write!(f, "submitting"),
        }
    }
}

/// Ephemeral per-attempt state, owned exclusively by the orchestrator.
///
/// `Settled` and `Failed` are terminal: the session is destroyed on both, so
/// they never appear as a stored phase.
#[derive(Debug)]
struct CheckoutSession {
    cart_snapshot: Cart,
    address: Option<Address>,
    payment_method: Option<PaymentMethod>,
    notes: Option<String>,
    phase: Phase,
    last_error: Option<CheckoutError>,
}

/// Sequences one checkout attempt end to end.
pub struct CheckoutOrchestrator {
    cart: Arc<CartStore>,
    address_book: Arc<AddressBook>,
    ledger: Arc<OrderLedger>,
    gateway: PaymentGateway,
    session: Mutex<Option<CheckoutSession>>,
    in_flight: AtomicBool,
}

impl CheckoutOrchestrator {
    /// Wire the orchestrator to its collaborators. Stores are shared with the
    /// rest of the app; the session is exclusively owned here.
    #[must_use]
    pub fn new(
        cart: Arc<CartStore>,
        address_book: Arc<AddressBook>,
        ledger: Arc<OrderLedger>,
        gateway: PaymentGateway,
    ) -> Self {
        Self {
            cart,
            address_book,
            ledger,
            gateway,
            session: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Open a checkout session, snapshotting the live cart.
    ///
    /// Replaces any previous non-submitting session; retry after a failure is
    /// simply a fresh `begin` with a fresh snapshot.
    ///
    /// # Errors
    ///
    /// `NotReady` if a submission is currently in flight.
    pub async fn begin(&self) -> Result<(), CheckoutError> {
        let mut session = self.session.lock().await;
        if session.as_ref().is_some_and(|s| s.phase == Phase::Submitting) {
            return Err(CheckoutError::NotReady("submission in flight"));
        }

        let cart_snapshot = self.cart.snapshot().await;
        tracing::debug!(lines = cart_snapshot.items().len(), "checkout session opened");
        *session = Some(CheckoutSession {
            cart_snapshot,
            address: None,
            payment_method: None,
            notes: None,
            phase: Phase::AddressPending,
            last_error: None,
        });
        Ok(())
    }

    /// Detect the device location as an unconfirmed candidate address.
    ///
    /// # Errors
    ///
    /// Location and geocoding failures, classified; also recorded as the
    /// session's last error.
    pub async fn detect_address(&self) -> Result<Address, CheckoutError> {
        self.require_open_session().await?;
        match self.address_book.detect_current().await {
            Ok(candidate) => Ok(candidate),
            Err(e) => {
                let err = CheckoutError::from(e);
                self.record_error(err.clone()).await;
                Err(err)
            }
        }
    }

    /// Confirm a candidate address through the eligibility gate.
    ///
    /// On rejection the session stays in `AddressPending` with the rejection
    /// recorded, so the user can try a different address.
    ///
    /// # Errors
    ///
    /// `OutOfServiceArea` and the location/geocode kinds.
    pub async fn confirm_address(&self, candidate: Address) -> Result<(), CheckoutError> {
        self.require_open_session().await?;
        match self.address_book.confirm(candidate).await {
            Ok(confirmed) => {
                self.advance_to_confirmed(confirmed).await;
                Ok(())
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                self.record_error(err.clone()).await;
                Err(err)
            }
        }
    }

    /// Promote a saved address, re-validated through the gate.
    ///
    /// # Errors
    ///
    /// Same as [`Self::confirm_address`].
    pub async fn select_saved_address(&self, address: Address) -> Result<(), CheckoutError> {
        self.require_open_session().await?;
        match self.address_book.select_saved(address).await {
            Ok(confirmed) => {
                self.advance_to_confirmed(confirmed).await;
                Ok(())
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                self.record_error(err.clone()).await;
                Err(err)
            }
        }
    }

    /// Confirm a manually typed address.
    ///
    /// # Errors
    ///
    /// Same as [`Self::confirm_address`].
    pub async fn confirm_manual_address(
        &self,
        text: &str,
        details: Option<StructuredDetails>,
    ) -> Result<(), CheckoutError> {
        self.require_open_session().await?;
        match self.address_book.confirm_manual_text(text, details).await {
            Ok(confirmed) => {
                self.advance_to_confirmed(confirmed).await;
                Ok(())
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                self.record_error(err.clone()).await;
                Err(err)
            }
        }
    }

    /// Pick how the order will be settled. Requires a confirmed address.
    ///
    /// # Errors
    ///
    /// `NotReady` unless the session is in `AddressConfirmed`.
    pub async fn choose_payment_method(&self, method: PaymentMethod) -> Result<(), CheckoutError> {
        let mut session = self.session.lock().await;
        match session.as_mut() {
            Some(s) if s.phase == Phase::AddressConfirmed => {
                s.payment_method = Some(method);
                Ok(())
            }
            Some(s) if s.phase == Phase::Submitting => {
                Err(CheckoutError::NotReady("submission in flight"))
            }
            Some(_) => Err(CheckoutError::NotReady("no confirmed address")),
            None => Err(CheckoutError::NotReady("no checkout session")),
        }
    }

    /// Attach a delivery note forwarded to the order API.
    pub async fn set_delivery_note(&self, note: impl Into<String> + Send) {
        let mut session = self.session.lock().await;
        if let Some(s) = session.as_mut() {
            if s.phase != Phase::Submitting {
                s.notes = Some(note.into());
            }
        }
    }

    /// Submit the order.
    ///
    /// Exactly one remote order-creation call is made per accepted
    /// submission. A second call while one is in flight returns
    /// `DuplicateSubmissionSuppressed` without touching the network.
    ///
    /// On success the order lands in the ledger, the cart is cleared, and the
    /// session is destroyed. Payment cancellation returns the session to
    /// `AddressConfirmed`. Every other failure destroys the session and
    /// leaves the live cart exactly as it was.
    ///
    /// # Errors
    ///
    /// `EmptyCart`, the payment/API kinds, `PaymentCancelled`,
    /// `DuplicateSubmissionSuppressed`, `NotReady`.
    #[tracing::instrument(skip(self))]
    pub async fn submit(&self) -> Result<Order, CheckoutError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            tracing::debug!("duplicate submission suppressed");
            return Err(CheckoutError::DuplicateSubmissionSuppressed);
        }

        let result = self.submit_once().await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    /// Abandon the session before submission. Cheap and clean: no remote
    /// calls were made, the live cart is untouched.
    ///
    /// # Errors
    ///
    /// `NotReady` once a submission has started; the remote call is not
    /// cancellable.
    pub async fn cancel(&self) -> Result<(), CheckoutError> {
        let mut session = self.session.lock().await;
        if session.as_ref().is_some_and(|s| s.phase == Phase::Submitting) {
            return Err(CheckoutError::NotReady("submission in flight"));
        }
        *session = None;
        Ok(())
    }

    /// Current phase, `Idle` when no session is open.
    pub async fn phase(&self) -> Phase {
        self.session
            .lock()
            .await
            .as_ref()
            .map_or(Phase::Idle, |s| s.phase)
    }

    /// The last non-terminal failure recorded on the open session.
    pub async fn last_error(&self) -> Option<CheckoutError> {
        self.session
            .lock()
            .await
            .as_ref()
            .and_then(|s| s.last_error.clone())
    }

    /// The snapshot the open session will submit, if any.
    pub async fn cart_snapshot(&self) -> Option<Cart> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.cart_snapshot.clone())
    }

    async fn submit_once(&self) -> Result<Order, CheckoutError> {
        // Validate the session and flip it to Submitting while holding the
        // lock, then release it for the duration of the remote call.
        let (snapshot, address, method, notes) = {
            let mut session = self.session.lock().await;
            let Some(s) = session.as_mut() else {
                return Err(CheckoutError::NotReady("no checkout session"));
            };
            if s.phase != Phase::AddressConfirmed {
                return Err(CheckoutError::NotReady("no confirmed address"));
            }
            let Some(address) = s.address.clone() else {
                return Err(CheckoutError::NotReady("no confirmed address"));
            };
            let Some(method) = s.payment_method else {
                return Err(CheckoutError::NotReady("no payment method selected"));
            };

            // The cart may have been emptied from another surface since the
            // snapshot was taken; fail fast rather than submit a zero-item
            // order.
            if s.cart_snapshot.is_empty() || self.cart.is_empty().await {
                tracing::info!("submission rejected: cart emptied mid-flow");
                *session = None;
                return Err(CheckoutError::EmptyCart);
            }

            s.phase = Phase::Submitting;
            s.last_error = None;
            (
                s.cart_snapshot.clone(),
                address,
                method,
                s.notes.clone(),
            )
        };

        match self.gateway.settle(&snapshot, &address, method, notes).await {
            Ok(order) => {
                self.ledger.append(order.clone()).await;
                self.cart.clear().await;
                *self.session.lock().await = None;
                tracing::info!(order_id = %order.order_id, "checkout settled");
                Ok(order)
            }
            Err(PaymentError::Cancelled) => {
                let mut session = self.session.lock().await;
                if let Some(s) = session.as_mut() {
                    s.phase = Phase::AddressConfirmed;
                    s.last_error = Some(CheckoutError::PaymentCancelled);
                }
                Err(CheckoutError::PaymentCancelled)
            }
            Err(e) => {
                let err = CheckoutError::from(e);
                tracing::warn!(error = %err, "checkout failed");
                *self.session.lock().await = None;
                Err(err)
            }
        }
    }

    async fn require_open_session(&self) -> Result<(), CheckoutError> {
        let session = self.session.lock().await;
        match session.as_ref() {
            Some(s) if s.phase == Phase::Submitting => {
                Err(CheckoutError::NotReady("submission in flight"))
            }
            Some(_) => Ok(()),
            None => Err(CheckoutError::NotReady("no checkout session")),
        }
    }

    async fn advance_to_confirmed(&self, address: Address) {
        let mut session = self.session.lock().await;
        if let Some(s) = session.as_mut() {
            s.address = Some(address);
            s.phase = Phase::AddressConfirmed;
            s.last_error = None;
        }
    }

    async fn record_error(&self, err: CheckoutError) {
        let mut session = self.session.lock().await;
        if let Some(s) = session.as_mut() {
            s.last_error = Some(err);
        }
    }
}
