//! SwiftCart checkout library.
//!
//! Cart state, delivery-address management, service-area gating, payment
//! settlement and the order ledger, sequenced by the checkout orchestrator.
//! Everything here is UI-agnostic; the app shell drives the flow and renders
//! the phases.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod address;
pub mod cart;
pub mod config;
pub mod error;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod payment;
pub mod services;
pub mod state;
pub mod storage;

pub use address::AddressBook;
pub use cart::CartStore;
pub use error::CheckoutError;
pub use ledger::OrderLedger;
pub use orchestrator::{CheckoutOrchestrator, Phase};
pub use payment::PaymentGateway;
pub use state::CheckoutSystem;
