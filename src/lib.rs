//! creatorpay: backend library and ops CLI for a creator-payments platform.
//!
//! The library owns the two data transforms the platform depends on: the
//! fixed-layout payment payload codec ([`payload`]) and the UTXO withdrawal
//! transaction builder ([`withdraw`]), plus typed alloy clients for the
//! platform contracts ([`contract_client`]) and EIP-712 lazy-mint vouchers
//! ([`voucher`]).

pub mod config;
pub mod contract_client;
pub mod payload;
pub mod state;
pub mod voucher;
pub mod wallet;
pub mod withdraw;

pub use payload::{PaymentKind, PaymentPayload};
pub use withdraw::{build_withdrawal, Utxo, Withdrawal};
