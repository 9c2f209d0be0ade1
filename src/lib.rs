//! Interbank clearing simulator.
//!
//! Two simulated banks exchange payments as SWIFT MT (MT103/MT910) or
//! ISO 20022 (pacs.008/camt.054) messages, and a clearing engine settles
//! credit transfers against a ledger of accounts and bank liquidity,
//! answering in pacs.002 and camt.004.

pub mod application;
pub mod codec;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
