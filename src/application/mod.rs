//! Application layer orchestrating the domain.
//!
//! `SettlementEngine` is the clearing system moving funds between banks.
//! `PaymentSimulator` plays two correspondent banks exchanging MT or ISO 20022
//! messages.

pub mod dto;
pub mod settlement;
pub mod simulation;

pub use settlement::SettlementEngine;
pub use simulation::PaymentSimulator;
