//! Domain layer: payments, ledger records, money and the ports the
//! application layer talks to.

pub mod account;
pub mod money;
pub mod payment;
pub mod ports;
