pub mod ledger_writer;
