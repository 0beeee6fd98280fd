pub mod commands;
pub mod ledger_manager;
pub mod services;

pub use commands::{execute, CommandOutcome, LedgerCommand};
pub use ledger_manager::LedgerManager;
