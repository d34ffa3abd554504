#![forbid(unsafe_code)]

//! Core domain model and business logic for the Tally daily ledger.
//!
//! This crate provides:
//! - Domain types (profile, daily records, diary entries, weigh-ins)
//! - Unit conversion (mass and water volume)
//! - Metabolic math (BMR, TDEE) and goal resolution
//! - Diary aggregation and streak tracking
//! - The day ledger state machine
//! - Persistence (JSON document store, CSV export)

pub mod types;
pub mod error;
pub mod logging;
pub mod units;
pub mod metabolic;
pub mod goal;
pub mod aggregate;
pub mod streak;
pub mod clock;
pub mod store;
pub mod ledger;
pub mod export;
pub mod config;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use store::{JsonStore, MemoryStore, RecordStore};
pub use ledger::{DayLedger, LedgerOptions, LedgerSnapshot};
pub use aggregate::{aggregate, DayTotals, MacroSplit};
pub use goal::{resolve_daily_goal, GoalResolution};
pub use export::export_history;
pub use config::Config;
