//! Sales analytics
//!
//! Stateless queries over transaction history:
//! - most productive sellers of a calendar period
//! - sellers whose total stays below a ceiling over a date span
//! - a seller's busiest day, week and month

pub mod aggregation;
pub mod best_window;
mod engine;
pub mod error;
pub mod period;

pub use aggregation::SellerTotal;
pub use best_window::{AlignedWindow, BestPeriod, BestPeriods, WindowLength};
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use period::{resolve, DateRange, PeriodKind};
