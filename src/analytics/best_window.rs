//! Densest calendar-aligned window of a seller's activity.
//!
//! For each window length the scan walks a timestamp-sorted array with two
//! indices. `left` is the anchor transaction; its window starts at the
//! calendar boundary (midnight, Monday midnight, first of month) at or before
//! it and runs up to the next boundary, exclusive. The reported end is that
//! boundary minus one second. `right` is one past the last transaction inside
//! that window. Windows never move backwards as
//! `left` advances, so `right` never regresses and the scan is linear.

use chrono::{Datelike, Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::period::{add_months, first_of_month, start_of_day};
use super::{AnalyticsError, PeriodKind};
use crate::store::SellerTransaction;

/// Fixed window lengths searched by [`find_best_periods`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLength {
    Day,
    Week,
    Month,
}

impl WindowLength {
    pub fn period_kind(&self) -> PeriodKind {
        match self {
            WindowLength::Day => PeriodKind::Day,
            WindowLength::Week => PeriodKind::Week,
            WindowLength::Month => PeriodKind::Month,
        }
    }

    /// The aligned window containing `ts`.
    pub fn window_for(&self, ts: NaiveDateTime) -> Result<AlignedWindow, AnalyticsError> {
        let date = ts.date();
        let (start, next) = match self {
            WindowLength::Day => {
                let next = date.succ_opt().ok_or(AnalyticsError::DateOutOfRange(date))?;
                (date, next)
            }
            WindowLength::Week => {
                let monday = date
                    .checked_sub_signed(Duration::days(i64::from(date.weekday().num_days_from_monday())))
                    .ok_or(AnalyticsError::DateOutOfRange(date))?;
                let next = monday
                    .checked_add_signed(Duration::days(7))
                    .ok_or(AnalyticsError::DateOutOfRange(date))?;
                (monday, next)
            }
            WindowLength::Month => {
                let first = first_of_month(date)?;
                (first, add_months(first, 1)?)
            }
        };

        let next_start = start_of_day(next);
        Ok(AlignedWindow {
            start: start_of_day(start),
            end: next_start - Duration::seconds(1),
            next_start,
        })
    }
}

/// One calendar-aligned window.
///
/// Membership is `start <= ts < next_start`, so sub-second timestamps in the
/// last second still count. `end` is only the reported bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub next_start: NaiveDateTime,
}

impl AlignedWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.next_start
    }
}

/// The densest window found for one window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPeriod {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub period_kind: PeriodKind,
    pub transaction_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestPeriods {
    pub best_day: BestPeriod,
    pub best_week: BestPeriod,
    pub best_month: BestPeriod,
}

/// Two-pointer scan over `sorted` (ascending). `None` only for empty input.
///
/// A later window replaces the current best only on a strictly greater count,
/// so the chronologically first window wins ties.
pub fn best_window(
    sorted: &[NaiveDateTime],
    length: WindowLength,
) -> Result<Option<BestPeriod>, AnalyticsError> {
    let mut best: Option<BestPeriod> = None;
    let mut right = 0;

    for left in 0..sorted.len() {
        let window = length.window_for(sorted[left])?;

        right = right.max(left);
        while right < sorted.len() && sorted[right] < window.next_start {
            right += 1;
        }

        let count = (right - left) as u64;
        if best.map_or(true, |b| count > b.transaction_count) {
            best = Some(BestPeriod {
                start: window.start,
                end: window.end,
                period_kind: length.period_kind(),
                transaction_count: count,
            });
        }
    }

    Ok(best)
}

/// Best day, week and month windows of one seller's transactions.
pub fn find_best_periods(
    seller_id: i64,
    transactions: &[SellerTransaction],
) -> Result<BestPeriods, AnalyticsError> {
    if transactions.is_empty() {
        return Err(AnalyticsError::NoTransactionsForSeller(seller_id));
    }

    let mut timestamps: Vec<NaiveDateTime> = transactions
        .iter()
        .map(|row| row.transaction.transaction_date)
        .collect();
    timestamps.sort_unstable();

    let pick = |length: WindowLength| -> Result<BestPeriod, AnalyticsError> {
        best_window(&timestamps, length)?.ok_or(AnalyticsError::NoTransactionsForSeller(seller_id))
    };

    Ok(BestPeriods {
        best_day: pick(WindowLength::Day)?,
        best_week: pick(WindowLength::Week)?,
        best_month: pick(WindowLength::Month)?,
    })
}
