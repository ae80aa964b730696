use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::aggregation::{below_threshold, most_productive, SellerTotal};
use super::best_window::{find_best_periods, BestPeriods};
use super::{resolve, AnalyticsError, DateRange, PeriodKind};
use crate::store::TransactionStore;

// =========================================================================
// AnalyticsEngine
// =========================================================================

/// Read-only sales queries over a [`TransactionStore`].
///
/// Holds nothing but the store handle, so one instance is shared by every
/// request. Inputs are validated before the store is touched.
#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Arc<dyn TransactionStore>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn TransactionStore>) -> Self {
        Self { store }
    }

    /// Sellers with the highest total in the `period` containing `date`.
    ///
    /// `period` is one of DAY, MONTH, QUARTER or YEAR, case-insensitive.
    pub async fn most_productive_sellers(
        &self,
        date: NaiveDate,
        period: &str,
        active: bool,
    ) -> Result<Vec<SellerTotal>, AnalyticsError> {
        let kind = PeriodKind::parse_coarse(period)?;
        let range = resolve(date, kind)?;

        let rows = self.store.find_by_date_range_and_active_flag(range, active).await?;
        tracing::debug!(
            %date,
            period = %kind,
            active,
            rows = rows.len(),
            "Most productive sellers query"
        );

        let winners = most_productive(&rows)?;
        tracing::info!(sellers = winners.len(), "Most productive sellers found");
        Ok(winners)
    }

    /// Sellers whose total over the days `start..=end` is below `ceiling`.
    pub async fn sellers_below_threshold(
        &self,
        ceiling: Decimal,
        start: NaiveDate,
        end: NaiveDate,
        active: bool,
    ) -> Result<Vec<SellerTotal>, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::InvalidDateOrder { start, end });
        }
        let range = DateRange::from_days_inclusive(start, end)?;

        let rows = self.store.find_by_date_range_and_active_flag(range, active).await?;
        tracing::debug!(
            %ceiling,
            %start,
            %end,
            active,
            rows = rows.len(),
            "Sellers below threshold query"
        );

        let below = below_threshold(&rows, ceiling)?;
        tracing::info!(sellers = below.len(), "Sellers below threshold found");
        Ok(below)
    }

    /// Busiest day, week and month of one seller's history.
    pub async fn best_periods_for_seller(&self, seller_id: i64) -> Result<BestPeriods, AnalyticsError> {
        let rows = self.store.find_all_for_seller(seller_id).await?;
        tracing::debug!(seller_id, rows = rows.len(), "Best periods query");

        find_best_periods(seller_id, &rows)
    }
}

impl std::fmt::Debug for AnalyticsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsEngine").finish_non_exhaustive()
    }
}
