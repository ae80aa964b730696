//! Analytics engine end-to-end scenarios over the in-memory store

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use seller_crm::analytics::{DateRange, PeriodKind};
use seller_crm::store::SellerTransaction;
use seller_crm::{AnalyticsEngine, AnalyticsError, InMemoryTransactionStore, StoreError, TransactionStore};

mod common;
use common::{at, date, seller, store_with, transaction};

/// Store wrapper counting every fetch
struct CountingStore {
    inner: InMemoryTransactionStore,
    fetches: AtomicUsize,
}

#[async_trait]
impl TransactionStore for CountingStore {
    async fn find_by_date_range_and_active_flag(
        &self,
        range: DateRange,
        active: bool,
    ) -> Result<Vec<SellerTransaction>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_date_range_and_active_flag(range, active).await
    }

    async fn find_all_for_seller(&self, seller_id: i64) -> Result<Vec<SellerTransaction>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.find_all_for_seller(seller_id).await
    }
}

fn counting(inner: InMemoryTransactionStore) -> Arc<CountingStore> {
    Arc::new(CountingStore {
        inner,
        fetches: AtomicUsize::new(0),
    })
}

#[tokio::test]
async fn test_most_productive_single_day() {
    let store = store_with(
        vec![seller(1, "Sasha", true), seller(2, "Petr", true)],
        vec![
            transaction(1, 1, dec!(100), at(2024, 1, 1, 10, 0)),
            transaction(2, 1, dec!(200), at(2024, 1, 1, 12, 0)),
            transaction(3, 2, dec!(250), at(2024, 1, 1, 15, 0)),
            transaction(4, 2, dec!(900), at(2024, 1, 2, 0, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let winners = engine
        .most_productive_sellers(date(2024, 1, 1), "DAY", true)
        .await
        .unwrap();

    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].seller.id, 1);
    assert_eq!(winners[0].total, dec!(300));
}

#[tokio::test]
async fn test_most_productive_month_reports_ties() {
    let store = store_with(
        vec![seller(1, "Sasha", true), seller(2, "Petr", true), seller(3, "Lena", true)],
        vec![
            transaction(1, 1, dec!(500), at(2024, 2, 1, 10, 0)),
            transaction(2, 2, dec!(200), at(2024, 2, 10, 10, 0)),
            transaction(3, 2, dec!(300.00), at(2024, 2, 29, 23, 59)),
            transaction(4, 3, dec!(100), at(2024, 2, 14, 8, 0)),
            transaction(5, 3, dec!(700), at(2024, 3, 1, 0, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let winners = engine
        .most_productive_sellers(date(2024, 2, 15), "month", true)
        .await
        .unwrap();

    let ids: Vec<i64> = winners.iter().map(|w| w.seller.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_inactive_flag_selects_deleted_sellers() {
    let store = store_with(
        vec![seller(1, "Sasha", true), seller(2, "Gone", false)],
        vec![
            transaction(1, 1, dec!(1000), at(2024, 5, 5, 10, 0)),
            transaction(2, 2, dec!(10), at(2024, 5, 6, 10, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let winners = engine
        .most_productive_sellers(date(2024, 5, 1), "YEAR", false)
        .await
        .unwrap();

    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].seller.id, 2);
    assert!(!winners[0].seller.is_active);
}

#[tokio::test]
async fn test_soft_deleted_transaction_of_active_seller_is_skipped() {
    let mut refunded = transaction(2, 1, dec!(900), at(2024, 5, 5, 11, 0));
    refunded.is_active = false;
    let store = store_with(
        vec![seller(1, "Sasha", true), seller(2, "Lena", true)],
        vec![
            transaction(1, 1, dec!(100), at(2024, 5, 5, 10, 0)),
            refunded,
            transaction(3, 2, dec!(500), at(2024, 5, 5, 12, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let winners = engine
        .most_productive_sellers(date(2024, 5, 5), "DAY", true)
        .await
        .unwrap();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].seller.id, 2);

    let below = engine
        .sellers_below_threshold(dec!(200), date(2024, 5, 5), date(2024, 5, 5), true)
        .await
        .unwrap();
    assert_eq!(below.len(), 1);
    assert_eq!(below[0].seller.id, 1);
    assert_eq!(below[0].total, dec!(100));
}

#[tokio::test]
async fn test_best_periods_count_last_second_fractions() {
    let late = at(2024, 1, 1, 23, 59) + chrono::Duration::milliseconds(59_500);
    let store = store_with(
        vec![seller(1, "Sasha", true)],
        vec![transaction(1, 1, dec!(10), late)],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let periods = engine.best_periods_for_seller(1).await.unwrap();
    assert_eq!(periods.best_day.transaction_count, 1);
    assert_eq!(periods.best_day.start, at(2024, 1, 1, 0, 0));
    assert_eq!(periods.best_day.end, at(2024, 1, 1, 23, 59) + chrono::Duration::seconds(59));
    assert_eq!(periods.best_week.transaction_count, 1);
    assert_eq!(periods.best_month.transaction_count, 1);
}

#[tokio::test]
async fn test_best_periods_for_seller() {
    let store = store_with(
        vec![seller(1, "Sasha", true)],
        vec![
            transaction(1, 1, dec!(100), at(2024, 1, 1, 10, 0)),
            transaction(2, 1, dec!(200), at(2024, 1, 1, 12, 0)),
            transaction(3, 1, dec!(50), at(2024, 2, 3, 9, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let periods = engine.best_periods_for_seller(1).await.unwrap();

    assert_eq!(periods.best_day.start, at(2024, 1, 1, 0, 0));
    assert_eq!(periods.best_day.end, date(2024, 1, 1).and_hms_opt(23, 59, 59).unwrap());
    assert_eq!(periods.best_day.transaction_count, 2);
    assert_eq!(periods.best_day.period_kind, PeriodKind::Day);

    assert_eq!(periods.best_month.start, at(2024, 1, 1, 0, 0));
    assert_eq!(periods.best_month.end, date(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap());
    assert_eq!(periods.best_month.transaction_count, 2);
    assert_eq!(periods.best_month.period_kind, PeriodKind::Month);
}

#[tokio::test]
async fn test_sellers_below_threshold() {
    let store = store_with(
        vec![seller(1, "SellerOne", true), seller(2, "SellerTwo", true)],
        vec![
            transaction(1, 1, dec!(1500), at(2024, 1, 10, 10, 0)),
            transaction(2, 1, dec!(500), at(2024, 2, 28, 23, 0)),
            transaction(3, 2, dec!(1800), at(2024, 1, 20, 10, 0)),
            // outside the inclusive end day
            transaction(4, 2, dec!(5000), at(2024, 2, 29, 0, 0)),
        ],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let below = engine
        .sellers_below_threshold(dec!(1801), date(2024, 1, 1), date(2024, 2, 28), true)
        .await
        .unwrap();

    assert_eq!(below.len(), 1);
    assert_eq!(below[0].seller.seller_name, "SellerTwo");
    assert_eq!(below[0].total, dec!(1800));
}

#[tokio::test]
async fn test_threshold_nobody_below() {
    let store = store_with(
        vec![seller(1, "SellerOne", true)],
        vec![transaction(1, 1, dec!(2000), at(2024, 1, 10, 10, 0))],
    );
    let engine = AnalyticsEngine::new(Arc::new(store));

    let err = engine
        .sellers_below_threshold(dec!(2000), date(2024, 1, 1), date(2024, 1, 31), true)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::NoSellersFound(_)));
    assert_eq!(err.to_string(), "No sellers matched the given parameters");
}

#[tokio::test]
async fn test_invalid_date_order_fails_before_fetch() {
    let store = counting(store_with(vec![seller(1, "Sasha", true)], vec![]));
    let engine = AnalyticsEngine::new(store.clone());

    let err = engine
        .sellers_below_threshold(dec!(100), date(2024, 2, 28), date(2024, 1, 1), true)
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyticsError::InvalidDateOrder { .. }));
    assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_period_fails_before_fetch() {
    let store = counting(store_with(vec![seller(1, "Sasha", true)], vec![]));
    let engine = AnalyticsEngine::new(store.clone());

    for period in ["WEEK", "hour", ""] {
        let err = engine
            .most_productive_sellers(date(2024, 1, 1), period, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidPeriod { .. }), "period {period:?}");
    }
    assert_eq!(store.fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_engine_is_shared_across_tasks() {
    let store = store_with(
        vec![seller(1, "Sasha", true)],
        vec![transaction(1, 1, dec!(10), at(2024, 1, 1, 10, 0))],
    );
    let engine = Arc::new(AnalyticsEngine::new(Arc::new(store)));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.best_periods_for_seller(1).await })
        })
        .collect();

    for handle in handles {
        let periods = handle.await.unwrap().unwrap();
        assert_eq!(periods.best_week.transaction_count, 1);
    }
}
