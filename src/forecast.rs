//! Computes the trailing-window simple moving average (SMA) of monthly
//! expenses.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use time::{Date, Month};

use crate::transaction::Transaction;

/// The number of trailing months a forecast covers when the caller does not
/// ask for a specific window.
pub const DEFAULT_WINDOW_MONTHS: u32 = 3;

/// The outcome of a spending forecast.
///
/// Computed on demand and never persisted; the same inputs always produce
/// the same result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// The average monthly expense total across the months in the window
    /// that had any expenses, rounded to 2 decimal places.
    pub sma: Decimal,
    /// A label describing the window, e.g. "3 months".
    pub window: String,
    /// The number of expense transactions that contributed to the forecast.
    pub data_points: usize,
    /// The expense total of each non-empty month in the window, in
    /// chronological order.
    pub monthly_totals: Vec<Decimal>,
    /// The sum of every expense in the window, rounded to 2 decimal places.
    pub total_expenses: Decimal,
    /// A sentence summarising the forecast, or explaining that the window
    /// held no expense data.
    pub summary: String,
}

/// Average the per-month totals of `expenses` over a `window_months` long
/// window.
///
/// `expenses` must be sorted ascending by date; each calendar month's
/// transactions are then contiguous, and buckets fall out of the scan in
/// chronological order.
///
/// Months without any expenses contribute no bucket: the average divides by
/// the number of months that had data, not by the window length. A month of
/// zero spending therefore raises the average rather than lowering it.
/// Callers that want a zero-filled denominator must adjust.
pub(crate) fn compute_sma(expenses: &[Transaction], window_months: u32) -> ForecastResult {
    let window = format!("{window_months} months");

    if expenses.is_empty() {
        return ForecastResult {
            sma: Decimal::ZERO,
            window,
            data_points: 0,
            monthly_totals: Vec::new(),
            total_expenses: Decimal::ZERO,
            summary: format!("No expense data available for the last {window_months} months"),
        };
    }

    let mut monthly_totals: Vec<Decimal> = Vec::new();
    let mut current_month: Option<(i32, Month)> = None;

    for expense in expenses {
        let month = (expense.date.year(), expense.date.month());
        if current_month != Some(month) {
            current_month = Some(month);
            monthly_totals.push(Decimal::ZERO);
        }
        *monthly_totals.last_mut().expect("bucket just added") += expense.amount;
    }

    let total: Decimal = monthly_totals.iter().sum();
    let sma = round_currency(total / Decimal::from(monthly_totals.len() as u64));

    ForecastResult {
        sma,
        window,
        data_points: expenses.len(),
        monthly_totals,
        total_expenses: round_currency(total),
        summary: format!(
            "Based on your last {window_months} months, \
             you're spending an average of ${sma:.2} per month"
        ),
    }
}

/// Round to 2 decimal places with half-up rounding for currency display.
fn round_currency(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// The date `months` calendar months before `date`.
///
/// The day of month is kept where possible and otherwise clamped to the last
/// day of the target month, e.g. 31 May minus 3 months is 28 (or 29)
/// February.
pub(crate) fn months_before(date: Date, months: u32) -> Date {
    let total_months = date.year() * 12 + i32::from(u8::from(date.month())) - 1 - months as i32;
    let year = total_months.div_euclid(12);
    let month = Month::try_from((total_months.rem_euclid(12) + 1) as u8).expect("month in 1..=12");
    let day = date.day().min(month.length(year));

    Date::from_calendar_date(year, month, day).expect("clamped day is valid for its month")
}

#[cfg(test)]
mod forecast_tests {
    use rust_decimal::Decimal;
    use time::{Date, macros::date};

    use crate::{
        database_id::OwnerId,
        transaction::{Transaction, TransactionKind},
    };

    use super::{compute_sma, months_before};

    fn amount(text: &str) -> Decimal {
        text.parse().unwrap()
    }

    fn expense(amount_text: &str, day: Date) -> Transaction {
        Transaction {
            id: 1,
            owner_id: OwnerId::new(1),
            kind: TransactionKind::Expense,
            amount: amount(amount_text),
            description: "test expense".to_owned(),
            category: None,
            date: day,
        }
    }

    #[test]
    fn empty_window_is_not_an_error() {
        let got = compute_sma(&[], 3);

        assert_eq!(got.sma, Decimal::ZERO);
        assert_eq!(got.window, "3 months");
        assert_eq!(got.data_points, 0);
        assert!(got.monthly_totals.is_empty());
        assert_eq!(got.total_expenses, Decimal::ZERO);
        assert_eq!(
            got.summary,
            "No expense data available for the last 3 months"
        );
    }

    #[test]
    fn averages_three_full_months() {
        let expenses = [
            expense("100.00", date!(2025 - 01 - 10)),
            expense("200.00", date!(2025 - 02 - 10)),
            expense("300.00", date!(2025 - 03 - 10)),
        ];

        let got = compute_sma(&expenses, 3);

        assert_eq!(got.sma, amount("200.00"));
        assert_eq!(got.total_expenses, amount("600.00"));
        assert_eq!(got.data_points, 3);
        assert_eq!(
            got.monthly_totals,
            vec![amount("100.00"), amount("200.00"), amount("300.00")]
        );
        assert_eq!(
            got.summary,
            "Based on your last 3 months, you're spending an average of $200.00 per month"
        );
    }

    #[test]
    fn sums_each_month_into_one_bucket() {
        let expenses = [
            expense("10.00", date!(2025 - 01 - 02)),
            expense("15.00", date!(2025 - 01 - 28)),
            expense("25.00", date!(2025 - 02 - 14)),
        ];

        let got = compute_sma(&expenses, 3);

        assert_eq!(got.monthly_totals, vec![amount("25.00"), amount("25.00")]);
        assert_eq!(got.data_points, 3);
    }

    #[test]
    fn months_without_expenses_do_not_dilute_the_average() {
        // Nothing in February: two buckets, not three.
        let expenses = [
            expense("100.00", date!(2025 - 01 - 10)),
            expense("300.00", date!(2025 - 03 - 10)),
        ];

        let got = compute_sma(&expenses, 3);

        assert_eq!(got.monthly_totals.len(), 2);
        assert_eq!(got.sma, amount("200.00"));
    }

    #[test]
    fn same_month_of_different_years_is_two_buckets() {
        let expenses = [
            expense("100.00", date!(2024 - 03 - 10)),
            expense("300.00", date!(2025 - 03 - 10)),
        ];

        let got = compute_sma(&expenses, 12);

        assert_eq!(got.monthly_totals.len(), 2);
    }

    #[test]
    fn average_rounds_half_up() {
        let expenses = [
            expense("10.00", date!(2025 - 01 - 10)),
            expense("10.01", date!(2025 - 02 - 10)),
        ];

        let got = compute_sma(&expenses, 3);

        // (10.00 + 10.01) / 2 = 10.005, which rounds up for display.
        assert_eq!(got.sma, amount("10.01"));
    }

    #[test]
    fn months_before_keeps_the_day_when_valid() {
        let got = months_before(date!(2025 - 05 - 15), 3);

        assert_eq!(got, date!(2025 - 02 - 15));
    }

    #[test]
    fn months_before_clamps_to_the_end_of_short_months() {
        let got = months_before(date!(2025 - 05 - 31), 3);

        assert_eq!(got, date!(2025 - 02 - 28));
    }

    #[test]
    fn months_before_respects_leap_years() {
        let got = months_before(date!(2024 - 05 - 31), 3);

        assert_eq!(got, date!(2024 - 02 - 29));
    }

    #[test]
    fn months_before_wraps_across_year_boundaries() {
        let got = months_before(date!(2025 - 02 - 15), 3);

        assert_eq!(got, date!(2024 - 11 - 15));
    }

    #[test]
    fn months_before_handles_windows_longer_than_a_year() {
        let got = months_before(date!(2025 - 02 - 15), 14);

        assert_eq!(got, date!(2023 - 12 - 15));
    }
}
