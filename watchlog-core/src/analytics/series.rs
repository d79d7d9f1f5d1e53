//! Month-series helpers for gap-filled time series.
//!
//! SQL grouping alone only returns months that have at least one row; these
//! helpers generate the full calendar range independently of the data and
//! merge the two already-sorted sequences in a single linear pass.

use std::fmt;

/// A calendar month. Derived ordering is chronological (year, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl YearMonth {
    /// Parse from a `YYYY-MM` key as produced by `strftime('%Y-%m', ...)`.
    pub fn parse(s: &str) -> Option<Self> {
        let (year, month) = s.split_once('-')?;
        let year = year.parse().ok()?;
        let month: u32 = month.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    /// The following calendar month.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Every calendar month in `[first, last]`, ascending.
pub fn month_span(first: YearMonth, last: YearMonth) -> Vec<YearMonth> {
    let mut months = Vec::new();
    let mut current = first;
    while current <= last {
        months.push(current);
        current = current.next();
    }
    months
}

/// Merge a generated month span against sparse per-month counts.
///
/// Both inputs must be sorted ascending. Months absent from `counts` get a
/// zero count. Linear two-pointer merge, O(n + m).
pub fn merge_month_series(
    span: &[YearMonth],
    counts: &[(YearMonth, i64)],
) -> Vec<(YearMonth, i64)> {
    let mut merged = Vec::with_capacity(span.len());
    let mut next = 0;

    for &month in span {
        let count = match counts.get(next) {
            Some(&(counted, count)) if counted == month => {
                next += 1;
                count
            }
            _ => 0,
        };
        merged.push((month, count));
    }

    merged
}
