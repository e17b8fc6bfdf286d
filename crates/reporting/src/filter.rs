//! Date filters for invoice reports.
//!
//! Windows are computed from an explicit "as of" date. Nothing here reads
//! the clock.

use chrono::{Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateFilter {
    Today,
    Month,
    Year,
    /// Inclusive on both calendar days.
    Custom { start: NaiveDate, end: NaiveDate },
    #[default]
    All,
}

/// Closed interval `[start, end]` on invoice timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

// 23:59:59.999
fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    start_of_day(day) + Duration::milliseconds(86_399_999)
}

impl DateFilter {
    /// Timestamp window for this filter, or `None` for [`DateFilter::All`].
    pub fn window(&self, as_of: NaiveDate) -> Option<DateWindow> {
        match *self {
            // [midnight today, midnight tomorrow)
            DateFilter::Today => Some(DateWindow {
                start: start_of_day(as_of),
                end: start_of_day(as_of) + Duration::nanoseconds(86_400_000_000_000 - 1),
            }),
            DateFilter::Month => {
                let first = as_of - Days::new(u64::from(as_of.day0()));
                let last = first + Months::new(1) - Days::new(1);
                Some(DateWindow {
                    start: start_of_day(first),
                    end: end_of_day(last),
                })
            }
            DateFilter::Year => {
                let first = as_of - Days::new(u64::from(as_of.ordinal0()));
                let last = first + Months::new(12) - Days::new(1);
                Some(DateWindow {
                    start: start_of_day(first),
                    end: end_of_day(last),
                })
            }
            DateFilter::Custom { start, end } => Some(DateWindow {
                start: start_of_day(start),
                end: end_of_day(end),
            }),
            DateFilter::All => None,
        }
    }

    pub fn matches(&self, as_of: NaiveDate, at: NaiveDateTime) -> bool {
        self.window(as_of).is_none_or(|w| w.contains(at))
    }

    /// Keep the items whose timestamp falls in the window, preserving order.
    pub fn apply<T>(
        &self,
        as_of: NaiveDate,
        items: impl IntoIterator<Item = T>,
        date_of: impl Fn(&T) -> NaiveDateTime,
    ) -> Vec<T> {
        let window = self.window(as_of);
        items
            .into_iter()
            .filter(|item| window.is_none_or(|w| w.contains(date_of(item))))
            .collect()
    }

    /// Report title for the filter, e.g. "Monthly Report (February 2024)".
    pub fn label(&self, as_of: NaiveDate) -> String {
        match self {
            DateFilter::Today => format!("Daily Report ({})", as_of.format("%d %b %Y")),
            DateFilter::Month => format!("Monthly Report ({})", as_of.format("%B %Y")),
            DateFilter::Year => format!("Yearly Report ({})", as_of.year()),
            DateFilter::Custom { start, end } => format!(
                "Custom Report ({} to {})",
                start.format("%d %b %Y"),
                end.format("%d %b %Y")
            ),
            DateFilter::All => "All Invoices".to_string(),
        }
    }
}
