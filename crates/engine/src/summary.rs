//! Dashboard aggregates derived from a list of records.

use api_types::record::{Record, RecordType};

/// Income shown while no income record exists.
pub const DEFAULT_INCOME: i64 = 50_000;
/// Expense shown while no expense record exists.
pub const DEFAULT_EXPENSE: i64 = 9_000;
/// Net profit shown while neither kind has records.
pub const DEFAULT_NET_PROFIT: i64 = DEFAULT_INCOME - DEFAULT_EXPENSE;

/// Slices below this share get no percentage label.
const LABEL_MIN_SHARE: f64 = 0.05;

/// Display buckets of the dashboard.
///
/// `NetProfit` is derived from the other two and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SummaryBucket {
    Income,
    Expense,
    NetProfit,
}

impl SummaryBucket {
    pub fn label(self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::NetProfit => "Net Profit",
        }
    }
}

impl From<RecordType> for SummaryBucket {
    fn from(kind: RecordType) -> Self {
        match kind {
            RecordType::Income => Self::Income,
            RecordType::Expense => Self::Expense,
        }
    }
}

/// One slice of the income/expense/net breakdown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slice {
    pub bucket: SummaryBucket,
    pub value: i64,
    /// Share of the breakdown total, in `0.0..=1.0`.
    pub share: f64,
}

impl Slice {
    /// Share rounded to a whole percent.
    pub fn percent(&self) -> u8 {
        (self.share * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// `"NN%"`, or `None` when the slice is too thin to label.
    pub fn percent_label(&self) -> Option<String> {
        if self.share < LABEL_MIN_SHARE {
            return None;
        }
        Some(format!("{}%", self.percent()))
    }
}

/// Totals of the loaded records.
///
/// Zero totals fall back to the demo defaults so an empty dashboard still
/// shows something.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    income_total: i64,
    expense_total: i64,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        records.iter().fold(Self::default(), |mut acc, record| {
            match record.kind {
                RecordType::Income => {
                    acc.income_total = acc.income_total.saturating_add(record.amount)
                }
                RecordType::Expense => {
                    acc.expense_total = acc.expense_total.saturating_add(record.amount)
                }
            }
            acc
        })
    }

    /// Sum of income records, without defaults.
    pub fn income_total(&self) -> i64 {
        self.income_total
    }

    /// Sum of expense records, without defaults.
    pub fn expense_total(&self) -> i64 {
        self.expense_total
    }

    pub fn income(&self) -> i64 {
        if self.shows_default(SummaryBucket::Income) {
            DEFAULT_INCOME
        } else {
            self.income_total
        }
    }

    pub fn expense(&self) -> i64 {
        if self.shows_default(SummaryBucket::Expense) {
            DEFAULT_EXPENSE
        } else {
            self.expense_total
        }
    }

    /// Computed `income - expense` as soon as either total is non-zero.
    pub fn net(&self) -> i64 {
        if self.shows_default(SummaryBucket::NetProfit) {
            DEFAULT_NET_PROFIT
        } else {
            self.income_total.saturating_sub(self.expense_total)
        }
    }

    pub fn value(&self, bucket: SummaryBucket) -> i64 {
        match bucket {
            SummaryBucket::Income => self.income(),
            SummaryBucket::Expense => self.expense(),
            SummaryBucket::NetProfit => self.net(),
        }
    }

    /// `true` when `bucket` shows its default instead of a computed value.
    pub fn shows_default(&self, bucket: SummaryBucket) -> bool {
        match bucket {
            SummaryBucket::Income => self.income_total == 0,
            SummaryBucket::Expense => self.expense_total == 0,
            SummaryBucket::NetProfit => self.income_total == 0 && self.expense_total == 0,
        }
    }

    /// `true` when at least one displayed value is a default.
    pub fn is_default(&self) -> bool {
        self.shows_default(SummaryBucket::Income) || self.shows_default(SummaryBucket::Expense)
    }

    /// Income, expense and positive net profit with their shares.
    ///
    /// Zero slices are dropped; a negative net profit counts as zero.
    pub fn breakdown(&self) -> Vec<Slice> {
        let values = [
            (SummaryBucket::Income, self.income()),
            (SummaryBucket::Expense, self.expense()),
            (SummaryBucket::NetProfit, self.net().max(0)),
        ];
        let total: i64 = values.iter().map(|(_, v)| *v).sum();
        if total <= 0 {
            return Vec::new();
        }

        values
            .into_iter()
            .filter(|(_, value)| *value > 0)
            .map(|(bucket, value)| Slice {
                bucket,
                value,
                share: value as f64 / total as f64,
            })
            .collect()
    }
}
