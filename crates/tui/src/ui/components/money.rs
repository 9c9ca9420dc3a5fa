use api_types::record::RecordType;
use engine::{Amount, Currency, SummaryBucket};
use ratatui::{
    style::{Color, Style},
    text::Span,
};

use crate::ui::theme::Theme;

pub fn bucket_color(bucket: SummaryBucket, theme: &Theme) -> Color {
    match bucket {
        SummaryBucket::Income => theme.positive,
        SummaryBucket::Expense => theme.negative,
        SummaryBucket::NetProfit => theme.net,
    }
}

/// Amount in the color of its dashboard bucket.
#[must_use]
pub fn bucket_amount(amount: i64, bucket: SummaryBucket, theme: &Theme) -> Span<'static> {
    Span::styled(
        Amount::new(amount).format(Currency::default()),
        Style::default().fg(bucket_color(bucket, theme)),
    )
}

/// Record amount, prefixed `+` for income and `-` for expense.
#[must_use]
pub fn record_amount(amount: i64, kind: RecordType, theme: &Theme) -> Span<'static> {
    let sign = match kind {
        RecordType::Income => "+",
        RecordType::Expense => "-",
    };
    let formatted = Amount::new(amount).format(Currency::default());
    Span::styled(
        format!("{sign}{formatted}"),
        Style::default().fg(bucket_color(kind.into(), theme)),
    )
}
