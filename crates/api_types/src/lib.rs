use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Error body returned by the server for every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub mod record {
    use super::*;

    /// Kind of a persisted record.
    ///
    /// "Net Profit" is a summary bucket, never a record type.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub enum RecordType {
        Income,
        Expense,
    }

    impl RecordType {
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Income => "Income",
                Self::Expense => "Expense",
            }
        }

        /// The other kind. Used by the record form toggle.
        pub fn toggled(self) -> Self {
            match self {
                Self::Income => Self::Expense,
                Self::Expense => Self::Income,
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Record {
        pub id: String,
        pub title: String,
        /// Whole currency units, never negative.
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: RecordType,
        /// RFC3339 timestamp, including timezone offset.
        pub created_at: DateTime<FixedOffset>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub due_date: Option<DateTime<FixedOffset>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub notes: Option<String>,
    }

    impl Record {
        /// Date shown on a record card: the due date when set, otherwise the
        /// creation time.
        pub fn display_date(&self) -> DateTime<FixedOffset> {
            self.due_date.unwrap_or(self.created_at)
        }
    }

    /// Body of `POST /records`. The server assigns the id.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordNew {
        pub title: String,
        pub amount: i64,
        #[serde(rename = "type")]
        pub kind: RecordType,
        /// Optional: if absent, server uses now().
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub created_at: Option<DateTime<FixedOffset>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub due_date: Option<DateTime<FixedOffset>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub notes: Option<String>,
    }

    /// Body of `PUT /records/{id}`.
    ///
    /// Absent fields are left untouched. `dueDate` and `notes` may be sent
    /// as `null` to clear them.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordPatch {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub amount: Option<i64>,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        pub kind: Option<RecordType>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub due_date: Option<Option<DateTime<FixedOffset>>>,
        #[serde(
            default,
            deserialize_with = "double_option",
            skip_serializing_if = "Option::is_none"
        )]
        pub notes: Option<Option<String>>,
    }

    impl RecordPatch {
        pub fn is_empty(&self) -> bool {
            self == &Self::default()
        }
    }
}
