//! Domain core of FinSync: the in-memory record store, the money type used
//! to display amounts and the dashboard summary.

pub use currency::Currency;
pub use error::EngineError;
pub use money::Amount;
pub use store::{RecordStore, RecordStoreBuilder, demo_seed};
pub use summary::{
    DEFAULT_EXPENSE, DEFAULT_INCOME, DEFAULT_NET_PROFIT, Slice, Summary, SummaryBucket,
};

mod currency;
mod error;
mod money;
mod store;
mod summary;

type ResultEngine<T> = Result<T, EngineError>;
