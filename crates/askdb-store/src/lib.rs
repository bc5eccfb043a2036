//! AskDB Store
//!
//! Database access for the question-answering pipeline. A store exposes
//! the dialect name, the usable tables, a textual schema description for
//! prompting, and plain query execution returning text.

pub mod mock;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod sqlite;
pub mod store;

pub use mock::{MockStore, MockStoreBuilder};
pub use sqlite::SqliteStore;
pub use store::{SqlStore, StoreError};

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
