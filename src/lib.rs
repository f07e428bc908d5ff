//! Sift — session-sticky SQL filter conditions for list views.
//!
//! Translates a request's `filter_by` parameters into a parameterized WHERE
//! clause, remembering chosen values per request path in a session store so
//! filters survive navigation. The output is a clause string plus ordered
//! bound values, ready for a rusqlite (or any parameterized) query.
//!
//! ```
//! use sift::{FieldOptions, FilterAccumulator, MemoryStore, RequestParams};
//!
//! let params = RequestParams::from_pairs("/users", vec![("filter_by[status]", "active")]);
//! let mut session = MemoryStore::new();
//!
//! let mut acc = FilterAccumulator::with_constraints(&params, &mut session, "tenant_id = 1");
//! acc.register("status", FieldOptions::new()).unwrap();
//! acc.register("from", FieldOptions::new().template("created_at >= ?")).unwrap();
//!
//! let conditions = acc.conditions();
//! assert_eq!(conditions.clause, "((status = ?1) AND (tenant_id = 1))");
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod params;
pub mod session;
pub mod value;

pub use config::{FilterConfig, ViewConfig};
pub use error::{Result, SiftError};
pub use filter::{Conditions, FieldOptions, FilterAccumulator};
pub use params::{RawParam, RequestParams};
pub use session::sqlite::SqliteStore;
pub use session::{MemoryStore, SessionStore};
pub use value::FilterValue;
