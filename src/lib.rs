//! memokit: a bounded memoizing result cache.
//!
//! A [`Memoizer`](memo::Memoizer) turns calls of an expensive operation into
//! cache lookups keyed by the call's arguments. Capacity is fixed; when the
//! store fills up, one of two eviction policies decides what goes:
//!
//! - `frequency-batch`: drop the `max(1, capacity / 10)` least frequently
//!   used entries, oldest first among ties.
//! - `recency-single`: drop the single least recently used entry.
//!
//! ```
//! use memokit::prelude::*;
//!
//! let fetch = Memoized::new(
//!     |args: &Args| Ok::<_, std::io::Error>(format!("body of {:?}", args.positional())),
//!     StoreConfig::new(2, CachePolicy::RecencySingle),
//! )
//! .unwrap();
//!
//! let page = Args::new().arg("https://example.com");
//! fetch.call(&page).unwrap();
//! fetch.call(&page).unwrap();
//! assert_eq!(fetch.cache().metrics().hits, 1);
//! ```

pub mod builder;
pub mod error;
pub mod key;
pub mod memo;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;
