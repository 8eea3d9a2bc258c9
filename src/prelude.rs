pub use crate::builder::{CacheBuilder, CachePolicy, PolicyStore, StoreConfig};
pub use crate::error::{ConfigError, MemoError, UnhashableArgument};
pub use crate::key::{ArgValue, Args, CacheKey, KeyBuilder};
pub use crate::memo::{Memoized, Memoizer};
pub use crate::metrics::snapshot::MemoMetricsSnapshot;
pub use crate::policy::{FrequencyBatchStore, RecencyStore};
pub use crate::traits::{BoundedStore, LfuStoreTrait, LruStoreTrait};
