pub mod result_cache;
pub mod ttl_cache;

pub use result_cache::{bucketed_key, ResultCache};
pub use ttl_cache::TtlCache;
