pub mod clock;
pub mod fingerprint;
pub mod singleflight;
pub mod ttl_cache;

pub use clock::{Clock, SystemClock, TestClock};
pub use fingerprint::{create_key, QueryFingerprint};
pub use singleflight::{SingleFlight, SingleFlightError};
pub use ttl_cache::{spawn_sweeper, Stats, TtlCache};
