pub mod history_store;
pub mod profile_store;
pub mod weight_store;

pub use history_store::{entry_for_action, HistoryStore, PostgresHistoryStore};
pub use profile_store::{PostgresProfileStore, ProfileStore};
pub use weight_store::{PostgresWeightStore, WeightStore, WeightUpdateInput};
