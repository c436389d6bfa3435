pub mod group;
pub mod join;
pub mod pivot;
pub mod status;
pub mod window;

pub use group::group_sum;
pub use join::{join, DateBetween, JoinMode, JoinSpec};
pub use pivot::crosstab;
pub use status::{with_status, NEW_BUSINESS, RENEWAL};
pub use window::with_partition_rank;
