pub mod math;
pub mod params;
pub mod types;

pub use math::{
    deviation, height_after, median, next_reputation, slash_amount, split_rewards, weight_of,
};
pub use types::RoundStatus;
