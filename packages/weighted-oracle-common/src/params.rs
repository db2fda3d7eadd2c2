//! Protocol defaults. Every value here can be overridden at instantiation;
//! the contract validates whatever it is given against the same rules.

/// Share of the 0..=100 weight scale contributed by reputation.
pub const WEIGHT_REPUTATION_SHARE: u128 = 60;
/// Share of the 0..=100 weight scale contributed by stake.
pub const WEIGHT_STAKE_SHARE: u128 = 40;
/// Upper bound of `weight_of` when reputation and stake are within bounds.
pub const MAX_WEIGHT: u64 = 100;

pub const DEFAULT_MIN_STAKE: u128 = 1_000_000;
pub const DEFAULT_MAX_STAKE: u128 = 1_000_000_000_000;

pub const DEFAULT_MAX_REPUTATION: u64 = 1000;
pub const DEFAULT_INITIAL_REPUTATION: u64 = 100;
/// Reputation gained per accurate submission.
pub const DEFAULT_REPUTATION_REWARD: u64 = 10;
/// Reputation lost per inaccurate submission.
pub const DEFAULT_REPUTATION_DECAY: u64 = 1;

/// Blocks a round stays open for submissions (~24h at 10 min blocks).
pub const DEFAULT_SUBMISSION_WINDOW: u64 = 144;
/// Blocks an oracle stays locked after a slash (~7 days at 10 min blocks).
pub const DEFAULT_COOLDOWN_BLOCKS: u64 = 1008;

/// Percent of current stake forfeited per inaccurate submission.
pub const DEFAULT_SLASH_PERCENTAGE: u8 = 10;
/// Percent of slashed funds credited to accurate oracles of the same round.
pub const DEFAULT_REWARD_PERCENTAGE: u8 = 50;

/// Aggregation threshold: no feed may require fewer submissions than this.
pub const DEFAULT_MIN_ORACLES: u32 = 3;

/// Longest single subscription (~1 year at 10 min blocks).
pub const DEFAULT_MAX_SUBSCRIPTION_BLOCKS: u64 = 52_560;

/// Ceiling for `submission_window`, `cooldown_blocks` and
/// `max_subscription_blocks`.
pub const MAX_DURATION_BLOCKS: u64 = 10_000_000;

pub const MAX_FEED_NAME_LEN: usize = 64;
pub const MAX_FEED_DESCRIPTION_LEN: usize = 256;
