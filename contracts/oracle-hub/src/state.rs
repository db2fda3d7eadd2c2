use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Empty, Uint128};
use cw_storage_plus::{Item, Map};

pub const CONFIG: Item<Config> = Item::new("config");
pub const PROTOCOL_STATE: Item<ProtocolState> = Item::new("protocol_state");

pub const ORACLES: Map<&Addr, Oracle> = Map::new("oracles");
/// Per (oracle, feed) running aggregate, updated at every finalization the oracle took part in.
pub const PERFORMANCE: Map<(&Addr, u64), OraclePerformance> = Map::new("performance");
/// Slash-funded rewards credited at finalization and not yet claimed.
pub const PENDING_REWARDS: Map<&Addr, Uint128> = Map::new("pending_rewards");

pub const FEEDS: Map<u64, Feed> = Map::new("feeds");
/// Keyed (feed_id, round).
pub const ROUNDS: Map<(u64, u64), Round> = Map::new("rounds");
/// Keyed (feed_id, round, oracle) so a round's submissions share one prefix.
pub const SUBMISSIONS: Map<(u64, u64, &Addr), Submission> = Map::new("submissions");
/// Keyed (oracle, feed_id, round) for every submission whose round has not
/// been finalized yet.
pub const UNSETTLED: Map<(&Addr, u64, u64), Empty> = Map::new("unsettled");
pub const LATEST_VALUES: Map<u64, LatestValue> = Map::new("latest_values");

pub const SUBSCRIPTIONS: Map<(u64, &Addr), Subscription> = Map::new("subscriptions");
/// Live subscription count per feed, kept in step with SUBSCRIPTIONS.
pub const SUBSCRIBER_COUNT: Map<u64, u32> = Map::new("subscriber_count");

#[cw_serde]
pub struct Config {
    pub admin: Addr,
    /// Receives the non-reward share of slashed stake.
    pub treasury: Addr,
    pub stake_denom: String,
    pub min_stake: Uint128,
    pub max_stake: Uint128,
    pub max_reputation: u64,
    pub initial_reputation: u64,
    pub reputation_reward: u64,
    pub reputation_decay: u64,
    /// Blocks a round accepts submissions for.
    pub submission_window: u64,
    /// Blocks an oracle is locked out after a slash.
    pub cooldown_blocks: u64,
    /// Percent of stake forfeited per inaccurate submission (0-100)
    pub slash_percentage: u8,
    /// Percent of slashed funds credited to accurate oracles (0-100)
    pub reward_percentage: u8,
    /// Aggregation threshold: lowest `min_submissions` a feed may use.
    pub min_oracles: u32,
    pub max_subscription_blocks: u64,
}

#[cw_serde]
pub struct ProtocolState {
    pub total_oracles: u64,
    pub active_oracles: u64,
    /// Always equal to the sum of every active oracle's `stake`.
    pub total_staked: Uint128,
    pub total_slashed: Uint128,
    pub total_rewards_credited: Uint128,
    pub next_feed_id: u64,
}

#[cw_serde]
pub struct Oracle {
    pub stake: Uint128,
    pub reputation: u64,
    pub submission_count: u64,
    pub accurate_count: u64,
    pub slashed_amount: Uint128,
    /// Blocks submission and withdrawal while `height <= cooldown_until`.
    pub cooldown_until: u64,
    pub active: bool,
    pub registered_at: u64,
}

#[cw_serde]
pub struct Feed {
    pub id: u64,
    pub creator: Addr,
    pub name: String,
    pub description: String,
    pub min_submissions: u32,
    pub deviation_threshold: Uint128,
    pub active: bool,
    /// Sole source of round numbers for this feed.
    pub total_rounds: u64,
    pub created_at: u64,
}

#[cw_serde]
pub struct Round {
    pub feed_id: u64,
    pub round: u64,
    pub start_height: u64,
    pub end_height: u64,
    pub submission_count: u32,
    pub final_value: Option<Uint128>,
    pub is_finalized: bool,
    pub finalized_at: Option<u64>,
}

#[cw_serde]
pub struct Submission {
    pub value: Uint128,
    pub submitted_at: u64,
    /// Weight at submission time; later stake or reputation changes do not touch it.
    pub weight_at_submission: u64,
    /// Distance from the round's consensus value, set at finalization.
    pub deviation: Option<Uint128>,
}

#[cw_serde]
#[derive(Default)]
pub struct OraclePerformance {
    pub total_submissions: u64,
    pub accurate_submissions: u64,
    pub cumulative_deviation: Uint128,
    pub last_submission_height: u64,
}

#[cw_serde]
pub struct LatestValue {
    pub round: u64,
    pub value: Uint128,
    pub finalized_at: u64,
}

#[cw_serde]
pub struct Subscription {
    pub subscribed_at: u64,
    pub expires_at: u64,
}
