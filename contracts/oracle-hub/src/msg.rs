use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;
use weighted_oracle_common::types::RoundStatus;

use crate::state::{
    Config, Feed, LatestValue, Oracle, OraclePerformance, ProtocolState, Round, Submission,
    Subscription,
};

/// Protocol parameters. Any `None` falls back to the default in
/// `weighted_oracle_common::params`.
#[cw_serde]
pub struct InstantiateMsg {
    pub treasury: String,
    pub stake_denom: String,
    pub min_stake: Option<Uint128>,
    pub max_stake: Option<Uint128>,
    pub max_reputation: Option<u64>,
    pub initial_reputation: Option<u64>,
    pub reputation_reward: Option<u64>,
    pub reputation_decay: Option<u64>,
    pub submission_window: Option<u64>,
    pub cooldown_blocks: Option<u64>,
    pub slash_percentage: Option<u8>,
    pub reward_percentage: Option<u8>,
    pub min_oracles: Option<u32>,
    pub max_subscription_blocks: Option<u64>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Register the sender as an oracle. Send the stake in info.funds.
    Register {},
    /// Top up the sender's stake. Send the amount in info.funds.
    AddStake {},
    /// Return the sender's whole stake and deactivate the oracle.
    Withdraw {},
    /// Pay out rewards credited from slashed stake.
    ClaimRewards {},
    /// Create a data feed. Anyone may create one; the sender becomes its creator.
    CreateFeed {
        name: String,
        description: String,
        min_submissions: u32,
        deviation_threshold: Uint128,
    },
    /// Update a feed. Creator or admin only.
    UpdateFeed {
        feed_id: u64,
        name: Option<String>,
        description: Option<String>,
        min_submissions: Option<u32>,
        deviation_threshold: Option<Uint128>,
        active: Option<bool>,
    },
    /// Open the next round of a feed. Feed creator, admin or any active oracle.
    StartRound { feed_id: u64 },
    /// Report a value for an open round. Active oracles only.
    Submit {
        feed_id: u64,
        round: u64,
        value: Uint128,
    },
    /// Compute consensus for a closed round and apply reputation, slashing
    /// and rewards. Anyone can call.
    Finalize { feed_id: u64, round: u64 },
    Subscribe { feed_id: u64, duration_blocks: u64 },
    Unsubscribe { feed_id: u64 },
    /// Update configuration. Admin only.
    UpdateConfig {
        admin: Option<String>,
        treasury: Option<String>,
        slash_percentage: Option<u8>,
        reward_percentage: Option<u8>,
        cooldown_blocks: Option<u64>,
        submission_window: Option<u64>,
        max_subscription_blocks: Option<u64>,
    },
}

/// Bundled arguments for `feeds::update_feed`.
pub struct UpdateFeedParams {
    pub feed_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_submissions: Option<u32>,
    pub deviation_threshold: Option<Uint128>,
    pub active: Option<bool>,
}

/// Bundled arguments for `config::update_config`.
pub struct UpdateConfigParams {
    pub admin: Option<String>,
    pub treasury: Option<String>,
    pub slash_percentage: Option<u8>,
    pub reward_percentage: Option<u8>,
    pub cooldown_blocks: Option<u64>,
    pub submission_window: Option<u64>,
    pub max_subscription_blocks: Option<u64>,
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(Config)]
    Config {},
    #[returns(ProtocolState)]
    ProtocolState {},
    #[returns(Option<Oracle>)]
    Oracle { address: String },
    #[returns(WeightResponse)]
    OracleWeight { address: String },
    #[returns(ReputationResponse)]
    OracleReputation { address: String },
    #[returns(OraclePerformance)]
    OraclePerformance { address: String, feed_id: u64 },
    #[returns(Uint128)]
    PendingRewards { address: String },
    #[returns(Option<Feed>)]
    Feed { feed_id: u64 },
    #[returns(FeedsResponse)]
    Feeds {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Option<Round>)]
    Round { feed_id: u64, round: u64 },
    #[returns(Option<RoundStatus>)]
    RoundStatus { feed_id: u64, round: u64 },
    #[returns(Option<Submission>)]
    Submission {
        feed_id: u64,
        round: u64,
        oracle: String,
    },
    #[returns(RoundSubmissionsResponse)]
    RoundSubmissions {
        feed_id: u64,
        round: u64,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Option<LatestValue>)]
    LatestValue { feed_id: u64 },
    #[returns(bool)]
    ReadyToFinalize { feed_id: u64, round: u64 },
    #[returns(Option<Subscription>)]
    Subscription { feed_id: u64, subscriber: String },
}

#[cw_serde]
pub struct WeightResponse {
    pub address: String,
    pub weight: u64,
}

#[cw_serde]
pub struct ReputationResponse {
    pub address: String,
    pub reputation: u64,
    pub max_reputation: u64,
}

#[cw_serde]
pub struct FeedsResponse {
    pub feeds: Vec<Feed>,
}

#[cw_serde]
pub struct SubmissionEntry {
    pub oracle: String,
    pub submission: Submission,
}

#[cw_serde]
pub struct RoundSubmissionsResponse {
    pub submissions: Vec<SubmissionEntry>,
}
