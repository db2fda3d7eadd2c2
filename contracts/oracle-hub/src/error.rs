use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("{address} is already registered as an oracle")]
    AlreadyRegistered { address: String },

    #[error("{address} is not a registered oracle")]
    NotRegistered { address: String },

    #[error("stake {amount} is below minimum {min_stake}")]
    InsufficientStake { amount: Uint128, min_stake: Uint128 },

    #[error("stake {amount} exceeds maximum {max_stake}")]
    StakeTooHigh { amount: Uint128, max_stake: Uint128 },

    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },

    #[error("feed {feed_id} not found")]
    FeedNotFound { feed_id: u64 },

    #[error("feed {feed_id} is inactive")]
    FeedInactive { feed_id: u64 },

    #[error("oracle already submitted to feed {feed_id} round {round}")]
    AlreadySubmitted { feed_id: u64, round: u64 },

    #[error("round {round} of feed {feed_id} is not active: {reason}")]
    RoundNotActive {
        feed_id: u64,
        round: u64,
        reason: String,
    },

    #[error("submission to feed {feed_id} round {round} is not settled yet")]
    SubmissionPending { feed_id: u64, round: u64 },

    #[error("cooldown active until height {cooldown_until}")]
    CooldownActive { cooldown_until: u64 },

    #[error("below threshold: {reason}")]
    BelowThreshold { reason: String },

    #[error("invalid duration {blocks} blocks (must be 1..={max})")]
    InvalidDuration { blocks: u64, max: u64 },

    #[error("no funds sent")]
    NoFundsSent,

    #[error("must send exactly one coin ({denom})")]
    InvalidFunds { denom: String },

    #[error("must send {expected} denom, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("no pending rewards for {address}")]
    NoRewards { address: String },

    #[error("invalid percentage: {field} = {value} (must be <= 100)")]
    InvalidPercentage { field: String, value: u8 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}
