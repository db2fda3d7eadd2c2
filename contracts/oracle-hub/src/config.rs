use cosmwasm_std::{Addr, Api, DepsMut, Env, Event, MessageInfo, Response, Uint128};
use weighted_oracle_common::params::{
    DEFAULT_COOLDOWN_BLOCKS, DEFAULT_INITIAL_REPUTATION, DEFAULT_MAX_REPUTATION,
    DEFAULT_MAX_STAKE, DEFAULT_MAX_SUBSCRIPTION_BLOCKS, DEFAULT_MIN_ORACLES, DEFAULT_MIN_STAKE,
    DEFAULT_REPUTATION_DECAY, DEFAULT_REPUTATION_REWARD, DEFAULT_REWARD_PERCENTAGE,
    DEFAULT_SLASH_PERCENTAGE, DEFAULT_SUBMISSION_WINDOW, MAX_DURATION_BLOCKS,
};

use crate::error::ContractError;
use crate::msg::{InstantiateMsg, UpdateConfigParams};
use crate::state::{Config, CONFIG};

/// Build the stored config from an instantiate message, filling defaults.
pub fn build_config(api: &dyn Api, admin: Addr, msg: InstantiateMsg) -> Result<Config, ContractError> {
    if msg.stake_denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "stake_denom must not be empty".to_string(),
        });
    }

    let config = Config {
        admin,
        treasury: api.addr_validate(&msg.treasury)?,
        stake_denom: msg.stake_denom,
        min_stake: msg.min_stake.unwrap_or(Uint128::new(DEFAULT_MIN_STAKE)),
        max_stake: msg.max_stake.unwrap_or(Uint128::new(DEFAULT_MAX_STAKE)),
        max_reputation: msg.max_reputation.unwrap_or(DEFAULT_MAX_REPUTATION),
        initial_reputation: msg.initial_reputation.unwrap_or(DEFAULT_INITIAL_REPUTATION),
        reputation_reward: msg.reputation_reward.unwrap_or(DEFAULT_REPUTATION_REWARD),
        reputation_decay: msg.reputation_decay.unwrap_or(DEFAULT_REPUTATION_DECAY),
        submission_window: msg.submission_window.unwrap_or(DEFAULT_SUBMISSION_WINDOW),
        cooldown_blocks: msg.cooldown_blocks.unwrap_or(DEFAULT_COOLDOWN_BLOCKS),
        slash_percentage: msg.slash_percentage.unwrap_or(DEFAULT_SLASH_PERCENTAGE),
        reward_percentage: msg.reward_percentage.unwrap_or(DEFAULT_REWARD_PERCENTAGE),
        min_oracles: msg.min_oracles.unwrap_or(DEFAULT_MIN_ORACLES),
        max_subscription_blocks: msg
            .max_subscription_blocks
            .unwrap_or(DEFAULT_MAX_SUBSCRIPTION_BLOCKS),
    };

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ContractError> {
    if config.min_stake.is_zero() || config.min_stake > config.max_stake {
        return Err(ContractError::InvalidConfig {
            reason: format!(
                "stake bounds must satisfy 0 < min_stake ({}) <= max_stake ({})",
                config.min_stake, config.max_stake
            ),
        });
    }
    if config.initial_reputation == 0 || config.initial_reputation > config.max_reputation {
        return Err(ContractError::InvalidConfig {
            reason: format!(
                "reputation bounds must satisfy 0 < initial_reputation ({}) <= max_reputation ({})",
                config.initial_reputation, config.max_reputation
            ),
        });
    }
    if config.slash_percentage > 100 {
        return Err(ContractError::InvalidPercentage {
            field: "slash_percentage".to_string(),
            value: config.slash_percentage,
        });
    }
    if config.reward_percentage > 100 {
        return Err(ContractError::InvalidPercentage {
            field: "reward_percentage".to_string(),
            value: config.reward_percentage,
        });
    }
    // Heights are derived by adding these to the current block height.
    for blocks in [
        config.submission_window,
        config.cooldown_blocks,
        config.max_subscription_blocks,
    ] {
        if blocks > MAX_DURATION_BLOCKS {
            return Err(ContractError::InvalidDuration {
                blocks,
                max: MAX_DURATION_BLOCKS,
            });
        }
    }
    if config.submission_window == 0 {
        return Err(ContractError::InvalidDuration {
            blocks: 0,
            max: MAX_DURATION_BLOCKS,
        });
    }
    if config.min_oracles == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "min_oracles must be at least 1".to_string(),
        });
    }
    if config.max_subscription_blocks == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "max_subscription_blocks must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Update contract configuration. Admin only.
///
/// Stake and reputation bounds are fixed at instantiation: they define the
/// scale of weights already frozen into submissions.
pub fn update_config(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateConfigParams,
) -> Result<Response, ContractError> {
    let UpdateConfigParams {
        admin,
        treasury,
        slash_percentage,
        reward_percentage,
        cooldown_blocks,
        submission_window,
        max_subscription_blocks,
    } = params;

    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update config".to_string(),
        });
    }

    if let Some(new_admin) = admin {
        config.admin = deps.api.addr_validate(&new_admin)?;
    }
    if let Some(new_treasury) = treasury {
        config.treasury = deps.api.addr_validate(&new_treasury)?;
    }
    if let Some(pct) = slash_percentage {
        config.slash_percentage = pct;
    }
    if let Some(pct) = reward_percentage {
        config.reward_percentage = pct;
    }
    if let Some(blocks) = cooldown_blocks {
        config.cooldown_blocks = blocks;
    }
    if let Some(blocks) = submission_window {
        config.submission_window = blocks;
    }
    if let Some(blocks) = max_subscription_blocks {
        config.max_subscription_blocks = blocks;
    }

    validate_config(&config)?;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_config")
        .add_event(
            Event::new("oracle_config_updated")
                .add_attribute("admin", config.admin.to_string())
                .add_attribute("treasury", config.treasury.to_string())
                .add_attribute("slash_percentage", config.slash_percentage.to_string())
                .add_attribute("reward_percentage", config.reward_percentage.to_string())
                .add_attribute("cooldown_blocks", config.cooldown_blocks.to_string())
                .add_attribute("submission_window", config.submission_window.to_string())
                .add_attribute(
                    "max_subscription_blocks",
                    config.max_subscription_blocks.to_string(),
                ),
        ))
}
