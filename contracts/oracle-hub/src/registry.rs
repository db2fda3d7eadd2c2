use cosmwasm_std::{
    coins, Addr, BankMsg, DepsMut, Env, Event, MessageInfo, Response, Storage, Uint128,
};
use weighted_oracle_common::math::weight_of;

use crate::error::ContractError;
use crate::rounds::unsettled_submission;
use crate::state::{Config, Oracle, CONFIG, ORACLES, PENDING_REWARDS, PROTOCOL_STATE};

/// Register the sender as an oracle, taking custody of the attached stake.
pub fn register(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if ORACLES.has(deps.storage, &info.sender) {
        return Err(ContractError::AlreadyRegistered {
            address: info.sender.to_string(),
        });
    }

    let amount = sent_stake(&info, &config.stake_denom)?;
    if amount < config.min_stake {
        return Err(ContractError::InsufficientStake {
            amount,
            min_stake: config.min_stake,
        });
    }
    if amount > config.max_stake {
        return Err(ContractError::StakeTooHigh {
            amount,
            max_stake: config.max_stake,
        });
    }

    let mut state = PROTOCOL_STATE.load(deps.storage)?;
    state.total_oracles += 1;
    state.active_oracles += 1;
    state.total_staked = state.total_staked.checked_add(amount)?;

    let oracle = Oracle {
        stake: amount,
        reputation: config.initial_reputation,
        submission_count: 0,
        accurate_count: 0,
        slashed_amount: Uint128::zero(),
        cooldown_until: 0,
        active: true,
        registered_at: env.block.height,
    };
    let weight = oracle_weight(&config, &oracle);

    ORACLES.save(deps.storage, &info.sender, &oracle)?;
    PROTOCOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "register")
        .add_attribute("oracle", info.sender.to_string())
        .add_attribute("stake", amount.to_string())
        .add_event(
            Event::new("oracle_registered")
                .add_attribute("oracle", info.sender.to_string())
                .add_attribute("stake", amount.to_string())
                .add_attribute("reputation", oracle.reputation.to_string())
                .add_attribute("weight", weight.to_string())
                .add_attribute("height", env.block.height.to_string()),
        ))
}

/// Add the attached funds to an active oracle's stake.
pub fn add_stake(deps: DepsMut, _env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut oracle = load_oracle(deps.storage, &info.sender)?;

    if !oracle.active {
        return Err(ContractError::Unauthorized {
            reason: "oracle has withdrawn and is inactive".to_string(),
        });
    }

    let amount = sent_stake(&info, &config.stake_denom)?;
    let new_stake = oracle.stake.checked_add(amount)?;
    if new_stake > config.max_stake {
        return Err(ContractError::StakeTooHigh {
            amount: new_stake,
            max_stake: config.max_stake,
        });
    }

    let mut state = PROTOCOL_STATE.load(deps.storage)?;
    state.total_staked = state.total_staked.checked_add(amount)?;

    oracle.stake = new_stake;
    ORACLES.save(deps.storage, &info.sender, &oracle)?;
    PROTOCOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "add_stake")
        .add_attribute("oracle", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("oracle_stake_added")
                .add_attribute("oracle", info.sender.to_string())
                .add_attribute("amount", amount.to_string())
                .add_attribute("new_stake", new_stake.to_string()),
        ))
}

/// Return the sender's remaining stake and mark the oracle inactive.
///
/// Refused while any of the sender's submissions sits in a round that can
/// still be finalized, so an outlier cannot leave before it is judged. The
/// record is kept so performance history stays queryable. Calling again
/// after a withdrawal succeeds with a zero payout.
pub fn withdraw(deps: DepsMut, env: Env, info: MessageInfo) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut oracle = load_oracle(deps.storage, &info.sender)?;

    if env.block.height <= oracle.cooldown_until {
        return Err(ContractError::CooldownActive {
            cooldown_until: oracle.cooldown_until,
        });
    }
    if let Some((feed_id, round)) =
        unsettled_submission(deps.storage, env.block.height, &info.sender)?
    {
        return Err(ContractError::SubmissionPending { feed_id, round });
    }

    let amount = oracle.stake;
    let mut state = PROTOCOL_STATE.load(deps.storage)?;
    if oracle.active {
        state.total_staked = state.total_staked.checked_sub(amount)?;
        state.active_oracles = state.active_oracles.saturating_sub(1);
    }

    oracle.stake = Uint128::zero();
    oracle.active = false;
    ORACLES.save(deps.storage, &info.sender, &oracle)?;
    PROTOCOL_STATE.save(deps.storage, &state)?;

    let mut response = Response::new()
        .add_attribute("action", "withdraw")
        .add_attribute("oracle", info.sender.to_string())
        .add_attribute("amount", amount.to_string())
        .add_event(
            Event::new("oracle_withdrawn")
                .add_attribute("oracle", info.sender.to_string())
                .add_attribute("amount", amount.to_string()),
        );

    if !amount.is_zero() {
        response = response.add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(amount.u128(), config.stake_denom),
        });
    }

    Ok(response)
}

/// Pay out the sender's accumulated slash-funded rewards.
pub fn claim_rewards(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let pending = PENDING_REWARDS
        .may_load(deps.storage, &info.sender)?
        .unwrap_or_default();
    if pending.is_zero() {
        return Err(ContractError::NoRewards {
            address: info.sender.to_string(),
        });
    }

    PENDING_REWARDS.remove(deps.storage, &info.sender);

    Ok(Response::new()
        .add_message(BankMsg::Send {
            to_address: info.sender.to_string(),
            amount: coins(pending.u128(), config.stake_denom),
        })
        .add_attribute("action", "claim_rewards")
        .add_attribute("oracle", info.sender.to_string())
        .add_attribute("amount", pending.to_string())
        .add_event(
            Event::new("oracle_rewards_claimed")
                .add_attribute("oracle", info.sender.to_string())
                .add_attribute("amount", pending.to_string()),
        ))
}

/// Current weight of an oracle under the given config.
pub fn oracle_weight(config: &Config, oracle: &Oracle) -> u64 {
    weight_of(
        oracle.reputation,
        oracle.stake,
        config.max_reputation,
        config.max_stake,
    )
}

pub fn load_oracle(storage: &dyn Storage, address: &Addr) -> Result<Oracle, ContractError> {
    ORACLES
        .may_load(storage, address)?
        .ok_or(ContractError::NotRegistered {
            address: address.to_string(),
        })
}

/// Validate funds: exactly one non-zero coin of the stake denom.
fn sent_stake(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    if info.funds.is_empty() {
        return Err(ContractError::NoFundsSent);
    }
    if info.funds.len() != 1 {
        return Err(ContractError::InvalidFunds {
            denom: denom.to_string(),
        });
    }
    let sent = &info.funds[0];
    if sent.denom != denom {
        return Err(ContractError::WrongDenom {
            expected: denom.to_string(),
            denom: sent.denom.clone(),
        });
    }
    if sent.amount.is_zero() {
        return Err(ContractError::NoFundsSent);
    }
    Ok(sent.amount)
}
