use cosmwasm_std::{Addr, Event, Storage, Uint128};
use weighted_oracle_common::math::split_rewards;

use crate::error::ContractError;
use crate::registry::load_oracle;
use crate::state::{Config, ORACLES, PENDING_REWARDS, PROTOCOL_STATE};

/// Forfeit up to `amount` of an oracle's stake and lock it until
/// `cooldown_until` (the caller passes `height + cooldown_blocks`).
///
/// The effective amount is `min(amount, stake)`: an oracle can be slashed to
/// zero but never into debt. Returns the amount actually taken.
pub fn slash(
    storage: &mut dyn Storage,
    address: &Addr,
    amount: Uint128,
    cooldown_until: u64,
) -> Result<(Uint128, Event), ContractError> {
    let mut oracle = load_oracle(storage, address)?;
    let mut state = PROTOCOL_STATE.load(storage)?;

    let slashed = amount.min(oracle.stake);
    oracle.stake -= slashed;
    oracle.slashed_amount = oracle.slashed_amount.checked_add(slashed)?;
    oracle.cooldown_until = cooldown_until;

    state.total_staked = state.total_staked.checked_sub(slashed)?;
    state.total_slashed = state.total_slashed.checked_add(slashed)?;

    ORACLES.save(storage, address, &oracle)?;
    PROTOCOL_STATE.save(storage, &state)?;

    let event = Event::new("oracle_slashed")
        .add_attribute("oracle", address.to_string())
        .add_attribute("requested", amount.to_string())
        .add_attribute("slashed", slashed.to_string())
        .add_attribute("remaining_stake", oracle.stake.to_string())
        .add_attribute("cooldown_until", oracle.cooldown_until.to_string());

    Ok((slashed, event))
}

/// Where a round's slashed stake ended up.
#[derive(Debug, PartialEq)]
pub struct RewardDistribution {
    /// Amounts credited to accurate oracles' pending rewards.
    pub credited: Vec<(Addr, Uint128)>,
    /// Non-reward share plus rounding dust, owed to the treasury.
    pub treasury: Uint128,
}

/// Earmark `reward_percentage` of a round's slashed stake for its accurate
/// oracles, pro rata to their frozen submission weight, and credit it to
/// their pending rewards. Everything not credited goes to the treasury.
pub fn distribute_slashed(
    storage: &mut dyn Storage,
    config: &Config,
    total_slashed: Uint128,
    accurate: &[(Addr, u64)],
) -> Result<RewardDistribution, ContractError> {
    if total_slashed.is_zero() {
        return Ok(RewardDistribution {
            credited: vec![],
            treasury: Uint128::zero(),
        });
    }

    let reward_pool = total_slashed.multiply_ratio(config.reward_percentage as u128, 100u128);
    let (credited, _dust) = split_rewards(reward_pool, accurate);

    let mut credited_total = Uint128::zero();
    for (address, share) in &credited {
        let pending = PENDING_REWARDS
            .may_load(storage, address)?
            .unwrap_or_default();
        PENDING_REWARDS.save(storage, address, &pending.checked_add(*share)?)?;
        credited_total = credited_total.checked_add(*share)?;
    }

    if !credited_total.is_zero() {
        let mut state = PROTOCOL_STATE.load(storage)?;
        state.total_rewards_credited = state.total_rewards_credited.checked_add(credited_total)?;
        PROTOCOL_STATE.save(storage, &state)?;
    }

    Ok(RewardDistribution {
        credited,
        treasury: total_slashed.checked_sub(credited_total)?,
    })
}
