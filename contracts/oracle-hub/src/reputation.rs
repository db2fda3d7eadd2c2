use cosmwasm_std::{Addr, Event, Storage};
use weighted_oracle_common::math::next_reputation;

use crate::error::ContractError;
use crate::registry::load_oracle;
use crate::state::{Config, Oracle, ORACLES};

/// Apply one accuracy outcome to an oracle's reputation.
///
/// Accurate: `+reputation_reward` (capped at `max_reputation`) and one more
/// accurate submission. Inaccurate: `-reputation_decay`, floored at zero.
pub fn update_reputation(
    storage: &mut dyn Storage,
    config: &Config,
    address: &Addr,
    accurate: bool,
) -> Result<(Oracle, Event), ContractError> {
    let mut oracle = load_oracle(storage, address)?;
    let previous = oracle.reputation;

    oracle.reputation = next_reputation(
        previous,
        accurate,
        config.reputation_reward,
        config.reputation_decay,
        config.max_reputation,
    );
    if accurate {
        oracle.accurate_count += 1;
    }
    ORACLES.save(storage, address, &oracle)?;

    let event = Event::new("oracle_reputation_updated")
        .add_attribute("oracle", address.to_string())
        .add_attribute("accurate", accurate.to_string())
        .add_attribute("previous", previous.to_string())
        .add_attribute("reputation", oracle.reputation.to_string());

    Ok((oracle, event))
}
