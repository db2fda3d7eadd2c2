use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdError, StdResult};
use cw_storage_plus::Bound;
use weighted_oracle_common::types::RoundStatus;

use crate::msg::{
    FeedsResponse, ReputationResponse, RoundSubmissionsResponse, SubmissionEntry, WeightResponse,
};
use crate::registry::oracle_weight;
use crate::rounds::is_ready_to_finalize;
use crate::state::{
    CONFIG, FEEDS, LATEST_VALUES, ORACLES, PENDING_REWARDS, PERFORMANCE, PROTOCOL_STATE, ROUNDS,
    SUBMISSIONS, SUBSCRIPTIONS,
};

const DEFAULT_LIMIT: u32 = 30;
const MAX_LIMIT: u32 = 100;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

pub fn query_protocol_state(deps: Deps) -> StdResult<Binary> {
    let state = PROTOCOL_STATE.load(deps.storage)?;
    to_json_binary(&state)
}

pub fn query_oracle(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let oracle = ORACLES.may_load(deps.storage, &addr)?;
    to_json_binary(&oracle)
}

pub fn query_oracle_weight(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    let oracle = ORACLES
        .may_load(deps.storage, &addr)?
        .ok_or_else(|| StdError::not_found(format!("oracle {}", address)))?;

    to_json_binary(&WeightResponse {
        address,
        weight: oracle_weight(&config, &oracle),
    })
}

pub fn query_oracle_reputation(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let config = CONFIG.load(deps.storage)?;
    let oracle = ORACLES
        .may_load(deps.storage, &addr)?
        .ok_or_else(|| StdError::not_found(format!("oracle {}", address)))?;

    to_json_binary(&ReputationResponse {
        address,
        reputation: oracle.reputation,
        max_reputation: config.max_reputation,
    })
}

pub fn query_oracle_performance(deps: Deps, address: String, feed_id: u64) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let performance = PERFORMANCE
        .may_load(deps.storage, (&addr, feed_id))?
        .unwrap_or_default();
    to_json_binary(&performance)
}

pub fn query_pending_rewards(deps: Deps, address: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&address)?;
    let pending = PENDING_REWARDS
        .may_load(deps.storage, &addr)?
        .unwrap_or_default();
    to_json_binary(&pending)
}

pub fn query_feed(deps: Deps, feed_id: u64) -> StdResult<Binary> {
    let feed = FEEDS.may_load(deps.storage, feed_id)?;
    to_json_binary(&feed)
}

pub fn query_feeds(deps: Deps, start_after: Option<u64>, limit: Option<u32>) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    let feeds = FEEDS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, feed)| feed))
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&FeedsResponse { feeds })
}

pub fn query_round(deps: Deps, feed_id: u64, round: u64) -> StdResult<Binary> {
    let round = ROUNDS.may_load(deps.storage, (feed_id, round))?;
    to_json_binary(&round)
}

pub fn query_round_status(deps: Deps, env: Env, feed_id: u64, round: u64) -> StdResult<Binary> {
    let status = ROUNDS
        .may_load(deps.storage, (feed_id, round))?
        .map(|r| RoundStatus::at_height(env.block.height, r.end_height, r.is_finalized));
    to_json_binary(&status)
}

pub fn query_submission(deps: Deps, feed_id: u64, round: u64, oracle: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&oracle)?;
    let submission = SUBMISSIONS.may_load(deps.storage, (feed_id, round, &addr))?;
    to_json_binary(&submission)
}

pub fn query_round_submissions(
    deps: Deps,
    feed_id: u64,
    round: u64,
    start_after: Option<String>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start_addr = start_after
        .map(|a| deps.api.addr_validate(&a))
        .transpose()?;
    let start = start_addr.as_ref().map(Bound::exclusive);

    let submissions = SUBMISSIONS
        .prefix((feed_id, round))
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            item.map(|(oracle, submission)| SubmissionEntry {
                oracle: oracle.to_string(),
                submission,
            })
        })
        .collect::<StdResult<Vec<_>>>()?;

    to_json_binary(&RoundSubmissionsResponse { submissions })
}

pub fn query_latest_value(deps: Deps, feed_id: u64) -> StdResult<Binary> {
    let latest = LATEST_VALUES.may_load(deps.storage, feed_id)?;
    to_json_binary(&latest)
}

pub fn query_ready_to_finalize(deps: Deps, env: Env, feed_id: u64, round: u64) -> StdResult<Binary> {
    let ready = is_ready_to_finalize(deps.storage, env.block.height, feed_id, round)?;
    to_json_binary(&ready)
}

pub fn query_subscription(deps: Deps, feed_id: u64, subscriber: String) -> StdResult<Binary> {
    let addr = deps.api.addr_validate(&subscriber)?;
    let subscription = SUBSCRIPTIONS.may_load(deps.storage, (feed_id, &addr))?;
    to_json_binary(&subscription)
}
