use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult, Uint128,
};
use cw2::{get_contract_version, set_contract_version};

use crate::aggregate;
use crate::config;
use crate::error::ContractError;
use crate::feeds;
use crate::msg::{
    ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg, UpdateConfigParams, UpdateFeedParams,
};
use crate::query;
use crate::registry;
use crate::rounds;
use crate::state::{ProtocolState, CONFIG, PROTOCOL_STATE};

const CONTRACT_NAME: &str = "crates.io:weighted-oracle-hub";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = config::build_config(deps.api, info.sender.clone(), msg)?;
    CONFIG.save(deps.storage, &config)?;

    let state = ProtocolState {
        total_oracles: 0,
        active_oracles: 0,
        total_staked: Uint128::zero(),
        total_slashed: Uint128::zero(),
        total_rewards_credited: Uint128::zero(),
        next_feed_id: 1,
    };
    PROTOCOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "weighted-oracle-hub")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("stake_denom", config.stake_denom))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Register {} => registry::register(deps, env, info),
        ExecuteMsg::AddStake {} => registry::add_stake(deps, env, info),
        ExecuteMsg::Withdraw {} => registry::withdraw(deps, env, info),
        ExecuteMsg::ClaimRewards {} => registry::claim_rewards(deps, env, info),
        ExecuteMsg::CreateFeed {
            name,
            description,
            min_submissions,
            deviation_threshold,
        } => feeds::create_feed(
            deps,
            env,
            info,
            name,
            description,
            min_submissions,
            deviation_threshold,
        ),
        ExecuteMsg::UpdateFeed {
            feed_id,
            name,
            description,
            min_submissions,
            deviation_threshold,
            active,
        } => feeds::update_feed(
            deps,
            env,
            info,
            UpdateFeedParams {
                feed_id,
                name,
                description,
                min_submissions,
                deviation_threshold,
                active,
            },
        ),
        ExecuteMsg::StartRound { feed_id } => rounds::start_round(deps, env, info, feed_id),
        ExecuteMsg::Submit {
            feed_id,
            round,
            value,
        } => rounds::submit(deps, env, info, feed_id, round, value),
        ExecuteMsg::Finalize { feed_id, round } => {
            aggregate::finalize(deps, env, info, feed_id, round)
        }
        ExecuteMsg::Subscribe {
            feed_id,
            duration_blocks,
        } => feeds::subscribe(deps, env, info, feed_id, duration_blocks),
        ExecuteMsg::Unsubscribe { feed_id } => feeds::unsubscribe(deps, env, info, feed_id),
        ExecuteMsg::UpdateConfig {
            admin,
            treasury,
            slash_percentage,
            reward_percentage,
            cooldown_blocks,
            submission_window,
            max_subscription_blocks,
        } => config::update_config(
            deps,
            env,
            info,
            UpdateConfigParams {
                admin,
                treasury,
                slash_percentage,
                reward_percentage,
                cooldown_blocks,
                submission_window,
                max_subscription_blocks,
            },
        ),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::ProtocolState {} => query::query_protocol_state(deps),
        QueryMsg::Oracle { address } => query::query_oracle(deps, address),
        QueryMsg::OracleWeight { address } => query::query_oracle_weight(deps, address),
        QueryMsg::OracleReputation { address } => query::query_oracle_reputation(deps, address),
        QueryMsg::OraclePerformance { address, feed_id } => {
            query::query_oracle_performance(deps, address, feed_id)
        }
        QueryMsg::PendingRewards { address } => query::query_pending_rewards(deps, address),
        QueryMsg::Feed { feed_id } => query::query_feed(deps, feed_id),
        QueryMsg::Feeds { start_after, limit } => query::query_feeds(deps, start_after, limit),
        QueryMsg::Round { feed_id, round } => query::query_round(deps, feed_id, round),
        QueryMsg::RoundStatus { feed_id, round } => {
            query::query_round_status(deps, env, feed_id, round)
        }
        QueryMsg::Submission {
            feed_id,
            round,
            oracle,
        } => query::query_submission(deps, feed_id, round, oracle),
        QueryMsg::RoundSubmissions {
            feed_id,
            round,
            start_after,
            limit,
        } => query::query_round_submissions(deps, feed_id, round, start_after, limit),
        QueryMsg::LatestValue { feed_id } => query::query_latest_value(deps, feed_id),
        QueryMsg::ReadyToFinalize { feed_id, round } => {
            query::query_ready_to_finalize(deps, env, feed_id, round)
        }
        QueryMsg::Subscription {
            feed_id,
            subscriber,
        } => query::query_subscription(deps, feed_id, subscriber),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
