//! Integration tests for the weighted oracle hub.
//!
//! These tests drive the contract through its `instantiate` / `execute` /
//! `query` entry points using `cosmwasm_std::testing` mocks, advancing
//! `env.block.height` to move rounds through their lifecycle.
//!
//! Run:
//! ```bash
//! cargo test -p weighted-oracle-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coins, from_json, Addr, BankMsg, Coin, CosmosMsg, Env, OwnedDeps, Response, Uint128,
};
use weighted_oracle_common::types::RoundStatus;
use weighted_oracle_hub::contract::{execute, instantiate, query};
use weighted_oracle_hub::error::ContractError;
use weighted_oracle_hub::msg::{
    ExecuteMsg, FeedsResponse, InstantiateMsg, QueryMsg, ReputationResponse,
    RoundSubmissionsResponse, WeightResponse,
};
use weighted_oracle_hub::state::{LatestValue, Oracle, ProtocolState, Round};

type Deps = OwnedDeps<cosmwasm_std::MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

const DENOM: &str = "ustake";
const STAKE: u128 = 10_000_000;
const WINDOW: u64 = 144;
const COOLDOWN: u64 = 1008;

// ─── Helpers ───

fn instantiate_msg() -> InstantiateMsg {
    let mock_api = MockApi::default();
    InstantiateMsg {
        treasury: mock_api.addr_make("treasury").to_string(),
        stake_denom: DENOM.to_string(),
        min_stake: None,
        max_stake: None,
        max_reputation: None,
        initial_reputation: None,
        reputation_reward: None,
        reputation_decay: None,
        submission_window: None,
        cooldown_blocks: None,
        slash_percentage: None,
        reward_percentage: None,
        min_oracles: None,
        max_subscription_blocks: None,
    }
}

fn setup(deps: &mut Deps) {
    let admin = deps.api.addr_make("admin");
    let info = message_info(&admin, &[]);
    instantiate(deps.as_mut(), mock_env(), info, instantiate_msg()).unwrap();
}

fn genesis() -> u64 {
    mock_env().block.height
}

fn env_at(height: u64) -> Env {
    let mut env = mock_env();
    env.block.height = height;
    env
}

fn exec(
    deps: &mut Deps,
    sender: &Addr,
    height: u64,
    funds: &[Coin],
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    let info = message_info(sender, funds);
    execute(deps.as_mut(), env_at(height), info, msg)
}

fn query_at<T: serde::de::DeserializeOwned>(deps: &Deps, height: u64, msg: QueryMsg) -> T {
    from_json(query(deps.as_ref(), env_at(height), msg).unwrap()).unwrap()
}

fn register(deps: &mut Deps, name: &str, stake: u128) -> Addr {
    let addr = deps.api.addr_make(name);
    exec(deps, &addr, genesis(), &coins(stake, DENOM), ExecuteMsg::Register {}).unwrap();
    addr
}

fn create_feed(deps: &mut Deps, name: &str, threshold: u128) -> u64 {
    let creator = deps.api.addr_make("creator");
    let res = exec(
        deps,
        &creator,
        genesis(),
        &[],
        ExecuteMsg::CreateFeed {
            name: name.to_string(),
            description: format!("{} reference price", name),
            min_submissions: 3,
            deviation_threshold: Uint128::new(threshold),
        },
    )
    .unwrap();
    res.attributes
        .iter()
        .find(|a| a.key == "feed_id")
        .map(|a| a.value.parse().unwrap())
        .unwrap()
}

fn start_round(deps: &mut Deps, feed_id: u64, height: u64) -> u64 {
    let creator = deps.api.addr_make("creator");
    let res = exec(deps, &creator, height, &[], ExecuteMsg::StartRound { feed_id }).unwrap();
    res.attributes
        .iter()
        .find(|a| a.key == "round")
        .map(|a| a.value.parse().unwrap())
        .unwrap()
}

fn submit(deps: &mut Deps, oracle: &Addr, feed_id: u64, round: u64, value: u128, height: u64) {
    exec(
        deps,
        oracle,
        height,
        &[],
        ExecuteMsg::Submit {
            feed_id,
            round,
            value: Uint128::new(value),
        },
    )
    .unwrap();
}

fn finalize(deps: &mut Deps, feed_id: u64, round: u64, height: u64) -> Response {
    let keeper = deps.api.addr_make("keeper");
    exec(deps, &keeper, height, &[], ExecuteMsg::Finalize { feed_id, round }).unwrap()
}

fn oracle_record(deps: &Deps, addr: &Addr) -> Oracle {
    let oracle: Option<Oracle> = query_at(
        deps,
        genesis(),
        QueryMsg::Oracle {
            address: addr.to_string(),
        },
    );
    oracle.unwrap()
}

fn bank_sends(res: &Response) -> Vec<(String, Vec<Coin>)> {
    res.messages
        .iter()
        .filter_map(|m| match &m.msg {
            CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                Some((to_address.clone(), amount.clone()))
            }
            _ => None,
        })
        .collect()
}

/// Sum of active oracle stakes must always equal the tracked total.
fn assert_conservation(deps: &Deps, oracles: &[Addr]) {
    let state: ProtocolState = query_at(deps, genesis(), QueryMsg::ProtocolState {});
    let sum: Uint128 = oracles
        .iter()
        .map(|a| oracle_record(deps, a))
        .filter(|o| o.active)
        .map(|o| o.stake)
        .sum();
    assert_eq!(state.total_staked, sum);
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_round_with_outlier() {
    // Three equally weighted oracles report 100, 105 and 300 against a
    // threshold of 100. The median is 105 and only the 300 report is slashed.

    let mut deps = mock_dependencies();
    setup(&mut deps);

    let a = register(&mut deps, "oracle_a", STAKE);
    let b = register(&mut deps, "oracle_b", STAKE);
    let c = register(&mut deps, "oracle_c", STAKE);
    let all = [a.clone(), b.clone(), c.clone()];
    assert_conservation(&deps, &all);

    let feed_id = create_feed(&mut deps, "BTC/USD", 100);
    let round = start_round(&mut deps, feed_id, genesis());
    assert_eq!(round, 1);

    submit(&mut deps, &a, feed_id, round, 100, genesis() + 1);
    submit(&mut deps, &b, feed_id, round, 105, genesis() + 2);
    submit(&mut deps, &c, feed_id, round, 300, genesis() + 3);

    // 1. Round is still open until the window closes
    let status: Option<RoundStatus> = query_at(
        &deps,
        genesis() + WINDOW - 1,
        QueryMsg::RoundStatus { feed_id, round },
    );
    assert_eq!(status, Some(RoundStatus::Open));
    let ready: bool = query_at(
        &deps,
        genesis() + WINDOW,
        QueryMsg::ReadyToFinalize { feed_id, round },
    );
    assert!(ready);

    // 2. Finalize
    let finalize_height = genesis() + WINDOW;
    let res = finalize(&mut deps, feed_id, round, finalize_height);
    let treasury = deps.api.addr_make("treasury");
    assert_eq!(
        bank_sends(&res),
        vec![(treasury.to_string(), coins(500_000, DENOM))]
    );

    let stored: Option<Round> = query_at(&deps, finalize_height, QueryMsg::Round { feed_id, round });
    let stored = stored.unwrap();
    assert!(stored.is_finalized);
    assert_eq!(stored.final_value, Some(Uint128::new(105)));
    assert_eq!(stored.submission_count, 3);

    let latest: Option<LatestValue> = query_at(&deps, finalize_height, QueryMsg::LatestValue { feed_id });
    assert_eq!(latest.unwrap().value, Uint128::new(105));

    // 3. Reputation and stake outcomes
    for addr in [&a, &b] {
        let rep: ReputationResponse = query_at(
            &deps,
            finalize_height,
            QueryMsg::OracleReputation {
                address: addr.to_string(),
            },
        );
        assert_eq!(rep.reputation, 110);
        assert_eq!(rep.max_reputation, 1000);
        assert_eq!(oracle_record(&deps, addr).stake, Uint128::new(STAKE));
    }
    let slashed = oracle_record(&deps, &c);
    assert_eq!(slashed.reputation, 99);
    assert_eq!(slashed.stake, Uint128::new(9_000_000));
    assert_eq!(slashed.cooldown_until, finalize_height + COOLDOWN);
    assert_conservation(&deps, &all);

    let state: ProtocolState = query_at(&deps, finalize_height, QueryMsg::ProtocolState {});
    assert_eq!(state.total_slashed, Uint128::new(1_000_000));
    assert_eq!(state.total_rewards_credited, Uint128::new(500_000));

    // 4. Accurate oracles claim their share of the slash
    for addr in [&a, &b] {
        let res = exec(&mut deps, addr, finalize_height, &[], ExecuteMsg::ClaimRewards {}).unwrap();
        assert_eq!(
            bank_sends(&res),
            vec![(addr.to_string(), coins(250_000, DENOM))]
        );
    }

    // 5. A second finalize is rejected
    let keeper = deps.api.addr_make("keeper");
    let err = exec(
        &mut deps,
        &keeper,
        finalize_height + 1,
        &[],
        ExecuteMsg::Finalize { feed_id, round },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::RoundNotActive { .. }));
}

#[test]
fn test_rewards_follow_frozen_weight() {
    // Two accurate oracles with different weights share the slash of a
    // third pro rata: weight 6 (reputation only) vs 26 (reputation + stake).

    let mut deps = mock_dependencies();
    setup(&mut deps);

    let small = register(&mut deps, "small", STAKE);
    let large = register(&mut deps, "large", 500_000_000_000);
    let liar = register(&mut deps, "liar", STAKE);

    for (addr, expected) in [(&small, 6u64), (&large, 26u64)] {
        let weight: WeightResponse = query_at(
            &deps,
            genesis(),
            QueryMsg::OracleWeight {
                address: addr.to_string(),
            },
        );
        assert_eq!(weight.weight, expected);
    }

    let feed_id = create_feed(&mut deps, "ETH/USD", 10);
    let round = start_round(&mut deps, feed_id, genesis());
    submit(&mut deps, &small, feed_id, round, 2_000, genesis() + 1);
    submit(&mut deps, &large, feed_id, round, 2_005, genesis() + 1);
    submit(&mut deps, &liar, feed_id, round, 9_999, genesis() + 1);

    finalize(&mut deps, feed_id, round, genesis() + WINDOW);

    // 500_000 reward pool split 6:26
    let small_pending: Uint128 = query_at(
        &deps,
        genesis(),
        QueryMsg::PendingRewards {
            address: small.to_string(),
        },
    );
    let large_pending: Uint128 = query_at(
        &deps,
        genesis(),
        QueryMsg::PendingRewards {
            address: large.to_string(),
        },
    );
    assert_eq!(small_pending, Uint128::new(93_750));
    assert_eq!(large_pending, Uint128::new(406_250));
    assert_conservation(&deps, &[small, large, liar]);
}

#[test]
fn test_reputation_grows_across_rounds() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let oracles: Vec<Addr> = ["o1", "o2", "o3"]
        .iter()
        .map(|name| register(&mut deps, name, STAKE))
        .collect();
    let feed_id = create_feed(&mut deps, "ATOM/USD", 5);

    let mut height = genesis();
    for expected_round in 1..=5u64 {
        let round = start_round(&mut deps, feed_id, height);
        assert_eq!(round, expected_round);
        for (i, addr) in oracles.iter().enumerate() {
            submit(&mut deps, addr, feed_id, round, 1_000 + i as u128, height + 1);
        }
        height += WINDOW;
        finalize(&mut deps, feed_id, round, height);
    }

    for addr in &oracles {
        let record = oracle_record(&deps, addr);
        assert_eq!(record.reputation, 150);
        assert_eq!(record.submission_count, 5);
        assert_eq!(record.accurate_count, 5);
        assert!(record.slashed_amount.is_zero());
    }

    // Weight reflects the new reputation: 150 * 60 / 1000 = 9
    let weight: WeightResponse = query_at(
        &deps,
        height,
        QueryMsg::OracleWeight {
            address: oracles[0].to_string(),
        },
    );
    assert_eq!(weight.weight, 9);

    let latest: Option<LatestValue> = query_at(&deps, height, QueryMsg::LatestValue { feed_id });
    let latest = latest.unwrap();
    assert_eq!(latest.round, 5);
    assert_eq!(latest.value, Uint128::new(1_001));
}

#[test]
fn test_out_of_order_finalization_keeps_newest_value() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let oracles: Vec<Addr> = ["o1", "o2", "o3"]
        .iter()
        .map(|name| register(&mut deps, name, STAKE))
        .collect();
    let feed_id = create_feed(&mut deps, "SOL/USD", 50);

    let first = start_round(&mut deps, feed_id, genesis());
    let second = start_round(&mut deps, feed_id, genesis() + 1);
    for addr in &oracles {
        submit(&mut deps, addr, feed_id, first, 100, genesis() + 2);
        submit(&mut deps, addr, feed_id, second, 200, genesis() + 2);
    }

    let height = genesis() + 1 + WINDOW;
    finalize(&mut deps, feed_id, second, height);
    finalize(&mut deps, feed_id, first, height);

    let latest: Option<LatestValue> = query_at(&deps, height, QueryMsg::LatestValue { feed_id });
    let latest = latest.unwrap();
    assert_eq!(latest.round, second);
    assert_eq!(latest.value, Uint128::new(200));

    let status: Option<RoundStatus> = query_at(
        &deps,
        height,
        QueryMsg::RoundStatus {
            feed_id,
            round: first,
        },
    );
    assert_eq!(status, Some(RoundStatus::Finalized));
}

#[test]
fn test_outlier_cannot_withdraw_before_judgement() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let a = register(&mut deps, "a", STAKE);
    let b = register(&mut deps, "b", STAKE);
    let c = register(&mut deps, "c", STAKE);
    let feed_id = create_feed(&mut deps, "BTC/USD", 100);
    let round = start_round(&mut deps, feed_id, genesis());
    submit(&mut deps, &a, feed_id, round, 100, genesis() + 1);
    submit(&mut deps, &b, feed_id, round, 100, genesis() + 1);
    submit(&mut deps, &c, feed_id, round, 5_000, genesis() + 1);

    let err = exec(&mut deps, &c, genesis() + 2, &[], ExecuteMsg::Withdraw {}).unwrap_err();
    assert!(matches!(
        err,
        ContractError::SubmissionPending { feed_id: f, round: r } if f == feed_id && r == round
    ));

    // Still held once the window closes, until someone finalizes
    let err = exec(&mut deps, &c, genesis() + WINDOW, &[], ExecuteMsg::Withdraw {}).unwrap_err();
    assert!(matches!(err, ContractError::SubmissionPending { .. }));

    let slashed_at = genesis() + WINDOW;
    let res = finalize(&mut deps, feed_id, round, slashed_at);
    let treasury = deps.api.addr_make("treasury");
    assert_eq!(
        bank_sends(&res),
        vec![(treasury.to_string(), coins(500_000, DENOM))]
    );

    let record = oracle_record(&deps, &c);
    assert_eq!(record.stake, Uint128::new(9_000_000));
    assert!(record.active);

    let cooldown_until = slashed_at + COOLDOWN;
    let err = exec(&mut deps, &c, cooldown_until, &[], ExecuteMsg::Withdraw {}).unwrap_err();
    assert!(matches!(err, ContractError::CooldownActive { .. }));

    let res = exec(&mut deps, &c, cooldown_until + 1, &[], ExecuteMsg::Withdraw {}).unwrap();
    assert_eq!(bank_sends(&res), vec![(c.to_string(), coins(9_000_000, DENOM))]);

    let state: ProtocolState = query_at(&deps, genesis(), QueryMsg::ProtocolState {});
    assert_eq!(state.total_slashed, Uint128::new(1_000_000));
    assert_eq!(state.active_oracles, 2);
    assert_conservation(&deps, &[a, b, c]);
}

#[test]
fn test_slashed_oracle_recovers_after_cooldown() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let a = register(&mut deps, "a", STAKE);
    let b = register(&mut deps, "b", STAKE);
    let c = register(&mut deps, "c", STAKE);
    let feed_id = create_feed(&mut deps, "BTC/USD", 100);

    let round = start_round(&mut deps, feed_id, genesis());
    submit(&mut deps, &a, feed_id, round, 100, genesis() + 1);
    submit(&mut deps, &b, feed_id, round, 100, genesis() + 1);
    submit(&mut deps, &c, feed_id, round, 900, genesis() + 1);
    let slashed_at = genesis() + WINDOW;
    finalize(&mut deps, feed_id, round, slashed_at);

    let cooldown_until = slashed_at + COOLDOWN;
    let round = start_round(&mut deps, feed_id, cooldown_until);
    let err = exec(
        &mut deps,
        &c,
        cooldown_until,
        &[],
        ExecuteMsg::Submit {
            feed_id,
            round,
            value: Uint128::new(100),
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::CooldownActive { .. }));

    // One block later the oracle may report again
    submit(&mut deps, &c, feed_id, round, 100, cooldown_until + 1);
    submit(&mut deps, &a, feed_id, round, 100, cooldown_until + 1);
    submit(&mut deps, &b, feed_id, round, 100, cooldown_until + 1);
    finalize(&mut deps, feed_id, round, cooldown_until + WINDOW);

    let record = oracle_record(&deps, &c);
    assert_eq!(record.reputation, 109);
    assert_eq!(record.accurate_count, 1);
    assert_eq!(record.submission_count, 2);
    assert_conservation(&deps, &[a, b, c]);
}

#[test]
fn test_feed_and_submission_pagination() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    for name in ["A", "B", "C", "D", "E"] {
        create_feed(&mut deps, name, 1);
    }

    let page: FeedsResponse = query_at(
        &deps,
        genesis(),
        QueryMsg::Feeds {
            start_after: None,
            limit: Some(2),
        },
    );
    assert_eq!(
        page.feeds.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![1, 2]
    );
    let page: FeedsResponse = query_at(
        &deps,
        genesis(),
        QueryMsg::Feeds {
            start_after: Some(2),
            limit: Some(10),
        },
    );
    assert_eq!(
        page.feeds.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["C", "D", "E"]
    );

    let oracles: Vec<Addr> = (0..4)
        .map(|i| register(&mut deps, &format!("oracle{}", i), STAKE))
        .collect();
    let round = start_round(&mut deps, 1, genesis());
    for addr in &oracles {
        submit(&mut deps, addr, 1, round, 42, genesis() + 1);
    }

    let first: RoundSubmissionsResponse = query_at(
        &deps,
        genesis(),
        QueryMsg::RoundSubmissions {
            feed_id: 1,
            round,
            start_after: None,
            limit: Some(3),
        },
    );
    assert_eq!(first.submissions.len(), 3);
    let rest: RoundSubmissionsResponse = query_at(
        &deps,
        genesis(),
        QueryMsg::RoundSubmissions {
            feed_id: 1,
            round,
            start_after: Some(first.submissions[2].oracle.clone()),
            limit: None,
        },
    );
    assert_eq!(rest.submissions.len(), 1);
    assert!(first
        .submissions
        .iter()
        .all(|entry| entry.oracle != rest.submissions[0].oracle));
}

#[test]
fn test_subscription_lifecycle() {
    let mut deps = mock_dependencies();
    setup(&mut deps);

    let feed_id = create_feed(&mut deps, "BTC/USD", 100);
    let reader = deps.api.addr_make("reader");

    exec(
        &mut deps,
        &reader,
        genesis(),
        &[],
        ExecuteMsg::Subscribe {
            feed_id,
            duration_blocks: 1_000,
        },
    )
    .unwrap();

    let subscription: Option<weighted_oracle_hub::state::Subscription> = query_at(
        &deps,
        genesis(),
        QueryMsg::Subscription {
            feed_id,
            subscriber: reader.to_string(),
        },
    );
    assert_eq!(subscription.unwrap().expires_at, genesis() + 1_000);

    // Renewing after expiry restarts from the current height
    exec(
        &mut deps,
        &reader,
        genesis() + 5_000,
        &[],
        ExecuteMsg::Subscribe {
            feed_id,
            duration_blocks: 10,
        },
    )
    .unwrap();
    let subscription: Option<weighted_oracle_hub::state::Subscription> = query_at(
        &deps,
        genesis(),
        QueryMsg::Subscription {
            feed_id,
            subscriber: reader.to_string(),
        },
    );
    assert_eq!(subscription.unwrap().expires_at, genesis() + 5_010);

    let admin = deps.api.addr_make("admin");
    exec(
        &mut deps,
        &admin,
        genesis(),
        &[],
        ExecuteMsg::UpdateFeed {
            feed_id,
            name: None,
            description: None,
            min_submissions: None,
            deviation_threshold: None,
            active: Some(false),
        },
    )
    .unwrap();
    let err = exec(
        &mut deps,
        &reader,
        genesis(),
        &[],
        ExecuteMsg::Subscribe {
            feed_id,
            duration_blocks: 10,
        },
    )
    .unwrap_err();
    assert!(matches!(err, ContractError::FeedInactive { .. }));

    exec(
        &mut deps,
        &reader,
        genesis(),
        &[],
        ExecuteMsg::Unsubscribe { feed_id },
    )
    .unwrap();
    let subscription: Option<weighted_oracle_hub::state::Subscription> = query_at(
        &deps,
        genesis(),
        QueryMsg::Subscription {
            feed_id,
            subscriber: reader.to_string(),
        },
    );
    assert!(subscription.is_none());
}
