use cosmwasm_std::{
    Addr, DepsMut, Empty, Env, Event, MessageInfo, Order, Response, StdResult, Storage, Uint128,
};
use weighted_oracle_common::math::height_after;

use crate::error::ContractError;
use crate::feeds::load_feed;
use crate::registry::{load_oracle, oracle_weight};
use crate::state::{Round, Submission, CONFIG, FEEDS, ORACLES, ROUNDS, SUBMISSIONS, UNSETTLED};

/// Open the next round of a feed.
///
/// The round number is `feed.total_rounds + 1`; bumping the counter and
/// creating the round happen in the same transaction, so two starts on one
/// feed can never hand out the same number. Earlier rounds that never
/// reached `min_submissions` are simply left behind.
pub fn start_round(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    feed_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut feed = load_feed(deps.storage, feed_id)?;
    if !feed.active {
        return Err(ContractError::FeedInactive { feed_id });
    }

    let is_active_oracle = ORACLES
        .may_load(deps.storage, &info.sender)?
        .map(|o| o.active)
        .unwrap_or(false);
    if info.sender != feed.creator && info.sender != config.admin && !is_active_oracle {
        return Err(ContractError::Unauthorized {
            reason: "only feed creator, admin or an active oracle can start rounds".to_string(),
        });
    }

    let round_number = feed.total_rounds + 1;
    let start_height = env.block.height;
    let end_height = height_after(start_height, config.submission_window)?;
    feed.total_rounds = round_number;

    let round = Round {
        feed_id,
        round: round_number,
        start_height,
        end_height,
        submission_count: 0,
        final_value: None,
        is_finalized: false,
        finalized_at: None,
    };
    ROUNDS.save(deps.storage, (feed_id, round_number), &round)?;
    FEEDS.save(deps.storage, feed_id, &feed)?;

    Ok(Response::new()
        .add_attribute("action", "start_round")
        .add_attribute("feed_id", feed_id.to_string())
        .add_attribute("round", round_number.to_string())
        .add_event(
            Event::new("oracle_round_started")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("round", round_number.to_string())
                .add_attribute("start_height", start_height.to_string())
                .add_attribute("end_height", end_height.to_string())
                .add_attribute("started_by", info.sender.to_string()),
        ))
}

/// Record the sender's value for an open round.
///
/// Checks run in a fixed order and the first failure wins: registration,
/// cooldown, round openness, uniqueness, then value. Only positivity is
/// checked here; deviation is judged at finalization.
pub fn submit(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    feed_id: u64,
    round_number: u64,
    value: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let height = env.block.height;

    let mut oracle = load_oracle(deps.storage, &info.sender)?;
    if !oracle.active {
        return Err(ContractError::Unauthorized {
            reason: "oracle has withdrawn and is inactive".to_string(),
        });
    }

    if height <= oracle.cooldown_until {
        return Err(ContractError::CooldownActive {
            cooldown_until: oracle.cooldown_until,
        });
    }

    let mut round = ROUNDS
        .may_load(deps.storage, (feed_id, round_number))?
        .ok_or_else(|| round_not_active(feed_id, round_number, "round not found"))?;
    if round.is_finalized {
        return Err(round_not_active(
            feed_id,
            round_number,
            "round already finalized",
        ));
    }
    if height >= round.end_height {
        return Err(round_not_active(
            feed_id,
            round_number,
            "submission window closed",
        ));
    }

    if SUBMISSIONS.has(deps.storage, (feed_id, round_number, &info.sender)) {
        return Err(ContractError::AlreadySubmitted {
            feed_id,
            round: round_number,
        });
    }

    if value.is_zero() {
        return Err(ContractError::InvalidValue {
            reason: "submitted value must be greater than zero".to_string(),
        });
    }

    let weight = oracle_weight(&config, &oracle);
    let submission = Submission {
        value,
        submitted_at: height,
        weight_at_submission: weight,
        deviation: None,
    };

    round.submission_count += 1;
    oracle.submission_count += 1;

    SUBMISSIONS.save(
        deps.storage,
        (feed_id, round_number, &info.sender),
        &submission,
    )?;
    ROUNDS.save(deps.storage, (feed_id, round_number), &round)?;
    ORACLES.save(deps.storage, &info.sender, &oracle)?;
    UNSETTLED.save(
        deps.storage,
        (&info.sender, feed_id, round_number),
        &Empty {},
    )?;

    Ok(Response::new()
        .add_attribute("action", "submit")
        .add_attribute("oracle", info.sender.to_string())
        .add_attribute("feed_id", feed_id.to_string())
        .add_attribute("round", round_number.to_string())
        .add_event(
            Event::new("oracle_submitted")
                .add_attribute("oracle", info.sender.to_string())
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("round", round_number.to_string())
                .add_attribute("value", value.to_string())
                .add_attribute("weight", weight.to_string())
                .add_attribute("submission_count", round.submission_count.to_string()),
        ))
}

/// True iff the window has closed, the round is not finalized and it
/// collected at least the feed's `min_submissions`. Missing feeds or rounds
/// are simply not ready.
pub fn is_ready_to_finalize(
    storage: &dyn Storage,
    height: u64,
    feed_id: u64,
    round_number: u64,
) -> StdResult<bool> {
    let (Some(feed), Some(round)) = (
        FEEDS.may_load(storage, feed_id)?,
        ROUNDS.may_load(storage, (feed_id, round_number))?,
    ) else {
        return Ok(false);
    };

    Ok(height >= round.end_height
        && !round.is_finalized
        && round.submission_count >= feed.min_submissions)
}

/// First round the oracle submitted to that can still be finalized: its
/// window is open, or it is closed with enough submissions. Rounds left
/// below `min_submissions` after their window are abandoned and do not count.
pub fn unsettled_submission(
    storage: &dyn Storage,
    height: u64,
    oracle: &Addr,
) -> StdResult<Option<(u64, u64)>> {
    let keys = UNSETTLED
        .sub_prefix(oracle)
        .keys(storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;

    for (feed_id, round_number) in keys {
        let (Some(feed), Some(round)) = (
            FEEDS.may_load(storage, feed_id)?,
            ROUNDS.may_load(storage, (feed_id, round_number))?,
        ) else {
            continue;
        };
        if round.is_finalized {
            continue;
        }
        if height < round.end_height || round.submission_count >= feed.min_submissions {
            return Ok(Some((feed_id, round_number)));
        }
    }
    Ok(None)
}

pub(crate) fn round_not_active(feed_id: u64, round: u64, reason: &str) -> ContractError {
    ContractError::RoundNotActive {
        feed_id,
        round,
        reason: reason.to_string(),
    }
}
