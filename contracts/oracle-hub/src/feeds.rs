use cosmwasm_std::{DepsMut, Env, Event, MessageInfo, Response, Storage, Uint128};
use weighted_oracle_common::math::height_after;
use weighted_oracle_common::params::{MAX_FEED_DESCRIPTION_LEN, MAX_FEED_NAME_LEN};

use crate::error::ContractError;
use crate::msg::UpdateFeedParams;
use crate::state::{
    Config, Feed, Subscription, CONFIG, FEEDS, PROTOCOL_STATE, SUBSCRIBER_COUNT, SUBSCRIPTIONS,
};

/// Create a feed with the next protocol-wide feed id.
pub fn create_feed(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    name: String,
    description: String,
    min_submissions: u32,
    deviation_threshold: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    validate_feed(
        &config,
        &name,
        &description,
        min_submissions,
        deviation_threshold,
    )?;

    let mut state = PROTOCOL_STATE.load(deps.storage)?;
    let feed_id = state.next_feed_id;
    state.next_feed_id += 1;

    let feed = Feed {
        id: feed_id,
        creator: info.sender.clone(),
        name,
        description,
        min_submissions,
        deviation_threshold,
        active: true,
        total_rounds: 0,
        created_at: env.block.height,
    };
    FEEDS.save(deps.storage, feed_id, &feed)?;
    PROTOCOL_STATE.save(deps.storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "create_feed")
        .add_attribute("feed_id", feed_id.to_string())
        .add_attribute("creator", info.sender.to_string())
        .add_event(
            Event::new("oracle_feed_created")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("name", feed.name)
                .add_attribute("min_submissions", min_submissions.to_string())
                .add_attribute("deviation_threshold", deviation_threshold.to_string()),
        ))
}

/// Update a feed's metadata or aggregation settings. Creator or admin only.
pub fn update_feed(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    params: UpdateFeedParams,
) -> Result<Response, ContractError> {
    let UpdateFeedParams {
        feed_id,
        name,
        description,
        min_submissions,
        deviation_threshold,
        active,
    } = params;

    let config = CONFIG.load(deps.storage)?;
    let mut feed = load_feed(deps.storage, feed_id)?;

    if info.sender != feed.creator && info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only feed creator or admin can update a feed".to_string(),
        });
    }

    if let Some(name) = name {
        feed.name = name;
    }
    if let Some(description) = description {
        feed.description = description;
    }
    if let Some(min_submissions) = min_submissions {
        feed.min_submissions = min_submissions;
    }
    if let Some(deviation_threshold) = deviation_threshold {
        feed.deviation_threshold = deviation_threshold;
    }
    if let Some(active) = active {
        feed.active = active;
    }

    validate_feed(
        &config,
        &feed.name,
        &feed.description,
        feed.min_submissions,
        feed.deviation_threshold,
    )?;

    FEEDS.save(deps.storage, feed_id, &feed)?;

    Ok(Response::new()
        .add_attribute("action", "update_feed")
        .add_attribute("feed_id", feed_id.to_string())
        .add_event(
            Event::new("oracle_feed_updated")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("active", feed.active.to_string())
                .add_attribute("min_submissions", feed.min_submissions.to_string())
                .add_attribute("deviation_threshold", feed.deviation_threshold.to_string()),
        ))
}

/// Subscribe the sender to a feed, or extend an existing subscription.
/// Extensions run from the later of now and the current expiry.
pub fn subscribe(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    feed_id: u64,
    duration_blocks: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let feed = load_feed(deps.storage, feed_id)?;
    if !feed.active {
        return Err(ContractError::FeedInactive { feed_id });
    }

    if duration_blocks == 0 || duration_blocks > config.max_subscription_blocks {
        return Err(ContractError::InvalidDuration {
            blocks: duration_blocks,
            max: config.max_subscription_blocks,
        });
    }

    let now = env.block.height;
    let existing = SUBSCRIPTIONS.may_load(deps.storage, (feed_id, &info.sender))?;
    let subscription = match &existing {
        Some(current) => Subscription {
            subscribed_at: current.subscribed_at,
            expires_at: height_after(current.expires_at.max(now), duration_blocks)?,
        },
        None => Subscription {
            subscribed_at: now,
            expires_at: height_after(now, duration_blocks)?,
        },
    };

    SUBSCRIPTIONS.save(deps.storage, (feed_id, &info.sender), &subscription)?;
    if existing.is_none() {
        let count = SUBSCRIBER_COUNT
            .may_load(deps.storage, feed_id)?
            .unwrap_or(0);
        SUBSCRIBER_COUNT.save(deps.storage, feed_id, &(count + 1))?;
    }

    Ok(Response::new()
        .add_attribute("action", "subscribe")
        .add_attribute("feed_id", feed_id.to_string())
        .add_attribute("subscriber", info.sender.to_string())
        .add_event(
            Event::new("oracle_subscribed")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("subscriber", info.sender.to_string())
                .add_attribute("expires_at", subscription.expires_at.to_string()),
        ))
}

pub fn unsubscribe(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    feed_id: u64,
) -> Result<Response, ContractError> {
    if !SUBSCRIPTIONS.has(deps.storage, (feed_id, &info.sender)) {
        return Err(ContractError::Unauthorized {
            reason: format!("not subscribed to feed {}", feed_id),
        });
    }

    SUBSCRIPTIONS.remove(deps.storage, (feed_id, &info.sender));
    let count = SUBSCRIBER_COUNT
        .may_load(deps.storage, feed_id)?
        .unwrap_or(0);
    SUBSCRIBER_COUNT.save(deps.storage, feed_id, &count.saturating_sub(1))?;

    Ok(Response::new()
        .add_attribute("action", "unsubscribe")
        .add_attribute("feed_id", feed_id.to_string())
        .add_event(
            Event::new("oracle_unsubscribed")
                .add_attribute("feed_id", feed_id.to_string())
                .add_attribute("subscriber", info.sender.to_string()),
        ))
}

pub fn load_feed(storage: &dyn Storage, feed_id: u64) -> Result<Feed, ContractError> {
    FEEDS
        .may_load(storage, feed_id)?
        .ok_or(ContractError::FeedNotFound { feed_id })
}

fn validate_feed(
    config: &Config,
    name: &str,
    description: &str,
    min_submissions: u32,
    deviation_threshold: Uint128,
) -> Result<(), ContractError> {
    if name.is_empty() || name.len() > MAX_FEED_NAME_LEN {
        return Err(ContractError::InvalidValue {
            reason: format!("feed name must be 1..={} bytes", MAX_FEED_NAME_LEN),
        });
    }
    if description.len() > MAX_FEED_DESCRIPTION_LEN {
        return Err(ContractError::InvalidValue {
            reason: format!(
                "feed description must be at most {} bytes",
                MAX_FEED_DESCRIPTION_LEN
            ),
        });
    }
    if min_submissions < config.min_oracles {
        return Err(ContractError::BelowThreshold {
            reason: format!(
                "min_submissions {} is below the aggregation threshold {}",
                min_submissions, config.min_oracles
            ),
        });
    }
    if deviation_threshold.is_zero() {
        return Err(ContractError::InvalidValue {
            reason: "deviation_threshold must be greater than zero".to_string(),
        });
    }
    Ok(())
}
