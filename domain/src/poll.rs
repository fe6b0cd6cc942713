//! In-memory polls, scoped per channel and keyed by name.
//!
//! Every operation takes the store lock once and never awaits while holding
//! it, so reading and updating a poll's votes is one atomic step.

use crate::circuit_breaker::format_cooldown_time;
use chrono::{DateTime, Duration, Utc};
use domain_shared::discord::{Author, ChannelId, UserId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{info, instrument};

pub const MAX_OPTIONS: usize = 20;

/// How long only the creator may end a poll.
pub fn creator_grace_period() -> Duration {
    Duration::minutes(10)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("A poll is already ongoing with the same name having the following options: {}.", quoted(.options))]
    AlreadyExists { name: String, options: Vec<String> },
    #[error("Poll options must be different from each other.")]
    NonUniqueOptions,
    #[error("A poll can have at most {limit} options.")]
    TooManyOptions { limit: usize },
    #[error("No poll named `{name}` exists on this channel.")]
    NoSuchPoll { name: String },
    #[error("No option `{option}` exists on poll `{poll}`.")]
    NoSuchOption { poll: String, option: String },
    #[error("Only {creator} can end poll `{name}` during the next {}.", format_cooldown_time(*.remaining))]
    NotCreator {
        name: String,
        creator: String,
        remaining: Duration,
    },
    #[error("There are no ongoing polls on this channel.")]
    NoPolls,
}

#[derive(Debug, Clone)]
struct Poll {
    options: Vec<String>,
    votes: HashMap<UserId, usize>,
    creator: Author,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Cast,
    Changed { previous: String },
    Unchanged,
}

/// Votes per option, in the order the options were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub name: String,
    pub creator: String,
    pub counts: Vec<(String, usize)>,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Options sharing the highest non-zero count.
    pub fn leaders(&self) -> Vec<&str> {
        let best = self.counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
        if best == 0 {
            return Vec::new();
        }
        self.counts
            .iter()
            .filter(|(_, count)| *count == best)
            .map(|(option, _)| option.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// Every poll on the channel as `(name, total votes)`.
    Overview(Vec<(String, usize)>),
    Single(Tally),
}

#[derive(Debug, Default)]
pub struct PollStore {
    channels: Mutex<HashMap<ChannelId, BTreeMap<String, Poll>>>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "debug", skip(self, creator))]
    pub fn create(
        &self,
        channel: ChannelId,
        name: &str,
        options: &[&str],
        creator: &Author,
        now: DateTime<Utc>,
    ) -> Result<(), PollError> {
        if options.len() > MAX_OPTIONS {
            return Err(PollError::TooManyOptions { limit: MAX_OPTIONS });
        }
        for (index, option) in options.iter().enumerate() {
            if options[..index].contains(option) {
                return Err(PollError::NonUniqueOptions);
            }
        }

        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let polls = channels.entry(channel).or_default();
        if let Some(existing) = polls.get(name) {
            return Err(PollError::AlreadyExists {
                name: name.to_string(),
                options: existing.options.clone(),
            });
        }

        polls.insert(
            name.to_string(),
            Poll {
                options: options.iter().map(|option| option.to_string()).collect(),
                votes: HashMap::new(),
                creator: creator.clone(),
                created_at: now,
            },
        );
        info!(channel_id = channel.0, poll = name, "Poll created");

        Ok(())
    }

    #[instrument(level = "debug", skip(self, voter))]
    pub fn vote(
        &self,
        channel: ChannelId,
        name: &str,
        option: &str,
        voter: UserId,
    ) -> Result<VoteOutcome, PollError> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let poll = channels
            .get_mut(&channel)
            .and_then(|polls| polls.get_mut(name))
            .ok_or_else(|| PollError::NoSuchPoll {
                name: name.to_string(),
            })?;
        let chosen = poll
            .options
            .iter()
            .position(|candidate| candidate == option)
            .ok_or_else(|| PollError::NoSuchOption {
                poll: name.to_string(),
                option: option.to_string(),
            })?;

        Ok(match poll.votes.insert(voter, chosen) {
            None => VoteOutcome::Cast,
            Some(previous) if previous == chosen => VoteOutcome::Unchanged,
            Some(previous) => VoteOutcome::Changed {
                previous: poll.options[previous].clone(),
            },
        })
    }

    pub fn status(&self, channel: ChannelId, name: Option<&str>) -> Result<PollStatus, PollError> {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let polls = channels.get(&channel);

        match name {
            Some(name) => polls
                .and_then(|polls| polls.get(name))
                .map(|poll| PollStatus::Single(tally(name, poll)))
                .ok_or_else(|| PollError::NoSuchPoll {
                    name: name.to_string(),
                }),
            None => {
                let overview: Vec<_> = polls
                    .into_iter()
                    .flatten()
                    .map(|(name, poll)| (name.clone(), poll.votes.len()))
                    .collect();
                if overview.is_empty() {
                    return Err(PollError::NoPolls);
                }
                Ok(PollStatus::Overview(overview))
            }
        }
    }

    /// Closes the poll and returns its final tally.
    #[instrument(level = "debug", skip(self, requester))]
    pub fn end(
        &self,
        channel: ChannelId,
        name: &str,
        requester: UserId,
        now: DateTime<Utc>,
    ) -> Result<Tally, PollError> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let polls = channels
            .get_mut(&channel)
            .ok_or_else(|| PollError::NoSuchPoll {
                name: name.to_string(),
            })?;
        let poll = polls.get(name).ok_or_else(|| PollError::NoSuchPoll {
            name: name.to_string(),
        })?;

        let open_to_everyone = poll.created_at + creator_grace_period();
        if requester != poll.creator.id && now < open_to_everyone {
            return Err(PollError::NotCreator {
                name: name.to_string(),
                creator: poll.creator.display_name.clone(),
                remaining: open_to_everyone - now,
            });
        }

        let tally = tally(name, poll);
        polls.remove(name);
        info!(channel_id = channel.0, poll = name, "Poll ended");

        Ok(tally)
    }
}

fn tally(name: &str, poll: &Poll) -> Tally {
    let mut counts: Vec<(String, usize)> = poll
        .options
        .iter()
        .map(|option| (option.clone(), 0))
        .collect();
    for &chosen in poll.votes.values() {
        counts[chosen].1 += 1;
    }
    Tally {
        name: name.to_string(),
        creator: poll.creator.display_name.clone(),
        counts,
    }
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("`{item}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const CHANNEL: ChannelId = ChannelId(1);

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::minutes(minutes)
    }

    fn author(id: u64, name: &str) -> Author {
        Author {
            id: UserId(id),
            display_name: name.to_string(),
        }
    }

    fn store_with_lunch_poll() -> PollStore {
        let store = PollStore::new();
        store
            .create(CHANNEL, "lunch", &["pizza", "sushi"], &author(1, "alice"), at(0))
            .unwrap();
        store
    }

    #[test]
    fn votes_are_cast_changed_and_tallied() {
        let store = store_with_lunch_poll();

        assert_eq!(store.vote(CHANNEL, "lunch", "pizza", UserId(2)), Ok(VoteOutcome::Cast));
        assert_eq!(store.vote(CHANNEL, "lunch", "pizza", UserId(2)), Ok(VoteOutcome::Unchanged));
        assert_eq!(
            store.vote(CHANNEL, "lunch", "sushi", UserId(2)),
            Ok(VoteOutcome::Changed {
                previous: "pizza".into()
            })
        );
        store.vote(CHANNEL, "lunch", "sushi", UserId(3)).unwrap();

        let PollStatus::Single(tally) = store.status(CHANNEL, Some("lunch")).unwrap() else {
            panic!("expected a single tally");
        };
        assert_eq!(tally.counts, vec![("pizza".into(), 0), ("sushi".into(), 2)]);
        assert_eq!(tally.total(), 2);
        assert_eq!(tally.leaders(), vec!["sushi"]);
    }

    #[test]
    fn polls_are_scoped_per_channel() {
        let store = store_with_lunch_poll();
        assert_eq!(
            store.vote(ChannelId(2), "lunch", "pizza", UserId(2)),
            Err(PollError::NoSuchPoll {
                name: "lunch".into()
            })
        );
        store
            .create(ChannelId(2), "lunch", &["tea", "coffee"], &author(2, "bob"), at(0))
            .unwrap();
    }

    #[test]
    fn create_rejects_duplicates_and_repeated_options() {
        let store = store_with_lunch_poll();
        assert_eq!(
            store
                .create(CHANNEL, "lunch", &["a", "b"], &author(2, "bob"), at(1))
                .unwrap_err()
                .to_string(),
            "A poll is already ongoing with the same name having the following options: `pizza`, `sushi`."
        );
        assert_eq!(
            store.create(CHANNEL, "other", &["a", "a"], &author(2, "bob"), at(1)),
            Err(PollError::NonUniqueOptions)
        );
        let many: Vec<String> = (0..21).map(|i| i.to_string()).collect();
        let many: Vec<&str> = many.iter().map(String::as_str).collect();
        assert_eq!(
            store.create(CHANNEL, "big", &many, &author(2, "bob"), at(1)),
            Err(PollError::TooManyOptions { limit: 20 })
        );
    }

    #[test]
    fn unknown_option_is_reported() {
        let store = store_with_lunch_poll();
        assert_eq!(
            store
                .vote(CHANNEL, "lunch", "tacos", UserId(2))
                .unwrap_err()
                .to_string(),
            "No option `tacos` exists on poll `lunch`."
        );
    }

    #[test]
    fn only_creator_can_end_during_grace_period() {
        let store = store_with_lunch_poll();

        let error = store.end(CHANNEL, "lunch", UserId(2), at(4)).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Only alice can end poll `lunch` during the next 6m 0s."
        );

        assert!(store.end(CHANNEL, "lunch", UserId(1), at(4)).is_ok());
        assert!(matches!(
            store.status(CHANNEL, None),
            Err(PollError::NoPolls)
        ));
    }

    #[test]
    fn anyone_can_end_after_grace_period() {
        let store = store_with_lunch_poll();
        store.vote(CHANNEL, "lunch", "pizza", UserId(3)).unwrap();
        let tally = store.end(CHANNEL, "lunch", UserId(2), at(10)).unwrap();
        assert_eq!(tally.leaders(), vec!["pizza"]);
    }

    #[test]
    fn overview_counts_voters_per_poll() {
        let store = store_with_lunch_poll();
        store.vote(CHANNEL, "lunch", "pizza", UserId(3)).unwrap();
        assert_eq!(
            store.status(CHANNEL, None),
            Ok(PollStatus::Overview(vec![("lunch".into(), 1)]))
        );
    }
}
