// In-memory vote store.
//
// Test double for the vote service and the router; the binary always opens
// the SQLite store. Votes are keyed by nullifier hash, so `entry` gives an
// atomic insert-if-absent.

use crate::core::votes::{Vote, VoteError, VoteStore, VoteTally};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashMap;

pub struct InMemoryVoteStore {
    /// nullifier hash -> vote
    votes: DashMap<String, Vote>,
}

impl InMemoryVoteStore {
    pub fn new() -> Self {
        Self {
            votes: DashMap::new(),
        }
    }
}

impl Default for InMemoryVoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoteStore for InMemoryVoteStore {
    async fn record_vote(&self, vote: &Vote) -> Result<bool, VoteError> {
        match self.votes.entry(vote.nullifier_hash.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(vote.clone());
                Ok(true)
            }
        }
    }

    async fn tallies(&self) -> Result<HashMap<String, VoteTally>, VoteError> {
        let mut tallies: HashMap<String, VoteTally> = HashMap::new();
        for vote in self.votes.iter() {
            let tally = tallies.entry(vote.prompt_id.clone()).or_default();
            if vote.is_upvote {
                tally.upvotes += 1;
            } else {
                tally.downvotes += 1;
            }
        }
        Ok(tallies)
    }

    async fn recent_votes(&self, limit: usize) -> Result<Vec<Vote>, VoteError> {
        let mut votes: Vec<Vote> = self.votes.iter().map(|v| v.value().clone()).collect();
        votes.sort_by(|a, b| b.cast_at.cmp(&a.cast_at));
        votes.truncate(limit);
        Ok(votes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn vote(prompt_id: &str, nullifier: &str, minutes_ago: i64) -> Vote {
        Vote {
            prompt_id: prompt_id.to_string(),
            nullifier_hash: nullifier.to_string(),
            is_upvote: true,
            voter: None,
            proof: None,
            cast_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_second_use_of_nullifier_is_refused() {
        let store = InMemoryVoteStore::new();
        assert!(store.record_vote(&vote("a", "n1", 0)).await.unwrap());
        assert!(!store.record_vote(&vote("b", "n1", 0)).await.unwrap());
        assert_eq!(store.tallies().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recent_votes_newest_first() {
        let store = InMemoryVoteStore::new();
        store.record_vote(&vote("a", "old", 30)).await.unwrap();
        store.record_vote(&vote("a", "new", 1)).await.unwrap();
        store.record_vote(&vote("a", "mid", 10)).await.unwrap();

        let recent = store.recent_votes(2).await.unwrap();
        let order: Vec<&str> = recent.iter().map(|v| v.nullifier_hash.as_str()).collect();
        assert_eq!(order, vec!["new", "mid"]);
    }
}
