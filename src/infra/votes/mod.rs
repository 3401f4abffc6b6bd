#[cfg(test)]
pub mod in_memory;
pub mod sqlite_vote_store;

#[cfg(test)]
pub use in_memory::InMemoryVoteStore;
pub use sqlite_vote_store::SqliteVoteStore;
