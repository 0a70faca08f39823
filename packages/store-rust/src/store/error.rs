//! Internal failure classification for the store.
//!
//! No error propagates out of a mutation entry point; these variants exist
//! so log lines and internal handling can distinguish a failed initial
//! load from a failed durable write.

/// A store-layer failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The initial load from the active backend failed. Non-fatal: the
    /// session continues with an empty list.
    #[error("initial load failed: {0}")]
    Load(#[source] anyhow::Error),

    /// A durable write failed after the optimistic apply. The published
    /// state is rolled back to the snapshot.
    #[error("durable write failed: {0}")]
    Write(#[source] anyhow::Error),
}
