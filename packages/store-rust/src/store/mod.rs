//! Record store and synchronization layer.
//!
//! Layered bottom-up:
//!
//! - [`kv`] and [`remote_table`]: the two persistence seams (string
//!   key-value storage, owner-scoped relational table with a change feed).
//! - [`backend`] and [`backends`]: the uniform [`RecordBackend`] write
//!   interface and its local, remote, and null implementations.
//! - [`transaction`], [`selector`], [`feed`]: the optimistic mutation
//!   primitive, identity-driven backend selection, and the realtime merger.
//! - [`coupon_store`]: the orchestrator tying all of the above together.

pub mod backend;
pub mod backends;
pub mod config;
pub mod coupon_store;
pub mod error;
pub mod feed;
pub mod kv;
pub mod remote_table;
pub mod selector;
pub mod transaction;

pub use backend::RecordBackend;
pub use backends::{LocalBackend, NullBackend, RemoteBackend};
pub use config::StoreConfig;
pub use coupon_store::CouponStore;
pub use error::StoreError;
pub use feed::FeedSubscription;
pub use kv::{KeyValueStore, MemoryKeyValueStore};
pub use remote_table::{ChangeEvent, MemoryRemoteTable, RecordRow, RemoteTable};
pub use selector::{BackendMode, BackendSelector, Identity, IdentitySignal};
pub use transaction::{SharedList, Transaction};
