//! `CouponVault` store: dual-backend record store with optimistic
//! mutations and realtime convergence.
//!
//! The model, query engine, and aggregator live in `couponvault-core`;
//! this crate owns persistence, the mutation pipeline, and the change-feed
//! merger. Entry point: [`store::CouponStore`].

pub mod store;

pub use store::{
    BackendMode, ChangeEvent, CouponStore, Identity, IdentitySignal, KeyValueStore,
    MemoryKeyValueStore, MemoryRemoteTable, RemoteTable, StoreConfig,
};
