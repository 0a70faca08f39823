//! Concrete [`RecordBackend`](super::backend::RecordBackend) implementations.

pub mod local;
pub mod null;
pub mod remote;

pub use local::LocalBackend;
pub use null::NullBackend;
pub use remote::RemoteBackend;
