//! Convenience surface over [`Signal`](crate::Signal) for plain listeners and async waiting.

pub mod subscribe;
#[cfg(feature = "tokio")]
pub mod wait;

pub use subscribe::*;
#[cfg(feature = "tokio")]
pub use wait::*;
