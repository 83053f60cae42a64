//! doe-core: value types shared by the channel-flow DOE crates.
//!
//! - [`ChannelClass`] and [`ChannelPair`] for per-channel results
//! - finite and range checks on [`Real`] inputs

pub mod channel;
pub mod error;
pub mod numeric;

pub use channel::{ChannelClass, ChannelPair};
pub use error::{CoreError, CoreResult};
pub use numeric::*;
