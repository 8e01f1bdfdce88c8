//! # Shared Types Crate
//!
//! This crate contains the domain primitives shared across the consensus-core
//! subsystems, the `Cached<T>` compute-on-demand slot used for content
//! addressing, and the `ChainLinker` boundary that supplies block-height
//! chaining to the stake registry and unlock-time checks.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-subsystem type is defined here.
//! - **No hidden state**: chain linkage and clocks are explicit objects passed
//!   to the code that needs them, never process-wide globals.

pub mod cached;
pub mod chain;
pub mod entities;

pub use cached::Cached;
pub use chain::{ChainLinker, MemoryChain};
pub use entities::*;
