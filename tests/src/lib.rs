//! # StakeNet Core Test Suite
//!
//! Unified test crate for cross-crate behavior:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── codec.rs          # binary/JSON archive equivalence
//!     ├── lifecycle.rs      # rewards, expiry, replay determinism
//!     └── deregistration.rs # quorum voting end-to-end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sn-tests
//!
//! # By category
//! cargo test -p sn-tests integration::deregistration::
//! ```

#![allow(dead_code)]

pub mod integration;
