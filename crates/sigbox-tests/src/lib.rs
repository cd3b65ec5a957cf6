//! End-to-end payment scenario tests for Sigbox.
//!
//! Integration tests under `tests/` drive the full flow: derive keys from
//! entropy, fund boxes, build payments, prove, encode and verify.

pub mod helpers;
