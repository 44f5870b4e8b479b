//! Canonical address rendering.
//!
//! Contracts, RPC nodes and the price index disagree on hex casing
//! (EIP-55 checksums vs. lower case). Everything the monitor compares or
//! emits goes through these helpers so that only the lower-case form is
//! ever observed.

use alloy::primitives::Address;

/// Lower-case `0x`-prefixed hex form of an address.
#[must_use]
pub fn canonical(address: &Address) -> String {
    format!("{address:#x}")
}

/// Case-insensitive equality of two hex address strings.
#[must_use]
pub fn same_address(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}
