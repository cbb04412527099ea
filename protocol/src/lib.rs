// Copyright (c) 2026 Quill Labs. MIT License.
// See LICENSE for details.

//! # QUILL Protocol — Core Primitives
//!
//! QUILL lets multiple parties co-sign an immutable document reference on
//! a shared ledger without every signer having to submit a transaction
//! themselves. This crate is the cryptographic foundation: everything a
//! wallet, relayer, or registry needs to agree — byte for byte — on what
//! was signed.
//!
//! ## Architecture
//!
//! - **crypto** — Keccak-256 hashing, secp256k1 keypairs, 20-byte ledger
//!   addresses, and recoverable ECDSA signatures. Don't roll your own.
//! - **typed_data** — the structured-data codec: ordered schemas,
//!   domain-separated messages, and the canonical V4 digest.
//! - **config** — every protocol constant, in one place, on purpose.
//!
//! The registry state machines (documents, profiles, nonces) live in the
//! sibling `quill-contracts` crate; this crate holds no state at all.
//!
//! ## Design Philosophy
//!
//! 1. Digests are consensus-critical: deterministic, versioned, pinned
//!    by test vectors. Any divergence breaks every signature downstream.
//! 2. Authorization is recovery-based — "who signed this?" rather than
//!    "did X sign this?" — because that is what makes relaying possible.
//! 3. No unsafe code in crypto paths. We sleep at night.

pub mod config;
pub mod crypto;
pub mod typed_data;
