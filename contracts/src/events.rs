//! Domain events emitted by the registries.
//!
//! Events are the *only* observability channel: a state-changing entry
//! point returns its event on success, and each registry keeps the
//! ordered journal of everything it has emitted. Indexers and the
//! signing UI consume these records; nothing else about registry
//! internals is promised to the outside world.
//!
//! Field order within each variant is part of the public contract —
//! external consumers match on position when decoding serialized events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use quill_protocol::crypto::{ContentHash, LedgerAddress, RecoverableSignature};

/// A structured record of one successful state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    /// A document reference was registered for co-signing.
    DocumentCreated {
        /// Content digest identifying the document.
        hash: ContentHash,
        /// The deduplicated set of addresses whose signatures are required.
        required_signers: Vec<LedgerAddress>,
        /// Whether signers may later revoke their signatures.
        revocable: bool,
    },

    /// A required signer added their signature.
    DocumentSigned {
        hash: ContentHash,
        signer: LedgerAddress,
        /// Ledger height through which the signature remains valid.
        valid_until: u64,
    },

    /// A signer withdrew a previously added signature.
    DocumentSignatureRevoked {
        hash: ContentHash,
        signer: LedgerAddress,
    },

    /// The registry owner granted validator rights to an address.
    ValidatorRegistered { validator: LedgerAddress },

    /// The registry owner withdrew validator rights from an address.
    ValidatorUnregistered { validator: LedgerAddress },

    /// A KYC profile was registered under dual attestation.
    ProfileAdded {
        owner: LedgerAddress,
        validator: LedgerAddress,
        content_hash: ContentHash,
        owner_signature: RecoverableSignature,
        validator_signature: RecoverableSignature,
        registered_at: DateTime<Utc>,
    },
}

impl fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentCreated {
                hash,
                required_signers,
                revocable,
            } => write!(
                f,
                "DocumentCreated({}, {} signer(s), revocable={})",
                hash,
                required_signers.len(),
                revocable
            ),
            Self::DocumentSigned {
                hash,
                signer,
                valid_until,
            } => write!(f, "DocumentSigned({}, {}, until height {})", hash, signer, valid_until),
            Self::DocumentSignatureRevoked { hash, signer } => {
                write!(f, "DocumentSignatureRevoked({}, {})", hash, signer)
            }
            Self::ValidatorRegistered { validator } => {
                write!(f, "ValidatorRegistered({})", validator)
            }
            Self::ValidatorUnregistered { validator } => {
                write!(f, "ValidatorUnregistered({})", validator)
            }
            Self::ProfileAdded {
                owner, validator, ..
            } => write!(f, "ProfileAdded({}, validated by {})", owner, validator),
        }
    }
}
