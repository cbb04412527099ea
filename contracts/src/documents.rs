//! # Document Registry
//!
//! The multi-party document-signing state machine. The lifecycle is:
//!
//! 1. **Create** — anyone registers a content hash together with the set
//!    of addresses whose signatures it requires and a revocation policy.
//! 2. **Sign** — each required signer adds a signature, either directly
//!    or through a relayer carrying a typed-data authorization.
//! 3. **Revoke** — if the document's policy allows it, a signer can
//!    withdraw their signature (again directly or via relay).
//! 4. **Fully signed** — a read-time predicate: every required signer
//!    has a signature that hasn't expired at the queried ledger height.
//!
//! Documents are never deleted. Expiry is lazy: an expired signature
//! simply stops counting towards the predicate, no transition required.
//!
//! ## Execution model
//!
//! The host ledger totally orders invocations, so there is no internal
//! concurrency. What the ledger model *does* demand is atomicity per
//! invocation: every entry point runs all of its checks before its first
//! write, and the write phase cannot fail. A rejected authorized action
//! therefore never consumes the signer's nonce, and no error leaves a
//! document half-transitioned. Current ledger height is an argument
//! (`at_height`) — this registry holds no clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

use quill_protocol::crypto::{
    recover_address, ContentHash, LedgerAddress, RecoverableSignature, SignatureError,
};
use quill_protocol::typed_data::Domain;

use crate::events::RegistryEvent;
use crate::meta;
use crate::nonce::{NonceError, NonceRegistry};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during document operations.
///
/// Each variant is a stable, enumerable kind the external caller can map
/// to an actionable message (a `NonceMismatch` means "refresh and
/// resubmit"; an `AlreadySigned` means the work is already done). None
/// of them leave partial state behind.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A document with this hash has already been created. Creation is
    /// once-only; re-creation is rejected rather than silently ignored
    /// so callers can tell "already done" from "done just now".
    #[error("document already exists: {hash}")]
    AlreadyExists { hash: ContentHash },

    /// No document with this hash has been created.
    #[error("document not found: {hash}")]
    NotCreated { hash: ContentHash },

    /// The caller is not in the document's required-signer set.
    #[error("{signer} is not a required signer of {hash}")]
    NotARequiredSigner {
        hash: ContentHash,
        signer: LedgerAddress,
    },

    /// The signer already has an active signature on this document.
    #[error("{signer} has already signed {hash}")]
    AlreadySigned {
        hash: ContentHash,
        signer: LedgerAddress,
    },

    /// The signer has no signature on this document to revoke.
    #[error("{signer} has not signed {hash}")]
    NotSigned {
        hash: ContentHash,
        signer: LedgerAddress,
    },

    /// The document was created with revocation disallowed.
    #[error("document {hash} does not allow revocation")]
    RevocationNotAllowed { hash: ContentHash },

    /// The requested validity window already lies in the past.
    #[error("expired: valid until height {valid_until}, current height {at_height}")]
    Expired { valid_until: u64, at_height: u64 },

    /// The signature is well-formed but does not recover to the claimed
    /// signer. The relayer is carrying somebody else's authorization.
    #[error("signature does not recover to {signer}")]
    InvalidSignature { signer: LedgerAddress },

    /// The presented nonce is stale or premature.
    #[error(transparent)]
    Nonce(#[from] NonceError),

    /// The signature bytes themselves are invalid.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One signer's signature state on one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureEntry {
    /// Wall-clock time the signature was recorded. Informational only —
    /// expiry is decided by `valid_until`, never by this field.
    pub signed_at: DateTime<Utc>,
    /// Ledger height through which the signature remains valid.
    pub valid_until: u64,
}

impl SignatureEntry {
    /// Whether this signature still counts at the given ledger height.
    pub fn is_active(&self, at_height: u64) -> bool {
        self.valid_until >= at_height
    }
}

/// A registered document and its per-signer signature state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-supplied content digest. Opaque to the registry — hashing
    /// the underlying bytes is the off-ledger collaborator's job.
    pub hash: ContentHash,
    /// Addresses whose signatures are required, deduplicated, in first-
    /// occurrence order.
    pub required_signers: Vec<LedgerAddress>,
    /// Whether signers may revoke after signing.
    pub revocable: bool,
    /// When the document was registered.
    pub created_at: DateTime<Utc>,
    /// Active signatures keyed by signer.
    signatures: HashMap<LedgerAddress, SignatureEntry>,
}

impl Document {
    /// The signature entry for `signer`, if one exists.
    pub fn signature(&self, signer: &LedgerAddress) -> Option<&SignatureEntry> {
        self.signatures.get(signer)
    }

    /// Whether `signer` belongs to the required-signer set.
    pub fn requires(&self, signer: &LedgerAddress) -> bool {
        self.required_signers.contains(signer)
    }

    /// Whether every required signer has an active signature at the
    /// given ledger height. An empty required-signer set is vacuously
    /// fully signed.
    pub fn is_fully_signed(&self, at_height: u64) -> bool {
        self.required_signers.iter().all(|signer| {
            self.signatures
                .get(signer)
                .is_some_and(|entry| entry.is_active(at_height))
        })
    }
}

// ---------------------------------------------------------------------------
// DocumentRegistry
// ---------------------------------------------------------------------------

/// The document-signing registry: owns every document's lifecycle and
/// the replay nonces for the relayed entry points.
#[derive(Debug)]
pub struct DocumentRegistry {
    /// The domain this registry instance verifies typed-data signatures
    /// in. Fixed at construction — a signature for another domain never
    /// authorizes anything here.
    domain: Domain,
    documents: HashMap<ContentHash, Document>,
    nonces: NonceRegistry,
    journal: Vec<RegistryEvent>,
}

impl DocumentRegistry {
    /// Create an empty registry bound to the given verification domain.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            documents: HashMap::new(),
            nonces: NonceRegistry::new(),
            journal: Vec::new(),
        }
    }

    /// The registry's verification domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Look up a document by hash.
    pub fn document(&self, hash: &ContentHash) -> Option<&Document> {
        self.documents.get(hash)
    }

    /// The next nonce expected from `signer` on the authorized paths.
    pub fn nonce_of(&self, signer: &LedgerAddress) -> u64 {
        self.nonces.current(signer)
    }

    /// Every event this registry has emitted, in emission order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.journal
    }

    // -- creation -----------------------------------------------------------

    /// Register a document for co-signing.
    ///
    /// Duplicate addresses in `required_signers` are collapsed (first
    /// occurrence wins); order is otherwise irrelevant to the state
    /// machine. An empty signer set is legal — such a document is
    /// vacuously fully signed.
    ///
    /// # Errors
    ///
    /// [`DocumentError::AlreadyExists`] if the hash was created before.
    pub fn create_document(
        &mut self,
        hash: ContentHash,
        required_signers: Vec<LedgerAddress>,
        allow_revocation: bool,
    ) -> Result<RegistryEvent, DocumentError> {
        if self.documents.contains_key(&hash) {
            return Err(DocumentError::AlreadyExists { hash });
        }

        let mut deduplicated: Vec<LedgerAddress> = Vec::with_capacity(required_signers.len());
        for signer in required_signers {
            if !deduplicated.contains(&signer) {
                deduplicated.push(signer);
            }
        }

        info!(%hash, signers = deduplicated.len(), revocable = allow_revocation, "document created");

        self.documents.insert(
            hash,
            Document {
                hash,
                required_signers: deduplicated.clone(),
                revocable: allow_revocation,
                created_at: Utc::now(),
                signatures: HashMap::new(),
            },
        );
        Ok(self.emit(RegistryEvent::DocumentCreated {
            hash,
            required_signers: deduplicated,
            revocable: allow_revocation,
        }))
    }

    // -- signing ------------------------------------------------------------

    /// Add `caller`'s signature to a document, valid through
    /// `valid_until` (a ledger height), evaluated at `at_height`.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotCreated`], [`DocumentError::NotARequiredSigner`],
    /// [`DocumentError::AlreadySigned`], or [`DocumentError::Expired`]
    /// when `valid_until` already lies below `at_height`.
    pub fn sign_document(
        &mut self,
        caller: LedgerAddress,
        hash: ContentHash,
        valid_until: u64,
        at_height: u64,
    ) -> Result<RegistryEvent, DocumentError> {
        self.validate_sign(&caller, &hash, valid_until, at_height)?;
        Ok(self.commit_sign(caller, hash, valid_until))
    }

    /// Relayed variant of [`sign_document`](Self::sign_document).
    ///
    /// The transition is identical; the authorization differs. The caller
    /// (a relayer, typically) presents a typed-data signature produced by
    /// `signer` over `(signer, hash, valid_until, nonce)` under this
    /// registry's domain. The signature must recover to `signer` and the
    /// nonce must be `signer`'s current one. All checks run before any
    /// state changes: a rejection — for any reason — leaves the nonce
    /// unconsumed.
    ///
    /// # Errors
    ///
    /// Everything [`sign_document`](Self::sign_document) can return, plus
    /// [`DocumentError::Signature`] for malformed signature bytes,
    /// [`DocumentError::InvalidSignature`] when recovery yields a
    /// different address, and [`DocumentError::Nonce`] for a stale nonce.
    pub fn sign_document_authorized(
        &mut self,
        signer: LedgerAddress,
        hash: ContentHash,
        valid_until: u64,
        nonce: u64,
        signature: &RecoverableSignature,
        at_height: u64,
    ) -> Result<RegistryEvent, DocumentError> {
        let digest = meta::sign_document_digest(self.domain, signer, hash, valid_until, nonce);
        let recovered = recover_address(&digest, signature)?;
        if recovered != signer {
            return Err(DocumentError::InvalidSignature { signer });
        }
        self.nonces.expect(&signer, nonce)?;
        self.validate_sign(&signer, &hash, valid_until, at_height)?;

        // Commit phase: infallible, and only reached with every check passed.
        self.nonces.advance(&signer);
        Ok(self.commit_sign(signer, hash, valid_until))
    }

    // -- revocation ---------------------------------------------------------

    /// Withdraw `caller`'s signature from a revocable document.
    ///
    /// # Errors
    ///
    /// [`DocumentError::NotCreated`], [`DocumentError::RevocationNotAllowed`]
    /// when the document's policy forbids it, or [`DocumentError::NotSigned`]
    /// when there is nothing to revoke.
    pub fn revoke_document_signature(
        &mut self,
        caller: LedgerAddress,
        hash: ContentHash,
    ) -> Result<RegistryEvent, DocumentError> {
        self.validate_revoke(&caller, &hash)?;
        Ok(self.commit_revoke(caller, hash))
    }

    /// Relayed variant of
    /// [`revoke_document_signature`](Self::revoke_document_signature),
    /// authorized under the distinct `RevokeDocumentSignature` schema so
    /// a signing authorization can never be replayed as a revocation.
    pub fn revoke_document_signature_authorized(
        &mut self,
        signer: LedgerAddress,
        hash: ContentHash,
        nonce: u64,
        signature: &RecoverableSignature,
    ) -> Result<RegistryEvent, DocumentError> {
        let digest = meta::revoke_signature_digest(self.domain, signer, hash, nonce);
        let recovered = recover_address(&digest, signature)?;
        if recovered != signer {
            return Err(DocumentError::InvalidSignature { signer });
        }
        self.nonces.expect(&signer, nonce)?;
        self.validate_revoke(&signer, &hash)?;

        self.nonces.advance(&signer);
        Ok(self.commit_revoke(signer, hash))
    }

    // -- predicates ---------------------------------------------------------

    /// Whether every required signer of `hash` has an active signature
    /// at `at_height`.
    ///
    /// Expiry is evaluated here, lazily: a signature whose `valid_until`
    /// has passed counts as absent without any revocation transition.
    /// Returns `false` for a hash that was never created. A created
    /// document with an empty required-signer set is vacuously `true`.
    pub fn is_fully_signed(&self, hash: &ContentHash, at_height: u64) -> bool {
        self.documents
            .get(hash)
            .is_some_and(|document| document.is_fully_signed(at_height))
    }

    // -- internals ----------------------------------------------------------

    /// All preconditions of a signing transition, mutating nothing.
    fn validate_sign(
        &self,
        signer: &LedgerAddress,
        hash: &ContentHash,
        valid_until: u64,
        at_height: u64,
    ) -> Result<(), DocumentError> {
        let document = self
            .documents
            .get(hash)
            .ok_or(DocumentError::NotCreated { hash: *hash })?;
        if !document.requires(signer) {
            return Err(DocumentError::NotARequiredSigner {
                hash: *hash,
                signer: *signer,
            });
        }
        if document.signature(signer).is_some() {
            return Err(DocumentError::AlreadySigned {
                hash: *hash,
                signer: *signer,
            });
        }
        if valid_until < at_height {
            return Err(DocumentError::Expired {
                valid_until,
                at_height,
            });
        }
        Ok(())
    }

    /// Write half of a signing transition. Infallible: every precondition
    /// was checked by [`validate_sign`](Self::validate_sign).
    fn commit_sign(
        &mut self,
        signer: LedgerAddress,
        hash: ContentHash,
        valid_until: u64,
    ) -> RegistryEvent {
        if let Some(document) = self.documents.get_mut(&hash) {
            document.signatures.insert(
                signer,
                SignatureEntry {
                    signed_at: Utc::now(),
                    valid_until,
                },
            );
        }
        info!(%hash, %signer, valid_until, "document signed");
        self.emit(RegistryEvent::DocumentSigned {
            hash,
            signer,
            valid_until,
        })
    }

    /// All preconditions of a revocation, mutating nothing.
    fn validate_revoke(
        &self,
        signer: &LedgerAddress,
        hash: &ContentHash,
    ) -> Result<(), DocumentError> {
        let document = self
            .documents
            .get(hash)
            .ok_or(DocumentError::NotCreated { hash: *hash })?;
        if !document.revocable {
            return Err(DocumentError::RevocationNotAllowed { hash: *hash });
        }
        if document.signature(signer).is_none() {
            return Err(DocumentError::NotSigned {
                hash: *hash,
                signer: *signer,
            });
        }
        Ok(())
    }

    /// Write half of a revocation. Infallible after
    /// [`validate_revoke`](Self::validate_revoke).
    fn commit_revoke(&mut self, signer: LedgerAddress, hash: ContentHash) -> RegistryEvent {
        if let Some(document) = self.documents.get_mut(&hash) {
            document.signatures.remove(&signer);
        }
        info!(%hash, %signer, "document signature revoked");
        self.emit(RegistryEvent::DocumentSignatureRevoked { hash, signer })
    }

    /// Append to the journal and hand the event back to the caller.
    fn emit(&mut self, event: RegistryEvent) -> RegistryEvent {
        self.journal.push(event.clone());
        event
    }
}
