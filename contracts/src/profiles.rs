//! # Profile Registry
//!
//! KYC profile attestation under a dual-signature protocol. A profile
//! binds an identity payload (off-ledger; only its content hash appears
//! here) to a ledger address, and becomes valid only when two parties
//! have independently signed that same hash:
//!
//! - the **profile owner**, attesting "this is my data", and
//! - an accredited **validator**, attesting "I reviewed it".
//!
//! Neither signature alone registers anything. The validator set itself
//! is managed by a single registry owner fixed at construction — an
//! explicit stored address checked on every privileged call, not an
//! ambient global.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;
use tracing::info;

use quill_protocol::crypto::{
    recover_address, ContentHash, LedgerAddress, RecoverableSignature, SignatureError,
};

use crate::events::RegistryEvent;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The caller is not the registry owner. Validator management is the
    /// owner's exclusive privilege.
    #[error("{caller} is not the registry owner")]
    NotOwner { caller: LedgerAddress },

    /// The caller is not an accredited validator.
    #[error("{caller} is not a registered validator")]
    NotAValidator { caller: LedgerAddress },

    /// The owner address already has a profile. Profiles are created at
    /// most once per address, regardless of payload.
    #[error("profile already exists for {owner}")]
    AlreadyExists { owner: LedgerAddress },

    /// The owner signature does not recover to the profile owner.
    #[error("owner signature does not recover to {owner}")]
    InvalidOwnerSignature { owner: LedgerAddress },

    /// The validator signature does not recover to the calling validator.
    #[error("validator signature does not recover to {validator}")]
    InvalidValidatorSignature { validator: LedgerAddress },

    /// One of the signatures is structurally invalid.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A registered profile: the content hash plus both attestations.
///
/// The registry stores the signatures themselves, not just the fact of
/// verification, so any later reader can re-verify the attestation chain
/// from the record alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// The address this profile describes.
    pub owner: LedgerAddress,
    /// Digest of the off-ledger profile payload.
    pub content_hash: ContentHash,
    /// The owner's signature over `content_hash`.
    pub owner_signature: RecoverableSignature,
    /// The reviewing validator's signature over the same hash.
    pub validator_signature: RecoverableSignature,
    /// The validator that submitted the registration.
    pub registered_by: LedgerAddress,
    /// When the registration was recorded.
    pub registered_at: chrono::DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ProfileRegistry
// ---------------------------------------------------------------------------

/// The KYC profile registry: validator set plus registered profiles.
#[derive(Debug)]
pub struct ProfileRegistry {
    /// The privileged address allowed to manage the validator set.
    owner: LedgerAddress,
    validators: BTreeSet<LedgerAddress>,
    profiles: HashMap<LedgerAddress, Profile>,
    journal: Vec<RegistryEvent>,
}

impl ProfileRegistry {
    /// Create an empty registry owned by `owner`.
    pub fn new(owner: LedgerAddress) -> Self {
        Self {
            owner,
            validators: BTreeSet::new(),
            profiles: HashMap::new(),
            journal: Vec::new(),
        }
    }

    /// The registry owner fixed at construction.
    pub fn owner(&self) -> &LedgerAddress {
        &self.owner
    }

    /// Whether `address` is currently an accredited validator.
    pub fn is_validator(&self, address: &LedgerAddress) -> bool {
        self.validators.contains(address)
    }

    /// The profile registered for `owner`, if any.
    pub fn profile(&self, owner: &LedgerAddress) -> Option<&Profile> {
        self.profiles.get(owner)
    }

    /// Every event this registry has emitted, in emission order.
    pub fn events(&self) -> &[RegistryEvent] {
        &self.journal
    }

    // -- validator management -----------------------------------------------

    /// Grant validator rights to `validator`. Owner-only; idempotent —
    /// re-adding an existing validator succeeds and re-emits the event.
    pub fn register_validator(
        &mut self,
        caller: LedgerAddress,
        validator: LedgerAddress,
    ) -> Result<RegistryEvent, ProfileError> {
        self.require_owner(caller)?;
        self.validators.insert(validator);
        info!(%validator, "validator registered");
        Ok(self.emit(RegistryEvent::ValidatorRegistered { validator }))
    }

    /// Withdraw validator rights from `validator`. Owner-only; idempotent.
    /// Profiles the validator has already attested remain valid — the
    /// attestation was checked at registration time.
    pub fn unregister_validator(
        &mut self,
        caller: LedgerAddress,
        validator: LedgerAddress,
    ) -> Result<RegistryEvent, ProfileError> {
        self.require_owner(caller)?;
        self.validators.remove(&validator);
        info!(%validator, "validator unregistered");
        Ok(self.emit(RegistryEvent::ValidatorUnregistered { validator }))
    }

    // -- registration -------------------------------------------------------

    /// Register a profile for `owner` under dual attestation.
    ///
    /// `caller` must be an accredited validator. Both signatures are
    /// verified independently over the same `content_hash`: the owner's
    /// must recover to `owner`, the validator's to `caller`. The checks
    /// are ordered cheapest-first — role, then state, then cryptography —
    /// and nothing is written until all of them pass.
    ///
    /// # Errors
    ///
    /// [`ProfileError::NotAValidator`], [`ProfileError::AlreadyExists`],
    /// [`ProfileError::Signature`] for malformed signature bytes, and
    /// [`ProfileError::InvalidOwnerSignature`] /
    /// [`ProfileError::InvalidValidatorSignature`] identifying exactly
    /// which attestation failed.
    pub fn register_profile(
        &mut self,
        caller: LedgerAddress,
        owner: LedgerAddress,
        content_hash: ContentHash,
        owner_signature: RecoverableSignature,
        validator_signature: RecoverableSignature,
    ) -> Result<RegistryEvent, ProfileError> {
        if !self.is_validator(&caller) {
            return Err(ProfileError::NotAValidator { caller });
        }
        if self.profiles.contains_key(&owner) {
            return Err(ProfileError::AlreadyExists { owner });
        }

        let recovered_owner = recover_address(content_hash.as_bytes(), &owner_signature)?;
        if recovered_owner != owner {
            return Err(ProfileError::InvalidOwnerSignature { owner });
        }
        let recovered_validator = recover_address(content_hash.as_bytes(), &validator_signature)?;
        if recovered_validator != caller {
            return Err(ProfileError::InvalidValidatorSignature { validator: caller });
        }

        let registered_at = Utc::now();
        self.profiles.insert(
            owner,
            Profile {
                owner,
                content_hash,
                owner_signature,
                validator_signature,
                registered_by: caller,
                registered_at,
            },
        );
        info!(%owner, validator = %caller, %content_hash, "profile registered");
        Ok(self.emit(RegistryEvent::ProfileAdded {
            owner,
            validator: caller,
            content_hash,
            owner_signature,
            validator_signature,
            registered_at,
        }))
    }

    // -- internals ----------------------------------------------------------

    fn require_owner(&self, caller: LedgerAddress) -> Result<(), ProfileError> {
        if caller != self.owner {
            return Err(ProfileError::NotOwner { caller });
        }
        Ok(())
    }

    fn emit(&mut self, event: RegistryEvent) -> RegistryEvent {
        self.journal.push(event.clone());
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_protocol::crypto::QuillKeypair;

    struct Fixture {
        registry: ProfileRegistry,
        admin: LedgerAddress,
        validator: QuillKeypair,
        holder: QuillKeypair,
    }

    fn fixture() -> Fixture {
        let admin = LedgerAddress::new([0xad; 20]);
        let validator = QuillKeypair::generate();
        let holder = QuillKeypair::generate();
        let mut registry = ProfileRegistry::new(admin);
        registry
            .register_validator(admin, validator.address())
            .unwrap();
        Fixture {
            registry,
            admin,
            validator,
            holder,
        }
    }

    fn content() -> ContentHash {
        ContentHash::digest(b"profile payload digest input")
    }

    #[test]
    fn owner_manages_validator_set() {
        let mut f = fixture();
        let extra = LedgerAddress::new([0x01; 20]);
        assert!(!f.registry.is_validator(&extra));

        f.registry.register_validator(f.admin, extra).unwrap();
        assert!(f.registry.is_validator(&extra));

        f.registry.unregister_validator(f.admin, extra).unwrap();
        assert!(!f.registry.is_validator(&extra));
    }

    #[test]
    fn non_owner_cannot_manage_validators() {
        let mut f = fixture();
        let intruder = LedgerAddress::new([0x66; 20]);
        assert!(matches!(
            f.registry.register_validator(intruder, intruder),
            Err(ProfileError::NotOwner { .. })
        ));
        assert!(matches!(
            f.registry
                .unregister_validator(intruder, f.validator.address()),
            Err(ProfileError::NotOwner { .. })
        ));
    }

    #[test]
    fn validator_registration_is_idempotent() {
        let mut f = fixture();
        let again = f
            .registry
            .register_validator(f.admin, f.validator.address());
        assert!(again.is_ok());
        assert!(f.registry.is_validator(&f.validator.address()));
    }

    #[test]
    fn dual_signature_registration_succeeds() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();

        let event = f
            .registry
            .register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                validator_sig,
            )
            .unwrap();

        match event {
            RegistryEvent::ProfileAdded {
                owner, validator, ..
            } => {
                assert_eq!(owner, f.holder.address());
                assert_eq!(validator, f.validator.address());
            }
            other => panic!("unexpected event {:?}", other),
        }

        let profile = f.registry.profile(&f.holder.address()).unwrap();
        assert_eq!(profile.content_hash, content());
        assert_eq!(profile.registered_by, f.validator.address());
    }

    #[test]
    fn non_validator_cannot_register() {
        let mut f = fixture();
        let outsider = QuillKeypair::generate();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let outsider_sig = outsider.sign_prehash(content().as_bytes()).unwrap();

        assert!(matches!(
            f.registry.register_profile(
                outsider.address(),
                f.holder.address(),
                content(),
                owner_sig,
                outsider_sig,
            ),
            Err(ProfileError::NotAValidator { .. })
        ));
    }

    #[test]
    fn swapped_signatures_fail_with_specific_errors() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();

        // Validator's signature in the owner slot: the owner check is the
        // one that must fail, by name.
        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                validator_sig,
                validator_sig,
            ),
            Err(ProfileError::InvalidOwnerSignature { .. })
        ));

        // Owner's signature in the validator slot: owner check passes,
        // validator check fails.
        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                owner_sig,
            ),
            Err(ProfileError::InvalidValidatorSignature { .. })
        ));
    }

    #[test]
    fn third_party_signature_fails_for_its_slot() {
        let mut f = fixture();
        let stranger = QuillKeypair::generate();
        let stranger_sig = stranger.sign_prehash(content().as_bytes()).unwrap();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();

        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                stranger_sig,
                validator_sig,
            ),
            Err(ProfileError::InvalidOwnerSignature { .. })
        ));
        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                stranger_sig,
            ),
            Err(ProfileError::InvalidValidatorSignature { .. })
        ));
    }

    #[test]
    fn reregistration_is_rejected_regardless_of_payload() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();
        f.registry
            .register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                validator_sig,
            )
            .unwrap();

        // Different payload, freshly signed by everyone: still rejected.
        let other = ContentHash::digest(b"entirely new payload");
        let owner_sig2 = f.holder.sign_prehash(other.as_bytes()).unwrap();
        let validator_sig2 = f.validator.sign_prehash(other.as_bytes()).unwrap();
        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                f.holder.address(),
                other,
                owner_sig2,
                validator_sig2,
            ),
            Err(ProfileError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn unregistered_validator_loses_rights_but_profiles_remain() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();
        f.registry
            .register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                validator_sig,
            )
            .unwrap();

        f.registry
            .unregister_validator(f.admin, f.validator.address())
            .unwrap();
        assert!(f.registry.profile(&f.holder.address()).is_some());

        // But the demoted validator cannot register anything new.
        let next = QuillKeypair::generate();
        let next_hash = ContentHash::digest(b"next");
        let sig_a = next.sign_prehash(next_hash.as_bytes()).unwrap();
        let sig_b = f.validator.sign_prehash(next_hash.as_bytes()).unwrap();
        assert!(matches!(
            f.registry.register_profile(
                f.validator.address(),
                next.address(),
                next_hash,
                sig_a,
                sig_b,
            ),
            Err(ProfileError::NotAValidator { .. })
        ));
    }

    #[test]
    fn journal_records_validator_and_profile_events() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();
        f.registry
            .register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                validator_sig,
            )
            .unwrap();

        assert_eq!(f.registry.events().len(), 2); // validator added + profile
        assert!(matches!(
            f.registry.events()[0],
            RegistryEvent::ValidatorRegistered { .. }
        ));
        assert!(matches!(
            f.registry.events()[1],
            RegistryEvent::ProfileAdded { .. }
        ));
    }

    #[test]
    fn profile_serialization_roundtrip() {
        let mut f = fixture();
        let owner_sig = f.holder.sign_prehash(content().as_bytes()).unwrap();
        let validator_sig = f.validator.sign_prehash(content().as_bytes()).unwrap();
        f.registry
            .register_profile(
                f.validator.address(),
                f.holder.address(),
                content(),
                owner_sig,
                validator_sig,
            )
            .unwrap();

        let profile = f.registry.profile(&f.holder.address()).unwrap();
        let json = serde_json::to_string(profile).unwrap();
        let restored: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(*profile, restored);
    }
}
