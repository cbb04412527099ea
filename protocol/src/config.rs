//! # Protocol Configuration & Constants
//!
//! Every magic number in QUILL lives here. If you're hardcoding a constant
//! somewhere else, you're doing it wrong and you owe the team coffee.
//!
//! Several of these values are digest inputs — the canonical type strings
//! below are hashed into every signature the protocol ever verifies.
//! Changing one after documents exist on a ledger invalidates every
//! outstanding signature, so choose wisely during devnet.

// ---------------------------------------------------------------------------
// Ledger Identifiers
// ---------------------------------------------------------------------------

/// Ethereum mainnet. The real deal — mistakes here cost real money.
pub const LEDGER_ID_MAINNET: u64 = 1;

/// Sepolia testnet — where we break things on purpose and call it "testing."
pub const LEDGER_ID_SEPOLIA: u64 = 11_155_111;

/// Local development ledger (the Hardhat/Anvil default). Reset at will,
/// no promises, no survivors.
pub const LEDGER_ID_DEVNET: u64 = 31_337;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 ECDSA — chosen not for elegance but for recovery. The entire
/// meta-transaction path depends on deriving the signer's address from
/// (digest, signature) alone, which Ed25519 cannot do.
pub const SIGNING_ALGORITHM: &str = "secp256k1-ECDSA";

/// Secret key length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Digest length in bytes. Everything signed in QUILL is a 32-byte
/// Keccak-256 output.
pub const DIGEST_LENGTH: usize = 32;

/// Ledger address length in bytes — the trailing 20 bytes of the
/// Keccak-256 hash of the uncompressed public key.
pub const ADDRESS_LENGTH: usize = 20;

/// Packed recoverable signature length: r (32) || s (32) || v (1).
/// If yours isn't 65 bytes, something has gone terribly wrong.
pub const SIGNATURE_LENGTH: usize = 65;

// ---------------------------------------------------------------------------
// Typed-Data Encoding
// ---------------------------------------------------------------------------

/// The two-byte prefix of every typed-data digest: `0x19` (non-RLP marker)
/// followed by `0x01` (structured-data version). Wallets refuse to sign
/// raw transactions that start with these bytes, which is the whole point —
/// a typed-data signature can never be replayed as a transaction.
pub const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Name of the domain-separator struct merged into every typed message.
pub const DOMAIN_TYPE_NAME: &str = "EIP712Domain";

/// Canonical encoding of the domain-separator type. Part of every digest.
pub const DOMAIN_TYPE: &str = "EIP712Domain(uint256 chainId,address verifyingContract)";

// ---------------------------------------------------------------------------
// Action Schemas
// ---------------------------------------------------------------------------

/// Primary type name for the document-signing meta-action.
pub const SIGN_DOCUMENT_TYPE_NAME: &str = "SignDocument";

/// Primary type name for the signature-revocation meta-action. Distinct
/// from [`SIGN_DOCUMENT_TYPE_NAME`] so a signature over one action can
/// never authorize the other.
pub const REVOKE_SIGNATURE_TYPE_NAME: &str = "RevokeDocumentSignature";

/// Primary type name for the KYC signer-profile payload.
pub const SIGNER_PROFILE_TYPE_NAME: &str = "SignerProfile";

/// The fixed, ordered field list of the signer profile. Order is part of
/// the hash input — do not reorder, do not append in the middle.
pub const SIGNER_PROFILE_FIELDS: [&str; 7] = [
    "name",
    "address",
    "govID",
    "ethereumAddress",
    "organizationName",
    "organizationAddress",
    "organizationID",
];
