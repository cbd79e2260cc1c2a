//! # DACert Structural Validation
//!
//! Checks the internal consistency of a Decentralized Attestation
//! Certificate before it is presented as trustworthy.
//!
//! ## Validation Rules (strict order, short-circuiting)
//!
//! 1. No certificate attached → [`VerificationVerdict::Absent`]. Not an
//!    error: not every query requests one.
//! 2. `signers` and `signatures` must have equal length →
//!    `signature-count-mismatch`.
//! 3. `1 <= quorum <= signers.len()` → `invalid-quorum`.
//! 4. No duplicate signer identifiers → `duplicate-signer`. A repeated
//!    signer would let one party satisfy quorum twice.
//!
//! ## What This Does NOT Check
//!
//! Signatures are not verified against signer public keys and
//! `output_hash` is not recomputed from the output. A
//! `StructurallyValid` verdict means "internally consistent", not
//! "cryptographically proven". A deployment that needs the stronger
//! guarantee must add an explicit verification step on top.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use parallax_common::DACert;

// ════════════════════════════════════════════════════════════════════════════
// VERDICT TYPES
// ════════════════════════════════════════════════════════════════════════════

/// Why a certificate failed structural validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MalformedReason {
    /// `signatures` is not aligned 1:1 with `signers`.
    SignatureCountMismatch,
    /// `quorum` is zero or exceeds the signer count.
    InvalidQuorum,
    /// A signer identifier appears more than once.
    DuplicateSigner,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MalformedReason::SignatureCountMismatch => "signature-count-mismatch",
            MalformedReason::InvalidQuorum => "invalid-quorum",
            MalformedReason::DuplicateSigner => "duplicate-signer",
        };
        f.write_str(s)
    }
}

/// Trust verdict stamped on each result before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerificationVerdict {
    /// No certificate was attached.
    Absent,
    /// The certificate is internally consistent (cardinalities, quorum
    /// bounds, signer uniqueness). Not a cryptographic proof.
    StructurallyValid,
    /// The certificate fails a structural rule.
    Malformed(MalformedReason),
}

impl VerificationVerdict {
    /// `true` only for [`VerificationVerdict::StructurallyValid`].
    #[inline]
    pub fn is_trusted(&self) -> bool {
        matches!(self, VerificationVerdict::StructurallyValid)
    }
}

impl fmt::Display for VerificationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationVerdict::Absent => f.write_str("no certificate"),
            VerificationVerdict::StructurallyValid => f.write_str("structurally valid"),
            VerificationVerdict::Malformed(reason) => write!(f, "malformed ({})", reason),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// VALIDATION
// ════════════════════════════════════════════════════════════════════════════

/// Validate the structural integrity of an optional certificate.
///
/// Rules are applied in order and short-circuit on the first failure;
/// see the module docs for the exact sequence.
pub fn validate(cert: Option<&DACert>) -> VerificationVerdict {
    let cert = match cert {
        Some(c) => c,
        None => return VerificationVerdict::Absent,
    };

    if cert.signers.len() != cert.signatures.len() {
        return VerificationVerdict::Malformed(MalformedReason::SignatureCountMismatch);
    }

    if cert.quorum < 1 || cert.quorum as usize > cert.signers.len() {
        return VerificationVerdict::Malformed(MalformedReason::InvalidQuorum);
    }

    let mut seen = HashSet::with_capacity(cert.signers.len());
    for signer in &cert.signers {
        if !seen.insert(signer.as_str()) {
            return VerificationVerdict::Malformed(MalformedReason::DuplicateSigner);
        }
    }

    VerificationVerdict::StructurallyValid
}

// ════════════════════════════════════════════════════════════════════════════
// TESTS
// ════════════════════════════════════════════════════════════════════════════
