//! COSE structures used by CIP-8 message signing
//!
//! Reference: RFC 9052 (COSE_Sign1, Sig_structure) and RFC 9053 (OKP keys)

mod key;
mod sign1;

pub use key::{PublicKey, extract_public_key, labels};
pub use sign1::{CoseSign1, SIG_STRUCTURE_CONTEXT_SIGNATURE1, create_sig_structure, parse_cose_sign1};
