//! HMAC-SHA256 signing and verification.
//!
//! `Signature = Base64(HMAC-SHA256(ClientSecret, StringToSign))`, using the
//! standard alphabet with padding and no line wrapping.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies strings to sign.
///
/// Stateless and immutable; one instance is built per verifier and shared by
/// all requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSigner;

impl HmacSigner {
    /// Create a new signer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compute the base64-encoded HMAC-SHA256 of `string_to_sign`.
    #[must_use]
    pub fn sign(&self, secret: &[u8], string_to_sign: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can accept any key length");
        mac.update(string_to_sign);
        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Check `candidate` against the expected signature in constant time.
    #[must_use]
    pub fn verify(&self, candidate: &str, secret: &[u8], string_to_sign: &[u8]) -> bool {
        let expected = self.sign(secret, string_to_sign);
        candidate.as_bytes().ct_eq(expected.as_bytes()).into()
    }
}

/// Compute the signature for `string_to_sign` with the default signer.
///
/// # Examples
///
/// ```
/// use tfg_auth::signer::sign;
///
/// assert_eq!(sign(b"secret", b"data"), "GywWt1vSqHDBFBU8zaW8/KYzFLxyL6Fg1pDeEzzLuds=");
/// ```
#[must_use]
pub fn sign(secret: &[u8], string_to_sign: &[u8]) -> String {
    HmacSigner.sign(secret, string_to_sign)
}

/// Verify `candidate` with the default signer.
#[must_use]
pub fn verify(candidate: &str, secret: &[u8], string_to_sign: &[u8]) -> bool {
    HmacSigner.verify(candidate, secret, string_to_sign)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRING_TO_SIGN: &[u8] =
        b"GET\nfake_client\n1371211200\nhttp://example.org/signature/test.json\n";

    #[test]
    fn test_should_match_known_signature() {
        assert_eq!(
            sign(b"my-shared-secret", STRING_TO_SIGN),
            "EDs81ljsXNbd3xKDGwdAfFvdN0tCV5NLDYQIZHEshLU="
        );
    }

    #[test]
    fn test_should_match_known_signature_with_body() {
        let sts = b"POST\nfake_client\n1371211200\nhttp://example.org/signature/test.json\nmybodydata";
        assert_eq!(
            sign(b"my-shared-secret", sts),
            "mdfTxJ/1LSRk3k0CJC4eYf/sGpnhWpGJMrttGtnJHlg="
        );
    }

    #[test]
    fn test_should_produce_single_line_padded_base64() {
        let sig = sign(b"my-shared-secret", STRING_TO_SIGN);
        assert_eq!(sig.len(), 44);
        assert!(sig.ends_with('='));
        assert!(!sig.contains('\n'));
    }

    #[test]
    fn test_should_verify_matching_signature() {
        let sig = sign(b"my-shared-secret", STRING_TO_SIGN);
        assert!(verify(&sig, b"my-shared-secret", STRING_TO_SIGN));
    }

    #[test]
    fn test_should_reject_wrong_secret_or_tampered_input() {
        let sig = sign(b"my-shared-secret", STRING_TO_SIGN);
        assert!(!verify(&sig, b"other-secret", STRING_TO_SIGN));
        assert!(!verify(&sig, b"my-shared-secret", b"GET\nfake_client\n"));
        assert!(!verify(&sig[..43], b"my-shared-secret", STRING_TO_SIGN));
        assert!(!verify("", b"my-shared-secret", STRING_TO_SIGN));
    }

    #[test]
    fn test_should_accept_empty_secret() {
        let sig = sign(b"", STRING_TO_SIGN);
        assert!(verify(&sig, b"", STRING_TO_SIGN));
    }
}
