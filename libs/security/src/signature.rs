use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

/// Header carrying the base64 HMAC-SHA256 of the request body.
pub const LINE_SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid hmac key")]
    InvalidKey,
}

/// Base64 HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(body: &[u8], secret: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(B64.encode(mac.finalize().into_bytes()))
}

/// Constant-time check of `signature_header` against the body's signature.
///
/// Any mismatch, including a length difference or an empty header, is `false`.
///
/// ```
/// let body = br#"{"events":[]}"#;
/// let sig = fortune_security::sign(body, b"secret").unwrap();
/// assert!(fortune_security::verify(body, &sig, b"secret"));
/// assert!(!fortune_security::verify(body, &sig, b"other"));
/// ```
pub fn verify(body: &[u8], signature_header: &str, secret: &[u8]) -> bool {
    if signature_header.is_empty() {
        return false;
    }
    match sign(body, secret) {
        Ok(expected) => expected
            .as_bytes()
            .ct_eq(signature_header.as_bytes())
            .into(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    fn random_secret() -> Vec<u8> {
        let mut buf = vec![0u8; 32];
        rand::rng().fill_bytes(&mut buf);
        buf
    }

    #[test]
    fn accepts_matching_signature() {
        let secret = random_secret();
        let body = br#"{"destination":"U0","events":[]}"#;
        let sig = sign(body, &secret).unwrap();
        assert!(verify(body, &sig, &secret));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2, base64 encoded.
        let sig = sign(b"what do ya want for nothing?", b"Jefe").unwrap();
        assert_eq!(sig, "W9zBRr9gdU5qBCQmCJV1x1oAPwidJzmDnexYuWTsOEM=");
    }

    #[test]
    fn rejects_single_byte_tamper() {
        let secret = random_secret();
        let body = br#"{"events":[{"type":"message"}]}"#.to_vec();
        let sig = sign(&body, &secret).unwrap();
        for idx in 0..body.len() {
            let mut tampered = body.clone();
            tampered[idx] ^= 0x01;
            assert!(!verify(&tampered, &sig, &secret), "byte {idx} tamper accepted");
        }
    }

    #[test]
    fn rejects_wrong_length_and_empty_headers() {
        let secret = random_secret();
        let body = b"payload";
        let sig = sign(body, &secret).unwrap();
        assert!(!verify(body, "", &secret));
        assert!(!verify(body, &sig[..sig.len() - 1], &secret));
        assert!(!verify(body, &format!("{sig}A"), &secret));
        assert!(!verify(body, "not base64 at all", &secret));
    }
}
