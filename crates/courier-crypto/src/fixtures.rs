//! Fixed RSA-2048 keypairs and browser-produced payloads for tests.

pub const RECIPIENT_PKCS8: &str = include_str!("../../../testdata/recipient.pk8.b64");
pub const RECIPIENT_SPKI: &str = include_str!("../../../testdata/recipient.spki.b64");
pub const STRANGER_PKCS8: &str = include_str!("../../../testdata/stranger.pk8.b64");

/// Hybrid envelope sealed by WebCrypto against `RECIPIENT_SPKI`.
pub const WEBCRYPTO_ENVELOPE: &str = include_str!("../../../testdata/webcrypto_envelope.txt");
/// Bare RSA-OAEP ciphertext sealed by WebCrypto against `RECIPIENT_SPKI`.
pub const WEBCRYPTO_LEGACY: &str = include_str!("../../../testdata/webcrypto_legacy.txt");

/// Plaintext inside both WebCrypto payloads.
pub const WEBCRYPTO_PLAINTEXT: &str =
    r#"{"toEmail":["a@b.com"],"subject":"Hi","mailText":"<p>hi</p>"}"#;
