//! Fixed RSA-2048 keys and browser-produced payloads for tests.

pub const RECIPIENT_PKCS8: &str = include_str!("../../../testdata/recipient.pk8.b64");
pub const RECIPIENT_SPKI: &str = include_str!("../../../testdata/recipient.spki.b64");
pub const STRANGER_PKCS8: &str = include_str!("../../../testdata/stranger.pk8.b64");

pub const WEBCRYPTO_ENVELOPE: &str = include_str!("../../../testdata/webcrypto_envelope.txt");
pub const WEBCRYPTO_LEGACY: &str = include_str!("../../../testdata/webcrypto_legacy.txt");
