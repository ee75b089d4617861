//! The `{"token": "<string>"}` envelope.
//!
//! This is the only shape exchanged with the caller: `store`/`create` read one
//! envelope from stdin and `get` writes one to stdout. Local credential stores
//! also persist values inside it.

use crate::errors::{CredsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialResponse {
    pub token: String,
}

impl fmt::Debug for CredentialResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResponse").field("token", &"[REDACTED]").finish()
    }
}

impl CredentialResponse {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }

    /// Wrap a raw backend payload. Payloads that are not UTF-8 are rejected
    /// rather than rewritten.
    pub fn from_payload(payload: Vec<u8>) -> Result<Self> {
        String::from_utf8(payload).map(Self::new).map_err(|e| {
            CredsError::malformed_input(format!("stored value is not valid UTF-8: {}", e))
        })
    }

    /// Compact JSON encoding.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode exactly one envelope. Anything else, including trailing data,
    /// is malformed input.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(CredsError::malformed_input("expected a {\"token\": ...} object, got no input"));
        }

        serde_json::from_slice(bytes)
            .map_err(|e| CredsError::malformed_input(format!("invalid credential object: {}", e)))
    }

    /// Read the whole of `reader` and decode it.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::decode(&buf)
    }

    /// Recover the value from a locally stored entry. Entries that are not
    /// envelopes are returned verbatim.
    pub fn unwrap_stored(stored: &str) -> String {
        match serde_json::from_str::<Self>(stored) {
            Ok(envelope) => envelope.token,
            Err(_) => stored.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shape() {
        let encoded = CredentialResponse::new("abc.def").encode().unwrap();
        assert_eq!(String::from_utf8(encoded).unwrap(), r#"{"token":"abc.def"}"#);
    }

    #[test]
    fn test_decode_accepts_surrounding_whitespace() {
        let decoded = CredentialResponse::decode(b"  {\"token\": \"xyz\"}\n").unwrap();
        assert_eq!(decoded.token, "xyz");
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        for input in [
            &b""[..],
            b"\n",
            b"not json",
            b"{\"token\": 42}",
            b"{\"other\": \"x\"}",
            b"{\"token\": \"a\"} trailing",
        ] {
            let err = CredentialResponse::decode(input).unwrap_err();
            assert!(matches!(err, CredsError::MalformedInput { .. }), "input {:?}", input);
        }
    }

    #[test]
    fn test_from_payload_rejects_invalid_utf8() {
        let err = CredentialResponse::from_payload(vec![0x74, 0x6f, 0xff, 0x6b]).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::MalformedInput);

        let ok = CredentialResponse::from_payload(b"tok".to_vec()).unwrap();
        assert_eq!(ok.token, "tok");
    }

    #[test]
    fn test_read_from_reader() {
        let mut input = std::io::Cursor::new(b"{\"token\":\"from-stdin\"}".to_vec());
        let decoded = CredentialResponse::read_from(&mut input).unwrap();
        assert_eq!(decoded.token, "from-stdin");
    }

    #[test]
    fn test_unwrap_stored_falls_back_to_raw() {
        assert_eq!(CredentialResponse::unwrap_stored(r#"{"token":"wrapped"}"#), "wrapped");
        assert_eq!(CredentialResponse::unwrap_stored("legacy-raw-value"), "legacy-raw-value");
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", CredentialResponse::new("hidden"));
        assert!(!debug.contains("hidden"));
    }
}
