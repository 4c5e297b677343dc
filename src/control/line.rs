//! Control-channel line codec.
//!
//! The companion server is driven over a text control channel, one frame
//! per line:
//!
//! ```text
//! base64(key1)=base64(value1) base64(key2)=base64(value2) \n
//! ```
//!
//! Base64 is the RFC 4648 standard alphabet without padding. Decoding is
//! lenient: malformed tokens are skipped, characters outside the alphabet
//! are ignored, and an incomplete trailing group is dropped. Duplicate
//! keys overwrite; token order carries no meaning.
//!
//! # Example
//!
//! ```
//! use streamwire::control::{InterprocessFrame, LineCodec};
//!
//! let mut frame = InterprocessFrame::new();
//! frame.insert("url", "rtsp://host/stream");
//!
//! let line = LineCodec::encode(&frame);
//! assert!(line.ends_with(b"\n"));
//! assert_eq!(LineCodec::decode(&line), frame);
//! ```

use std::collections::HashMap;

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurposeConfig;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose};

/// Unpadded RFC 4648 standard base64, decoding as leniently as the engine
/// allows: padding indifferent, trailing bits accepted.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// A control-channel frame: a dictionary of text parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterprocessFrame {
    /// Parameter dictionary. Keys are unique; insertion order is
    /// irrelevant.
    pub parameters: HashMap<String, String>,
}

impl InterprocessFrame {
    /// An empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Look up a parameter value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    /// True when the frame carries no parameters.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// Serializer for control-channel lines.
pub struct LineCodec;

impl LineCodec {
    /// Serialize `frame` into one newline-terminated line.
    pub fn encode(frame: &InterprocessFrame) -> Vec<u8> {
        let mut line = Vec::new();

        for (key, value) in &frame.parameters {
            line.extend_from_slice(BASE64.encode(key).as_bytes());
            line.push(b'=');
            line.extend_from_slice(BASE64.encode(value).as_bytes());
            line.push(b' ');
        }

        line.push(b'\n');
        line
    }

    /// Parse a received line into a frame.
    ///
    /// Tokens are split on spaces and each token at its first `=`; tokens
    /// with `=` first or last are skipped, as are tokens whose key decodes
    /// to nothing. Anything undecodable degrades to an empty or partial
    /// value rather than an error.
    pub fn decode(line: &[u8]) -> InterprocessFrame {
        let mut frame = InterprocessFrame::new();

        for token in line.split(|&byte| byte == b' ') {
            let Some(index) = token.iter().position(|&byte| byte == b'=') else {
                continue;
            };
            if index == 0 || index >= token.len() - 1 {
                continue;
            }

            let key = decode_lenient(trim_ascii(&token[..index]));
            let value = decode_lenient(trim_ascii(&token[index + 1..]));

            if !key.is_empty() {
                frame.parameters.insert(key, value);
            }
        }

        frame
    }
}

fn trim_ascii(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = bytes {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}

/// Decode base64, ignoring characters outside the alphabet and dropping an
/// incomplete trailing group. Undecodable input yields an empty string.
fn decode_lenient(token: &[u8]) -> String {
    let mut filtered: Vec<u8> = token
        .iter()
        .copied()
        .filter(|byte| byte.is_ascii_alphanumeric() || *byte == b'+' || *byte == b'/')
        .collect();

    // A single leftover character can never form a valid group.
    if filtered.len() % 4 == 1 {
        filtered.truncate(filtered.len() - 1);
    }

    match BASE64.decode(&filtered) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}
