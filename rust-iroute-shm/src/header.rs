//! Control-block header codec.
//!
//! The control region carries a single 11-byte ASCII header of the exact
//! form `<tag>/<8-digit-zero-padded-length>`, e.g. `ns/00000013`. The tag
//! names the producer of the data block's current contents: `ai` is this
//! side's telemetry, `ns` is the peer's routing/weight-update response.

use log::error;
use rust_iroute_common::{Error, Result};
use std::fmt;

/// Producer tag carried in the control header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Written by the peer: the data block holds a weight update.
    Ns,
    /// Written by this side: the data block holds telemetry.
    Ai,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Ns => "ns",
            Tag::Ai => "ai",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        match s {
            "ns" => Some(Tag::Ns),
            "ai" => Some(Tag::Ai),
            _ => None,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded control header: producer tag plus payload length in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlHeader {
    pub tag: Tag,
    pub len: usize,
}

impl ControlHeader {
    pub fn new(tag: Tag, len: usize) -> Self {
        Self { tag, len }
    }

    /// Render the wire form, zero-padding the length to 8 digits.
    pub fn encode(&self) -> String {
        format!("{}/{:08}", self.tag, self.len)
    }

    /// Strict parse: unknown tag, missing `/`, or non-digit length bytes
    /// are protocol errors.
    pub fn parse(raw: &str) -> Result<Self> {
        let (tag_str, digits) = raw
            .split_once('/')
            .ok_or_else(|| Error::ProtocolParse(format!("no '/' in control header {raw:?}")))?;
        let tag = Tag::from_str(tag_str)
            .ok_or_else(|| Error::ProtocolParse(format!("unknown header tag {tag_str:?}")))?;
        let len = parse_len(digits)?;
        Ok(Self { tag, len })
    }

    /// Lenient parse used by the poll loop.
    ///
    /// Returns `None` when the tag is not recognizable (nothing to consume,
    /// keep polling). A recognizable tag with a malformed length field
    /// degrades to length 0, logged as an error: the caller then reads zero
    /// payload bytes and proceeds.
    pub fn parse_lossy(raw: &str) -> Option<Self> {
        let (tag_str, digits) = raw.split_once('/')?;
        let tag = Tag::from_str(tag_str)?;
        let len = match parse_len(digits) {
            Ok(len) => len,
            Err(e) => {
                error!("{e}");
                0
            }
        };
        Some(Self { tag, len })
    }
}

/// Parse the 8-digit length field: leading zeros stripped, all-zero means 0.
fn parse_len(digits: &str) -> Result<usize> {
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        return Ok(0);
    }
    stripped
        .parse::<usize>()
        .map_err(|_| Error::ProtocolParse(format!("non-digit length field {digits:?}")))
}
