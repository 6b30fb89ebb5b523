//! On-disk entry format for the directory gate
//!
//! File name:
//! ```text
//! <hash(cache name)>-<key or hash(key)>.v<version><extension>
//! ```
//!
//! File body, three segments separated by a single `\n`:
//! ```text
//! <serialized key>\n<options, base64 by default>\n<value, verbatim to EOF>
//! ```
//!
//! The value is last and unescaped, so it may itself contain newlines.
//!
//! Only the file name carries the key hash. The key segment always holds the
//! full serialized key, so scans can rebuild keys and lookups can reject a
//! file whose stored key differs from the requested one.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use nom::{
    bytes::complete::take_until,
    character::complete::char,
    combinator::rest,
    sequence::{terminated, tuple},
    IResult,
};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Current entry format version, part of every file name
pub const FORMAT_VERSION: u32 = 1;

/// Bytes of the SHA-256 digest kept for file name hashes
const HASH_BYTES: usize = 8;

/// Borrowed view of the three segments of an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEntry<'a> {
    /// Serialized key
    pub key: &'a str,
    /// Options segment, still encoded
    pub options: &'a str,
    /// Value segment
    pub value: &'a str,
}

/// Short, filesystem-safe hash of `text`
pub fn hash_text(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..HASH_BYTES])
}

/// Build the file name for one entry
pub fn cache_filename(namespace: &str, key_part: &str, version: u32, extension: &str) -> String {
    format!("{}-{}.v{}{}", namespace, key_part, version, extension)
}

/// True when `file_name` was produced by [`cache_filename`] for this
/// namespace, version and extension
pub fn is_cache_filename(file_name: &str, namespace: &str, version: u32, extension: &str) -> bool {
    let Some(stem) = file_name.strip_suffix(extension) else {
        return false;
    };
    let Some(after_namespace) = stem
        .strip_prefix(namespace)
        .and_then(|s| s.strip_prefix('-'))
    else {
        return false;
    };
    let tag = format!(".v{}", version);
    after_namespace.len() > tag.len() && after_namespace.ends_with(&tag)
}

fn segment(input: &str) -> IResult<&str, &str> {
    terminated(take_until("\n"), char('\n'))(input)
}

fn entry(input: &str) -> IResult<&str, (&str, &str, &str)> {
    tuple((segment, segment, rest))(input)
}

/// Split an entry body into its segments
pub fn parse_entry(input: &str) -> Result<RawEntry<'_>> {
    let (_, (key, options, value)) = entry(input)?;
    Ok(RawEntry {
        key,
        options,
        value,
    })
}

/// Join the three segments into an entry body
pub fn encode_entry(key: &str, options: &str, value: &str) -> String {
    let mut body = String::with_capacity(key.len() + options.len() + value.len() + 2);
    body.push_str(key);
    body.push('\n');
    body.push_str(options);
    body.push('\n');
    body.push_str(value);
    body
}

/// Encode the options segment
pub fn encode_options(options: &str, base64: bool) -> String {
    if base64 {
        BASE64.encode(options.as_bytes())
    } else {
        options.to_string()
    }
}

/// Decode the options segment written by [`encode_options`]
pub fn decode_options(segment: &str, base64: bool) -> Result<String> {
    if !base64 {
        return Ok(segment.to_string());
    }
    let bytes = BASE64.decode(segment.as_bytes())?;
    String::from_utf8(bytes).map_err(|e| Error::Parse(format!("options are not UTF-8: {}", e)))
}
