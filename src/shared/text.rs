//! Best-effort text decoding
//!
//! File contents, blobs, commit messages and patches are all read as bytes and
//! turned into text here. Invalid UTF-8 sequences are dropped rather than
//! replaced, so the text on either side of a stray byte runs together:
//! `pass\xffword` decodes to `password` and matches that keyword.

/// Decode bytes as UTF-8, discarding any invalid sequences
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}
