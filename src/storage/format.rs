//! Framed text format of the per-site store file
//!
//! Every page is appended as one frame:
//!
//! ```text
//! \n\nLINK: <url>\nLENGTH: <n>\n\nCONTENT:\n<n bytes of text>\n
//! ```
//!
//! `LENGTH` makes a frame self-delimiting, so page text may contain blank
//! lines or even `LINK:` lines without confusing the decoder. Frames written
//! before `LENGTH` existed are still accepted; their body runs until the next
//! frame marker.

use crate::storage::{PageRecord, StorageError, StorageResult};

/// Start of every frame
pub const FRAME_MARKER: &str = "\n\nLINK: ";

const LENGTH_PREFIX: &str = "LENGTH: ";
const CONTENT_HEADER: &str = "\nCONTENT:\n";

/// Result of decoding a store file
#[derive(Debug, Default)]
pub struct DecodedStore {
    /// Complete frames in file order
    pub records: Vec<PageRecord>,

    /// Byte length of the prefix made of complete frames
    pub valid_len: usize,

    /// True if the data ends in an incomplete frame
    pub torn: bool,
}

/// Encodes one page as a frame
pub fn encode_record(url: &str, text: &str) -> StorageResult<String> {
    if url.is_empty() || url.contains(|c: char| c == '\n' || c == '\r') {
        return Err(StorageError::InvalidUrl(url.to_string()));
    }

    Ok(format!(
        "{FRAME_MARKER}{url}\n{LENGTH_PREFIX}{}\n{CONTENT_HEADER}{text}\n",
        text.len()
    ))
}

/// Decodes all complete frames in `data`
///
/// Bytes before the first marker are ignored and count as valid. Decoding
/// stops at the first incomplete or malformed frame, which is reported as a
/// torn tail.
pub fn decode_records(data: &str) -> DecodedStore {
    let mut decoded = DecodedStore::default();

    let Some(first) = data.find(FRAME_MARKER) else {
        decoded.valid_len = data.len();
        return decoded;
    };
    decoded.valid_len = first;

    let mut pos = first;
    while pos < data.len() {
        if !data[pos..].starts_with(FRAME_MARKER) {
            decoded.torn = true;
            break;
        }

        match decode_frame(data, pos) {
            Some((record, next)) => {
                decoded.records.push(record);
                decoded.valid_len = next;
                pos = next;
            }
            None => {
                decoded.torn = true;
                break;
            }
        }
    }

    decoded
}

/// Decodes the frame starting at `start`, returning it and the offset after it
fn decode_frame(data: &str, start: usize) -> Option<(PageRecord, usize)> {
    let url_start = start + FRAME_MARKER.len();
    let url_end = url_start + data[url_start..].find('\n')?;
    let url = &data[url_start..url_end];
    if url.is_empty() {
        return None;
    }

    let cursor = url_end + 1;
    let rest = &data[cursor..];

    if let Some(length_line) = rest.strip_prefix(LENGTH_PREFIX) {
        let line_end = length_line.find('\n')?;
        let length: usize = length_line[..line_end].trim().parse().ok()?;

        let header_start = cursor + LENGTH_PREFIX.len() + line_end + 1;
        if !data[header_start..].starts_with(CONTENT_HEADER) {
            return None;
        }

        let body_start = header_start + CONTENT_HEADER.len();
        let body_end = body_start.checked_add(length)?;
        let body = data.get(body_start..body_end)?;
        if !data[body_end..].starts_with('\n') {
            return None;
        }

        return Some((PageRecord::new(url, body), body_end + 1));
    }

    // Legacy frames go straight from the URL line to the content header.
    // Anything else here is a length frame cut off before its header.
    if !rest.starts_with(CONTENT_HEADER) {
        return None;
    }
    let body_start = cursor + CONTENT_HEADER.len();
    let body_end = data[body_start..]
        .find(FRAME_MARKER)
        .map(|offset| body_start + offset)
        .unwrap_or(data.len());
    let body = &data[body_start..body_end];
    let body = body.strip_suffix('\n').unwrap_or(body);

    Some((PageRecord::new(url, body), body_end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(decoded: &DecodedStore) -> Vec<&str> {
        decoded.records.iter().map(|r| r.url.as_str()).collect()
    }

    #[test]
    fn test_encode_layout() {
        let frame = encode_record("https://example.edu/", "Hello").unwrap();
        assert_eq!(
            frame,
            "\n\nLINK: https://example.edu/\nLENGTH: 5\n\nCONTENT:\nHello\n"
        );
    }

    #[test]
    fn test_encode_rejects_newline_in_url() {
        assert!(encode_record("https://example.edu/\nLINK: x", "").is_err());
        assert!(encode_record("", "text").is_err());
    }

    #[test]
    fn test_body_containing_marker_text() {
        let tricky = "Intro\n\nLINK: https://example.edu/fake\n\nCONTENT:\nnot a page\n\n";
        let mut data = encode_record("https://example.edu/", tricky).unwrap();
        data.push_str(&encode_record("https://example.edu/a", "second").unwrap());

        let decoded = decode_records(&data);
        assert!(!decoded.torn);
        assert_eq!(urls(&decoded), vec!["https://example.edu/", "https://example.edu/a"]);
        assert_eq!(decoded.records[0].text, tricky);
        assert_eq!(decoded.records[1].text, "second");
        assert_eq!(decoded.valid_len, data.len());
    }

    #[test]
    fn test_multibyte_body() {
        let data = encode_record("https://example.edu/ü", "Stipendium für Studierende – ja")
            .unwrap();
        let decoded = decode_records(&data);
        assert_eq!(decoded.records[0].text, "Stipendium für Studierende – ja");
    }

    #[test]
    fn test_torn_tail_is_reported() {
        let complete = encode_record("https://example.edu/", "full page").unwrap();
        let partial = encode_record("https://example.edu/b", "this one was cut").unwrap();
        let data = format!("{}{}", complete, &partial[..partial.len() - 6]);

        let decoded = decode_records(&data);
        assert!(decoded.torn);
        assert_eq!(urls(&decoded), vec!["https://example.edu/"]);
        assert_eq!(decoded.valid_len, complete.len());
    }

    #[test]
    fn test_torn_header_is_reported() {
        let complete = encode_record("https://example.edu/", "ok").unwrap();
        let data = format!("{}\n\nLINK: https://exa", complete);

        let decoded = decode_records(&data);
        assert!(decoded.torn);
        assert_eq!(decoded.valid_len, complete.len());
    }

    #[test]
    fn test_frame_cut_after_url_line_is_reported() {
        let complete = encode_record("https://example.edu/", "ok").unwrap();

        for tail in [
            "\n\nLINK: https://example.edu/a\n",
            "\n\nLINK: https://example.edu/a\nLENG",
            "\n\nLINK: https://example.edu/a\nLENGTH: 1",
        ] {
            let decoded = decode_records(&format!("{}{}", complete, tail));
            assert!(decoded.torn, "not torn: {:?}", tail);
            assert_eq!(urls(&decoded), vec!["https://example.edu/"]);
            assert_eq!(decoded.valid_len, complete.len());
        }
    }

    #[test]
    fn test_legacy_frames() {
        let data = "\n\nLINK: https://example.edu/\n\nCONTENT:\nfirst\n\nwith blank line\n\
                    \n\nLINK: https://example.edu/a\n\nCONTENT:\nsecond\n";

        let decoded = decode_records(data);
        assert!(!decoded.torn);
        assert_eq!(urls(&decoded), vec!["https://example.edu/", "https://example.edu/a"]);
        assert_eq!(decoded.records[0].text, "first\n\nwith blank line");
        assert_eq!(decoded.records[1].text, "second");
    }

    #[test]
    fn test_empty_and_markerless_input() {
        let decoded = decode_records("");
        assert!(decoded.records.is_empty());
        assert_eq!(decoded.valid_len, 0);

        let decoded = decode_records("stray notes");
        assert!(decoded.records.is_empty());
        assert!(!decoded.torn);
        assert_eq!(decoded.valid_len, 11);
    }
}
