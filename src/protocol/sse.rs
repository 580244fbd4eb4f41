//! Event-stream framing
//!
//! Each event goes over the wire as `data: <JSON>\n\n`. The registry fans out
//! bare JSON payloads; framing is applied at the HTTP boundary and stripped by
//! the client-side [`FrameDecoder`], which tolerates arbitrary chunk
//! boundaries from the network.

use bytes::{Bytes, BytesMut};

/// Wrap a JSON payload in event-stream framing.
pub fn encode_frame(payload: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(payload.len() + 8);
    out.extend_from_slice(b"data: ");
    out.extend_from_slice(payload);
    out.extend_from_slice(b"\n\n");
    out.freeze()
}

/// Incremental event-stream parser
///
/// Feed raw network chunks in; pull complete JSON payloads out. An event ends
/// at a blank line. Comment lines (leading `:`) are dropped; multiple `data:`
/// lines within one event are joined with newlines per the SSE contract.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk received from the transport.
    pub fn feed(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pop the next complete event payload, if one is buffered.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            let end = find_event_end(&self.buf)?;
            let raw = self.buf.split_to(end.frame_len);

            let mut data = Vec::new();
            for line in raw[..end.body_len].split(|&b| b == b'\n') {
                let line = strip_cr(line);
                if line.starts_with(b":") {
                    continue;
                }
                if let Some(rest) = strip_data_prefix(line) {
                    if !data.is_empty() {
                        data.push(b'\n');
                    }
                    data.extend_from_slice(rest);
                }
            }

            if !data.is_empty() {
                return Some(Bytes::from(data));
            }
            // Comment-only or empty event; keep scanning the buffer.
        }
    }
}

struct EventEnd {
    /// Length of the event body, excluding the terminating blank line
    body_len: usize,
    /// Total length to consume from the buffer
    frame_len: usize,
}

/// Locate the blank-line terminator, accepting both `\n\n` and `\r\n\r\n`.
fn find_event_end(buf: &[u8]) -> Option<EventEnd> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some(EventEnd {
                body_len: i,
                frame_len: i + 2,
            });
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some(EventEnd {
                body_len: i,
                frame_len: i + 4,
            });
        }
        i += 1;
    }
    None
}

fn strip_cr(line: &[u8]) -> &[u8] {
    match line.last() {
        Some(b'\r') => &line[..line.len() - 1],
        _ => line,
    }
}

fn strip_data_prefix(line: &[u8]) -> Option<&[u8]> {
    let rest = line.strip_prefix(b"data:")?;
    // A single leading space after the colon is part of the framing.
    Some(rest.strip_prefix(b" ").unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(br#"{"type":"status"}"#);
        assert_eq!(&frame[..], b"data: {\"type\":\"status\"}\n\n");
    }

    #[test]
    fn test_decode_single_frame() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"data: {\"a\":1}\n\n");

        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(br#"{"a":1}"#));
        assert!(dec.next_frame().is_none());
    }

    #[test]
    fn test_decode_split_across_chunks() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"data: {\"a\"");
        assert!(dec.next_frame().is_none());

        dec.feed(b":1}\n");
        assert!(dec.next_frame().is_none());

        dec.feed(b"\ndata: {\"b\":2}\n\n");
        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(br#"{"b":2}"#));
        assert!(dec.next_frame().is_none());
    }

    #[test]
    fn test_decode_multiple_frames_in_one_chunk() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"data: 1\n\ndata: 2\n\ndata: 3\n\n");

        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(b"1"));
        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(b"2"));
        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(b"3"));
        assert!(dec.next_frame().is_none());
    }

    #[test]
    fn test_decode_skips_comment_events() {
        let mut dec = FrameDecoder::new();
        dec.feed(b": keep-alive\n\ndata: real\n\n");

        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(b"real"));
        assert!(dec.next_frame().is_none());
    }

    #[test]
    fn test_decode_crlf_framing() {
        let mut dec = FrameDecoder::new();
        dec.feed(b"data: x\r\n\r\n");

        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(b"x"));
    }

    #[test]
    fn test_roundtrip_with_encoder() {
        let payload = br#"{"type":"transcript","data":{"text":"hi"}}"#;
        let mut dec = FrameDecoder::new();
        dec.feed(&encode_frame(payload));

        assert_eq!(dec.next_frame().unwrap(), Bytes::from_static(payload));
    }
}
