//! Unit tests for the newline-delimited frame codec.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use simple_mcp_server::mcp::codec::{FrameCodec, MAX_FRAME_BYTES};
use simple_mcp_server::AppError;

fn decode_frame(codec: &mut FrameCodec, buf: &mut BytesMut) -> Option<String> {
    codec
        .decode(buf)
        .expect("decode must not fail")
        .map(|item| item.expect("frame must be within limits"))
}

#[test]
fn single_line_is_decoded_without_newline() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::from("{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}\n");
    assert_eq!(
        decode_frame(&mut codec, &mut buf).as_deref(),
        Some("{\"jsonrpc\":\"2.0\",\"method\":\"ping\",\"id\":1}")
    );
    assert!(buf.is_empty());
}

#[test]
fn two_lines_in_one_buffer_decode_separately() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::from("{\"a\":1}\n{\"b\":2}\n");
    assert_eq!(decode_frame(&mut codec, &mut buf).as_deref(), Some("{\"a\":1}"));
    assert_eq!(decode_frame(&mut codec, &mut buf).as_deref(), Some("{\"b\":2}"));
    assert_eq!(decode_frame(&mut codec, &mut buf), None);
}

#[test]
fn partial_line_is_buffered() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::from("{\"method\":");
    assert_eq!(decode_frame(&mut codec, &mut buf), None);
    buf.extend_from_slice(b"\"ping\"}\n");
    assert_eq!(
        decode_frame(&mut codec, &mut buf).as_deref(),
        Some("{\"method\":\"ping\"}")
    );
}

#[test]
fn crlf_terminator_is_stripped() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::from("{}\r\n");
    assert_eq!(decode_frame(&mut codec, &mut buf).as_deref(), Some("{}"));
}

#[test]
fn unterminated_line_is_flushed_at_eof() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::from("{\"tail\":true}");
    let item = codec
        .decode_eof(&mut buf)
        .expect("decode_eof must not fail")
        .map(|item| item.expect("frame within limits"));
    assert_eq!(item.as_deref(), Some("{\"tail\":true}"));
}

#[test]
fn oversized_line_is_surfaced_as_item_and_codec_recovers() {
    let mut codec = FrameCodec::new();
    let mut buf = BytesMut::with_capacity(MAX_FRAME_BYTES + 64);
    buf.extend_from_slice(&vec![b'x'; MAX_FRAME_BYTES + 1]);
    buf.extend_from_slice(b"\n{\"after\":1}\n");

    let item = codec
        .decode(&mut buf)
        .expect("oversize must not be a decoder error")
        .expect("oversize must produce an item");
    let err = item.expect_err("oversized frame must be an error item");
    assert!(matches!(err, AppError::Protocol(ref msg) if msg.contains("too long")));

    // Remaining bytes of the oversized line are discarded; the next frame decodes.
    let mut next = None;
    for _ in 0..4 {
        next = decode_frame(&mut codec, &mut buf);
        if next.is_some() {
            break;
        }
    }
    assert_eq!(next.as_deref(), Some("{\"after\":1}"));
}

#[test]
fn encoder_appends_newline() {
    let mut codec = FrameCodec::new();
    let mut dst = BytesMut::new();
    codec
        .encode("{\"ok\":true}".to_owned(), &mut dst)
        .expect("encode");
    assert_eq!(&dst[..], b"{\"ok\":true}\n");
}
