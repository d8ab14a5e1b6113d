//! Newline-delimited JSON codec for the pipe transport.
//!
//! Wraps [`tokio_util::codec::LinesCodec`] with a fixed maximum line length
//! so an unterminated or oversized frame cannot exhaust memory.
//!
//! Use [`FrameCodec`] with [`tokio_util::codec::FramedRead`] (inbound) and
//! [`tokio_util::codec::FramedWrite`] (outbound).

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::{AppError, Result};

/// Maximum inbound frame length: 1 MiB.
pub const MAX_FRAME_BYTES: usize = 1_048_576;

/// NDJSON codec: one UTF-8 line per protocol frame.
///
/// An oversized inbound line is yielded as an `Err(AppError::Protocol)` item
/// rather than a decoder error: `FramedRead` stops after a decoder error,
/// while the session must answer with an error frame and keep reading. The
/// rest of the oversized line is discarded up to the next newline. I/O
/// failures are decoder errors and end the session.
#[derive(Debug)]
pub struct FrameCodec(LinesCodec);

impl FrameCodec {
    /// Create a codec with the default [`MAX_FRAME_BYTES`] limit.
    #[must_use]
    pub fn new() -> Self {
        Self(LinesCodec::new_with_max_length(MAX_FRAME_BYTES))
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Result<String>;
    type Error = AppError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        surface_oversize(self.0.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        surface_oversize(self.0.decode_eof(src))
    }
}

impl Encoder<String> for FrameCodec {
    type Error = AppError;

    fn encode(&mut self, item: String, dst: &mut BytesMut) -> Result<()> {
        // The length limit is a decoder-side concern only.
        self.0.encode(item, dst).map_err(map_codec_error)
    }
}

fn surface_oversize(
    decoded: std::result::Result<Option<String>, LinesCodecError>,
) -> Result<Option<Result<String>>> {
    match decoded {
        Ok(line) => Ok(line.map(Ok)),
        Err(LinesCodecError::MaxLineLengthExceeded) => {
            Ok(Some(Err(map_codec_error(LinesCodecError::MaxLineLengthExceeded))))
        }
        Err(err) => Err(map_codec_error(err)),
    }
}

fn map_codec_error(e: LinesCodecError) -> AppError {
    match e {
        LinesCodecError::MaxLineLengthExceeded => {
            AppError::Protocol(format!("frame too long: exceeded {MAX_FRAME_BYTES} bytes"))
        }
        LinesCodecError::Io(io_err) => AppError::Io(io_err.to_string()),
    }
}
