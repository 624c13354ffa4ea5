//! Build code transport: URL-safe Base64 wrapped around a zlib stream, plus the
//! paste host collaborator that hands such codes out.

use std::io::{self, Write as _};
use std::time::Duration;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use tracing::debug;

use crate::core_api::{Error, Result};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(6);

const PASTEBIN_PREFIX: &str = "https://pastebin.com/";
const PASTEBIN_RAW_PREFIX: &str = "https://pastebin.com/raw/";
const INFLATE_CHUNK: usize = 16 * 1024;

/// URL-safe alphabet; padding optional on input, always written on output.
pub(crate) const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode an export code into the XML document bytes it carries.
pub fn decode_build_code(code: &str) -> Result<Vec<u8>> {
    let compressed = URL_SAFE_LENIENT.decode(code.trim())?;
    let document = inflate(&compressed)?;
    debug!(
        compressed = compressed.len(),
        inflated = document.len(),
        "decoded build code"
    );
    Ok(document)
}

/// Inverse of [`decode_build_code`].
pub fn encode_build_code(document: &[u8]) -> Result<String> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(document).map_err(Error::Inflate)?;
    let compressed = encoder.finish().map_err(Error::Inflate)?;
    Ok(URL_SAFE_LENIENT.encode(compressed))
}

fn inflate(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut inflater = Decompress::new(true);
    let mut out = Vec::with_capacity(INFLATE_CHUNK);

    loop {
        if out.len() == out.capacity() {
            out.reserve(INFLATE_CHUNK);
        }
        let before_in = inflater.total_in();
        let before_out = inflater.total_out();
        let input = &compressed[before_in as usize..];

        let status = inflater
            .decompress_vec(input, &mut out, FlushDecompress::Finish)
            .map_err(|e| Error::Inflate(io::Error::new(io::ErrorKind::InvalidData, e)))?;

        if status == Status::StreamEnd {
            return Ok(out);
        }

        let stalled = inflater.total_in() == before_in && inflater.total_out() == before_out;
        let input_exhausted = inflater.total_in() as usize == compressed.len();
        if input_exhausted && (stalled || out.len() < out.capacity()) {
            return Err(Error::Inflate(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "compressed stream ended early after {} of {} bytes",
                    inflater.total_in(),
                    compressed.len()
                ),
            )));
        }
    }
}

/// Map a paste URL onto the host's raw content path.
pub fn raw_paste_url(url: &str) -> Result<String> {
    let url = url.trim();
    if url.starts_with(PASTEBIN_RAW_PREFIX) {
        return Ok(url.to_string());
    }
    match url.strip_prefix(PASTEBIN_PREFIX) {
        Some(key) if !key.is_empty() && !key.contains('/') => {
            Ok(format!("{PASTEBIN_RAW_PREFIX}{key}"))
        }
        _ => Err(Error::UnsupportedUrl {
            url: url.to_string(),
        }),
    }
}

/// Fetch an export code from a paste host with a single blocking GET.
pub fn fetch_build_code(url: &str, timeout: Duration) -> Result<String> {
    let raw = raw_paste_url(url)?;
    debug!(url = %raw, ?timeout, "fetching build code");

    let response = match ureq::get(&raw).timeout(timeout).call() {
        Ok(response) => response,
        Err(ureq::Error::Status(status, _)) => {
            return Err(Error::HttpStatus { url: raw, status });
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(transport_error(raw, transport));
        }
    };

    let body = response
        .into_string()
        .map_err(|e| io_transport_error(raw.clone(), e))?;
    Ok(body.trim().to_string())
}

fn transport_error(url: String, transport: ureq::Transport) -> Error {
    let timed_out = std::error::Error::source(&transport)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .is_some_and(|e| e.kind() == io::ErrorKind::TimedOut);
    if timed_out {
        Error::Timeout { url }
    } else {
        Error::Connection {
            url,
            source: Box::new(transport),
        }
    }
}

fn io_transport_error(url: String, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::TimedOut {
        Error::Timeout { url }
    } else {
        Error::Connection {
            url,
            source: Box::new(e),
        }
    }
}
