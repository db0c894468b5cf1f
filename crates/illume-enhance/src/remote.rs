//! Remote-service diagram rendering.
//!
//! Diagram source is compressed with raw deflate and re-encoded in the
//! PlantUML base64 variant, then embedded as an `<img>` whose URL points at
//! a remote rendering server. No rendering happens locally; fetching the
//! image (and failing to) is the document consumer's concern.

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

use crate::block::DiagramBlock;
use crate::rewrite::Replacement;
use crate::util::escape_html;

/// Public PlantUML rendering server.
pub const DEFAULT_PLANTUML_SERVER: &str = "https://www.plantuml.com/plantuml";

/// Dark-styled SVG output.
pub const DEFAULT_PLANTUML_FORMAT: &str = "dsvg";

/// PlantUML's base64 variant alphabet (not interchangeable with standard
/// base64; the server decodes exactly this ordering).
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

fn encode_6bit(value: u8) -> char {
    ALPHABET[usize::from(value & 0x3F)] as char
}

fn append_3_bytes(out: &mut String, b1: u8, b2: u8, b3: u8) {
    out.push(encode_6bit(b1 >> 2));
    out.push(encode_6bit(((b1 & 0x03) << 4) | (b2 >> 4)));
    out.push(encode_6bit(((b2 & 0x0F) << 2) | (b3 >> 6)));
    out.push(encode_6bit(b3 & 0x3F));
}

fn encode_64(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);
    let mut chunks = data.chunks_exact(3);
    for chunk in &mut chunks {
        append_3_bytes(&mut out, chunk[0], chunk[1], chunk[2]);
    }
    match *chunks.remainder() {
        [b1] => append_3_bytes(&mut out, b1, 0, 0),
        [b1, b2] => append_3_bytes(&mut out, b1, b2, 0),
        _ => {}
    }
    out
}

/// Encode diagram source for the remote server.
///
/// Pure and deterministic: identical input always yields the identical
/// encoding, so image URLs are stable across passes.
#[must_use]
pub fn encode_diagram(source: &str) -> String {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    // Writing into a Vec cannot fail.
    encoder.write_all(source.as_bytes()).unwrap();
    let deflated = encoder.finish().unwrap();
    encode_64(&deflated)
}

/// Build the image URL for one diagram.
#[must_use]
pub fn image_url(server: &str, format: &str, source: &str) -> String {
    let server = server.trim_end_matches('/');
    format!("{server}/{format}/{}", encode_diagram(source))
}

/// Replace each remote-rendered diagram block with an `<img>` element.
pub(crate) fn render_remote_blocks(
    blocks: &[DiagramBlock],
    server: &str,
    format: &str,
) -> Vec<Replacement> {
    blocks
        .iter()
        .map(|block| {
            let url = image_url(server, format, &block.source);
            Replacement {
                span: block.span.clone(),
                html: format!(
                    r#"<div class="plantuml"><img src="{}" style="max-width:100%" alt="diagram"></div>"#,
                    escape_html(&url)
                ),
            }
        })
        .collect()
}
