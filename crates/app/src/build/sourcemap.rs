//! Version 3 source maps with one segment per input line.

use serde::Serialize;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Origin of the generated text starting at `generated_column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub generated_column: usize,
    pub source: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u8,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

/// Append `value` as a base64 VLQ.
pub fn encode_vlq(value: i64, out: &mut String) {
    let mut v = (if value < 0 { ((-value) << 1) | 1 } else { value << 1 }) as u64;

    loop {
        let mut digit = (v & 0b1_1111) as usize;
        v >>= 5;
        if v > 0 {
            digit |= 0b10_0000;
        }
        out.push(BASE64[digit] as char);
        if v == 0 {
            break;
        }
    }
}

/// Encode the `mappings` field, one entry per generated line. An empty
/// entry marks a line with no origin.
pub fn encode_mappings(lines: &[Vec<Mapping>]) -> String {
    let mut out = String::new();
    let (mut source, mut line, mut column) = (0i64, 0i64, 0i64);

    for (i, segments) in lines.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        // generated columns restart on every line
        let mut generated = 0i64;
        for (j, m) in segments.iter().enumerate() {
            if j > 0 {
                out.push(',');
            }
            let (g, s, l, c) = (
                m.generated_column as i64,
                m.source as i64,
                m.line as i64,
                m.column as i64,
            );
            encode_vlq(g - generated, &mut out);
            encode_vlq(s - source, &mut out);
            encode_vlq(l - line, &mut out);
            encode_vlq(c - column, &mut out);
            (generated, source, line, column) = (g, s, l, c);
        }
    }
    out
}
