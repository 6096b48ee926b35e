//! Byte fixtures shared by the integration tests.

#![allow(dead_code)]

use std::io::Cursor;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Builds a chunk with a placeholder CRC; CRCs are never checked.
pub fn png_chunk(kind: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(data.len() + 12);
    chunk.extend_from_slice(&(data.len() as u32).to_be_bytes());
    chunk.extend_from_slice(kind);
    chunk.extend_from_slice(data);
    chunk.extend_from_slice(&[0xC0, 0xFF, 0xEE, kind[0]]);
    chunk
}

pub fn ihdr() -> Vec<u8> {
    // 1x1, 8 bit greyscale
    png_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 0])
}

pub fn iend() -> Vec<u8> {
    png_chunk(b"IEND", &[])
}

pub fn png(chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut file = PNG_SIGNATURE.to_vec();
    for chunk in chunks {
        file.extend_from_slice(chunk);
    }
    file
}

/// Signature, IHDR, IEND: 45 bytes.
pub fn minimal_png() -> Vec<u8> {
    png(&[ihdr(), iend()])
}

/// Signature, IHDR, a 4 byte tEXt, IEND: 61 bytes.
pub fn png_with_text() -> Vec<u8> {
    png(&[ihdr(), png_chunk(b"tEXt", b"a\0bc"), iend()])
}

/// Scan data containing a stuffed 0xFF and a restart marker.
pub const SCAN: [u8; 8] = [0x12, 0x34, 0xFF, 0x00, 0x56, 0xFF, 0xD0, 0x78];

pub fn jpeg_segment(marker: u8, payload: &[u8]) -> Vec<u8> {
    let mut segment = vec![0xFF, marker];
    segment.extend_from_slice(&(payload.len() as u16 + 2).to_be_bytes());
    segment.extend_from_slice(payload);
    segment
}

pub fn jpeg(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}

pub fn soi() -> Vec<u8> {
    vec![0xFF, 0xD8]
}

pub fn eoi() -> Vec<u8> {
    vec![0xFF, 0xD9]
}

/// SOS header for one component: 8 byte length field, 6 payload bytes.
pub fn sos() -> Vec<u8> {
    jpeg_segment(0xDA, &[0x01, 0x01, 0x00, 0x00, 0x3F, 0x00])
}

/// `FF D8 | FF E1 00 04 AA BB | FF DA 00 08 <6> | SCAN | FF D9`: 28 bytes.
pub fn jpeg_with_app1() -> Vec<u8> {
    jpeg(&[
        soi(),
        jpeg_segment(0xE1, &[0xAA, 0xBB]),
        sos(),
        SCAN.to_vec(),
        eoi(),
    ])
}

/// A fuller JPEG layout: JFIF, EXIF, comment, tables, frame and two scans.
pub fn jpeg_full() -> Vec<u8> {
    jpeg(&[
        soi(),
        jpeg_segment(0xE0, b"JFIF\0\x01\x01\0\0\x01\0\x01\0\0"),
        jpeg_segment(0xE1, b"Exif\0\0MM\0*"),
        jpeg_segment(0xFE, b"made with a camera"),
        jpeg_segment(0xDB, &[0u8; 65]),
        jpeg_segment(0xC2, &[8, 0, 1, 0, 1, 1, 1, 0x11, 0]),
        jpeg_segment(0xC4, &[0u8; 20]),
        jpeg_segment(0xDD, &[0, 4]),
        sos(),
        vec![0x01, 0xFF, 0x00, 0xFF, 0xD1, 0x02, 0xFF, 0xD2],
        jpeg_segment(0xC4, &[1u8; 20]),
        sos(),
        vec![0xAB, 0xCD, 0xFF, 0x00],
        eoi(),
    ])
}

pub fn cursor(bytes: &[u8]) -> Cursor<Vec<u8>> {
    Cursor::new(bytes.to_vec())
}
