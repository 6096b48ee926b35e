mod support;

use metastrip::png_chunk::{ChunkKind, PngChunk};
use metastrip::png_file::{write_signature, PngFile};
use metastrip::MetastripError;
use std::io::Write;
use support::*;

fn parse(bytes: &[u8]) -> Result<PngFile<std::io::Cursor<Vec<u8>>>, MetastripError> {
    PngFile::from_reader(cursor(bytes), "test.png")
}

fn copy_all(png: &PngFile<std::io::Cursor<Vec<u8>>>) -> Vec<u8> {
    let mut output: Vec<u8> = Vec::new();
    write_signature(&mut output).unwrap();
    for chunk in png.chunks() {
        chunk.write_to(&mut output).unwrap();
    }
    output
}

#[test]
fn minimal_png() {
    let png = parse(&support::minimal_png()).unwrap();

    assert_eq!(
        png.descriptors(),
        &[
            PngChunk {
                kind: ChunkKind::IHDR,
                len: 13,
                data_offset: 16
            },
            PngChunk {
                kind: ChunkKind::IEND,
                len: 0,
                data_offset: 41
            },
        ]
    );
    assert_eq!(png.descriptors()[1].start(), 33);
    assert!(png.trailing_data().is_none());
}

#[test]
fn ancillary_chunk_offsets() {
    let png = parse(&png_with_text()).unwrap();
    let kinds: Vec<String> = png.chunks().map(|c| c.kind.to_string()).collect();

    assert_eq!(kinds, ["IHDR", "tEXt", "IEND"]);
    assert_eq!(png.descriptors()[1].len, 4);
    assert_eq!(png.descriptors()[1].data_offset, 41);
    assert_eq!(png.descriptors()[2].data_offset, 57);
}

#[test]
fn selective_copy_drops_chunk() {
    let png = parse(&png_with_text()).unwrap();
    let mut output: Vec<u8> = Vec::new();
    write_signature(&mut output).unwrap();
    for chunk in png.chunks() {
        if chunk.kind == ChunkKind::IHDR || chunk.kind == ChunkKind::IEND {
            chunk.write_to(&mut output).unwrap();
        }
    }

    assert_eq!(output.len(), 45);
    assert_eq!(output, support::minimal_png());
}

#[test]
fn copy_all_reproduces_input() {
    let input = png(&[
        ihdr(),
        png_chunk(b"gAMA", &[0, 0, 0xB1, 0x8F]),
        png_chunk(b"IDAT", &[0x5A; 3000]),
        png_chunk(b"IDAT", &[0xA5; 10]),
        iend(),
    ]);
    let png = parse(&input).unwrap();

    assert_eq!(copy_all(&png), input);
}

#[test]
fn length_fields_match_descriptors() {
    let input = png_with_text();
    let png = parse(&input).unwrap();

    for chunk in png.descriptors() {
        let at = chunk.data_offset as usize;
        assert!(chunk.data_offset >= 16);
        let len = u32::from_be_bytes(input[at - 8..at - 4].try_into().unwrap());
        assert_eq!(len, chunk.len);
        assert_eq!(&input[at - 4..at], &chunk.kind.0);
    }
}

#[test]
fn round_trip_keeps_descriptors() {
    let input = png(&[ihdr(), png_chunk(b"pHYs", &[0; 9]), png_chunk(b"IDAT", &[1; 40]), iend()]);
    let first = parse(&input).unwrap();
    let second = parse(&copy_all(&first)).unwrap();

    assert_eq!(first.descriptors(), second.descriptors());
}

#[test]
fn trailing_data_is_not_fatal() {
    let mut input = support::minimal_png();
    input.push(0x00);
    let png = parse(&input).unwrap();

    assert_eq!(png.descriptors().len(), 2);
    let trailing = png.trailing_data().unwrap();
    assert_eq!((trailing.position, trailing.end), (45, 46));
    assert_eq!(trailing.len(), 1);
    assert!(matches!(
        png.into_strict(),
        Err(MetastripError::TrailingData {
            position: 45,
            end: 46
        })
    ));
}

#[test]
fn bad_signature() {
    let mut input = support::minimal_png();
    input[1] = b'p';

    assert!(matches!(parse(&input), Err(MetastripError::BadSignature)));
}

#[test]
fn short_signature() {
    assert!(matches!(
        parse(&PNG_SIGNATURE[..5]),
        Err(MetastripError::ShortRead { offset: 0 })
    ));
}

#[test]
fn first_chunk_must_be_ihdr() {
    let input = png(&[png_chunk(b"tEXt", b"x"), ihdr(), iend()]);

    assert!(matches!(parse(&input), Err(MetastripError::BadHeader(_))));
}

#[test]
fn ihdr_must_be_13_bytes() {
    let input = png(&[png_chunk(b"IHDR", &[0; 12]), iend()]);

    assert!(matches!(parse(&input), Err(MetastripError::BadHeader(_))));
}

#[test]
fn truncated_chunk_header() {
    let mut input = support::minimal_png();
    input.truncate(38);

    assert!(matches!(
        parse(&input),
        Err(MetastripError::ShortRead { offset: 37 })
    ));
}

#[test]
fn truncated_chunk_data() {
    let mut input = png(&[ihdr(), png_chunk(b"IDAT", &[0; 100]), iend()]);
    input.truncate(80);

    assert!(matches!(parse(&input), Err(MetastripError::ShortRead { .. })));
}

#[test]
fn missing_iend() {
    let input = png(&[ihdr(), png_chunk(b"IDAT", &[0; 4])]);

    assert!(matches!(parse(&input), Err(MetastripError::ShortRead { .. })));
}

#[test]
fn iend_past_end_of_file() {
    let mut input = png(&[ihdr(), png_chunk(b"IEND", &[0; 8])]);
    input.truncate(input.len() - 6);

    assert!(matches!(parse(&input), Err(MetastripError::ShortRead { .. })));
}

#[test]
fn non_ascii_chunk_type_is_kept_verbatim() {
    let input = png(&[ihdr(), png_chunk(&[0x00, 0xFF, 0x10, 0x7F], b"??"), iend()]);
    let png = parse(&input).unwrap();

    assert_eq!(png.descriptors()[1].kind.0, [0x00, 0xFF, 0x10, 0x7F]);
    assert_eq!(png.descriptors()[1].kind.to_string(), "0x00ff107f");
    assert_eq!(copy_all(&png), input);
}

#[test]
fn chunk_kind_parsing() {
    assert_eq!("tEXt".parse::<ChunkKind>().unwrap(), ChunkKind(*b"tEXt"));
    assert_eq!("0x00ff107f".parse::<ChunkKind>().unwrap(), ChunkKind([0, 0xFF, 0x10, 0x7F]));
    assert!("TEXTS".parse::<ChunkKind>().is_err());
    assert!("te1t".parse::<ChunkKind>().is_err());
    assert!(ChunkKind::IDAT.is_critical());
    assert!(!ChunkKind(*b"eXIf").is_critical());
}

#[test]
fn copy_after_close_fails() {
    let mut png = parse(&support::minimal_png()).unwrap();
    png.close().unwrap();

    assert!(png.is_closed());
    let mut output: Vec<u8> = Vec::new();
    let chunk = png.chunks().next().unwrap();
    assert!(matches!(chunk.write_to(&mut output), Err(MetastripError::SourceClosed)));
    assert!(output.is_empty());
    assert!(matches!(png.close(), Err(MetastripError::AlreadyClosed)));
}

#[test]
fn display_lists_chunks() {
    let png = parse(&support::minimal_png()).unwrap();

    assert_eq!(
        png.to_string(),
        "test.png\n\"IHDR\": len: 13, offset: 16\n\"IEND\": len: 0, offset: 41\n"
    );
}

#[test]
fn open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("image.png");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(&png_with_text()).unwrap();
    drop(file);

    let png = PngFile::open(&path).unwrap();
    assert_eq!(png.file_path(), path);
    assert_eq!(png.descriptors().len(), 3);

    let mut output: Vec<u8> = Vec::new();
    png.chunks().nth(1).unwrap().write_to(&mut output).unwrap();
    assert_eq!(output, png_chunk(b"tEXt", b"a\0bc"));
}

#[test]
fn open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.png");

    assert!(matches!(PngFile::open(&path), Err(MetastripError::NotFound(p)) if p == path));
}
