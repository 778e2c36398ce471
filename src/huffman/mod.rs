/// Huffman coding is a method of encoding where symbols are assigned a code,
/// and more commonly used symbols get shorter codes, and less commonly
/// used symbols get longer codes. Codes are prefix free, meaning no two codes
/// will start with the same sequence of bits.
///
/// HPACK (RFC 7541) fixes one such code for all of HTTP/2 header compression:
/// 256 byte symbols plus an end-of-string marker whose leading bits pad the
/// final byte of every encoded string.
mod hpack_code;
mod huffman_table;

pub use hpack_code::hpack_huffman_code;
pub use huffman_table::{HuffmanDecodeError, HuffmanSymbol, HuffmanTable, HuffmanTableError};

use crate::decoding::bit_reader::BitReader;
use crate::encoding::bit_writer::BitWriter;

/// Encode `data` with the HPACK table, decode it back and assert the result
/// matches. Exercised by the fuzz targets.
pub fn round_trip(data: &[u8]) {
    let mut table = HuffmanTable::new();
    table.initialize(&hpack_huffman_code()).unwrap();

    let mut writer = BitWriter::new();
    table.encode_string(data, &mut writer);
    let encoded = writer.take_bytes();
    assert_eq!(encoded.len(), table.encoded_size(data));

    let mut reader = BitReader::new(&encoded);
    let mut decoded = Vec::new();
    table
        .decode_string(&mut reader, data.len(), &mut decoded)
        .unwrap();
    assert_eq!(decoded, data);
}

#[test]
fn roundtrip() {
    round_trip(b"no-cache");
}
