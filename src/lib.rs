//! A pure Rust implementation of the Huffman codec used by HPACK, the HTTP/2
//! header compression scheme (RFC 7541 Section 5.2 and Appendix B).
//!
//! A [HuffmanTable] is built once from a canonical code listing, is immutable
//! afterwards and may be shared freely between encoders and decoders.
//! [hpack_huffman_code] yields the listing from RFC 7541 Appendix B.
//!
//! ```
//! use ruhpack::decoding::bit_reader::BitReader;
//! use ruhpack::encoding::bit_writer::BitWriter;
//! use ruhpack::{hpack_huffman_code, HuffmanTable};
//!
//! let mut table = HuffmanTable::new();
//! table.initialize(&hpack_huffman_code()).unwrap();
//!
//! let mut writer = BitWriter::new();
//! table.encode_string(b"no-cache", &mut writer);
//! let encoded = writer.take_bytes();
//! assert_eq!(encoded.len(), table.encoded_size(b"no-cache"));
//!
//! let mut decoded = Vec::new();
//! table
//!     .decode_string(&mut BitReader::new(&encoded), 8, &mut decoded)
//!     .unwrap();
//! assert_eq!(decoded, b"no-cache");
//! ```

pub mod decoding;
pub mod encoding;
pub mod huffman;
#[cfg(test)]
mod tests;

pub use huffman::{
    hpack_huffman_code, HuffmanDecodeError, HuffmanSymbol, HuffmanTable, HuffmanTableError,
};
