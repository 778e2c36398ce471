use crate::decoding::bit_reader::BitReader;
use crate::encoding::bit_writer::BitWriter;

/// One symbol of a canonical prefix code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuffmanSymbol {
    /// The codeword, left-aligned in the high bits. Bits below `length` are zero.
    pub code: u32,
    /// Number of valid bits in `code`.
    pub length: u8,
    /// Symbol ordinal. For HPACK, ids 0..=255 are the byte values and id 256
    /// is the end-of-string marker.
    pub id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HuffmanTableError {
    #[error("expected symbol id {expected} but found {found}, ids must be sequential starting at 0")]
    NonSequentialId { expected: u16, found: u16 },
    #[error("symbol {id} has a code length of {length} bits, must be between 1 and 32")]
    LengthOutOfRange { id: u16, length: u8 },
    #[error("the shortest code must be all zero bits but symbol {id} has {code:#010x}")]
    FirstCodeNonZero { id: u16, code: u32 },
    #[error("symbol {id} does not follow the canonical sequence, expected code {expected:#010x} but found {found:#010x}")]
    NonCanonicalCode { id: u16, expected: u32, found: u32 },
    #[error("the code space is exhausted before symbol {id}")]
    CodeSpaceOverflow { id: u16 },
    #[error("the longest code must have at least 8 bits to derive the padding byte, symbol {id} has {length}")]
    PadTooShort { id: u16, length: u8 },
}

impl HuffmanTableError {
    /// Id of the symbol at which validation failed.
    pub fn failed_symbol_id(&self) -> u16 {
        match *self {
            HuffmanTableError::NonSequentialId { expected, .. } => expected,
            HuffmanTableError::LengthOutOfRange { id, .. }
            | HuffmanTableError::FirstCodeNonZero { id, .. }
            | HuffmanTableError::NonCanonicalCode { id, .. }
            | HuffmanTableError::CodeSpaceOverflow { id }
            | HuffmanTableError::PadTooShort { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HuffmanDecodeError {
    #[error("input contains a bit pattern that is not a prefix of any code")]
    InvalidCode,
    #[error("unconsumed input remains that is not a prefix of the padding byte")]
    TrailingGarbage,
    #[error("the end-of-string symbol must not occur in decoded output")]
    EosEmitted,
}

/// How many bits the root decode table indexes.
const ROOT_INDEXED_BITS: u8 = 9;
/// Most bits a lower-level decode table may index.
const BRANCH_INDEXED_BITS: u8 = 6;
/// Fewest bits a lower-level decode table may index.
const MIN_INDEXED_BITS: u8 = 3;

/// A block of decode entries reached after `prefix_length` bits have already
/// been matched, indexing the next `indexed_length` bits of input.
///
/// All blocks share one flat entry pool; `entries_offset` locates this one.
#[derive(Debug, Clone, Copy)]
struct DecodeTable {
    prefix_length: u8,
    indexed_length: u8,
    entries_offset: usize,
}

impl DecodeTable {
    fn size(&self) -> usize {
        1 << self.indexed_length
    }
}

/// Outcome of one decode table lookup.
///
/// When `length` fits within the bits indexed so far the entry is terminal
/// and names `symbol_id`; otherwise `next_table_index` points at the table
/// for the following bits and `length` records the longest code reachable
/// beneath it. `length == 0` marks a slot no code uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DecodeEntry {
    next_table_index: u8,
    length: u8,
    symbol_id: u16,
}

/// An immutable Huffman codec built once from a canonical code listing.
///
/// Encoding walks two arrays indexed by symbol id. Decoding walks a chain of
/// lookup tables, the root indexing the first 9 bits of a code and lower
/// levels indexing a few more bits each.
pub struct HuffmanTable {
    code_by_id: Vec<u32>,
    length_by_id: Vec<u8>,
    decode_tables: Vec<DecodeTable>,
    decode_entries: Vec<DecodeEntry>,
    /// First 8 bits of the last (longest) code, used to pad and to validate
    /// trailing bits.
    pad_bits: u8,
    failed_symbol_id: Option<u16>,
}

impl HuffmanTable {
    pub fn new() -> HuffmanTable {
        HuffmanTable {
            code_by_id: Vec::new(),
            length_by_id: Vec::new(),
            decode_tables: Vec::new(),
            decode_entries: Vec::new(),
            pad_bits: 0,
            failed_symbol_id: None,
        }
    }

    /// True once [HuffmanTable::initialize] has succeeded.
    pub fn is_initialized(&self) -> bool {
        !self.code_by_id.is_empty()
    }

    /// The id recorded by a failed [HuffmanTable::initialize], if any.
    pub fn failed_symbol_id(&self) -> Option<u16> {
        self.failed_symbol_id
    }

    /// Build the encode arrays and the decode table chain from `symbols`.
    ///
    /// The listing must assign ids 0..n without gaps and its codes must form
    /// a canonical prefix code: sorted by (length, id) the first code is all
    /// zeros and each successor is the previous code incremented and widened.
    /// On failure the offending symbol id is retained and the table stays
    /// unusable. A table is initialized at most once, a second call panics.
    pub fn initialize(&mut self, symbols: &[HuffmanSymbol]) -> Result<(), HuffmanTableError> {
        assert!(
            !self.is_initialized() && self.failed_symbol_id.is_none(),
            "a table is initialized at most once"
        );
        if let Err(e) = self.validate_and_build(symbols) {
            self.failed_symbol_id = Some(e.failed_symbol_id());
            return Err(e);
        }
        Ok(())
    }

    fn validate_and_build(&mut self, symbols: &[HuffmanSymbol]) -> Result<(), HuffmanTableError> {
        use HuffmanTableError as err;

        assert!(!symbols.is_empty(), "a prefix code needs at least one symbol");
        assert!(symbols.len() <= 1 << 16, "symbol ids must fit in a u16");

        let mut by_id = symbols.to_vec();
        by_id.sort_by_key(|s| s.id);
        for (expected, symbol) in by_id.iter().enumerate() {
            if symbol.id as usize != expected {
                return Err(err::NonSequentialId {
                    expected: expected as u16,
                    found: symbol.id,
                });
            }
            if symbol.length == 0 || symbol.length > 32 {
                return Err(err::LengthOutOfRange {
                    id: symbol.id,
                    length: symbol.length,
                });
            }
        }

        // A canonical code listed by (length, id) must also be ordered by
        // code, each one following from the last by increment-and-widen.
        // Left-aligned codes make the widening implicit.
        let mut canonical = by_id.clone();
        canonical.sort_by_key(|s| (s.length, s.id));

        let first = canonical[0];
        if first.code != 0 {
            return Err(err::FirstCodeNonZero {
                id: first.id,
                code: first.code,
            });
        }
        for pair in canonical.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let (expected, overflowed) = prev.code.overflowing_add(1 << (32 - prev.length));
            if overflowed {
                return Err(err::CodeSpaceOverflow { id: next.id });
            }
            if next.code != expected {
                return Err(err::NonCanonicalCode {
                    id: next.id,
                    expected,
                    found: next.code,
                });
            }
        }

        // The pad byte is the leading 8 bits of the last code, so that code
        // must be at least a byte long.
        let last = canonical[canonical.len() - 1];
        if last.length < 8 {
            return Err(err::PadTooShort {
                id: last.id,
                length: last.length,
            });
        }

        self.code_by_id = by_id.iter().map(|s| s.code).collect();
        self.length_by_id = by_id.iter().map(|s| s.length).collect();
        self.pad_bits = (last.code >> 24) as u8;
        self.build_decode_tables(&canonical);
        Ok(())
    }

    fn build_decode_tables(&mut self, canonical: &[HuffmanSymbol]) {
        self.add_decode_table(0, ROOT_INDEXED_BITS);

        for (i, symbol) in canonical.iter().enumerate() {
            let mut table_index = 0usize;
            loop {
                let table = self.decode_tables[table_index];
                let index =
                    ((symbol.code << table.prefix_length) >> (32 - table.indexed_length)) as usize;
                let indexed_to_here = table.prefix_length + table.indexed_length;
                let slot = table.entries_offset + index;

                if indexed_to_here < symbol.length {
                    // The code outruns this table. Descend into the next
                    // level, allocating it on first contact.
                    let mut entry = self.decode_entries[slot];
                    if entry.length == 0 {
                        // Canonical codes ascend, so every code sharing this
                        // prefix is adjacent and the last one is the longest.
                        let prefix_shift = 32 - indexed_to_here;
                        let prefix = symbol.code >> prefix_shift;
                        let mut longest = symbol.length;
                        for other in &canonical[i + 1..] {
                            if other.code >> prefix_shift != prefix {
                                break;
                            }
                            longest = other.length;
                        }
                        let indexed_length = (longest - indexed_to_here)
                            .clamp(MIN_INDEXED_BITS, BRANCH_INDEXED_BITS);
                        entry.next_table_index = self.add_decode_table(indexed_to_here, indexed_length);
                        entry.length = longest;
                        self.decode_entries[slot] = entry;
                    }
                    table_index = entry.next_table_index as usize;
                } else {
                    // Terminal. Every slot whose leading bits are this code
                    // resolves to the symbol.
                    let entry = DecodeEntry {
                        next_table_index: table_index as u8,
                        length: symbol.length,
                        symbol_id: symbol.id,
                    };
                    let fill = 1usize << (indexed_to_here - symbol.length);
                    for offset in 0..fill {
                        self.decode_entries[slot + offset] = entry;
                    }
                    break;
                }
            }
        }
    }

    fn add_decode_table(&mut self, prefix_length: u8, indexed_length: u8) -> u8 {
        assert!(
            self.decode_tables.len() < u8::MAX as usize,
            "decode table chain grew too long"
        );
        let table = DecodeTable {
            prefix_length,
            indexed_length,
            entries_offset: self.decode_entries.len(),
        };
        self.decode_entries
            .resize(self.decode_entries.len() + table.size(), DecodeEntry::default());
        self.decode_tables.push(table);
        (self.decode_tables.len() - 1) as u8
    }

    /// Number of bytes [HuffmanTable::encode_string] will produce for `input`.
    pub fn encoded_size(&self, input: &[u8]) -> usize {
        assert!(self.is_initialized(), "the table was never initialized");
        let bits: usize = input
            .iter()
            .map(|&byte| self.length_by_id[byte as usize] as usize)
            .sum();
        bits.div_ceil(8)
    }

    /// Append the code of every byte of `input` to `sink`, then pad the last
    /// byte with the leading bits of the end-of-string code.
    pub fn encode_string(&self, input: &[u8], sink: &mut BitWriter) {
        assert!(self.is_initialized(), "the table was never initialized");
        for &byte in input {
            sink.append_bits(self.code_by_id[byte as usize], self.length_by_id[byte as usize]);
        }
        sink.pad_to_byte(self.pad_bits);
    }

    /// Decode symbols from `source` into `out` until the input is exhausted
    /// or `out_capacity` bytes have been produced.
    ///
    /// `out` is cleared first and, on failure, holds everything decoded up to
    /// that point. Trailing bits must be a strict prefix of the padding byte;
    /// once the capacity is reached at most 7 such bits may remain.
    pub fn decode_string(
        &self,
        source: &mut BitReader<'_>,
        out_capacity: usize,
        out: &mut Vec<u8>,
    ) -> Result<(), HuffmanDecodeError> {
        use HuffmanDecodeError as err;

        assert!(self.is_initialized(), "the table was never initialized");
        out.clear();
        loop {
            let remaining = source.bits_remaining();
            if out.len() == out_capacity {
                // Past the cap only partial padding may remain.
                if remaining == 0
                    || (remaining <= 7 && source.matches_prefix(self.pad_bits, remaining as u8))
                {
                    return Ok(());
                }
                return Err(err::TrailingGarbage);
            }
            if remaining == 0 {
                return Ok(());
            }

            // A partial final byte is either padding or a short last symbol.
            let in_tail = remaining < 8;
            if in_tail && source.matches_prefix(self.pad_bits, remaining as u8) {
                return Ok(());
            }
            let unresolved = if in_tail {
                err::TrailingGarbage
            } else {
                err::InvalidCode
            };

            let mut table = self.decode_tables[0];
            loop {
                let (peeked, available) = source.peek_bits(table.indexed_length);
                let index = (peeked >> (32 - table.indexed_length)) as usize;
                let entry = self.decode_entries[table.entries_offset + index];

                if entry.length == 0 {
                    return Err(unresolved);
                }
                if entry.length <= table.prefix_length + table.indexed_length {
                    let needed = entry.length - table.prefix_length;
                    if needed > available {
                        return Err(unresolved);
                    }
                    source.consume_bits(needed);
                    if entry.symbol_id > u8::MAX as u16 {
                        return Err(err::EosEmitted);
                    }
                    out.push(entry.symbol_id as u8);
                    break;
                }
                if available < table.indexed_length {
                    return Err(unresolved);
                }
                source.consume_bits(table.indexed_length);
                table = self.decode_tables[entry.next_table_index as usize];
            }
        }
    }
}

impl Default for HuffmanTable {
    fn default() -> Self {
        Self::new()
    }
}
