use crate::decoding::bit_reader::BitReader;
use crate::encoding::bit_writer::BitWriter;
use crate::huffman::{hpack_huffman_code, HuffmanDecodeError, HuffmanTable};

use rand::{Rng, SeedableRng};

fn hpack_table() -> HuffmanTable {
    let mut table = HuffmanTable::new();
    table.initialize(&hpack_huffman_code()).unwrap();
    table
}

fn a2b_hex(hex: &str) -> Vec<u8> {
    assert!(hex.len() % 2 == 0);
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

fn encode(table: &HuffmanTable, input: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::new();
    table.encode_string(input, &mut writer);
    let encoded = writer.take_bytes();
    assert_eq!(encoded.len(), table.encoded_size(input));
    encoded
}

fn decode(table: &HuffmanTable, input: &[u8], capacity: usize) -> Vec<u8> {
    let mut out = Vec::new();
    table
        .decode_string(&mut BitReader::new(input), capacity, &mut out)
        .unwrap();
    out
}

// Header field values from the worked examples in RFC 7541 Appendix C,
// encoded bit-exactly.
const FIXTURES: &[(&str, &str)] = &[
    ("www.example.com", "f1e3c2e5f23a6ba0ab90f4ff"),
    ("no-cache", "a8eb10649cbf"),
    ("custom-key", "25a849e95ba97d7f"),
    ("custom-value", "25a849e95bb8e8b4bf"),
    ("302", "6402"),
    ("private", "aec3771a4b"),
    ("Mon, 21 Oct 2013 20:13:21 GMT", "d07abe941054d444a8200595040b8166e082a62d1bff"),
    ("https://www.example.com", "9d29ad171863c78f0b97c8e9ae82ae43d3"),
    (
        "foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
        "94e7821dd7f2e6c7b335dfdfcd5b3960d5af27087f3672c1ab270fb5291f9587316065c003ed4ee5b1063d5007",
    ),
];

#[test]
fn rfc_fixtures_encode() {
    let table = hpack_table();
    for (plain, hex) in FIXTURES {
        assert_eq!(
            encode(&table, plain.as_bytes()),
            a2b_hex(hex),
            "encoding {:?}",
            plain
        );
    }
}

#[test]
fn rfc_fixtures_decode() {
    let table = hpack_table();
    for (plain, hex) in FIXTURES {
        assert_eq!(
            decode(&table, &a2b_hex(hex), plain.len()),
            plain.as_bytes(),
            "decoding {:?}",
            plain
        );
    }
}

#[test]
fn round_trip_individual_symbols() {
    let table = hpack_table();
    for byte in 0..=255u8 {
        let input = [byte; 3];
        let encoded = encode(&table, &input);
        assert_eq!(decode(&table, &encoded, input.len()), input, "byte {}", byte);
    }
}

#[test]
fn round_trip_symbol_sequence() {
    let table = hpack_table();
    let mut input = Vec::with_capacity(512);
    input.extend(0..=255u8);
    input.extend((0..=255u8).rev());
    let encoded = encode(&table, &input);
    assert_eq!(decode(&table, &encoded, input.len()), input);
}

#[test]
fn encoded_size_agrees_with_encode_string() {
    let table = hpack_table();
    let all_values: Vec<u8> = (0..=255).collect();
    let cases: &[&[u8]] = &[
        b"",
        b"Mon, 21 Oct 2013 20:13:21 GMT",
        b"https://www.example.com",
        b"foo=ASDJKHQKBZXOQWEOPIUAXQWEOIU; max-age=3600; version=1",
        b"\0",
        b"foo\0bar",
        &all_values,
    ];
    for input in cases {
        // the encode helper asserts the agreement
        let _ = encode(&table, input);
    }
}

#[test]
fn random_round_trips() {
    let table = hpack_table();
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0xDEADBEEF);
    for _ in 0..2000 {
        let len = rng.gen_range(0..64);
        let input: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let encoded = encode(&table, &input);
        assert_eq!(decode(&table, &encoded, input.len()), input);
        // a roomier cap must not change the outcome
        let mut out = Vec::new();
        table
            .decode_string(&mut BitReader::new(&encoded), input.len() + 13, &mut out)
            .unwrap();
        assert_eq!(out, input);
    }
}

#[test]
fn decoded_output_never_exceeds_the_cap() {
    let table = hpack_table();
    let mut rng = rand::rngs::SmallRng::seed_from_u64(0x0DD_BA11);
    for _ in 0..2000 {
        let len = rng.gen_range(0..32);
        let blob: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
        let cap = rng.gen_range(0..24);
        let mut out = Vec::new();
        let _ = table.decode_string(&mut BitReader::new(&blob), cap, &mut out);
        assert!(out.len() <= cap);
    }
}

#[test]
fn a_tight_cap_fails_with_trailing_garbage() {
    let table = hpack_table();
    let encoded = encode(&table, b"www.example.com");
    let mut out = Vec::new();
    let err = table
        .decode_string(&mut BitReader::new(&encoded), 3, &mut out)
        .unwrap_err();
    assert_eq!(err, HuffmanDecodeError::TrailingGarbage);
    assert_eq!(out, b"www");
}
