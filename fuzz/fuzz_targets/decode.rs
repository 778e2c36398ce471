#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate ruhpack;
use ruhpack::decoding::bit_reader::BitReader;
use ruhpack::huffman::{hpack_huffman_code, HuffmanTable};

fuzz_target!(|data: &[u8]| {
    let mut table = HuffmanTable::new();
    table.initialize(&hpack_huffman_code()).unwrap();

    let mut out = Vec::new();
    let mut reader = BitReader::new(data);
    // decoding adversarial input must never panic or overrun the cap
    let _ = table.decode_string(&mut reader, data.len() * 2, &mut out);
    assert!(out.len() <= data.len() * 2);
});
