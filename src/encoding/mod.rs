//! Structures and utilities used for producing a Huffman coded bit stream.

pub mod bit_writer;
