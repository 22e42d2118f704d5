//! Shared test helpers: a greedy lzo1x stream assembler and the data patterns
//! the decoder is exercised with.
//!
//! The assembler only needs to emit valid bytecode, not small bytecode. It
//! uses literal runs (both the first-instruction form and the long form,
//! with continuation bytes) and M2, M3 and M4 matches. M1 is never emitted.

#![allow(dead_code)]

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

const M2_MAX_LEN: usize = 8;
const M2_MAX_OFFSET: usize = 0x0800;
const M3_MAX_OFFSET: usize = 0x4000;
const M4_MAX_OFFSET: usize = 0xBFFF;

pub fn encode(data: &[u8]) -> Vec<u8> {
    let mut asm = Assembler::default();
    let mut last_seen: HashMap<[u8; 3], usize> = HashMap::new();
    let mut lit_start = 0;
    let mut i = 0;

    while i + 3 <= data.len() {
        let key = [data[i], data[i + 1], data[i + 2]];
        match last_seen.insert(key, i) {
            Some(candidate) if i - candidate <= M4_MAX_OFFSET => {
                let mut len = 3;
                while i + len < data.len() && data[candidate + len] == data[i + len] {
                    len += 1;
                }

                asm.literals(&data[lit_start..i]);
                asm.matched(len, i - candidate);

                for j in i + 1..i + len {
                    if j + 3 <= data.len() {
                        last_seen.insert([data[j], data[j + 1], data[j + 2]], j);
                    }
                }
                i += len;
                lit_start = i;
            }
            _ => i += 1,
        }
    }

    asm.literals(&data[lit_start..]);
    asm.finish()
}

#[derive(Default)]
struct Assembler {
    out: Vec<u8>,
    // byte whose two low bits carry the trailing literal count of the last match
    state_pos: Option<usize>,
    started: bool,
}

impl Assembler {
    fn literals(&mut self, lit: &[u8]) {
        let n = lit.len();
        if n == 0 {
            return;
        }

        if !self.started {
            if n <= 238 {
                self.out.push((n + 17) as u8);
            } else {
                self.long_literal(n);
            }
        } else if n <= 3 {
            let pos = self.state_pos.expect("short literal run must follow a match");
            self.out[pos] |= n as u8;
        } else {
            self.long_literal(n);
        }

        self.started = true;
        self.state_pos = None;
        self.out.extend_from_slice(lit);
    }

    fn long_literal(&mut self, n: usize) {
        if n <= 18 {
            self.out.push((n - 3) as u8);
        } else {
            self.out.push(0);
            self.continuation(n - 18);
        }
    }

    fn matched(&mut self, len: usize, dist: usize) {
        assert!(self.started, "a match cannot open the stream");

        if len <= M2_MAX_LEN && dist <= M2_MAX_OFFSET {
            let d = dist - 1;
            self.out.push((((len - 1) << 5) | ((d & 7) << 2)) as u8);
            self.state_pos = Some(self.out.len() - 1);
            self.out.push((d >> 3) as u8);
        } else if dist <= M3_MAX_OFFSET {
            if len <= 33 {
                self.out.push(0x20 | (len - 2) as u8);
            } else {
                self.out.push(0x20);
                self.continuation(len - 33);
            }
            self.distance(dist - 1);
        } else {
            let d = dist - 0x4000;
            let high = ((d & 0x4000) >> 11) as u8;
            if len <= 9 {
                self.out.push(0x10 | high | (len - 2) as u8);
            } else {
                self.out.push(0x10 | high);
                self.continuation(len - 9);
            }
            self.distance(d & 0x3FFF);
        }
    }

    fn distance(&mut self, d: usize) {
        self.state_pos = Some(self.out.len());
        self.out.push((d << 2) as u8);
        self.out.push((d >> 6) as u8);
    }

    fn continuation(&mut self, mut rest: usize) {
        while rest > 255 {
            self.out.push(0);
            rest -= 255;
        }
        self.out.push(rest as u8);
    }

    fn finish(mut self) -> Vec<u8> {
        self.out.extend_from_slice(&[0x11, 0x00, 0x00]);
        self.out
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Pattern {
    Random,
    Repeated,
    Zeros,
    Text,
    Mixed,
}

pub const PATTERNS: [Pattern; 5] = [
    Pattern::Random,
    Pattern::Repeated,
    Pattern::Zeros,
    Pattern::Text,
    Pattern::Mixed,
];

pub const SIZES: [usize; 5] = [1024, 16 * 1024, 64 * 1024, 256 * 1024, 1024 * 1024];

const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog. ";

pub fn generate(size: usize, pattern: Pattern) -> Vec<u8> {
    let mut data = vec![0u8; size];
    match pattern {
        Pattern::Random => StdRng::seed_from_u64(size as u64).fill_bytes(&mut data),
        Pattern::Repeated => {
            for (i, b) in data.iter_mut().enumerate() {
                *b = i as u8;
            }
        }
        Pattern::Zeros => {}
        Pattern::Text => {
            for (i, b) in data.iter_mut().enumerate() {
                *b = FOX[i % FOX.len()];
            }
        }
        Pattern::Mixed => {
            let quarter = size / 4;
            data[..quarter].copy_from_slice(&generate(quarter, Pattern::Random));
            data[quarter..2 * quarter].copy_from_slice(&generate(quarter, Pattern::Repeated));
            data[3 * quarter..].copy_from_slice(&generate(size - 3 * quarter, Pattern::Text));
        }
    }
    data
}

pub fn fixed_cases() -> Vec<(&'static str, Vec<u8>)> {
    let mut mixed = Vec::new();
    mixed.extend_from_slice(b"Text section with repeating patterns.\n");
    for _ in 0..50 {
        mixed.extend_from_slice(&[0xAA, 0xBB]);
    }
    mixed.extend_from_slice(b"\nMore text here with different content.\n");
    mixed.extend_from_slice(&[0x00; 100]);
    mixed.extend_from_slice(b"\nFinal text section.\n");

    vec![
        ("empty", Vec::new()),
        ("really-short", b"Short stack!".to_vec()),
        ("short", b"Hello, World! This is a small test string.".to_vec()),
        ("short-repeated", b"ABCD".repeat(100)),
        ("long-repeated", FOX.repeat(200)),
        ("zeros", vec![0u8; 1000]),
        (
            "lorem-ipsum",
            b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. \n\
Sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \n\
Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris \n\
nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \n\
reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla \n\
pariatur. Excepteur sint occaecat cupidatat non proident, sunt in \n\
culpa qui officia deserunt mollit anim id est laborum."
                .to_vec(),
        ),
        ("binary", (0..=255u8).collect()),
        ("mixed", mixed),
        (
            "json",
            br#"{
  "users": [
    {"id": 1, "name": "Alice", "email": "alice@example.com"},
    {"id": 2, "name": "Bob", "email": "bob@example.com"},
    {"id": 3, "name": "Charlie", "email": "charlie@example.com"}
  ],
  "metadata": {
    "version": "1.0",
    "created": "2024-01-01",
    "count": 3
  }
}"#
            .to_vec(),
        ),
    ]
}
