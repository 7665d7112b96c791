//! Round-trip and robustness properties of the adjusted-binary LZW codec,
//! exercised through the public buffer API.

use ablzw::lzw;
use rand::rngs::StdRng;
use rand::{Rng,SeedableRng};

/// header plus end framing plus margin for the final monitor segment
const FRAMING_SLACK: usize = 16;

fn word_salad(len: usize,seed: u64) -> Vec<u8> {
    let words: [&[u8];16] = [b"the ",b"quick ",b"brown ",b"fox ",b"jumps ",
        b"over ",b"lazy ",b"dog ",b"pack ",b"my ",b"box ",b"with ",
        b"five ",b"dozen ",b"liquor ",b"jugs "];
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ans = Vec::with_capacity(len + 8);
    while ans.len() < len {
        ans.extend_from_slice(words[rng.gen_range(0..16)]);
    }
    ans
}

#[test]
fn random_data_round_trips_at_every_width() {
    let mut rng = StdRng::seed_from_u64(1);
    let test_data: Vec<u8> = (0..4096).map(|_| rng.gen::<u8>()).collect();
    for max_bits in 9..=16 {
        let compressed = lzw::compress_slice(&test_data,max_bits).expect("compression failed");
        assert!(compressed.len() <= (test_data.len() * 108 + 99) / 100 + FRAMING_SLACK);
        let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn text_round_trips_at_every_width() {
    let test_data = word_salad(100_000,2);
    for max_bits in 9..=16 {
        let compressed = lzw::compress_slice(&test_data,max_bits).expect("compression failed");
        assert!(compressed.len() < test_data.len());
        let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn repetitive_megabyte_shrinks_hard() {
    let test_data = vec![b'A';1_000_000];
    let compressed = lzw::compress_slice(&test_data,16).expect("compression failed");
    assert!(compressed.len() < test_data.len()/100);
    let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn incompressible_megabyte_stays_bounded() {
    let mut rng = StdRng::seed_from_u64(3);
    let test_data: Vec<u8> = (0..1_048_576).map(|_| rng.gen::<u8>()).collect();
    let compressed = lzw::compress_slice(&test_data,12).expect("compression failed");
    assert!(compressed.len() <= (test_data.len() * 108 + 99) / 100 + FRAMING_SLACK);
    let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn recycle_regime_round_trips() {
    // compressible input far beyond 10x the 512 slot dictionary keeps
    // the leaf-recycling path busy on both sides
    let test_data = word_salad(65_536,4);
    let compressed = lzw::compress_slice(&test_data,9).expect("compression failed");
    let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn deep_width_growth_round_trips() {
    // words salted with digit pairs keep matches short, so enough codes
    // are assigned to cross every power-of-two width boundary and fill
    // all 2^16 slots, ending in the recycling regime
    let words: [&[u8];8] = [b"north",b"south",b"east",b"west",
        b"upper",b"lower",b"inner",b"outer"];
    let mut rng = StdRng::seed_from_u64(5);
    let mut test_data = Vec::new();
    while test_data.len() < 600_000 {
        test_data.extend_from_slice(words[rng.gen_range(0..8)]);
        test_data.push(b'0' + rng.gen_range(0..10));
        test_data.push(b'0' + rng.gen_range(0..10));
    }
    let compressed = lzw::compress_slice(&test_data,16).expect("compression failed");
    let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
    assert_eq!(test_data,expanded);
}

#[test]
fn determinism() {
    let test_data = word_salad(10_000,6);
    let first = lzw::compress_slice(&test_data,12).expect("compression failed");
    let second = lzw::compress_slice(&test_data,12).expect("compression failed");
    assert_eq!(first,second);
}

#[test]
fn corrupt_streams_never_crash() {
    let test_data = word_salad(2_048,7);
    let compressed = lzw::compress_slice(&test_data,10).expect("compression failed");
    let mut rng = StdRng::seed_from_u64(8);
    for _trial in 0..10_000 {
        let mut mutated = compressed.clone();
        let bit = rng.gen_range(0..mutated.len()*8);
        mutated[bit/8] ^= 1 << (bit%8);
        // either outcome is fine, a panic or hang is not
        let _ = lzw::expand_slice(&mutated);
    }
}

#[test]
fn truncated_streams_never_crash() {
    let test_data = word_salad(2_048,9);
    let compressed = lzw::compress_slice(&test_data,10).expect("compression failed");
    for cut in 0..compressed.len() {
        match lzw::expand_slice(&compressed[0..cut]) {
            // only a cut inside the trailing padding can still decode,
            // and then it must decode to the original
            Ok(expanded) => assert_eq!(test_data,expanded),
            Err(_) => {}
        }
    }
}
