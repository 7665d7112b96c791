//! Streaming LZW with adjusted binary codes.
//!
//! This is a greedy LZW variant with three twists over the textbook
//! algorithm.  First, codes are written as adjusted binary (phase-in)
//! codes sized to the exact number of codes the decoder can accept next,
//! so the symbol width grows a fraction of a bit at a time instead of
//! jumping whole bits.  Second, once the dictionary is full it keeps
//! adapting by recycling leaf entries instead of freezing.  Third, the
//! encoder watches its own ratio and resets the dictionary when recent
//! output has been expanding, which keeps worst-case inflation on
//! incompressible data to a few percent.
//!
//! Streams are self delimiting: one `maxbits` header byte, then LSB-first
//! codes ending with a reserved stop code and zero padding to the next
//! byte boundary.  The codecs work on `Read`/`Write` trait objects and
//! never seek, so they can sit directly on pipes.

use std::io::{Cursor,Read,Write,BufReader,BufWriter,ErrorKind};
use crate::tools::bits::{CodeReader,CodeWriter};
use crate::tools::dictionary::{Dictionary,CLEAR,END,FIRST_STRING};
use crate::DYNERR;

/// smallest accepted maximum code width
pub const MIN_CODE_BITS: usize = 9;
/// largest accepted maximum code width
pub const MAX_CODE_BITS: usize = 16;

/// alphabet size right after a clear: 256 literals plus the two
/// reserved codes
const INIT_ALPHABET: usize = FIRST_STRING;

/// the ratio monitor stays quiet until this many input bytes have been
/// coded since the last clear
const FLUSH_WINDOW: u64 = 64;
/// slack before a clear is forced, in output bits beyond break-even
const FLUSH_SLACK_BITS: u64 = 128;

/// Main compression function.
/// `expanded_in` is an object with the `Read` trait, usually `std::fs::File` or `std::io::Cursor<&[u8]>`.
/// `compressed_out` is an object with the `Write` trait, usually `std::fs::File` or `std::io::Cursor<Vec<u8>>`.
/// `max_bits` caps the symbol width for this stream and is recorded in its header.
/// Returns (in_size,out_size) or error.
pub fn compress<R,W>(expanded_in: &mut R, compressed_out: &mut W, max_bits: usize) -> Result<(u64,u64),DYNERR>
where R: Read, W: Write {
    if max_bits < MIN_CODE_BITS || max_bits > MAX_CODE_BITS {
        return Err(Box::new(crate::Error::BadCodeWidth));
    }
    let mut reader = BufReader::new(expanded_in);
    let mut writer = BufWriter::new(compressed_out);
    let mut coder = CodeWriter::new();
    let mut dictionary = Dictionary::create(max_bits);
    let max_strings = dictionary.max_strings();

    writer.write_all(&[max_bits as u8])?;

    // count of codes the decoder will accept for the next symbol; this
    // includes the slot the pending insertion will take, which is what
    // lets the decoder resolve a self-referential code
    let mut alphabet = INIT_ALPHABET;
    let mut w_code: Option<usize> = None;
    let mut match_len: u64 = 0;
    let mut bytes_in: u64 = 0;
    // ratio monitor accumulators, reset at every clear
    let mut window_bytes: u64 = 0;
    let mut window_base_bits: u64 = 0;
    let mut byte_in: [u8;1] = [0];

    log::debug!("compress with {} bit codes, {} strings",max_bits,max_strings);
    loop {
        match reader.read_exact(&mut byte_in) {
            Ok(()) => {
                bytes_in += 1;
                let b = byte_in[0];
                w_code = match w_code {
                    None => {
                        match_len = 1;
                        Some(b as usize)
                    },
                    Some(w) => match dictionary.lookup(w as u16,b) {
                        Some(longer) => {
                            match_len += 1;
                            Some(longer as usize)
                        },
                        None => {
                            log::trace!("code: {}",w);
                            coder.put_code(w,alphabet,&mut writer)?;
                            dictionary.insert(w as u16,b);
                            if alphabet < max_strings {
                                alphabet += 1;
                            }
                            window_bytes += match_len;
                            let window_bits = coder.bits_written() - window_base_bits;
                            if window_bytes >= FLUSH_WINDOW && window_bits > 8*window_bytes + FLUSH_SLACK_BITS {
                                log::debug!("flush dictionary: {} bits out for {} bytes in",window_bits,window_bytes);
                                coder.put_code(CLEAR,alphabet,&mut writer)?;
                                dictionary.reset();
                                alphabet = INIT_ALPHABET;
                                window_bytes = 0;
                                window_base_bits = coder.bits_written();
                            }
                            match_len = 1;
                            Some(b as usize)
                        }
                    }
                };
            },
            Err(e) if e.kind()==ErrorKind::UnexpectedEof => {
                if let Some(w) = w_code {
                    log::trace!("code: {}",w);
                    coder.put_code(w,alphabet,&mut writer)?;
                    if alphabet < max_strings {
                        alphabet += 1;
                    }
                }
                coder.put_code(END,alphabet,&mut writer)?;
                coder.flush(&mut writer)?;
                writer.flush()?;
                log::debug!("end of input after {} bytes",bytes_in);
                return Ok((bytes_in,1 + (coder.bits_written() + 7)/8));
            },
            Err(e) => return Err(Box::new(e))
        }
    }
}

/// Main decompression function.
/// `compressed_in` is an object with the `Read` trait, usually `std::fs::File` or `std::io::Cursor<&[u8]>`.
/// `expanded_out` is an object with the `Write` trait, usually `std::fs::File` or `std::io::Cursor<Vec<u8>>`.
/// Returns (in_size,out_size) or error.  Success requires a well formed
/// stream up to and including the stop code; trailing padding is ignored.
pub fn expand<R,W>(compressed_in: &mut R, expanded_out: &mut W) -> Result<(u64,u64),DYNERR>
where R: Read, W: Write {
    let mut reader = BufReader::new(compressed_in);
    let mut writer = BufWriter::new(expanded_out);
    let mut decoder = CodeReader::new();

    let mut header: [u8;1] = [0];
    match reader.read_exact(&mut header) {
        Ok(()) => {},
        Err(e) if e.kind()==ErrorKind::UnexpectedEof => return Err(Box::new(crate::Error::Truncated)),
        Err(e) => return Err(Box::new(e))
    }
    let max_bits = header[0] as usize;
    if max_bits < MIN_CODE_BITS || max_bits > MAX_CODE_BITS {
        log::error!("header byte {} outside code width range",header[0]);
        return Err(Box::new(crate::Error::BadHeader));
    }
    let mut dictionary = Dictionary::create(max_bits);
    let max_strings = dictionary.max_strings();
    let mut alphabet = INIT_ALPHABET;
    let mut prev: Option<usize> = None;
    // reused across symbols, the longest possible string is bounded by
    // the dictionary size
    let mut string_buf: Vec<u8> = Vec::with_capacity(max_strings);
    let mut bytes_out: u64 = 0;

    log::debug!("expand with {} bit codes, {} strings",max_bits,max_strings);
    loop {
        // the encoder inserts a string as a side effect of every code it
        // emits, so the alphabet runs one ahead of completed insertions
        if prev.is_some() && alphabet < max_strings {
            alphabet += 1;
        }
        let code = match decoder.get_code(alphabet,&mut reader) {
            Ok(c) => c,
            Err(e) if e.kind()==ErrorKind::UnexpectedEof => return Err(Box::new(crate::Error::Truncated)),
            Err(e) => return Err(Box::new(e))
        };
        log::trace!("code: {}",code);
        if code == END {
            break;
        }
        if code == CLEAR {
            log::debug!("clear dictionary");
            dictionary.reset();
            alphabet = INIT_ALPHABET;
            prev = None;
            continue;
        }
        string_buf.clear();
        let first = match prev {
            Some(p) if dictionary.next_slot(p as u16)==Some(code) => {
                // the code the encoder assigned while emitting the
                // previous symbol: its string is the previous string
                // extended by its own first byte
                let f = dictionary.expand(p,&mut string_buf)?;
                string_buf.push(f);
                f
            },
            _ => {
                if !dictionary.is_assigned(code) {
                    log::error!("code {} is not assigned",code);
                    return Err(Box::new(crate::Error::BadCode));
                }
                dictionary.expand(code,&mut string_buf)?
            }
        };
        if let Some(p) = prev {
            dictionary.insert(p as u16,first);
        }
        writer.write_all(&string_buf)?;
        bytes_out += string_buf.len() as u64;
        prev = Some(code);
    }
    writer.flush()?;
    Ok((1 + decoder.bytes_read(),bytes_out))
}

/// Convenience function, calls `compress` with a slice returning a Vec
pub fn compress_slice(slice: &[u8],max_bits: usize) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    compress(&mut src,&mut ans,max_bits)?;
    Ok(ans.into_inner())
}

/// Convenience function, calls `expand` with a slice returning a Vec
pub fn expand_slice(slice: &[u8]) -> Result<Vec<u8>,DYNERR> {
    let mut src = Cursor::new(slice);
    let mut ans: Cursor<Vec<u8>> = Cursor::new(Vec::new());
    expand(&mut src,&mut ans)?;
    Ok(ans.into_inner())
}

// *************** TESTS *****************

#[test]
fn compression_works() {
    // empty input is a header byte and a framed stop code
    let compressed = compress_slice(&[],9).expect("compression failed");
    assert_eq!(compressed,hex::decode("09ff01").unwrap());
    // one literal, then the stop code against a 259 symbol alphabet
    let compressed = compress_slice("A".as_bytes(),12).expect("compression failed");
    assert_eq!(compressed,hex::decode("0c41ff00").unwrap());
    // "AAAA" exercises a string code and a self-referential expansion
    let compressed = compress_slice("AAAA".as_bytes(),9).expect("compression failed");
    assert_eq!(compressed,hex::decode("0941ff83fc01").unwrap());
}

#[test]
fn empty_round_trip() {
    let compressed = compress_slice(&[],9).expect("compression failed");
    let expanded = expand_slice(&compressed).expect("expansion failed");
    assert_eq!(expanded,Vec::<u8>::new());
}

#[test]
fn invertibility() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    for max_bits in MIN_CODE_BITS..=MAX_CODE_BITS {
        let compressed = compress_slice(test_data,max_bits).expect("compression failed");
        let expanded = expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data.to_vec(),expanded);
    }
}

#[test]
fn self_referential_codes() {
    // "ABAB..." makes the decoder meet a code one step ahead of its own
    // dictionary, "AAAA..." does it with a run
    for test_data in ["ABABABABABABABAB","AAAAAAAA"] {
        let compressed = compress_slice(test_data.as_bytes(),9).expect("compression failed");
        let expanded = expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data.as_bytes().to_vec(),expanded);
    }
}

#[test]
fn width_growth_round_trip() {
    // compressible word salad grows the dictionary steadily, carrying
    // the alphabet across each power-of-two boundary below the cap
    let words: [&[u8];8] = [b"alpha ",b"bravo ",b"charlie ",b"delta ",
        b"echo ",b"foxtrot ",b"golf ",b"hotel "];
    let mut test_data = Vec::new();
    let mut seed: u32 = 0xbeef;
    while test_data.len() < 40_000 {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        test_data.extend_from_slice(words[(seed >> 16) as usize % 8]);
    }
    for max_bits in [MIN_CODE_BITS,10,11] {
        let compressed = compress_slice(&test_data,max_bits).expect("compression failed");
        assert!(compressed.len() < test_data.len());
        let expanded = expand_slice(&compressed).expect("expansion failed");
        assert_eq!(test_data,expanded);
    }
}

#[test]
fn rejects_bad_code_width() {
    assert!(compress_slice("x".as_bytes(),8).is_err());
    assert!(compress_slice("x".as_bytes(),17).is_err());
}

#[test]
fn rejects_bad_header() {
    assert!(expand_slice(&[0x08,0xff,0x01]).is_err());
    assert!(expand_slice(&[0x20,0xff,0x01]).is_err());
    assert!(expand_slice(&[]).is_err());
}

#[test]
fn rejects_truncation() {
    let test_data = "I am Sam. Sam I am. I do not like this Sam I am.\n".as_bytes();
    let compressed = compress_slice(test_data,9).expect("compression failed");
    // cutting anywhere before the stop code must fail cleanly
    assert!(expand_slice(&compressed[0..1]).is_err());
    assert!(expand_slice(&compressed[0..compressed.len()/2]).is_err());
}

#[test]
fn garbage_streams_never_crash() {
    // arbitrary bytes after a plausible header must decode to something
    // or fail, never panic
    for fill in [0x00,0x55,0xaa,0xff] {
        let mut stream = vec![0x09];
        stream.extend(vec![fill;257]);
        let _ = expand_slice(&stream);
    }
}
