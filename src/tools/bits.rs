//! Bit-level I/O for adjusted binary codes.
//!
//! Codes are packed least-significant-bit first within each byte and may
//! span byte boundaries.  Both sides keep a `u32` accumulator, enough for
//! two 16 bit codes, so a code is never split across refills.
//!
//! The code width is not fixed: a value in `[0,n)` is written with either
//! `floor(log2 n)` or `floor(log2 n) + 1` bits (an adjusted binary code,
//! also called a phase-in code).  When `n` is a power of two this reduces
//! to plain fixed-width binary.

use std::io::{BufReader,BufWriter,Read,Write};

/// short code width `k` and the number of "short" codewords for an
/// alphabet of `n` symbols; the remaining codewords take `k+1` bits
fn short_codes(n: usize) -> (u32,usize) {
    let k = usize::BITS - 1 - n.leading_zeros();
    (k,(1 << (k+1)) - n)
}

/// Packs adjusted binary codes into a byte stream.
pub struct CodeWriter {
    acc: u32,
    nbits: u32,
    count: u64
}

impl CodeWriter {
    pub fn new() -> Self {
        Self {
            acc: 0,
            nbits: 0,
            count: 0
        }
    }
    /// total bits accepted so far, including bits still in the accumulator
    pub fn bits_written(&self) -> u64 {
        self.count
    }
    fn put_bits<W: Write>(&mut self,val: u32,num_bits: u32,writer: &mut BufWriter<W>) -> Result<(),std::io::Error> {
        self.acc |= val << self.nbits;
        self.nbits += num_bits;
        self.count += num_bits as u64;
        while self.nbits >= 8 {
            writer.write_all(&[(self.acc & 0xff) as u8])?;
            self.acc >>= 8;
            self.nbits -= 8;
        }
        Ok(())
    }
    /// Write `code` as an adjusted binary code for an alphabet of
    /// `alphabet` symbols.  Short codewords take `k = floor(log2 alphabet)`
    /// bits; the rest take `k+1`, emitted high part first so the reader
    /// can decide the length from the first `k` bits.
    pub fn put_code<W: Write>(&mut self,code: usize,alphabet: usize,writer: &mut BufWriter<W>) -> Result<(),std::io::Error> {
        let (k,t) = short_codes(alphabet);
        if code < t {
            self.put_bits(code as u32,k,writer)
        } else {
            let adjusted = code + t;
            self.put_bits((adjusted >> 1) as u32,k,writer)?;
            self.put_bits((adjusted & 1) as u32,1,writer)
        }
    }
    /// pad to the next byte boundary with zero bits and write the
    /// final byte if there is one
    pub fn flush<W: Write>(&mut self,writer: &mut BufWriter<W>) -> Result<(),std::io::Error> {
        if self.nbits > 0 {
            writer.write_all(&[(self.acc & 0xff) as u8])?;
            self.acc = 0;
            self.nbits = 0;
        }
        Ok(())
    }
}

/// Unpacks adjusted binary codes from a byte stream.
pub struct CodeReader {
    acc: u32,
    nbits: u32,
    bytes: u64
}

impl CodeReader {
    pub fn new() -> Self {
        Self {
            acc: 0,
            nbits: 0,
            bytes: 0
        }
    }
    /// bytes pulled from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }
    /// Get `num_bits` bits, pulling source bytes into the high end of the
    /// accumulator as needed.  Runs of fewer than `num_bits` remaining bits
    /// surface as `ErrorKind::UnexpectedEof`.
    fn get_bits<R: Read>(&mut self,num_bits: u32,reader: &mut BufReader<R>) -> Result<u32,std::io::Error> {
        let mut by: [u8;1] = [0];
        while self.nbits < num_bits {
            reader.read_exact(&mut by)?;
            self.acc |= (by[0] as u32) << self.nbits;
            self.nbits += 8;
            self.bytes += 1;
        }
        let val = self.acc & ((1 << num_bits) - 1);
        self.acc >>= num_bits;
        self.nbits -= num_bits;
        Ok(val)
    }
    /// Inverse of `CodeWriter::put_code` for the same `alphabet`.
    pub fn get_code<R: Read>(&mut self,alphabet: usize,reader: &mut BufReader<R>) -> Result<usize,std::io::Error> {
        let (k,t) = short_codes(alphabet);
        let head = self.get_bits(k,reader)? as usize;
        if head < t {
            Ok(head)
        } else {
            let tail = self.get_bits(1,reader)? as usize;
            Ok(((head << 1) | tail) - t)
        }
    }
}

// *************** TESTS *****************

#[cfg(test)]
fn write_codes(codes: &[(usize,usize)]) -> Vec<u8> {
    let mut cur: std::io::Cursor<Vec<u8>> = std::io::Cursor::new(Vec::new());
    let mut writer = BufWriter::new(&mut cur);
    let mut coder = CodeWriter::new();
    for (code,alphabet) in codes {
        coder.put_code(*code,*alphabet,&mut writer).expect("write err");
    }
    coder.flush(&mut writer).expect("write err");
    writer.flush().expect("write err");
    drop(writer);
    cur.into_inner()
}

#[test]
fn short_and_long_codewords() {
    // alphabet 258: k=8, 254 short codewords
    let (k,t) = short_codes(258);
    assert_eq!((k,t),(8,254));
    // power of two degenerates to fixed width
    let (k,t) = short_codes(512);
    assert_eq!((k,t),(9,512));
    let (k,t) = short_codes(65536);
    assert_eq!((k,t),(16,65536));
}

#[test]
fn packing_works() {
    // literal 0x41 with alphabet 258 is the bare byte
    assert_eq!(write_codes(&[(0x41,258)]),[0x41]);
    // code 256 with alphabet 258 adjusts to 510: eight high bits then a zero
    assert_eq!(write_codes(&[(256,258)]),[0xff,0x00]);
    // code 257 with alphabet 258 adjusts to 511
    assert_eq!(write_codes(&[(257,258)]),[0xff,0x01]);
}

#[test]
fn invertibility() {
    // mix of short and long codewords across a growing alphabet
    let mut codes: Vec<(usize,usize)> = Vec::new();
    let mut alphabet = 258;
    for v in [0usize,65,253,254,255,256,257,258,300,511] {
        if v < alphabet {
            codes.push((v,alphabet));
        }
        alphabet += 37;
    }
    let bytes = write_codes(&codes);
    let mut cur = std::io::Cursor::new(bytes);
    let mut reader = BufReader::new(&mut cur);
    let mut decoder = CodeReader::new();
    for (code,alphabet) in &codes {
        assert_eq!(decoder.get_code(*alphabet,&mut reader).expect("read err"),*code);
    }
}

#[test]
fn eof_mid_code() {
    let bytes = write_codes(&[(0x41,258)]);
    let mut cur = std::io::Cursor::new(&bytes[..]);
    let mut reader = BufReader::new(&mut cur);
    let mut decoder = CodeReader::new();
    assert_eq!(decoder.get_code(258,&mut reader).expect("read err"),0x41);
    // the stream is exhausted, a 9 bit read must fail cleanly
    match decoder.get_code(512,&mut reader) {
        Err(e) if e.kind()==std::io::ErrorKind::UnexpectedEof => {},
        _ => panic!("expected unexpected-eof")
    }
}
