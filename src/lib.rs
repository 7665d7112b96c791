//! # AB-LZW Library
//!
//! Compress or expand byte streams with adjusted-binary LZW.
//! * `lzw` is the codec: greedy LZW with phase-in (adjusted binary) symbol
//!   codes, a recycling dictionary, and ratio-driven dictionary resets
//!
//! The compression/expansion functions are generics that operate on trait
//! objects with bounds `Read` or `Write`.  They stream one byte at a time
//! and never seek, so sources and sinks can be files, pipes, or buffers.
//! There are convenience functions for working directly with buffers.
//!
//! ## File Example
//!
//! ```rs
//! use ablzw::*;
//! let mut in_file = std::fs::File::open("some_input_path").expect("open failed");
//! let mut out_file = std::fs::File::create("some_output_path").expect("create failed");
//! let (in_size,out_size) = lzw::compress(&mut in_file,&mut out_file,12)
//!     .expect("compression failed");
//! eprintln!("compressed {} into {}",in_size,out_size);
//! ```
//!
//! ## Buffer Example
//!
//! ```rs
//! use ablzw::*;
//! let test_data = "This is the chaunt of the priests.  The chaunt of the priests of Mung.".as_bytes();
//! let compressed = lzw::compress_slice(test_data,12).expect("compression failed");
//! let expanded = lzw::expand_slice(&compressed).expect("expansion failed");
//! ```

mod tools;
pub mod lzw;

type DYNERR = Box<dyn std::error::Error>;

/// Codec Errors
#[derive(thiserror::Error,Debug)]
pub enum Error {
    #[error("bad stream header")]
    BadHeader,
    #[error("bad symbol code")]
    BadCode,
    #[error("truncated stream")]
    Truncated,
    #[error("code width out of range")]
    BadCodeWidth
}
