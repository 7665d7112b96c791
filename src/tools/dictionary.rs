//! Prefix-forest dictionary for LZW coding.
//!
//! Every string code denotes a one byte extension of another code, so the
//! dictionary is a forest of chains rooted at the 256 literal codes.  The
//! chains are stored as parallel `prefix`/`terminator` arrays with a
//! `HashMap` over `(prefix,terminator)` as the encoder's child lookup.
//!
//! Once every slot has been assigned the dictionary keeps adapting by
//! recycling: a cyclic cursor scans for a leaf (a code no other entry uses
//! as its prefix) and the new pair overwrites it.  Leaves carry no
//! references, so the rest of the forest stays intact.  Both codec sides
//! run the same scan against the same state, which keeps the replacement
//! choices in lock step without transmitting them.

use std::collections::HashMap;

/// reserved code that resets the dictionary on both sides
pub const CLEAR: usize = 256;
/// reserved code that terminates the stream
pub const END: usize = 257;
/// first code available for string assignment
pub const FIRST_STRING: usize = 258;

pub struct Dictionary {
    max_strings: usize,
    /// code of the string this code extends, one entry per slot
    prefix: Vec<u16>,
    /// final byte of the string at this slot
    terminator: Vec<u8>,
    /// number of assigned codes using this slot as their prefix
    children: Vec<u16>,
    /// (prefix,terminator) -> code, the encoder's longest-match index
    index: HashMap<(u16,u8),u16>,
    /// head of the free list; the list is always the ascending range
    /// `next_free..max_strings`
    next_free: usize,
    /// recycle scan position, meaningful once the free list is empty
    cursor: usize
}

impl Dictionary {
    /// Allocate all state for a dictionary of `1 << max_bits` codes.
    /// Nothing allocates after this call.
    pub fn create(max_bits: usize) -> Self {
        let max_strings = 1 << max_bits;
        Self {
            max_strings,
            prefix: vec![0;max_strings],
            terminator: vec![0;max_strings],
            children: vec![0;max_strings],
            index: HashMap::with_capacity(max_strings),
            next_free: FIRST_STRING,
            cursor: FIRST_STRING
        }
    }
    /// back to the initial state: 258 assigned codes, empty index, full
    /// free list
    pub fn reset(&mut self) {
        self.children.fill(0);
        self.index.clear();
        self.next_free = FIRST_STRING;
        self.cursor = FIRST_STRING;
    }
    pub fn max_strings(&self) -> usize {
        self.max_strings
    }
    /// true once the free list has been exhausted and recycling has begun
    pub fn is_full(&self) -> bool {
        self.next_free == self.max_strings
    }
    /// is `code` currently bound to a string (literals always are)
    pub fn is_assigned(&self,code: usize) -> bool {
        code < CLEAR || (code >= FIRST_STRING && code < self.next_free)
    }
    /// child lookup for the encoder's longest-match loop
    pub fn lookup(&self,prefix: u16,ext: u8) -> Option<u16> {
        self.index.get(&(prefix,ext)).copied()
    }
    /// Scan for a recycling victim starting at the cursor: the first leaf
    /// that is not `new_prefix` (an entry cannot be its own prefix).
    /// Returns `None` in the degenerate case where no slot qualifies.
    fn find_victim(&self,new_prefix: u16) -> Option<usize> {
        let mut c = self.cursor;
        for _i in FIRST_STRING..self.max_strings {
            if self.children[c] == 0 && c != new_prefix as usize {
                return Some(c);
            }
            c += 1;
            if c == self.max_strings {
                c = FIRST_STRING;
            }
        }
        None
    }
    /// The slot the next `insert` with this prefix will occupy, without
    /// changing any state.  The decoder compares incoming codes against
    /// this to catch self-referential codes.
    pub fn next_slot(&self,new_prefix: u16) -> Option<usize> {
        match self.is_full() {
            false => Some(self.next_free),
            true => self.find_victim(new_prefix)
        }
    }
    /// Bind `(prefix,ext)` to a fresh code, taken from the head of the
    /// free list while it lasts, afterwards by recycling a leaf.  Returns
    /// the slot used, or `None` if no slot could be recycled (the
    /// insertion is skipped identically on both sides).
    pub fn insert(&mut self,prefix: u16,ext: u8) -> Option<u16> {
        let slot = match self.is_full() {
            false => {
                let s = self.next_free;
                self.next_free += 1;
                s
            },
            true => {
                let s = self.find_victim(prefix)?;
                let old_key = (self.prefix[s],self.terminator[s]);
                self.index.remove(&old_key);
                self.children[old_key.0 as usize] -= 1;
                self.cursor = match s + 1 == self.max_strings {
                    true => FIRST_STRING,
                    false => s + 1
                };
                s
            }
        };
        self.prefix[slot] = prefix;
        self.terminator[slot] = ext;
        self.children[prefix as usize] += 1;
        self.index.insert((prefix,ext),slot as u16);
        Some(slot as u16)
    }
    /// Append the string denoted by `code` to `out` in left-to-right order
    /// and return its first byte.  Walks the prefix chain down to a
    /// literal, pushing terminators, then reverses in place.
    pub fn expand(&self,code: usize,out: &mut Vec<u8>) -> Result<u8,crate::Error> {
        let start = out.len();
        let mut c = code;
        for _i in 0..=self.max_strings {
            if c < CLEAR {
                out.push(c as u8);
                out[start..].reverse();
                return Ok(out[start]);
            }
            out.push(self.terminator[c]);
            c = self.prefix[c] as usize;
        }
        // chains are acyclic by construction, a longer walk means the
        // caller handed us a reserved or unassigned code
        Err(crate::Error::BadCode)
    }
}

// *************** TESTS *****************

#[test]
fn growth_consumes_free_list_in_order() {
    let mut dictionary = Dictionary::create(9);
    assert_eq!(dictionary.next_slot(65),Some(FIRST_STRING));
    assert_eq!(dictionary.insert(65,b'b'),Some(258));
    assert_eq!(dictionary.insert(66,b'c'),Some(259));
    assert_eq!(dictionary.lookup(65,b'b'),Some(258));
    assert_eq!(dictionary.lookup(66,b'c'),Some(259));
    assert_eq!(dictionary.lookup(65,b'c'),None);
    assert!(dictionary.is_assigned(259));
    assert!(!dictionary.is_assigned(260));
}

#[test]
fn expansion_walks_to_the_root() {
    let mut dictionary = Dictionary::create(9);
    dictionary.insert(b'a' as u16,b'b');     // 258 = "ab"
    dictionary.insert(258,b'c');             // 259 = "abc"
    dictionary.insert(259,b'd');             // 260 = "abcd"
    let mut out = Vec::new();
    let first = dictionary.expand(260,&mut out).expect("expand err");
    assert_eq!(out,b"abcd");
    assert_eq!(first,b'a');
}

#[test]
fn recycling_picks_leaves_only() {
    let mut dictionary = Dictionary::create(9);
    // fill all 254 free slots with a chain hanging off 'a', so every
    // slot except the last is somebody's prefix
    let mut prev = b'a' as u16;
    for _i in FIRST_STRING..512 {
        prev = dictionary.insert(prev,b'x').unwrap();
    }
    assert!(dictionary.is_full());
    // only 511, the end of the chain, is a leaf
    assert_eq!(dictionary.next_slot(b'a' as u16),Some(511));
    assert_eq!(dictionary.insert(b'a' as u16,b'y'),Some(511));
    assert_eq!(dictionary.lookup(b'a' as u16,b'y'),Some(511));
    // the old key is gone and 510 became a leaf in its place
    assert_eq!(dictionary.lookup(510,b'x'),None);
    assert_eq!(dictionary.next_slot(b'a' as u16),Some(510));
}

#[test]
fn recycling_never_selects_the_new_prefix() {
    let mut dictionary = Dictionary::create(9);
    let mut prev = b'a' as u16;
    for _i in FIRST_STRING..512 {
        prev = dictionary.insert(prev,b'x').unwrap();
    }
    // 511 is the only leaf; extending 511 itself must not evict it
    assert_eq!(dictionary.next_slot(511),None);
    assert_eq!(dictionary.insert(511,b'z'),None);
    // the dictionary is unchanged by the skipped insertion
    assert_eq!(dictionary.lookup(510,b'x'),Some(511));
}

#[test]
fn reset_restores_initial_state() {
    let mut dictionary = Dictionary::create(9);
    dictionary.insert(65,b'b');
    dictionary.reset();
    assert_eq!(dictionary.lookup(65,b'b'),None);
    assert!(!dictionary.is_assigned(258));
    assert_eq!(dictionary.next_slot(65),Some(FIRST_STRING));
}
