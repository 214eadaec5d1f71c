//! Zero-cost cursor over a sentinel-terminated buffer.
//!
//! The cursor advances through the buffer byte-by-byte. End-of-input is
//! detected when the current byte equals the sentinel (`0x00`) and the
//! position has reached or exceeded the input length. No explicit bounds
//! checking is performed in the common case -- the sentinel guarantees
//! safe termination.
//!
//! # Interior Null Bytes
//!
//! If the input contains interior null bytes (U+0000), the cursor
//! distinguishes them from end-of-input by comparing `pos` against
//! `input_len`. A null at `pos < input_len` is ordinary content; a null
//! at `pos >= input_len` is the sentinel.

use crate::ByteSet;

/// Zero-cost cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor) or
/// [`SourceBuffer::cursor_at()`](crate::SourceBuffer::cursor_at). The
/// cursor is [`Copy`]; the session snapshots and re-creates cursors freely
/// because all real state is the position.
///
/// # Invariant
///
/// `buf` must be sentinel-terminated: `buf[input_len] == 0x00`, and all
/// bytes after `input_len` are `0x00` (cache-line padding). This is
/// guaranteed by [`SourceBuffer`](crate::SourceBuffer) construction.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (input + sentinel + padding).
    buf: &'a [u8],
    /// Current read position (byte index into `buf`).
    pos: u32,
    /// Length of actual input content (excludes sentinel and padding).
    input_len: u32,
}

/// Size assertion: Cursor should be <= 24 bytes on 64-bit platforms.
/// &[u8] = 16 (fat pointer), u32 = 4, u32 = 4 => 24 bytes.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0 over a sentinel-terminated buffer.
    ///
    /// # Contract
    ///
    /// `buf[input_len]` must be `0x00` (sentinel). All bytes after the
    /// sentinel must also be `0x00` (padding). This is guaranteed by
    /// `SourceBuffer::new()`.
    pub(crate) fn new(buf: &'a [u8], input_len: u32) -> Self {
        debug_assert!(
            (input_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[input_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            pos: 0,
            input_len,
        }
    }

    /// Returns the byte at the current position.
    ///
    /// Returns `0x00` at end-of-input (the sentinel byte). Interior null
    /// bytes also return `0x00`; use [`is_eof()`](Self::is_eof) to
    /// distinguish.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// Returns the byte one position ahead of current.
    ///
    /// Safe to call at any position: the sentinel and cache-line padding
    /// guarantee valid reads beyond the input content.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf[self.pos as usize + 1]
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance the cursor by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Returns `true` if the cursor has reached end-of-input.
    ///
    /// End-of-input is when the current byte is the sentinel (`0x00`) and
    /// the position is at or past the input length. This distinguishes
    /// end-of-input from interior null bytes.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0 && self.pos >= self.input_len
    }

    /// Current byte offset in the input.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the input content (excludes sentinel and padding).
    #[inline]
    pub fn input_len(&self) -> u32 {
        self.input_len
    }

    /// Extract an input substring as `&str`.
    ///
    /// # Contract
    ///
    /// `start..end` must fall within the input content (`end <= input_len`)
    /// and on valid UTF-8 character boundaries. This holds for all spans
    /// the engine produces: token spans cover whole literals (themselves
    /// valid UTF-8 starting on a boundary), and leading-text spans run
    /// between token spans, so every boundary is a character boundary of
    /// the originally-valid `&str` input.
    #[allow(
        unsafe_code,
        reason = "from_utf8_unchecked on input originally validated as &str"
    )]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(
            end <= self.input_len,
            "slice end {end} exceeds input length {}",
            self.input_len
        );
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        // SAFETY: The buffer was constructed from `&str` (valid UTF-8), and
        // engine spans always fall on character boundaries (see Contract).
        unsafe { std::str::from_utf8_unchecked(&self.buf[start as usize..end as usize]) }
    }

    /// Extract an input substring from `start` to the current position.
    ///
    /// Equivalent to `self.slice(start, self.pos())`.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Advance to the next byte that is a member of `set`, or to
    /// end-of-input if none remains. Returns the number of bytes skipped.
    ///
    /// Used to skip runs of leading text toward the next position where a
    /// token could start. Sets with at most three members use
    /// SIMD-accelerated memchr; larger sets use a scalar loop over the
    /// membership table. Interior nulls are skipped like any other
    /// non-member byte (the scan stays within `input_len`).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= input_len which fits in u32"
    )]
    pub fn skip_to_byte_in(&mut self, set: &ByteSet) -> u32 {
        let start = self.pos;
        let remaining = &self.buf[self.pos as usize..self.input_len as usize];

        let found = if set.is_empty() {
            // Nothing can match: skip straight to end-of-input.
            None
        } else {
            match set.memchr_needles() {
                Some(&[a]) => memchr::memchr(a, remaining),
                Some(&[a, b]) => memchr::memchr2(a, b, remaining),
                Some(&[a, b, c]) => memchr::memchr3(a, b, c, remaining),
                // Four or more members: scalar scan over the table.
                _ => remaining.iter().position(|&b| set.contains(b)),
            }
        };

        match found {
            Some(offset) => self.pos += offset as u32,
            None => self.pos = self.input_len,
        }
        self.pos - start
    }
}
