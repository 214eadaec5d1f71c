//! Sentinel-terminated input buffer for zero-bounds-check scanning.
//!
//! The buffer guarantees a `0x00` sentinel byte after the input content,
//! allowing the match loop to detect end-of-input without explicit bounds
//! checking. The total buffer size is rounded up to the next 64-byte
//! boundary, which also provides safe padding for `peek()` near the end.
//!
//! The engine imposes no constraints on the input text itself: byte order
//! marks, control characters, and interior null bytes are all ordinary
//! input. An interior null (U+0000) is distinguished from the sentinel by
//! position -- a null at `pos < len()` is content, a null at `pos >= len()`
//! is end-of-input.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Sentinel-terminated input buffer.
///
/// # Layout
///
/// ```text
/// [input_bytes..., 0x00, padding_zeros...]
///  ^               ^     ^
///  0               |     rounded up to 64-byte boundary
///             len() (sentinel)
/// ```
///
/// The sentinel byte at `len()` is always `0x00`. All subsequent bytes
/// (cache-line padding) are also `0x00`, ensuring safe reads for `peek()`
/// past the end of the input.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: `[input_bytes..., 0x00 sentinel, 0x00 padding...]`.
    buf: Vec<u8>,
    /// Length of the actual input content (excludes sentinel and padding).
    input_len: u32,
}

impl SourceBuffer {
    /// Create a new sentinel-terminated buffer from input text.
    ///
    /// Copies the input bytes into a cache-line-rounded buffer with a
    /// `0x00` sentinel byte appended.
    ///
    /// # Input Size
    ///
    /// All offsets are `u32`; inputs larger than `u32::MAX` bytes
    /// (~4 GiB) are not supported and `len()` saturates at `u32::MAX`.
    pub fn new(input: &str) -> Self {
        let input_bytes = input.as_bytes();
        let input_len = input_bytes.len();

        // Round up to next 64-byte boundary (minimum: input + 1 sentinel byte).
        let padded_len = (input_len + 1 + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        // Allocate zero-filled buffer, then copy input bytes.
        // The sentinel (buf[input_len]) and padding are already 0x00.
        let mut buf = vec![0u8; padded_len];
        buf[..input_len].copy_from_slice(input_bytes);

        let input_len_u32 = u32::try_from(input_len).unwrap_or(u32::MAX);

        Self {
            buf,
            input_len: input_len_u32,
        }
    }

    /// Returns the input bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.input_len as usize]
    }

    /// Create a [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.input_len)
    }

    /// Create a [`Cursor`] positioned at `pos`.
    ///
    /// The session re-creates its cursor from a saved position on every
    /// step, so the buffer and the cursor never live in the same struct.
    ///
    /// # Contract
    ///
    /// `pos <= len()`. Positions come from a previous cursor over this
    /// buffer, which never advances past the sentinel.
    pub fn cursor_at(&self, pos: u32) -> Cursor<'_> {
        debug_assert!(pos <= self.input_len, "cursor position past end of input");
        let mut cursor = Cursor::new(&self.buf, self.input_len);
        cursor.advance_n(pos);
        cursor
    }

    /// Length of the input content in bytes (excludes sentinel and padding).
    pub fn len(&self) -> u32 {
        self.input_len
    }

    /// Returns `true` if the input content is empty.
    pub fn is_empty(&self) -> bool {
        self.input_len == 0
    }
}

/// Size assertion: `SourceBuffer` should stay pointer-sized-small.
/// Vec<u8> = 24, u32 = 4, + padding = 32.
const _: () = assert!(std::mem::size_of::<SourceBuffer>() <= 32);
