use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// The rewrite primitive: byte-span replacement with verification.
///
/// Every rename compiles down to one of these, applied to an in-memory
/// buffer. The text currently at `[byte_start, byte_end)` must equal
/// `expected_before`, or nothing is changed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply_to() is called"]
pub struct Edit {
    /// Starting byte offset (inclusive)
    pub byte_start: usize,
    /// Ending byte offset (exclusive)
    pub byte_end: usize,
    /// New text to insert at [byte_start, byte_end)
    pub new_text: String,
    /// What the span must contain before the edit
    pub expected_before: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Before-text verification failed at [{byte_start}, {byte_end}): expected {expected:?}, found {found:?}")]
    BeforeTextMismatch {
        byte_start: usize,
        byte_end: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid byte range: [{byte_start}, {byte_end}) in buffer of length {len}")]
    InvalidByteRange {
        byte_start: usize,
        byte_end: usize,
        len: usize,
    },
}

impl Edit {
    pub fn new(
        byte_start: usize,
        byte_end: usize,
        new_text: impl Into<String>,
        expected_before: impl Into<String>,
    ) -> Self {
        Self {
            byte_start,
            byte_end,
            new_text: new_text.into(),
            expected_before: expected_before.into(),
        }
    }

    /// Validate the edit against the buffer, returning the current span text.
    ///
    /// Spans that are out of bounds or split a UTF-8 character are invalid.
    pub fn validate<'a>(&self, content: &'a str) -> Result<&'a str, EditError> {
        let current = content
            .get(self.byte_start..self.byte_end)
            .ok_or(EditError::InvalidByteRange {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                len: content.len(),
            })?;

        if current != self.expected_before {
            return Err(EditError::BeforeTextMismatch {
                byte_start: self.byte_start,
                byte_end: self.byte_end,
                expected: self.expected_before.clone(),
                found: current.to_string(),
            });
        }

        Ok(current)
    }

    /// Splice the new text into `buffer`, returning the change in length.
    pub fn apply_to(&self, buffer: &mut String) -> Result<isize, EditError> {
        self.validate(buffer)?;
        buffer.replace_range(self.byte_start..self.byte_end, &self.new_text);
        Ok(self.delta())
    }

    /// Bytes added (positive) or removed (negative) by this edit.
    pub fn delta(&self) -> isize {
        self.new_text.len() as isize - (self.byte_end - self.byte_start) as isize
    }
}

/// Move an offset by a cumulative shift; `None` if it would go negative.
pub fn shift_offset(offset: usize, shift: isize) -> Option<usize> {
    offset.checked_add_signed(shift)
}

/// Atomic file write: tempfile + fsync + rename, then bump the mtime.
///
/// Either the full write succeeds or the file is left untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Create tempfile in same directory to ensure same filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    // Build tools watching the tree must see the rewrite as new
    filetime::set_file_mtime(path, filetime::FileTime::now())?;

    Ok(())
}
