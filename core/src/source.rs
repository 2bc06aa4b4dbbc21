// Buffer sources: read-only byte views of one extent of a device or image

use crate::error::{VolidError, VolidResult};
use log::trace;
use std::borrow::Cow;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Supplies bytes of a single extent to the probes.
///
/// Offsets are relative to the extent start. An implementation must return
/// exactly `length` bytes or an error; short reads are never handed out.
pub trait BufferSource {
    fn fetch(&mut self, offset: u64, length: usize) -> VolidResult<Cow<'_, [u8]>>;
}

impl<S: BufferSource + ?Sized> BufferSource for &mut S {
    fn fetch(&mut self, offset: u64, length: usize) -> VolidResult<Cow<'_, [u8]>> {
        (**self).fetch(offset, length)
    }
}

/// An extent held entirely in memory.
pub struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl BufferSource for SliceSource<'_> {
    fn fetch(&mut self, offset: u64, length: usize) -> VolidResult<Cow<'_, [u8]>> {
        trace!("Fetching {} bytes at offset {:#x} from memory", length, offset);

        let view = usize::try_from(offset)
            .ok()
            .and_then(|start| crate::bytes::slice_at(self.data, start, length))
            .ok_or(VolidError::Unavailable { offset, length })?;

        Ok(Cow::Borrowed(view))
    }
}

/// Largest single fetch a [`FileSource`] serves.
pub const MAX_FETCH_LEN: usize = 16 * 1024 * 1024;

/// An extent `[base, base + size)` of any seekable reader, typically an
/// image file or a block device opened read-only.
pub struct FileSource<R> {
    reader: R,
    base: u64,
    size: Option<u64>,
}

impl FileSource<File> {
    /// Open `path` read-only and bind it to the extent starting at `base`.
    pub fn open<P: AsRef<Path>>(path: P, base: u64, size: Option<u64>) -> VolidResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(file, base, size))
    }
}

impl<R: Read + Seek> FileSource<R> {
    pub fn new(reader: R, base: u64, size: Option<u64>) -> Self {
        Self { reader, base, size }
    }
}

impl<R: Read + Seek> BufferSource for FileSource<R> {
    fn fetch(&mut self, offset: u64, length: usize) -> VolidResult<Cow<'_, [u8]>> {
        trace!(
            "Fetching {} bytes at extent offset {:#x} (absolute {:#x})",
            length,
            offset,
            self.base.saturating_add(offset)
        );

        if length > MAX_FETCH_LEN {
            return Err(VolidError::Unavailable { offset, length });
        }

        if let Some(extent) = self.size {
            let in_extent = offset
                .checked_add(length as u64)
                .map_or(false, |end| end <= extent);
            if !in_extent {
                return Err(VolidError::OutOfRange { offset, length, extent });
            }
        }

        let start = self
            .base
            .checked_add(offset)
            .ok_or(VolidError::Unavailable { offset, length })?;
        self.reader.seek(SeekFrom::Start(start))?;

        // Grow with the data actually returned; `length` comes from on-disk fields.
        let mut buffer = Vec::new();
        (&mut self.reader).take(length as u64).read_to_end(&mut buffer)?;

        if buffer.len() != length {
            trace!("Short read: wanted {} bytes, got {}", length, buffer.len());
            return Err(VolidError::Unavailable { offset, length });
        }

        Ok(Cow::Owned(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    #[test]
    fn test_slice_source_exact_reads() {
        let data: Vec<u8> = (0u8..16).collect();
        let mut source = SliceSource::new(&data);

        assert_eq!(&*source.fetch(4, 4).unwrap(), &[4, 5, 6, 7]);
        assert_eq!(source.fetch(12, 4).unwrap().len(), 4);
        assert!(matches!(
            source.fetch(13, 4),
            Err(VolidError::Unavailable { offset: 13, length: 4 })
        ));
        assert!(source.fetch(u64::MAX, 1).is_err());
    }

    #[test]
    fn test_file_source_honours_base_offset() {
        let data: Vec<u8> = (0u8..64).collect();
        let mut source = FileSource::new(Cursor::new(data), 16, None);

        assert_eq!(&*source.fetch(0, 2).unwrap(), &[16, 17]);
        assert_eq!(&*source.fetch(46, 2).unwrap(), &[62, 63]);
    }

    #[test]
    fn test_file_source_short_read_is_unavailable() {
        let mut source = FileSource::new(Cursor::new(vec![0u8; 100]), 0, None);
        assert!(matches!(
            source.fetch(90, 20),
            Err(VolidError::Unavailable { offset: 90, length: 20 })
        ));
    }

    #[test]
    fn test_file_source_rejects_reads_outside_extent() {
        let mut source = FileSource::new(Cursor::new(vec![0u8; 4096]), 0, Some(1024));
        assert!(source.fetch(512, 512).is_ok());
        assert!(matches!(
            source.fetch(1000, 100),
            Err(VolidError::OutOfRange { extent: 1024, .. })
        ));
        assert!(source.fetch(u64::MAX, 2).is_err());
    }

    #[test]
    fn test_file_source_huge_length_does_not_allocate() {
        let mut source = FileSource::new(Cursor::new(vec![0u8; 512]), 0, None);
        assert!(source.fetch(0, usize::MAX / 2).is_err());
    }

    #[test]
    fn test_file_source_refuses_oversized_fetch() {
        let mut source = FileSource::new(Cursor::new(vec![0u8; 1024]), 0, None);
        assert!(source.fetch(0, 1024).is_ok());
        assert!(matches!(
            source.fetch(0, MAX_FETCH_LEN + 1),
            Err(VolidError::Unavailable { offset: 0, .. })
        ));
    }

    #[test]
    fn test_file_source_open_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"0123456789").unwrap();
        file.flush().unwrap();

        let mut source = FileSource::open(file.path(), 2, Some(8)).unwrap();
        assert_eq!(&*source.fetch(0, 3).unwrap(), b"234");
        assert!(source.fetch(6, 3).is_err());
    }
}
