// Walk of the attribute list inside one MFT record

use super::structures::{AttributeHeader, ATTR_END};
use log::trace;
use volid_core::bytes::slice_at;

/// One attribute found by [`AttributeWalker`].
#[derive(Debug, Clone, Copy)]
pub struct Attribute<'a> {
    /// Offset of the attribute within the record.
    pub offset: usize,
    pub header: AttributeHeader,
    record: &'a [u8],
}

impl<'a> Attribute<'a> {
    /// The attribute's value, cut to at most `max_len` bytes.
    ///
    /// `None` when the (possibly cut) value does not lie entirely inside the
    /// record; such an attribute is skipped rather than partially read.
    pub fn value(&self, max_len: usize) -> Option<&'a [u8]> {
        let start = self.offset.checked_add(usize::from(self.header.value_offset))?;
        let len = usize::try_from(self.header.value_length)
            .unwrap_or(usize::MAX)
            .min(max_len);
        slice_at(self.record, start, len)
    }
}

/// Iterates over the attributes of an MFT record.
///
/// The walk ends at a zero-length entry, at an entry whose length would
/// reach or pass the end of the record, at the end marker, or at a header
/// that does not fit in the record. Offsets strictly increase, so the walk
/// visits at most one entry per byte of record.
pub struct AttributeWalker<'a> {
    record: &'a [u8],
    offset: usize,
    finished: bool,
}

impl<'a> AttributeWalker<'a> {
    /// `record_size` bounds the walk in addition to the buffer length.
    pub fn new(record: &'a [u8], record_size: u64, first_attribute: u16) -> Self {
        let bound = usize::try_from(record_size)
            .unwrap_or(usize::MAX)
            .min(record.len());
        Self {
            record: &record[..bound],
            offset: usize::from(first_attribute),
            finished: false,
        }
    }

    fn finish(&mut self, reason: &str) -> Option<Attribute<'a>> {
        trace!("Attribute walk ends at offset {:#x}: {}", self.offset, reason);
        self.finished = true;
        None
    }
}

impl<'a> Iterator for AttributeWalker<'a> {
    type Item = Attribute<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let header = match AttributeHeader::parse(self.record, self.offset) {
            Some(header) => header,
            None => return self.finish("header truncated"),
        };

        if header.length == 0 {
            return self.finish("zero length");
        }

        let next = match self.offset.checked_add(usize::from(header.length)) {
            Some(next) if next < self.record.len() => next,
            _ => return self.finish("length runs past record"),
        };

        if header.attr_type == ATTR_END {
            return self.finish("end marker");
        }

        trace!(
            "Attribute type {:#x}, len {}, at offset {:#x}",
            header.attr_type,
            header.length,
            self.offset
        );

        let attribute = Attribute {
            offset: self.offset,
            header,
            record: self.record,
        };
        self.offset = next;
        Some(attribute)
    }
}

impl std::iter::FusedIterator for AttributeWalker<'_> {}
