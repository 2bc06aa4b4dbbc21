/// Test utilities for exercising probes without real devices
use crate::error::VolidResult;
use crate::source::{BufferSource, SliceSource};
use std::borrow::Cow;

/// In-memory source that remembers every request made of it.
pub struct RecordingSource<'a> {
    inner: SliceSource<'a>,
    requests: Vec<(u64, usize)>,
}

impl<'a> RecordingSource<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            inner: SliceSource::new(data),
            requests: Vec::new(),
        }
    }

    /// `(offset, length)` of each fetch, in order.
    pub fn requests(&self) -> &[(u64, usize)] {
        &self.requests
    }

    /// One past the furthest byte any fetch asked for.
    pub fn highest_byte_requested(&self) -> u64 {
        self.requests
            .iter()
            .map(|&(offset, len)| offset.saturating_add(len as u64))
            .max()
            .unwrap_or(0)
    }
}

impl BufferSource for RecordingSource<'_> {
    fn fetch(&mut self, offset: u64, length: usize) -> VolidResult<Cow<'_, [u8]>> {
        self.requests.push((offset, length));
        self.inner.fetch(offset, length)
    }
}
