use crate::identity::{Usage, VolumeId};
use crate::source::BufferSource;

/// Recognizes one on-disk format.
///
/// A probe never fails: "not this format" is `None`, and a format that was
/// recognized but whose deeper metadata could not be read still yields the
/// fields that were extracted safely.
pub trait VolumeProbe: Send + Sync {
    /// Type tag reported for a match, e.g. "ntfs".
    fn name(&self) -> &'static str;

    fn usage(&self) -> Usage;

    fn probe(&self, source: &mut dyn BufferSource) -> Option<VolumeId>;
}
