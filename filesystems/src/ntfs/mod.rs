// NTFS volume identification
// Read-only, works on any BufferSource

pub mod attributes;
pub mod detector;
pub mod structures;


pub use attributes::{Attribute, AttributeWalker};
pub use detector::NtfsProbe;
pub use structures::*;
