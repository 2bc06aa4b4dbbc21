pub mod bytes;
pub mod config;
pub mod error;
pub mod identity;
pub mod probe;
pub mod registry;
pub mod source;
#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use config::ProbeOptions;
pub use error::{VolidError, VolidResult};
pub use identity::{Endian, IdentityBuilder, ProbeStage, Usage, UuidFormat, VolumeId, LABEL_SIZE};
pub use probe::VolumeProbe;
pub use registry::ProbeRegistry;
pub use source::{BufferSource, FileSource, SliceSource};
