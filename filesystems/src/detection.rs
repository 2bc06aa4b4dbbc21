// Volume detection entry points

use crate::registration::builtin_registry;
use log::{debug, info};
use std::path::Path;
use volid_core::{BufferSource, FileSource, ProbeOptions, VolidResult, VolumeId};

/// Identify the volume behind `source` with the built-in probes.
pub fn detect_volume(source: &mut dyn BufferSource, options: &ProbeOptions) -> Option<VolumeId> {
    builtin_registry().probe(source, options)
}

/// Open a device or image read-only and identify the extent described by `options`.
///
/// I/O errors opening the path are returned; an unrecognized volume is `Ok(None)`.
pub fn detect_path<P: AsRef<Path>>(path: P, options: &ProbeOptions) -> VolidResult<Option<VolumeId>> {
    let path = path.as_ref();
    debug!(
        "Probing {} at offset {:#x}, size {:?}",
        path.display(),
        options.offset,
        options.size
    );

    let mut source = FileSource::open(path, options.offset, options.size)?;
    let id = detect_volume(&mut source, options);

    match &id {
        Some(id) => info!(
            "{}: {} {}",
            path.display(),
            id.kind.unwrap_or("unknown"),
            id.uuid.as_deref().unwrap_or("")
        ),
        None => info!("{}: no known volume found", path.display()),
    }

    Ok(id)
}
