// NTFS volume identification
// Reads the boot sector and the $Volume MFT record for UUID, label and version.

use super::attributes::AttributeWalker;
use super::structures::*;
use log::{debug, trace};
use volid_core::{
    BufferSource, Endian, IdentityBuilder, Usage, UuidFormat, VolumeId, VolumeProbe, LABEL_SIZE,
};

pub struct NtfsProbe;

impl NtfsProbe {
    pub const NAME: &'static str = "ntfs";
}

impl VolumeProbe for NtfsProbe {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn usage(&self) -> Usage {
        Usage::Filesystem
    }

    fn probe(&self, source: &mut dyn BufferSource) -> Option<VolumeId> {
        let boot = match source.fetch(0, BOOT_SECTOR_SIZE) {
            Ok(sector) => BootSector::parse(&sector)?,
            Err(e) => {
                debug!("No NTFS boot sector: {}", e);
                return None;
            }
        };

        let geometry = match Geometry::from_boot_sector(&boot) {
            Some(geometry) => geometry,
            None => {
                debug!("NTFS signature found but geometry is malformed: {:?}", boot);
                return None;
            }
        };

        debug!("sector size {:#x}", geometry.sector_size);
        debug!("cluster size {:#x}", geometry.cluster_size);
        debug!("MFT cluster {}", boot.mft_cluster);
        debug!("MFT offset {:#x}", geometry.mft_offset);
        debug!("clusters per MFT record {}", boot.clusters_per_mft_record);
        debug!("MFT record size {}", geometry.mft_record_size);

        let mut builder = IdentityBuilder::new();
        builder
            .signature_matched()
            .uuid(&boot.volume_serial, UuidFormat::Le64);

        read_volume_record(source, &geometry, &mut builder);

        builder.finish(Self::NAME, Usage::Filesystem)
    }
}

/// Add version and label from the $Volume record. Any failure leaves the
/// builder with what the boot sector already provided.
fn read_volume_record(source: &mut dyn BufferSource, geometry: &Geometry, builder: &mut IdentityBuilder) {
    let offset = match geometry.mft_record_offset(MFT_RECORD_VOLUME) {
        Some(offset) => offset,
        None => {
            debug!("$Volume record offset overflows");
            return;
        }
    };
    if geometry.mft_record_size > MAX_MFT_RECORD_SIZE {
        debug!(
            "MFT record size {} exceeds {} bytes, $Volume not read",
            geometry.mft_record_size, MAX_MFT_RECORD_SIZE
        );
        return;
    }
    let length = match usize::try_from(geometry.mft_record_size) {
        Ok(length) => length,
        Err(_) => return,
    };

    let record = match source.fetch(offset, length) {
        Ok(record) => record,
        Err(e) => {
            debug!("$Volume record unavailable: {}", e);
            return;
        }
    };

    let header = match MftRecordHeader::parse(&record) {
        Some(header) => header,
        None => {
            debug!("$Volume record has no FILE magic");
            return;
        }
    };
    builder.record_matched();

    debug!(
        "$Volume attributes at offset {:#x}, {} of {} bytes in use",
        header.attrs_offset, header.bytes_in_use, header.bytes_allocated
    );

    for attr in AttributeWalker::new(&record, geometry.mft_record_size, header.attrs_offset) {
        match attr.header.attr_type {
            ATTR_VOLUME_INFORMATION => {
                match attr.value(VolumeInformation::MIN_SIZE).and_then(VolumeInformation::parse) {
                    Some(info) => {
                        debug!("found volume information, version {}", info.version_string());
                        builder.version(info.version_string());
                    }
                    None => debug!("volume information at {:#x} out of bounds, skipped", attr.offset),
                }
            }
            ATTR_VOLUME_NAME => match attr.value(LABEL_SIZE) {
                Some(label) => {
                    debug!("found label, len {}", attr.header.value_length);
                    builder
                        .label_raw(label)
                        .label_unicode16(label, Endian::Little);
                }
                None => debug!("volume name at {:#x} out of bounds, skipped", attr.offset),
            },
            ATTR_OBJECT_ID => trace!("object id at {:#x}", attr.offset),
            _ => {}
        }
    }
}
