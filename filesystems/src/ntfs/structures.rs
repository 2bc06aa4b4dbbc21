// NTFS on-disk structures used for volume identification
// Parsed field by field from borrowed buffers; nothing is overlaid in place.

use volid_core::bytes::{read_array, read_i8, read_u16, read_u32, read_u64, read_u8};

pub const BOOT_SECTOR_SIZE: usize = 512;
pub const NTFS_SIGNATURE: &[u8; 8] = b"NTFS    ";
pub const MFT_RECORD_MAGIC: &[u8; 4] = b"FILE";

/// Largest MFT record read from the media. Real volumes use 1 KiB or 4 KiB.
pub const MAX_MFT_RECORD_SIZE: u64 = 64 * 1024;

/// Index of the $Volume record in the MFT.
pub const MFT_RECORD_VOLUME: u64 = 3;

pub const ATTR_OBJECT_ID: u32 = 0x40;
pub const ATTR_VOLUME_NAME: u32 = 0x60;
pub const ATTR_VOLUME_INFORMATION: u32 = 0x70;
pub const ATTR_END: u32 = 0xFFFF_FFFF;

/// Fields of the NTFS boot sector needed to locate the $Volume record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootSector {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub mft_cluster: u64,
    /// Negative: record size is 2^-n bytes. Otherwise a cluster count.
    pub clusters_per_mft_record: i8,
    pub volume_serial: [u8; 8],
}

impl BootSector {
    const OEM_ID: usize = 0x03;
    const BYTES_PER_SECTOR: usize = 0x0B;
    const SECTORS_PER_CLUSTER: usize = 0x0D;
    const MFT_CLUSTER: usize = 0x30;
    const CLUSTERS_PER_MFT_RECORD: usize = 0x40;
    const VOLUME_SERIAL: usize = 0x48;

    /// Parse a boot sector, returning `None` unless the OEM ID is "NTFS    ".
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let oem_id: [u8; 8] = read_array(buf, Self::OEM_ID)?;
        if &oem_id != NTFS_SIGNATURE {
            return None;
        }

        Some(Self {
            bytes_per_sector: read_u16(buf, Self::BYTES_PER_SECTOR)?,
            sectors_per_cluster: read_u8(buf, Self::SECTORS_PER_CLUSTER)?,
            mft_cluster: read_u64(buf, Self::MFT_CLUSTER)?,
            clusters_per_mft_record: read_i8(buf, Self::CLUSTERS_PER_MFT_RECORD)?,
            volume_serial: read_array(buf, Self::VOLUME_SERIAL)?,
        })
    }
}

/// Byte geometry derived from the boot sector. All sizes are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub sector_size: u64,
    pub cluster_size: u64,
    pub mft_offset: u64,
    pub mft_record_size: u64,
}

impl Geometry {
    /// `None` for a malformed volume: a zero size, or arithmetic that overflows.
    pub fn from_boot_sector(boot: &BootSector) -> Option<Self> {
        let sector_size = u64::from(boot.bytes_per_sector);
        let cluster_size = u64::from(boot.sectors_per_cluster) * sector_size;
        if sector_size == 0 || cluster_size == 0 {
            return None;
        }

        let mft_offset = boot.mft_cluster.checked_mul(cluster_size)?;
        let mft_record_size = mft_record_size(boot.clusters_per_mft_record, cluster_size)?;
        if mft_record_size == 0 {
            return None;
        }

        Some(Self {
            sector_size,
            cluster_size,
            mft_offset,
            mft_record_size,
        })
    }

    /// Extent offset of MFT record `index`.
    pub fn mft_record_offset(&self, index: u64) -> Option<u64> {
        index
            .checked_mul(self.mft_record_size)?
            .checked_add(self.mft_offset)
    }
}

/// Decode the signed clusters-per-record byte.
pub fn mft_record_size(clusters_per_record: i8, cluster_size: u64) -> Option<u64> {
    if clusters_per_record < 0 {
        1u64.checked_shl(u32::from(clusters_per_record.unsigned_abs()))
    } else {
        u64::from(clusters_per_record as u8).checked_mul(cluster_size)
    }
}

/// Header shared by every MFT record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MftRecordHeader {
    pub attrs_offset: u16,
    pub bytes_in_use: u32,
    pub bytes_allocated: u32,
}

impl MftRecordHeader {
    const ATTRS_OFFSET: usize = 0x14;
    const BYTES_IN_USE: usize = 0x18;
    const BYTES_ALLOCATED: usize = 0x1C;

    /// Parse a record header, returning `None` unless the magic is "FILE".
    pub fn parse(buf: &[u8]) -> Option<Self> {
        let magic: [u8; 4] = read_array(buf, 0)?;
        if &magic != MFT_RECORD_MAGIC {
            return None;
        }

        Some(Self {
            attrs_offset: read_u16(buf, Self::ATTRS_OFFSET)?,
            bytes_in_use: read_u32(buf, Self::BYTES_IN_USE)?,
            bytes_allocated: read_u32(buf, Self::BYTES_ALLOCATED)?,
        })
    }
}

/// Attribute header fields, read relative to the attribute's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeHeader {
    pub attr_type: u32,
    pub length: u16,
    pub value_length: u32,
    pub value_offset: u16,
}

impl AttributeHeader {
    const LENGTH: usize = 0x04;
    const VALUE_LENGTH: usize = 0x10;
    const VALUE_OFFSET: usize = 0x14;
    pub const SIZE: usize = 0x16;

    pub fn parse(buf: &[u8], offset: usize) -> Option<Self> {
        let field = |rel: usize| offset.checked_add(rel);
        Some(Self {
            attr_type: read_u32(buf, offset)?,
            length: read_u16(buf, field(Self::LENGTH)?)?,
            value_length: read_u32(buf, field(Self::VALUE_LENGTH)?)?,
            value_offset: read_u16(buf, field(Self::VALUE_OFFSET)?)?,
        })
    }
}

/// Value of the $VOLUME_INFORMATION attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeInformation {
    pub major_version: u8,
    pub minor_version: u8,
}

impl VolumeInformation {
    const MAJOR: usize = 0x08;
    const MINOR: usize = 0x09;
    pub const MIN_SIZE: usize = 0x0A;

    pub fn parse(value: &[u8]) -> Option<Self> {
        Some(Self {
            major_version: read_u8(value, Self::MAJOR)?,
            minor_version: read_u8(value, Self::MINOR)?,
        })
    }

    pub fn version_string(&self) -> String {
        format!("{}.{}", self.major_version, self.minor_version)
    }
}
