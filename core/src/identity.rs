// Identity record produced by the volume probes, plus the label/UUID
// normalization helpers every probe shares.

use serde::Serialize;
use static_assertions::const_assert;
use std::fmt;

/// Maximum number of raw label bytes kept from the media.
pub const LABEL_SIZE: usize = 64;

/// Size of a 64-bit little-endian volume serial.
pub const UUID_LE64_SIZE: usize = 8;

// Unicode labels are stored as whole 16-bit units.
const_assert!(LABEL_SIZE % 2 == 0);

/// What a volume is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Usage {
    Unused,
    Unprobed,
    Other,
    Filesystem,
    Raid,
    Crypto,
}

impl Usage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Usage::Unused => "unused",
            Usage::Unprobed => "unprobed",
            Usage::Other => "other",
            Usage::Filesystem => "filesystem",
            Usage::Raid => "raid",
            Usage::Crypto => "crypto",
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// On-disk UUID encodings understood by [`VolumeId::set_uuid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UuidFormat {
    /// 8-byte serial stored least significant byte first.
    Le64,
}

impl UuidFormat {
    pub fn len(&self) -> usize {
        match self {
            UuidFormat::Le64 => UUID_LE64_SIZE,
        }
    }
}

/// Identity of one volume. Every field starts out absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeId {
    pub usage: Option<Usage>,
    #[serde(rename = "type")]
    pub kind: Option<&'static str>,
    pub version: Option<String>,
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_hex")]
    pub label_raw: Option<Vec<u8>>,
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_hex")]
    pub uuid_raw: Option<Vec<u8>>,
}

fn serialize_hex<S: serde::Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => s.serialize_str(&hex::encode(bytes)),
        None => s.serialize_none(),
    }
}

impl VolumeId {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most [`LABEL_SIZE`] bytes of the label exactly as stored.
    pub fn set_label_raw(&mut self, raw: &[u8]) {
        let len = raw.len().min(LABEL_SIZE);
        self.label_raw = Some(raw[..len].to_vec());
    }

    /// Label stored as 8-bit characters, padded with spaces or NULs.
    pub fn set_label_string(&mut self, raw: &[u8]) {
        let len = raw.len().min(LABEL_SIZE);
        let text = String::from_utf8_lossy(&raw[..len]);
        self.label = Some(text.trim_end_matches([' ', '\0']).to_string());
    }

    /// Label stored as 16-bit code units. Decoding stops at the first NUL
    /// unit; a trailing odd byte is ignored.
    pub fn set_label_unicode16(&mut self, raw: &[u8], endian: Endian) {
        let len = raw.len().min(LABEL_SIZE);
        self.label = Some(decode_unicode16(&raw[..len], endian));
    }

    /// Record the raw identifier and its textual form. An identifier made of
    /// zero bytes only carries no information and is not recorded.
    pub fn set_uuid(&mut self, raw: &[u8], format: UuidFormat) {
        if raw.len() < format.len() {
            return;
        }
        let raw = &raw[..format.len()];
        if raw.iter().all(|&b| b == 0) {
            return;
        }

        let text = match format {
            UuidFormat::Le64 => {
                let mut be = raw.to_vec();
                be.reverse();
                hex::encode_upper(be)
            }
        };

        self.uuid_raw = Some(raw.to_vec());
        self.uuid = Some(text);
    }

    /// The identifier as a number, when it was stored as a 64-bit serial.
    pub fn uuid_le64(&self) -> Option<u64> {
        let raw: [u8; UUID_LE64_SIZE] = self.uuid_raw.as_deref()?.try_into().ok()?;
        Some(u64::from_le_bytes(raw))
    }

    /// Label with whitespace and path separators replaced, for KEY=VALUE export.
    pub fn label_safe(&self) -> Option<String> {
        self.label.as_ref().map(|label| {
            label
                .trim()
                .chars()
                .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
                .collect()
        })
    }

    /// Label with every ASCII character outside `[A-Za-z0-9#+-.:=@_]` written
    /// as `\xNN`.
    pub fn label_encoded(&self) -> Option<String> {
        self.label.as_ref().map(|label| {
            let mut encoded = String::with_capacity(label.len());
            for c in label.chars() {
                if !c.is_ascii() || c.is_ascii_alphanumeric() || "#+-.:=@_".contains(c) {
                    encoded.push(c);
                } else {
                    encoded.push_str(&format!("\\x{:02x}", c as u32));
                }
            }
            encoded
        })
    }

    pub fn is_matched(&self) -> bool {
        self.kind.is_some()
    }
}

fn decode_unicode16(raw: &[u8], endian: Endian) -> String {
    let units = raw
        .chunks_exact(2)
        .map(|pair| match endian {
            Endian::Little => u16::from_le_bytes([pair[0], pair[1]]),
            Endian::Big => u16::from_be_bytes([pair[0], pair[1]]),
        })
        .take_while(|&unit| unit != 0);

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Progress of a single probe run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProbeStage {
    Unmatched,
    SignatureMatched,
    RecordMatched,
    Done,
}

/// Accumulates a [`VolumeId`] while a probe runs.
///
/// Stages only move forward and fields are only ever added, so whatever
/// was extracted before a later step gave up is still reported.
#[derive(Debug)]
pub struct IdentityBuilder {
    stage: ProbeStage,
    id: VolumeId,
}

impl IdentityBuilder {
    pub fn new() -> Self {
        Self {
            stage: ProbeStage::Unmatched,
            id: VolumeId::new(),
        }
    }

    pub fn stage(&self) -> ProbeStage {
        self.stage
    }

    fn advance(&mut self, stage: ProbeStage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }

    pub fn signature_matched(&mut self) -> &mut Self {
        self.advance(ProbeStage::SignatureMatched);
        self
    }

    pub fn record_matched(&mut self) -> &mut Self {
        self.advance(ProbeStage::RecordMatched);
        self
    }

    pub fn uuid(&mut self, raw: &[u8], format: UuidFormat) -> &mut Self {
        self.id.set_uuid(raw, format);
        self
    }

    pub fn version(&mut self, version: String) -> &mut Self {
        self.id.version = Some(version);
        self
    }

    pub fn label_raw(&mut self, raw: &[u8]) -> &mut Self {
        self.id.set_label_raw(raw);
        self
    }

    pub fn label_unicode16(&mut self, raw: &[u8], endian: Endian) -> &mut Self {
        self.id.set_label_unicode16(raw, endian);
        self
    }

    /// Stamp type and usage and hand out the identity. A run that never
    /// matched a signature yields nothing, whatever was collected.
    pub fn finish(mut self, kind: &'static str, usage: Usage) -> Option<VolumeId> {
        if self.stage == ProbeStage::Unmatched {
            return None;
        }
        self.advance(ProbeStage::Done);
        self.id.kind = Some(kind);
        self.id.usage = Some(usage);
        Some(self.id)
    }
}

impl Default for IdentityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(text: &str) -> Vec<u8> {
        text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    #[test]
    fn test_new_identity_is_empty() {
        let id = VolumeId::new();
        assert!(!id.is_matched());
        assert_eq!(id, VolumeId::default());
    }

    #[test]
    fn test_le64_uuid_formatting() {
        let mut id = VolumeId::new();
        id.set_uuid(&0x0123_4567_89AB_CDEFu64.to_le_bytes(), UuidFormat::Le64);
        assert_eq!(id.uuid.as_deref(), Some("0123456789ABCDEF"));
        assert_eq!(id.uuid_le64(), Some(0x0123_4567_89AB_CDEF));
    }

    #[test]
    fn test_zero_uuid_is_ignored() {
        let mut id = VolumeId::new();
        id.set_uuid(&[0u8; 8], UuidFormat::Le64);
        assert_eq!(id.uuid, None);
        assert_eq!(id.uuid_raw, None);
    }

    #[test]
    fn test_short_uuid_is_ignored() {
        let mut id = VolumeId::new();
        id.set_uuid(&[1, 2, 3], UuidFormat::Le64);
        assert_eq!(id.uuid, None);
    }

    #[test]
    fn test_unicode16_label_stops_at_nul() {
        let mut raw = utf16le("DATA");
        raw.extend_from_slice(&[0, 0]);
        raw.extend_from_slice(&utf16le("junk"));

        let mut id = VolumeId::new();
        id.set_label_unicode16(&raw, Endian::Little);
        assert_eq!(id.label.as_deref(), Some("DATA"));
    }

    #[test]
    fn test_unicode16_label_non_ascii_and_odd_length() {
        let mut raw = utf16le("Données");
        raw.push(0x41);

        let mut id = VolumeId::new();
        id.set_label_unicode16(&raw, Endian::Little);
        assert_eq!(id.label.as_deref(), Some("Données"));

        let be: Vec<u8> = "Ab".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        id.set_label_unicode16(&be, Endian::Big);
        assert_eq!(id.label.as_deref(), Some("Ab"));
    }

    #[test]
    fn test_unpaired_surrogate_is_replaced() {
        let raw = [0x00, 0xD8, 0x41, 0x00];
        let mut id = VolumeId::new();
        id.set_label_unicode16(&raw, Endian::Little);
        assert_eq!(id.label.as_deref(), Some("\u{FFFD}A"));
    }

    #[test]
    fn test_labels_are_clamped() {
        let raw = vec![b'A'; LABEL_SIZE * 2];
        let mut id = VolumeId::new();
        id.set_label_raw(&raw);
        id.set_label_string(&raw);
        assert_eq!(id.label_raw.as_ref().map(Vec::len), Some(LABEL_SIZE));
        assert_eq!(id.label.as_ref().map(String::len), Some(LABEL_SIZE));
    }

    #[test]
    fn test_label_string_trims_padding() {
        let mut id = VolumeId::new();
        id.set_label_string(b"BOOT       \0\0");
        assert_eq!(id.label.as_deref(), Some("BOOT"));
    }

    #[test]
    fn test_label_safe() {
        let mut id = VolumeId::new();
        id.label = Some(" My Disk/2 ".to_string());
        assert_eq!(id.label_safe().as_deref(), Some("My_Disk_2"));
        assert_eq!(id.label_encoded().as_deref(), Some("\\x20My\\x20Disk\\x2f2\\x20"));

        id.label = Some("Système".to_string());
        assert_eq!(id.label_encoded().as_deref(), Some("Système"));
    }

    #[test]
    fn test_builder_unmatched_yields_nothing() {
        let mut builder = IdentityBuilder::new();
        builder.version("3.1".to_string());
        assert_eq!(builder.finish("ntfs", Usage::Filesystem), None);
    }

    #[test]
    fn test_builder_stages_only_advance() {
        let mut builder = IdentityBuilder::new();
        builder.record_matched();
        builder.signature_matched();
        assert_eq!(builder.stage(), ProbeStage::RecordMatched);

        let id = builder.finish("ntfs", Usage::Filesystem).unwrap();
        assert_eq!(id.kind, Some("ntfs"));
        assert_eq!(id.usage, Some(Usage::Filesystem));
        assert_eq!(id.version, None);
    }

    #[test]
    fn test_serialize_identity() {
        let mut builder = IdentityBuilder::new();
        builder
            .signature_matched()
            .uuid(&[0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88], UuidFormat::Le64)
            .label_unicode16(&utf16le("DATA"), Endian::Little);
        let id = builder.finish("ntfs", Usage::Filesystem).unwrap();

        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["type"], "ntfs");
        assert_eq!(json["usage"], "filesystem");
        assert_eq!(json["uuid"], "8877665544332211");
        assert_eq!(json["uuid_raw"], "1122334455667788");
        assert_eq!(json["label"], "DATA");
        assert!(json["version"].is_null());
    }
}
