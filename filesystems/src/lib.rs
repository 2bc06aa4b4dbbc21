// Volume identification probes

pub mod detection;
pub mod ntfs;
pub mod registration;

pub use detection::{detect_path, detect_volume};
pub use ntfs::NtfsProbe;
pub use registration::{builtin_registry, list_available_probes, register_builtin_probes};
