// Registration of the built-in volume probes

use crate::ntfs::NtfsProbe;
use log::debug;
use std::sync::Arc;
use volid_core::ProbeRegistry;

/// Register all built-in probes, most specific first.
pub fn register_builtin_probes(registry: &mut ProbeRegistry) {
    registry.register(Arc::new(NtfsProbe));
    debug!("Registered probes: {:?}", registry.list_probes());
}

/// Registry holding every built-in probe.
pub fn builtin_registry() -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    register_builtin_probes(&mut registry);
    registry
}

/// Names of the built-in probes in priority order.
pub fn list_available_probes() -> Vec<&'static str> {
    builtin_registry().list_probes()
}
