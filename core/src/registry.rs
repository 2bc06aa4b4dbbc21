use crate::config::ProbeOptions;
use crate::identity::VolumeId;
use crate::probe::VolumeProbe;
use crate::source::BufferSource;
use log::debug;
use std::sync::Arc;

/// Probes in priority order; the first one that matches wins.
pub struct ProbeRegistry {
    probes: Vec<Arc<dyn VolumeProbe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self { probes: Vec::new() }
    }

    /// Append a probe. A probe registered under an existing name replaces it
    /// in place, keeping the original priority.
    pub fn register(&mut self, probe: Arc<dyn VolumeProbe>) {
        match self.probes.iter_mut().find(|p| p.name() == probe.name()) {
            Some(slot) => *slot = probe,
            None => self.probes.push(probe),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn VolumeProbe>> {
        self.probes.iter().find(|p| p.name() == name).cloned()
    }

    pub fn list_probes(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    /// Run every enabled probe against `source` until one matches.
    pub fn probe(&self, source: &mut dyn BufferSource, options: &ProbeOptions) -> Option<VolumeId> {
        for probe in self.probes.iter().filter(|p| options.allows(p.name())) {
            debug!("Trying {} probe", probe.name());
            if let Some(id) = probe.probe(source) {
                debug!("Matched {} ({})", probe.name(), probe.usage());
                return Some(id);
            }
        }
        None
    }
}

impl Default for ProbeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
