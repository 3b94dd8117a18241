use serde::{Deserialize, Serialize};

/// Reconstructed photon candidate. `eta` is the super-cluster
/// pseudorapidity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    pub pt: f64,
    pub eta: f64,
    #[serde(default)]
    pub phi: f64,
    pub hadronic_over_em: f64,
    pub sigma_ieta_ieta: f64,
    pub charged_hadron_iso: f64,
    pub neutral_hadron_iso: f64,
    pub photon_iso: f64,
    pub has_pixel_seed: bool,
    #[serde(default)]
    pub r9: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub ndof: f64,
    #[serde(default)]
    pub is_fake: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerPath {
    pub name: String,
    pub accepted: bool,
    #[serde(default = "unit_prescale")]
    pub prescale: u32,
}

fn unit_prescale() -> u32 {
    1
}

impl TriggerPath {
    pub fn new(name: &str, accepted: bool) -> Self {
        Self {
            name: name.to_owned(),
            accepted,
            prescale: 1,
        }
    }
}

/// Trigger decisions of one process for one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerResults {
    pub process: String,
    #[serde(default)]
    pub paths: Vec<TriggerPath>,
}

impl TriggerResults {
    pub fn new(process: &str, paths: Vec<TriggerPath>) -> Self {
        Self {
            process: process.to_owned(),
            paths,
        }
    }

    pub fn accepted_paths(&self) -> impl Iterator<Item = &TriggerPath> {
        self.paths.iter().filter(|path| path.accepted)
    }

    pub fn prescale_for_name(&self, name: &str) -> Option<u32> {
        self.paths
            .iter()
            .find(|path| path.name == name)
            .map(|path| path.prescale)
    }
}
