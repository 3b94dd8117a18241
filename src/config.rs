use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::effective_area::EffectiveAreaTable;
use crate::error::{AnalysisError, AnalysisResult};
use crate::photon_id::{CutSet, DEFAULT_EA_ERA, TIGHT};
use crate::trigger::{DEFAULT_TRIGGER_PROCESS, TriggerRule, photon_trigger_menu};

/// Labels of the per-event products the selection reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionLabels {
    pub vertices: String,
    pub rho: String,
    pub photons: String,
}

impl Default for CollectionLabels {
    fn default() -> Self {
        Self {
            vertices: "offlineSlimmedPrimaryVertices".to_owned(),
            rho: "fixedGridRhoFastjetAll".to_owned(),
            photons: "slimmedPhotons".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub debug: bool,
    #[serde(alias = "isMC")]
    pub is_mc: bool,
    #[serde(alias = "crossSection")]
    pub xsec: f64,
    #[serde(alias = "truthMode")]
    pub mctruthmode: i32,
    #[serde(alias = "inputURLs")]
    pub input: Vec<String>,
    #[serde(alias = "outputPath")]
    pub output: String,

    /// Worker threads for the event loop; 0 or 1 runs sequentially.
    #[serde(default)]
    pub threads: usize,
    /// Weight MC events by `xsec / total events`.
    #[serde(default)]
    pub apply_xsec_weight: bool,
    #[serde(default = "default_trigger_process")]
    pub trigger_process: String,
    #[serde(default = "photon_trigger_menu")]
    pub trigger_menu: Vec<TriggerRule>,
    #[serde(default = "default_id_label")]
    pub id_label: String,
    #[serde(default)]
    pub cut_sets: Vec<CutSet>,
    #[serde(default = "default_ea_era")]
    pub effective_area_era: u32,
    #[serde(default)]
    pub effective_areas: EffectiveAreaTable,
    #[serde(default)]
    pub labels: CollectionLabels,
}

fn default_trigger_process() -> String {
    DEFAULT_TRIGGER_PROCESS.to_owned()
}

fn default_id_label() -> String {
    TIGHT.to_owned()
}

fn default_ea_era() -> u32 {
    DEFAULT_EA_ERA
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(alias = "runProcess")]
    run_process: RunConfig,
}

impl RunConfig {
    pub fn load(path: &Path) -> AnalysisResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parses the `run_process` section of a configuration document.
    pub fn from_yaml(contents: &str) -> AnalysisResult<Self> {
        let file: ConfigFile = serde_yaml::from_str(contents)?;
        let config = file.run_process;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        if self.input.is_empty() {
            return Err(AnalysisError::MissingParameter("input"));
        }
        if self.output.trim().is_empty() {
            return Err(AnalysisError::MissingParameter("output"));
        }
        if !self.xsec.is_finite() || self.xsec < 0.0 {
            return Err(AnalysisError::InvalidParameter(format!(
                "xsec must be a non-negative number, got {}",
                self.xsec
            )));
        }
        if self.trigger_menu.is_empty() {
            return Err(AnalysisError::MissingParameter("trigger_menu"));
        }
        if self.effective_area_era != self.effective_areas.era {
            return Err(AnalysisError::InvalidParameter(format!(
                "effective_area_era {} has no table, the effective area table is for era {}",
                self.effective_area_era, self.effective_areas.era
            )));
        }
        self.effective_areas.validate()
    }

    /// MC normalisation to 1/pb. Data is never reweighted.
    pub fn xsec_weight(&self, total_events: usize) -> f64 {
        if !self.is_mc || total_events == 0 {
            return 1.0;
        }
        self.xsec / total_events as f64
    }

    /// Weight applied to every fill.
    pub fn event_weight(&self, total_events: usize) -> f64 {
        if self.apply_xsec_weight {
            self.xsec_weight(total_events)
        } else {
            1.0
        }
    }
}
