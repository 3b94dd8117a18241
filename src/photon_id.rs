//! Cut-based photon identification.
//!
//! The cuts are applied in a fixed order: electron veto, H/E, shower shape,
//! then charged, neutral and photon isolation corrected for pileup with
//! effective areas.

use serde::{Deserialize, Serialize};

use crate::effective_area::{EffectiveAreaProvider, IsolationKind, PHOTON_PDG_ID};
use crate::error::{AnalysisError, AnalysisResult};
use crate::event::objects::Photon;

pub const TIGHT: &str = "Tight";

/// Effective-area era the built-in cut sets were tuned with.
pub const DEFAULT_EA_ERA: u32 = 3;

/// `base + slope * pt`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearLimit {
    pub base: f64,
    #[serde(default)]
    pub slope: f64,
}

impl LinearLimit {
    pub fn constant(base: f64) -> Self {
        Self { base, slope: 0.0 }
    }

    pub fn at(&self, pt: f64) -> f64 {
        self.base + self.slope * pt
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSet {
    pub label: String,
    pub max_hoe: f64,
    pub max_sigma_ieta_ieta: f64,
    pub max_charged_iso: LinearLimit,
    pub max_neutral_iso: LinearLimit,
    pub max_photon_iso: LinearLimit,
}

impl CutSet {
    pub fn tight() -> Self {
        Self {
            label: TIGHT.to_owned(),
            max_hoe: 0.012,
            max_sigma_ieta_ieta: 0.0098,
            max_charged_iso: LinearLimit::constant(1.91),
            max_neutral_iso: LinearLimit {
                base: 2.55,
                slope: 0.0023,
            },
            max_photon_iso: LinearLimit {
                base: 1.29,
                slope: 0.0004,
            },
        }
    }

    fn isolation_limit(&self, kind: IsolationKind) -> &LinearLimit {
        match kind {
            IsolationKind::Charged => &self.max_charged_iso,
            IsolationKind::Neutral => &self.max_neutral_iso,
            IsolationKind::Photon => &self.max_photon_iso,
        }
    }
}

/// The identification step a candidate failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStep {
    ElectronVeto,
    HadronicOverEm,
    SigmaIetaIeta,
    Isolation(IsolationKind),
}

/// `max(raw - area * rho, 0)`
pub fn corrected_isolation(raw: f64, area: f64, rho: f64) -> f64 {
    (raw - area * rho).max(0.0)
}

fn raw_isolation(photon: &Photon, kind: IsolationKind) -> f64 {
    match kind {
        IsolationKind::Charged => photon.charged_hadron_iso,
        IsolationKind::Neutral => photon.neutral_hadron_iso,
        IsolationKind::Photon => photon.photon_iso,
    }
}

pub struct PhotonIdentifier {
    cut_sets: Vec<CutSet>,
    areas: Box<dyn EffectiveAreaProvider>,
    era: u32,
}

impl std::fmt::Debug for PhotonIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotonIdentifier")
            .field("cut_sets", &self.cut_sets)
            .field("era", &self.era)
            .finish_non_exhaustive()
    }
}

impl PhotonIdentifier {
    /// Starts from the built-in cut sets; a cut set in `extra` with the label
    /// of a built-in one replaces it.
    pub fn new(areas: Box<dyn EffectiveAreaProvider>, era: u32, extra: &[CutSet]) -> Self {
        let mut cut_sets = vec![CutSet::tight()];
        for cuts in extra {
            match cut_sets.iter_mut().find(|known| known.label == cuts.label) {
                Some(known) => *known = cuts.clone(),
                None => cut_sets.push(cuts.clone()),
            }
        }
        Self {
            cut_sets,
            areas,
            era,
        }
    }

    pub fn cut_set(&self, label: &str) -> AnalysisResult<&CutSet> {
        self.cut_sets
            .iter()
            .find(|cuts| cuts.label == label)
            .ok_or_else(|| AnalysisError::UnknownCutSet(label.to_owned()))
    }

    pub fn passes_identification(
        &self,
        label: &str,
        photon: &Photon,
        rho: f64,
    ) -> AnalysisResult<bool> {
        Ok(self.passes(self.cut_set(label)?, photon, rho))
    }

    pub fn passes(&self, cuts: &CutSet, photon: &Photon, rho: f64) -> bool {
        self.first_failure(cuts, photon, rho).is_none()
    }

    pub fn corrected(&self, photon: &Photon, kind: IsolationKind, rho: f64) -> f64 {
        let area = self
            .areas
            .effective_area(PHOTON_PDG_ID, photon.eta, self.era, kind);
        corrected_isolation(raw_isolation(photon, kind), area, rho)
    }

    /// Runs the cuts in order and stops at the first one that fails.
    pub fn first_failure(&self, cuts: &CutSet, photon: &Photon, rho: f64) -> Option<IdStep> {
        if photon.has_pixel_seed {
            return Some(IdStep::ElectronVeto);
        }
        if photon.hadronic_over_em > cuts.max_hoe {
            return Some(IdStep::HadronicOverEm);
        }
        if photon.sigma_ieta_ieta > cuts.max_sigma_ieta_ieta {
            return Some(IdStep::SigmaIetaIeta);
        }
        IsolationKind::ALL
            .into_iter()
            .find(|&kind| {
                self.corrected(photon, kind, rho) > cuts.isolation_limit(kind).at(photon.pt)
            })
            .map(IdStep::Isolation)
    }
}
