use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

pub const PHOTON_PDG_ID: i32 = 22;

/// Isolation sums corrected for pileup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationKind {
    Charged,
    Neutral,
    Photon,
}

impl IsolationKind {
    pub const ALL: [IsolationKind; 3] = [
        IsolationKind::Charged,
        IsolationKind::Neutral,
        IsolationKind::Photon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationKind::Charged => "chIso",
            IsolationKind::Neutral => "nhIso",
            IsolationKind::Photon => "gIso",
        }
    }
}

/// Calibration lookup used to subtract pileup from isolation sums.
pub trait EffectiveAreaProvider: Send + Sync {
    fn effective_area(&self, particle: i32, eta: f64, era: u32, kind: IsolationKind) -> f64;
}

/// Effective areas binned in |eta| for one particle type and era.
///
/// `eta_edges` are the upper edges of all but the last bin, which is open
/// ended, so each value list holds `eta_edges.len() + 1` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveAreaTable {
    pub particle: i32,
    pub era: u32,
    pub eta_edges: Vec<f64>,
    pub charged: Vec<f64>,
    pub neutral: Vec<f64>,
    pub photon: Vec<f64>,
}

impl EffectiveAreaTable {
    /// Photon effective areas for the 25ns selection (era 3).
    pub fn photon_era3() -> Self {
        Self {
            particle: PHOTON_PDG_ID,
            era: 3,
            eta_edges: vec![1.0, 1.479, 2.0, 2.2, 2.3, 2.4],
            charged: vec![0.0234, 0.0189, 0.0171, 0.0129, 0.0110, 0.0074, 0.0035],
            neutral: vec![0.0053, 0.0103, 0.0057, 0.0070, 0.0152, 0.0232, 0.1709],
            photon: vec![0.0780, 0.0629, 0.0264, 0.0462, 0.0740, 0.0924, 0.1484],
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        let expected = self.eta_edges.len() + 1;
        for kind in IsolationKind::ALL {
            let len = self.values(kind).len();
            if len != expected {
                return Err(AnalysisError::InvalidParameter(format!(
                    "effective area table for {} has {len} values, expected {expected}",
                    kind.as_str()
                )));
            }
        }
        if self.eta_edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(AnalysisError::InvalidParameter(
                "effective area eta edges must be increasing".to_owned(),
            ));
        }
        Ok(())
    }

    fn values(&self, kind: IsolationKind) -> &[f64] {
        match kind {
            IsolationKind::Charged => &self.charged,
            IsolationKind::Neutral => &self.neutral,
            IsolationKind::Photon => &self.photon,
        }
    }

    fn eta_bin(&self, eta: f64) -> usize {
        let abs_eta = eta.abs();
        self.eta_edges
            .iter()
            .position(|&edge| abs_eta < edge)
            .unwrap_or(self.eta_edges.len())
    }
}

impl Default for EffectiveAreaTable {
    fn default() -> Self {
        Self::photon_era3()
    }
}

impl EffectiveAreaProvider for EffectiveAreaTable {
    fn effective_area(&self, particle: i32, eta: f64, era: u32, kind: IsolationKind) -> f64 {
        if particle != self.particle || era != self.era {
            log::trace!("No effective area for particle {particle} era {era}");
            return 0.0;
        }
        self.values(kind)
            .get(self.eta_bin(eta))
            .copied()
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_uses_absolute_eta_bins() {
        let table = EffectiveAreaTable::photon_era3();
        table.validate().expect("default table is consistent");

        let area = |eta| table.effective_area(PHOTON_PDG_ID, eta, 3, IsolationKind::Charged);
        assert_eq!(area(0.5), 0.0234);
        assert_eq!(area(-0.5), 0.0234);
        assert_eq!(area(1.0), 0.0189);
        assert_eq!(area(1.4442), 0.0189);
        assert_eq!(area(3.0), 0.0035);
    }

    #[test]
    fn unknown_particle_or_era_has_no_area() {
        let table = EffectiveAreaTable::photon_era3();
        assert_eq!(table.effective_area(11, 0.5, 3, IsolationKind::Photon), 0.0);
        assert_eq!(
            table.effective_area(PHOTON_PDG_ID, 0.5, 2, IsolationKind::Photon),
            0.0
        );
    }

    #[test]
    fn validate_rejects_short_value_lists() {
        let mut table = EffectiveAreaTable::photon_era3();
        table.neutral.pop();
        assert!(matches!(
            table.validate(),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
