use crate::config::{CollectionLabels, RunConfig};
use crate::error::AnalysisResult;
use crate::event::Event;
use crate::event::objects::{Photon, Vertex};
use crate::histoer::histogrammer::{ALL_TAG, Histogrammer};
use crate::photon_id::{CutSet, PhotonIdentifier};
use crate::trigger::{TriggerDecision, TriggerSelector};

pub const SELECTED_TAG: &str = "sel";

/// Barrel acceptance, inclusive.
pub const BARREL_MAX_ETA: f64 = 1.4442;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// No trigger rule fired.
    Rejected,
    /// Triggered, but no photon passed the selection.
    NoSelection,
    Selected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventSelection {
    pub outcome: EventOutcome,
    pub trigger: TriggerDecision,
    pub selected: Vec<Photon>,
}

pub fn in_barrel_acceptance(eta: f64) -> bool {
    eta.abs() <= BARREL_MAX_ETA
}

/// Trigger, acceptance and identification for one event, with the control
/// plots filled along the way.
#[derive(Debug)]
pub struct SelectionPipeline {
    trigger: TriggerSelector,
    identifier: PhotonIdentifier,
    cuts: CutSet,
    labels: CollectionLabels,
}

impl SelectionPipeline {
    /// Fails if `id_label` names no cut set of `identifier`.
    pub fn new(
        trigger: TriggerSelector,
        identifier: PhotonIdentifier,
        id_label: &str,
        labels: CollectionLabels,
    ) -> AnalysisResult<Self> {
        let cuts = identifier.cut_set(id_label)?.clone();
        Ok(Self {
            trigger,
            identifier,
            cuts,
            labels,
        })
    }

    pub fn from_config(config: &RunConfig) -> AnalysisResult<Self> {
        let trigger = TriggerSelector::new(&config.trigger_process, &config.trigger_menu)?;
        let identifier = PhotonIdentifier::new(
            Box::new(config.effective_areas.clone()),
            config.effective_area_era,
            &config.cut_sets,
        );
        Self::new(trigger, identifier, &config.id_label, config.labels.clone())
    }

    pub fn process<E: Event + ?Sized>(
        &self,
        event: &E,
        histos: &mut Histogrammer,
        weight: f64,
    ) -> EventSelection {
        // pileup control plots come before any cut
        let vertices: &[Vertex] = event.get_by_label(&self.labels.vertices).unwrap_or_default();
        let nvtx = vertices.len() as f64;
        histos.fill_histo("nvtx", ALL_TAG, nvtx, weight);

        let rho: f64 = event.get_by_label(&self.labels.rho).unwrap_or_default();
        histos.fill_histo("rho", ALL_TAG, rho, weight);

        let trigger = self.trigger.evaluate(event);
        if !trigger.fired {
            return EventSelection {
                outcome: EventOutcome::Rejected,
                trigger,
                selected: Vec::new(),
            };
        }
        log::trace!(
            "Fired {:?} (prescale {:?}), threshold {}",
            trigger.path,
            trigger.prescale,
            trigger.threshold
        );

        let photons: &[Photon] = event.get_by_label(&self.labels.photons).unwrap_or_default();
        histos.fill_histo("npho", ALL_TAG, photons.len() as f64, weight);

        let selected = self.select_photons(photons, trigger.threshold, rho, histos, weight);
        if selected.is_empty() {
            return EventSelection {
                outcome: EventOutcome::NoSelection,
                trigger,
                selected,
            };
        }

        histos.fill_histo("npho", SELECTED_TAG, selected.len() as f64, weight);
        histos.fill_histo("nvtx", SELECTED_TAG, nvtx, weight);
        for photon in &selected {
            fill_photon_plots(histos, SELECTED_TAG, photon, weight);
        }

        EventSelection {
            outcome: EventOutcome::Selected,
            trigger,
            selected,
        }
    }

    fn select_photons(
        &self,
        photons: &[Photon],
        threshold: f64,
        rho: f64,
        histos: &mut Histogrammer,
        weight: f64,
    ) -> Vec<Photon> {
        let mut selected = Vec::new();
        for photon in photons {
            histos.fill_histo("phopt", ALL_TAG, photon.pt, weight);
            histos.fill_histo("phoeta", ALL_TAG, photon.eta, weight);

            if photon.pt < threshold || !in_barrel_acceptance(photon.eta) {
                continue;
            }

            histos.fill_histo("elevto", ALL_TAG, bool_value(photon.has_pixel_seed), weight);
            histos.fill_histo("sigietaieta", ALL_TAG, photon.sigma_ieta_ieta, weight);
            histos.fill_histo("phohoe", ALL_TAG, photon.hadronic_over_em, weight);

            if let Some(step) = self.identifier.first_failure(&self.cuts, photon, rho) {
                log::trace!(
                    "Photon pt {:.1} eta {:.3} failed {} at {step:?}",
                    photon.pt,
                    photon.eta,
                    self.cuts.label
                );
                continue;
            }
            selected.push(*photon);
        }
        selected
    }
}

fn bool_value(flag: bool) -> f64 {
    if flag { 1.0 } else { 0.0 }
}

fn fill_photon_plots(histos: &mut Histogrammer, tag: &str, photon: &Photon, weight: f64) {
    histos.fill_histo("phopt", tag, photon.pt, weight);
    histos.fill_histo("phoeta", tag, photon.eta, weight);
    histos.fill_histo("phohoe", tag, photon.hadronic_over_em, weight);
    histos.fill_histo("elevto", tag, bool_value(photon.has_pixel_seed), weight);
    histos.fill_histo("sigietaieta", tag, photon.sigma_ieta_ieta, weight);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effective_area::EffectiveAreaTable;
    use crate::event::objects::{TriggerPath, TriggerResults};
    use crate::event::{EventRecord, Product};
    use crate::histoer::configs::photon_control_plots;
    use crate::photon_id::{DEFAULT_EA_ERA, TIGHT};
    use crate::trigger::{DEFAULT_TRIGGER_PROCESS, TriggerRule, photon_trigger_menu};

    fn pipeline_with_menu(menu: &[TriggerRule]) -> SelectionPipeline {
        let trigger = TriggerSelector::new(DEFAULT_TRIGGER_PROCESS, menu).expect("menu");
        let identifier = PhotonIdentifier::new(
            Box::new(EffectiveAreaTable::photon_era3()),
            DEFAULT_EA_ERA,
            &[],
        );
        SelectionPipeline::new(trigger, identifier, TIGHT, CollectionLabels::default())
            .expect("pipeline")
    }

    fn pipeline() -> SelectionPipeline {
        pipeline_with_menu(&[TriggerRule::new("HLT_Photon150_*", 150.0, 0)])
    }

    fn histos() -> Histogrammer {
        Histogrammer::from_configs(&photon_control_plots()).expect("booking")
    }

    fn good_photon() -> Photon {
        Photon {
            pt: 200.0,
            eta: 0.5,
            hadronic_over_em: 0.005,
            sigma_ieta_ieta: 0.005,
            ..Photon::default()
        }
    }

    fn event(fired: bool, photons: Vec<Photon>) -> EventRecord {
        let labels = CollectionLabels::default();
        EventRecord::default()
            .with_trigger(TriggerResults::new(
                DEFAULT_TRIGGER_PROCESS,
                vec![TriggerPath::new("HLT_Photon150_v1", fired)],
            ))
            .with_product(&labels.vertices, Product::Vertices(vec![Vertex::default(); 3]))
            .with_product(&labels.rho, Product::Scalar(0.0))
            .with_product(&labels.photons, Product::Photons(photons))
    }

    fn entries(histos: &Histogrammer, name: &str, tag: &str) -> u64 {
        histos.get(name, tag).map_or(0, |hist| hist.entries)
    }

    #[test]
    fn selected_photon_fills_sel_histograms() {
        let mut histos = histos();
        let selection = pipeline().process(&event(true, vec![good_photon()]), &mut histos, 1.0);

        assert_eq!(selection.outcome, EventOutcome::Selected);
        assert_eq!(selection.selected.len(), 1);
        assert_eq!(selection.trigger.threshold, 150.0);

        let phopt = histos.get("phopt", SELECTED_TAG).expect("sel phopt");
        assert_eq!(phopt.entries, 1);
        let (center, count) = phopt.get_bin_count_and_center(200.0).expect("in range");
        assert_eq!(count, 1.0);
        assert_eq!(center, 205.0);
        assert_eq!(phopt.integral(), 1.0);

        for name in ["npho", "nvtx", "phoeta", "phohoe", "elevto", "sigietaieta"] {
            assert_eq!(entries(&histos, name, SELECTED_TAG), 1, "{name}");
        }
        let npho = histos.get("npho", SELECTED_TAG).expect("sel npho");
        assert_eq!(npho.bins[1].sum, 1.0);
        let nvtx = histos.get("nvtx", SELECTED_TAG).expect("sel nvtx");
        assert_eq!(nvtx.bins[3].sum, 1.0);
    }

    #[test]
    fn pixel_seed_fails_the_electron_veto() {
        let mut histos = histos();
        let photon = Photon {
            has_pixel_seed: true,
            ..good_photon()
        };
        let selection = pipeline().process(&event(true, vec![photon]), &mut histos, 1.0);

        assert_eq!(selection.outcome, EventOutcome::NoSelection);
        assert!(selection.selected.is_empty());
        for (tag, _) in histos.iter() {
            assert_ne!(tag, SELECTED_TAG);
        }
        // reached identification, so the id-stage control plots saw it
        assert_eq!(entries(&histos, "elevto", ALL_TAG), 1);
        assert_eq!(entries(&histos, "phopt", ALL_TAG), 1);
    }

    #[test]
    fn untriggered_event_only_fills_pileup_controls() {
        let mut histos = histos();
        let selection = pipeline().process(&event(false, vec![good_photon()]), &mut histos, 1.0);

        assert_eq!(selection.outcome, EventOutcome::Rejected);
        assert!(!selection.trigger.fired);
        for (tag, hist) in histos.iter() {
            let expected = u64::from(tag == ALL_TAG && (hist.name == "nvtx" || hist.name == "rho"));
            assert_eq!(hist.entries, expected, "{} {tag}", hist.name);
        }
    }

    #[test]
    fn missing_collections_read_as_empty() {
        let mut histos = histos();
        let record = EventRecord::default().with_trigger(TriggerResults::new(
            DEFAULT_TRIGGER_PROCESS,
            vec![TriggerPath::new("HLT_Photon150_v1", true)],
        ));
        let selection = pipeline().process(&record, &mut histos, 1.0);

        assert_eq!(selection.outcome, EventOutcome::NoSelection);
        let nvtx = histos.get("nvtx", ALL_TAG).expect("nvtx");
        assert_eq!(nvtx.bins[0].sum, 1.0);
        let npho = histos.get("npho", ALL_TAG).expect("npho");
        assert_eq!(npho.bins[0].sum, 1.0);
    }

    #[test]
    fn barrel_boundary_is_inclusive() {
        assert!(in_barrel_acceptance(1.4442));
        assert!(in_barrel_acceptance(-1.4442));
        assert!(!in_barrel_acceptance(1.4443));
        assert!(!in_barrel_acceptance(-2.0));

        let mut histos = histos();
        let photons = vec![
            Photon {
                eta: 1.4442,
                ..good_photon()
            },
            Photon {
                eta: -1.4442,
                ..good_photon()
            },
            Photon {
                eta: 1.44421,
                ..good_photon()
            },
        ];
        let selection = pipeline().process(&event(true, photons), &mut histos, 1.0);
        assert_eq!(selection.selected.len(), 2);
        assert_eq!(entries(&histos, "phoeta", ALL_TAG), 3);
    }

    #[test]
    fn photons_below_threshold_are_dropped() {
        let mut histos = histos();
        let photons = vec![
            Photon {
                pt: 149.9,
                ..good_photon()
            },
            Photon {
                pt: 150.0,
                ..good_photon()
            },
        ];
        let selection = pipeline().process(&event(true, photons), &mut histos, 1.0);

        assert_eq!(selection.selected.len(), 1);
        assert_eq!(selection.selected[0].pt, 150.0);
        // the dropped one never reached identification
        assert_eq!(entries(&histos, "phohoe", ALL_TAG), 1);
    }

    #[test]
    fn threshold_comes_from_the_matched_rule() {
        let mut histos = histos();
        let record = EventRecord::default()
            .with_trigger(TriggerResults::new(
                DEFAULT_TRIGGER_PROCESS,
                vec![TriggerPath::new("HLT_Photon250_v1", true)],
            ))
            .with_product("slimmedPhotons", Product::Photons(vec![good_photon()]));
        let selection =
            pipeline_with_menu(&photon_trigger_menu()).process(&record, &mut histos, 1.0);

        assert_eq!(selection.trigger.threshold, 250.0);
        assert_eq!(selection.outcome, EventOutcome::NoSelection);
    }

    #[test]
    fn weight_is_applied_to_every_fill() {
        let mut histos = histos();
        pipeline().process(&event(true, vec![good_photon()]), &mut histos, 0.5);

        let phopt = histos.get("phopt", SELECTED_TAG).expect("sel phopt");
        assert_eq!(phopt.integral(), 0.5);
        let rho = histos.get("rho", ALL_TAG).expect("rho");
        assert_eq!(rho.integral(), 0.5);
    }

    #[test]
    fn unknown_id_label_fails_at_construction() {
        let trigger = TriggerSelector::new(DEFAULT_TRIGGER_PROCESS, &photon_trigger_menu())
            .expect("menu");
        let identifier = PhotonIdentifier::new(
            Box::new(EffectiveAreaTable::photon_era3()),
            DEFAULT_EA_ERA,
            &[],
        );
        let result =
            SelectionPipeline::new(trigger, identifier, "Medium", CollectionLabels::default());
        assert!(result.is_err());
    }
}
