use super::configs::Hist1DConfig;
use super::histo1d::histogram1d::Histogram;
use crate::error::{AnalysisError, AnalysisResult};
use crate::output::HistogramSink;

use fnv::FnvHashMap;

/// Category every booked histogram starts with.
pub const ALL_TAG: &str = "all";

#[derive(Debug, Clone)]
struct Booked {
    // ALL_TAG first, then other categories in first-fill order
    tags: Vec<(String, Histogram)>,
}

impl Booked {
    fn new(hist: Histogram) -> Self {
        Self {
            tags: vec![(ALL_TAG.to_owned(), hist)],
        }
    }

    fn get(&self, tag: &str) -> Option<&Histogram> {
        self.tags.iter().find(|(t, _)| t == tag).map(|(_, h)| h)
    }

    fn get_or_create(&mut self, tag: &str) -> &mut Histogram {
        let index = match self.tags.iter().position(|(t, _)| t == tag) {
            Some(index) => index,
            None => {
                let hist = self.tags[0].1.empty_clone();
                self.tags.push((tag.to_owned(), hist));
                self.tags.len() - 1
            }
        };
        &mut self.tags[index].1
    }
}

/// Histograms keyed by (name, category tag).
///
/// A histogram is booked once by name; the accumulator for a new tag is
/// created on its first fill as an empty copy of the booked binning.
#[derive(Debug, Clone, Default)]
pub struct Histogrammer {
    booked: Vec<Booked>,
    index: FnvHashMap<String, usize>,
}

impl Histogrammer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &[Hist1DConfig]) -> AnalysisResult<Self> {
        let mut histogrammer = Self::new();
        for config in configs {
            histogrammer.add_histogram(config)?;
        }
        Ok(histogrammer)
    }

    pub fn add_histogram(&mut self, config: &Hist1DConfig) -> AnalysisResult<()> {
        if self.index.contains_key(&config.name) {
            return Err(AnalysisError::DuplicateHistogram(config.name.clone()));
        }
        if !config.is_valid() {
            return Err(AnalysisError::InvalidParameter(format!(
                "histogram '{}' needs at least one bin and an increasing range, got {} bins over {:?}",
                config.name, config.bins, config.range
            )));
        }

        self.index.insert(config.name.clone(), self.booked.len());
        self.booked.push(Booked::new(Histogram::from_config(config)));
        log::debug!(
            "Booked histogram '{}' with {} bins over {:?}",
            config.name,
            config.bins,
            config.range
        );
        Ok(())
    }

    /// Fills `(name, tag)`. Returns false if no histogram is booked under
    /// `name`.
    pub fn fill_histo(&mut self, name: &str, tag: &str, value: f64, weight: f64) -> bool {
        let Some(&index) = self.index.get(name) else {
            log::warn!("Histogram '{name}' is not booked, dropping fill for tag '{tag}'");
            return false;
        };
        self.booked[index].get_or_create(tag).fill(value, weight);
        true
    }

    pub fn get(&self, name: &str, tag: &str) -> Option<&Histogram> {
        self.index
            .get(name)
            .and_then(|&index| self.booked[index].get(tag))
    }

    pub fn tags(&self, name: &str) -> Vec<&str> {
        self.index
            .get(name)
            .map(|&index| {
                self.booked[index]
                    .tags
                    .iter()
                    .map(|(tag, _)| tag.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every accumulator as `(tag, histogram)`, in booking order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Histogram)> {
        self.booked
            .iter()
            .flat_map(|booked| booked.tags.iter().map(|(tag, hist)| (tag.as_str(), hist)))
    }

    pub fn len(&self) -> usize {
        self.booked.iter().map(|booked| booked.tags.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.booked.is_empty()
    }

    /// Same bookings, no content and no extra tags.
    pub fn empty_clone(&self) -> Self {
        Self {
            booked: self
                .booked
                .iter()
                .map(|booked| Booked::new(booked.tags[0].1.empty_clone()))
                .collect(),
            index: self.index.clone(),
        }
    }

    /// Adds every accumulator of `other` into this set. Histograms only
    /// booked in `other` are adopted as they are.
    /// Nothing is changed when a binning does not match.
    pub fn merge(&mut self, other: Histogrammer) -> AnalysisResult<()> {
        for booked in &other.booked {
            let base = &booked.tags[0].1;
            let Some(&index) = self.index.get(&base.name) else {
                continue;
            };
            let ours = &self.booked[index].tags[0].1;
            if booked.tags.iter().any(|(_, hist)| !ours.same_binning(hist)) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "cannot merge histogram '{}' with a different binning",
                    base.name
                )));
            }
        }

        for booked in other.booked {
            let name = booked.tags[0].1.name.clone();
            let Some(&index) = self.index.get(&name) else {
                self.index.insert(name, self.booked.len());
                self.booked.push(booked);
                continue;
            };

            for (tag, hist) in booked.tags {
                if !self.booked[index].get_or_create(&tag).add(&hist) {
                    return Err(AnalysisError::InvalidParameter(format!(
                        "cannot merge histogram '{name}' with a different binning"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Hands every accumulator to the sink exactly once and closes it.
    pub fn write(&self, sink: &mut dyn HistogramSink) -> AnalysisResult<usize> {
        let mut written = 0;
        for (tag, hist) in self.iter() {
            sink.write_histogram(tag, hist)?;
            written += 1;
        }
        sink.close()?;
        log::info!("Wrote {written} histograms");
        Ok(written)
    }
}
