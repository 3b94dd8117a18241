use crate::histoer::configs::Hist1DConfig;

/// Weighted content of a single bin.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BinContent {
    pub sum: f64,
    pub sumw2: f64,
}

impl BinContent {
    pub fn add(&mut self, weight: f64) {
        self.sum += weight;
        self.sumw2 += weight * weight;
    }

    pub fn merge(&mut self, other: &BinContent) {
        self.sum += other.sum;
        self.sumw2 += other.sumw2;
    }

    pub fn error(&self) -> f64 {
        self.sumw2.sqrt()
    }
}

/// Fixed-width 1D histogram with weighted bins.
///
/// Values below the range land in `underflow`, values at or above the upper
/// edge in `overflow`; both are kept outside `bins`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Histogram {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bins: Vec<BinContent>,
    pub range: (f64, f64),
    pub overflow: BinContent,
    pub underflow: BinContent,
    pub bin_width: f64,
    pub entries: u64,
}

impl Histogram {
    // Create a new Histogram with specified min, max, and number of bins
    pub fn new(name: &str, number_of_bins: usize, range: (f64, f64)) -> Self {
        Histogram {
            name: name.to_owned(),
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            bins: vec![BinContent::default(); number_of_bins],
            range,
            overflow: BinContent::default(),
            underflow: BinContent::default(),
            bin_width: (range.1 - range.0) / number_of_bins as f64,
            entries: 0,
        }
    }

    pub fn from_config(config: &Hist1DConfig) -> Self {
        let (title, x_label, y_label) = config.split_title();
        Histogram {
            title,
            x_label,
            y_label,
            ..Histogram::new(&config.name, config.bins, config.range)
        }
    }

    /// Same binning and labels, no content.
    pub fn empty_clone(&self) -> Self {
        let mut hist = self.clone();
        hist.reset();
        hist
    }

    pub fn reset(&mut self) {
        self.bins = vec![BinContent::default(); self.bins.len()];
        self.overflow = BinContent::default();
        self.underflow = BinContent::default();
        self.entries = 0;
    }

    pub fn same_binning(&self, other: &Histogram) -> bool {
        self.bins.len() == other.bins.len() && self.range == other.range
    }

    pub fn bin(&self, index: usize) -> Option<&BinContent> {
        self.bins.get(index)
    }
}
