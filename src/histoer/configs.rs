// Booking definition for a 1D histogram
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
pub struct Hist1DConfig {
    pub name: String,      // Histogram name, unique within a set
    pub title: String,     // ROOT-style "title;x label;y label"
    pub range: (f64, f64), // Range for the histogram
    pub bins: usize,       // Number of bins
}

impl Hist1DConfig {
    pub fn new(name: &str, title: &str, range: (f64, f64), bins: usize) -> Self {
        Self {
            name: name.to_owned(),
            title: title.to_owned(),
            range,
            bins,
        }
    }

    /// Splits the `title;x;y` convention into its three parts. Missing parts
    /// are empty.
    pub fn split_title(&self) -> (String, String, String) {
        let mut parts = self.title.splitn(3, ';').map(str::to_owned);
        let title = parts.next().unwrap_or_default();
        let x_label = parts.next().unwrap_or_default();
        let y_label = parts.next().unwrap_or_default();
        (title, x_label, y_label)
    }

    pub fn is_valid(&self) -> bool {
        self.bins > 0 && self.range.0 < self.range.1
    }
}

/// The control plots booked by the photon selection.
pub fn photon_control_plots() -> Vec<Hist1DConfig> {
    vec![
        // pu control
        Hist1DConfig::new("nvtx", ";Vertices;Events", (0.0, 50.0), 50),
        // photon control
        Hist1DConfig::new("rho", ";Average energy density (#rho);Events", (0.0, 100.0), 100),
        Hist1DConfig::new("npho", ";Photons;Events", (0.0, 20.0), 20),
        Hist1DConfig::new(
            "phopt",
            ";Photon transverse momentum [GeV];Events",
            (0.0, 1000.0),
            100,
        ),
        Hist1DConfig::new("phoeta", ";Photon pseudo-rapidity;Events", (0.0, 5.0), 50),
        Hist1DConfig::new("phohoe", ";Photon H/E;Events", (0.0, 1.0), 100),
        Hist1DConfig::new("elevto", ";Electron Veto;Events", (0.0, 1.0), 2),
        Hist1DConfig::new("sigietaieta", ";#sigma_{i#eta i#eta};Events", (0.0, 0.1), 100),
    ]
}
