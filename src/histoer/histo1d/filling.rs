use super::histogram1d::Histogram;

impl Histogram {
    /// Adds `weight` to the bin holding `value`. Out-of-range values go to
    /// the underflow/overflow edge bins and still count as entries.
    pub fn fill(&mut self, value: f64, weight: f64) {
        match self.get_bin_index(value) {
            Some(index) => self.bins[index].add(weight),
            None if value >= self.range.1 => self.overflow.add(weight),
            None => self.underflow.add(weight),
        }
        self.entries += 1;
    }

    pub fn fill_n(&mut self, value: f64, weight: f64, times: usize) {
        for _ in 0..times {
            self.fill(value, weight);
        }
    }

    /// Bin-by-bin sum. Returns false and leaves `self` untouched if the
    /// binnings differ.
    pub fn add(&mut self, other: &Histogram) -> bool {
        if !self.same_binning(other) {
            log::error!(
                "Cannot add histogram '{}' to '{}': binning differs",
                other.name,
                self.name
            );
            return false;
        }

        for (bin, other_bin) in self.bins.iter_mut().zip(&other.bins) {
            bin.merge(other_bin);
        }
        self.underflow.merge(&other.underflow);
        self.overflow.merge(&other.overflow);
        self.entries += other.entries;
        true
    }
}
