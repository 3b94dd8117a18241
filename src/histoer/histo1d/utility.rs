use super::histogram1d::Histogram;

impl Histogram {
    pub fn get_bin_edges(&self) -> Vec<f64> {
        (0..=self.bins.len())
            .map(|i| self.range.0 + i as f64 * self.bin_width)
            .collect()
    }

    pub fn get_bin_centers(&self) -> Vec<f64> {
        (0..self.bins.len())
            .map(|i| self.range.0 + (i as f64 + 0.5) * self.bin_width)
            .collect()
    }

    // Index of the in-range bin holding x; the upper edge belongs to the overflow.
    pub fn get_bin_index(&self, x: f64) -> Option<usize> {
        if self.bins.is_empty() || !(x >= self.range.0 && x < self.range.1) {
            return None;
        }

        let bin_index = ((x - self.range.0) / self.bin_width).floor() as usize;

        // rounding just below the upper edge
        Some(bin_index.min(self.bins.len() - 1))
    }

    pub fn get_bin_count_and_center(&self, x: f64) -> Option<(f64, f64)> {
        self.get_bin_index(x).map(|bin| {
            let bin_center = self.range.0 + (bin as f64 * self.bin_width) + self.bin_width * 0.5;
            (bin_center, self.bins[bin].sum)
        })
    }
}
