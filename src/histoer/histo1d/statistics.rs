use super::histogram1d::Histogram;

impl Histogram {
    /// Sum of weights in the in-range bins.
    pub fn integral(&self) -> f64 {
        self.bins.iter().map(|bin| bin.sum).sum()
    }

    // Weighted integral, mean and standard deviation over the in-range bins.
    pub fn get_statistics(&self) -> (f64, f64, f64) {
        let centers = self.get_bin_centers();

        let mut sum_product = 0.0;
        let mut total = 0.0;
        for (bin, center) in self.bins.iter().zip(&centers) {
            sum_product += bin.sum * center;
            total += bin.sum;
        }

        if total == 0.0 {
            return (0.0, 0.0, 0.0);
        }

        let mean = sum_product / total;

        let sum_squared_diff: f64 = self
            .bins
            .iter()
            .zip(&centers)
            .map(|(bin, center)| bin.sum * (center - mean) * (center - mean))
            .sum();

        let stdev = (sum_squared_diff / total).sqrt();

        (total, mean, stdev)
    }

    pub fn mean(&self) -> f64 {
        self.get_statistics().1
    }

    pub fn std_dev(&self) -> f64 {
        self.get_statistics().2
    }
}

#[cfg(test)]
mod tests {
    use super::super::histogram1d::Histogram;

    #[test]
    fn repeated_fills_add_weight_times_count() {
        let mut hist = Histogram::new("phopt", 100, (0.0, 1000.0));
        hist.fill_n(205.0, 0.25, 8);

        let bin = hist.bin(20).expect("bin 20 exists");
        assert!((bin.sum - 2.0).abs() < 1e-12);
        assert!((bin.sumw2 - 0.5).abs() < 1e-12);
        assert_eq!(hist.entries, 8);
        assert!((hist.integral() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_values_go_to_edge_bins() {
        let mut hist = Histogram::new("phoeta", 50, (0.0, 5.0));
        hist.fill(-0.5, 1.0);
        hist.fill(5.0, 2.0);
        hist.fill(12.0, 1.0);

        assert!((hist.underflow.sum - 1.0).abs() < 1e-12);
        assert!((hist.overflow.sum - 3.0).abs() < 1e-12);
        assert_eq!(hist.integral(), 0.0);
        assert_eq!(hist.entries, 3);
    }

    #[test]
    fn mean_and_stdev_use_bin_centers() {
        let mut hist = Histogram::new("h", 10, (0.0, 10.0));
        hist.fill(1.2, 1.0);
        hist.fill(3.7, 1.0);

        let (total, mean, stdev) = hist.get_statistics();
        assert!((total - 2.0).abs() < 1e-12);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((stdev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn add_requires_matching_binning() {
        let mut a = Histogram::new("h", 10, (0.0, 10.0));
        let mut b = a.empty_clone();
        b.fill(4.5, 3.0);
        assert!(a.add(&b));
        assert!((a.bins[4].sum - 3.0).abs() < 1e-12);

        let c = Histogram::new("h", 5, (0.0, 10.0));
        assert!(!a.add(&c));
        assert_eq!(a.entries, 1);
    }
}
