pub mod configs;
pub mod histo1d;
pub mod histogrammer;
