use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use serde::Serialize;

use crate::error::{AnalysisError, AnalysisResult};
use crate::histoer::histo1d::histogram1d::{BinContent, Histogram};

/// Destination for the histograms of a run. `close` is called once, after
/// the last histogram.
pub trait HistogramSink {
    fn write_histogram(&mut self, tag: &str, histogram: &Histogram) -> AnalysisResult<()>;

    fn close(&mut self) -> AnalysisResult<()>;
}

/// Picks the sink from the output extension: `.parquet` or JSON otherwise.
pub fn open_sink(path: &Path) -> AnalysisResult<Box<dyn HistogramSink>> {
    let is_parquet = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        Ok(Box::new(ParquetSink::create(path)?))
    } else {
        Ok(Box::new(JsonSink::create(path)?))
    }
}

// One row per bin, underflow (bin 0) and overflow (bin n + 1) included
#[derive(Default)]
struct BinRows {
    name: Vec<String>,
    tag: Vec<String>,
    title: Vec<String>,
    x_label: Vec<String>,
    y_label: Vec<String>,
    bin: Vec<u32>,
    low_edge: Vec<f64>,
    high_edge: Vec<f64>,
    content: Vec<f64>,
    error: Vec<f64>,
    entries: Vec<u64>,
}

impl BinRows {
    fn push(&mut self, tag: &str, hist: &Histogram, bin: u32, edges: (f64, f64), content: &BinContent) {
        self.name.push(hist.name.clone());
        self.tag.push(tag.to_owned());
        self.title.push(hist.title.clone());
        self.x_label.push(hist.x_label.clone());
        self.y_label.push(hist.y_label.clone());
        self.bin.push(bin);
        self.low_edge.push(edges.0);
        self.high_edge.push(edges.1);
        self.content.push(content.sum);
        self.error.push(content.error());
        self.entries.push(hist.entries);
    }

    fn push_histogram(&mut self, tag: &str, hist: &Histogram) {
        let edges = hist.get_bin_edges();
        let last = hist.bins.len() as u32 + 1;

        self.push(tag, hist, 0, (f64::NEG_INFINITY, hist.range.0), &hist.underflow);
        for (index, content) in hist.bins.iter().enumerate() {
            self.push(
                tag,
                hist,
                index as u32 + 1,
                (edges[index], edges[index + 1]),
                content,
            );
        }
        self.push(tag, hist, last, (hist.range.1, f64::INFINITY), &hist.overflow);
    }

    fn into_dataframe(self) -> PolarsResult<DataFrame> {
        df!(
            "name" => self.name,
            "tag" => self.tag,
            "title" => self.title,
            "x_label" => self.x_label,
            "y_label" => self.y_label,
            "bin" => self.bin,
            "low_edge" => self.low_edge,
            "high_edge" => self.high_edge,
            "content" => self.content,
            "error" => self.error,
            "entries" => self.entries,
        )
    }
}

/// Long-format Parquet table written through polars on close.
pub struct ParquetSink {
    path: PathBuf,
    file: Option<File>,
    rows: BinRows,
    histograms: usize,
}

impl ParquetSink {
    pub fn create(path: &Path) -> AnalysisResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            rows: BinRows::default(),
            histograms: 0,
        })
    }
}

impl HistogramSink for ParquetSink {
    fn write_histogram(&mut self, tag: &str, histogram: &Histogram) -> AnalysisResult<()> {
        if self.file.is_none() {
            return Err(AnalysisError::SinkClosed);
        }
        self.rows.push_histogram(tag, histogram);
        self.histograms += 1;
        Ok(())
    }

    fn close(&mut self) -> AnalysisResult<()> {
        let Some(mut file) = self.file.take() else {
            return Err(AnalysisError::SinkClosed);
        };

        let mut df = std::mem::take(&mut self.rows).into_dataframe()?;
        log::info!(
            "Writing {} histograms ({} rows) to {}",
            self.histograms,
            df.height(),
            self.path.display()
        );
        ParquetWriter::new(&mut file).finish(&mut df)?;
        Ok(())
    }
}

#[derive(Serialize)]
struct TaggedHistogram {
    tag: String,
    #[serde(flatten)]
    histogram: Histogram,
}

#[derive(Serialize)]
struct HistogramDocument<'a> {
    histograms: &'a [TaggedHistogram],
}

/// JSON document `{"histograms": [...]}` written on close.
pub struct JsonSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    histograms: Vec<TaggedHistogram>,
}

impl JsonSink {
    pub fn create(path: &Path) -> AnalysisResult<Self> {
        let file = File::create(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: Some(BufWriter::new(file)),
            histograms: Vec::new(),
        })
    }
}

impl HistogramSink for JsonSink {
    fn write_histogram(&mut self, tag: &str, histogram: &Histogram) -> AnalysisResult<()> {
        if self.writer.is_none() {
            return Err(AnalysisError::SinkClosed);
        }
        self.histograms.push(TaggedHistogram {
            tag: tag.to_owned(),
            histogram: histogram.clone(),
        });
        Ok(())
    }

    fn close(&mut self) -> AnalysisResult<()> {
        let Some(mut writer) = self.writer.take() else {
            return Err(AnalysisError::SinkClosed);
        };

        log::info!(
            "Writing {} histograms to {}",
            self.histograms.len(),
            self.path.display()
        );
        let document = HistogramDocument {
            histograms: &self.histograms,
        };
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        Ok(())
    }
}
