//! Event model consumed by the selection.
//!
//! An [`Event`] exposes trigger results by process name and labelled
//! products; every retrieval carries a validity flag through [`Handle`]. An
//! [`EventSource`] gives indexed access to a fixed number of events and hands
//! each one out as an owned value that lives for one pass of the loop.

pub mod chain;
pub mod objects;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisResult;
use objects::{Photon, TriggerResults, Vertex};

/// A labelled per-event collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Vertices(Vec<Vertex>),
    Photons(Vec<Photon>),
    Scalar(f64),
}

/// Typed view of a [`Product`]. `None` when the product holds another type.
pub trait FromProduct<'a>: Sized {
    fn from_product(product: &'a Product) -> Option<Self>;
}

impl<'a> FromProduct<'a> for &'a [Vertex] {
    fn from_product(product: &'a Product) -> Option<Self> {
        match product {
            Product::Vertices(vertices) => Some(vertices),
            _ => None,
        }
    }
}

impl<'a> FromProduct<'a> for &'a [Photon] {
    fn from_product(product: &'a Product) -> Option<Self> {
        match product {
            Product::Photons(photons) => Some(photons),
            _ => None,
        }
    }
}

impl<'a> FromProduct<'a> for f64 {
    fn from_product(product: &'a Product) -> Option<Self> {
        match product {
            Product::Scalar(value) => Some(*value),
            _ => None,
        }
    }
}

/// Result of a labelled retrieval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle<T> {
    value: Option<T>,
}

impl<T> Handle<T> {
    pub fn new(value: Option<T>) -> Self {
        Self { value }
    }

    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

}

impl<T: Default> Handle<T> {
    /// Invalid handles read as empty.
    pub fn unwrap_or_default(self) -> T {
        self.value.unwrap_or_default()
    }
}

pub trait Event {
    /// `None` when the process has no trigger results in this event.
    fn trigger_results(&self, process: &str) -> Option<&TriggerResults>;

    fn product(&self, label: &str) -> Option<&Product>;

    fn get_by_label<'a, T: FromProduct<'a>>(&'a self, label: &str) -> Handle<T> {
        Handle::new(self.product(label).and_then(T::from_product))
    }
}

pub trait EventSource {
    type Event: Event;

    fn len(&self) -> usize;

    fn event(&self, index: usize) -> AnalysisResult<Self::Event>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One event as stored in the JSON-lines input files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub run: u32,
    #[serde(default)]
    pub lumi: u32,
    #[serde(default)]
    pub event: u64,
    #[serde(default)]
    pub trigger: Vec<TriggerResults>,
    #[serde(default)]
    pub products: BTreeMap<String, Product>,
}

impl EventRecord {
    pub fn with_trigger(mut self, results: TriggerResults) -> Self {
        self.trigger.push(results);
        self
    }

    pub fn with_product(mut self, label: &str, product: Product) -> Self {
        self.products.insert(label.to_owned(), product);
        self
    }
}

impl Event for EventRecord {
    fn trigger_results(&self, process: &str) -> Option<&TriggerResults> {
        self.trigger.iter().find(|results| results.process == process)
    }

    fn product(&self, label: &str) -> Option<&Product> {
        self.products.get(label)
    }
}
