use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisResult;
use crate::event::Event;
use crate::event::objects::TriggerResults;

pub const DEFAULT_TRIGGER_PROCESS: &str = "HLT";

/// One entry of the trigger menu. Rules with a higher priority are tried
/// first; equal priorities keep menu order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerRule {
    pub pattern: String,
    pub threshold: f64,
    #[serde(default)]
    pub priority: u32,
}

impl TriggerRule {
    pub fn new(pattern: &str, threshold: f64, priority: u32) -> Self {
        Self {
            pattern: pattern.to_owned(),
            threshold,
            priority,
        }
    }
}

/// Single photon paths, highest threshold first.
pub fn photon_trigger_menu() -> Vec<TriggerRule> {
    let paths = [
        ("HLT_Photon300_*", 300.0),
        ("HLT_Photon250_*", 250.0),
        ("HLT_Photon160_*", 160.0),
        ("HLT_Photon150_*", 150.0),
        ("HLT_Photon135_*", 135.0),
        ("HLT_Photon120_R9Id90_HE10_Iso40_EBOnly_*", 120.0),
        ("HLT_Photon90_R9Id90_HE10_Iso40_EBOnly_*", 92.0),
        ("HLT_Photon75_R9Id90_HE10_Iso40_EBOnly_*", 77.0),
        ("HLT_Photon50_R9Id90_HE10_Iso40_EBOnly_*", 50.0),
        ("HLT_Photon36_R9Id90_HE10_Iso40_EBOnly_*", 36.0),
        ("HLT_Photon22_R9Id90_HE10_Iso40_EBOnly_*", 22.0),
    ];
    let count = paths.len() as u32;
    paths
        .iter()
        .zip((1..=count).rev())
        .map(|(&(pattern, threshold), priority)| TriggerRule::new(pattern, threshold, priority))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDecision {
    pub fired: bool,
    pub threshold: f64,
    /// Name of the fired path that matched.
    pub path: Option<String>,
    /// Prescale of that path. Informational only.
    pub prescale: Option<u32>,
}

impl TriggerDecision {
    pub fn rejected() -> Self {
        Self {
            fired: false,
            threshold: 0.0,
            path: None,
            prescale: None,
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: TriggerRule,
    regex: Regex,
}

/// Turns a path pattern into an anchored regex: `*` matches any run of
/// characters, `?` a single one, everything else is literal.
pub fn pattern_to_regex(pattern: &str) -> AnalysisResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            _ => expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }
    expr.push('$');
    Ok(Regex::new(&expr)?)
}

#[derive(Debug, Clone)]
pub struct TriggerSelector {
    process: String,
    rules: Vec<CompiledRule>,
}

impl TriggerSelector {
    pub fn new(process: &str, menu: &[TriggerRule]) -> AnalysisResult<Self> {
        let mut rules = menu
            .iter()
            .map(|rule| {
                Ok(CompiledRule {
                    rule: rule.clone(),
                    regex: pattern_to_regex(&rule.pattern)?,
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;
        // stable: equal priorities keep menu order
        rules.sort_by(|a, b| b.rule.priority.cmp(&a.rule.priority));

        Ok(Self {
            process: process.to_owned(),
            rules,
        })
    }

    pub fn rules(&self) -> impl Iterator<Item = &TriggerRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn evaluate<E: Event + ?Sized>(&self, event: &E) -> TriggerDecision {
        self.evaluate_results(event.trigger_results(&self.process))
    }

    /// First rule, in priority order, matching an accepted path. Missing
    /// results never fire.
    pub fn evaluate_results(&self, results: Option<&TriggerResults>) -> TriggerDecision {
        let Some(results) = results else {
            log::trace!("No trigger results for process '{}'", self.process);
            return TriggerDecision::rejected();
        };

        for compiled in &self.rules {
            if let Some(path) = results
                .accepted_paths()
                .find(|path| compiled.regex.is_match(&path.name))
            {
                return TriggerDecision {
                    fired: true,
                    threshold: compiled.rule.threshold,
                    path: Some(path.name.clone()),
                    prescale: Some(path.prescale),
                };
            }
        }

        TriggerDecision::rejected()
    }
}
