//! Reference model library: one smoothed model per training directory
//! plus the synthetic uniform "random" type, wrapped in the
//! metric-specific analyzer that turns observed pair frequencies into a
//! type index.

use crate::error::Result;
use crate::markov::MarkovChain;
use crate::metrics;
use crate::reader::{ByteReader, BASE_SET_SIZE};
use crate::scheme::Scheme;
use clap::ValueEnum;
use log::{debug, info};
use std::path::PathBuf;

/// Smoothing factor applied to every trained reference model and to the
/// sample scheme built for the scheme-based metrics.
pub const SMOOTHING_FACTOR: f64 = 1000.0;

/// Name given to the appended uniform reference type.
pub const RANDOM_TYPE_NAME: &str = "random";

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    /// Log-likelihood under a first-order Markov chain
    #[value(name = "MC")]
    MarkovLogLikelihood,
    /// Kullback-Leibler information distance
    #[value(name = "ID")]
    InfoDistance,
    /// Chi-square divergence
    #[value(name = "CHI2")]
    ChiSquare,
}

impl Metric {
    /// Short tag printed with offline verdicts.
    pub fn tag(&self) -> &'static str {
        match self {
            Metric::MarkovLogLikelihood => "MC",
            Metric::InfoDistance => "ID",
            Metric::ChiSquare => "CH",
        }
    }
}

/// Metric-specific reference representation. Each variant owns the
/// models it scores against.
pub enum Analyzer {
    MarkovLogLikelihood(Vec<MarkovChain>),
    InfoDistance(Vec<Scheme>),
    ChiSquare(Vec<Scheme>),
}

impl Analyzer {
    pub fn len(&self) -> usize {
        match self {
            Analyzer::MarkovLogLikelihood(chains) => chains.len(),
            Analyzer::InfoDistance(schemes) | Analyzer::ChiSquare(schemes) => schemes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scores observed pair frequencies against every reference and
    /// returns the index of the best-matching type, keeping the earliest
    /// index on ties. Best means maximum log-likelihood or minimum
    /// distance depending on the metric.
    pub fn score(&self, pair_frequencies: &[u32]) -> usize {
        let scores: Vec<f64> = match self {
            Analyzer::MarkovLogLikelihood(chains) => chains
                .iter()
                .map(|chain| metrics::markov_log_likelihood(chain, pair_frequencies))
                .collect(),
            Analyzer::InfoDistance(schemes) => {
                let sample = sample_scheme(pair_frequencies);
                schemes
                    .iter()
                    .map(|scheme| metrics::info_distance(scheme, &sample))
                    .collect()
            }
            Analyzer::ChiSquare(schemes) => {
                let sample = sample_scheme(pair_frequencies);
                schemes
                    .iter()
                    .map(|scheme| metrics::chi_square(&sample, scheme))
                    .collect()
            }
        };
        debug!("type scores: {scores:?}");
        let higher_wins = matches!(self, Analyzer::MarkovLogLikelihood(_));
        best_index(&scores, higher_wins)
    }
}

/// Depth-2 scheme of the observed sample, smoothed with the fixed
/// factor the scheme-based metrics expect.
fn sample_scheme(pair_frequencies: &[u32]) -> Scheme {
    let mut scheme = Scheme::new(2, BASE_SET_SIZE, pair_frequencies);
    scheme.smooth(SMOOTHING_FACTOR);
    scheme
}

fn best_index(scores: &[f64], higher_wins: bool) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        let better = if higher_wins {
            score > scores[best]
        } else {
            score < scores[best]
        };
        if better {
            best = i;
        }
    }
    best
}

/// Named reference types and the analyzer built over them.
pub struct ReferenceLibrary {
    metric: Metric,
    names: Vec<String>,
    analyzer: Analyzer,
}

impl ReferenceLibrary {
    /// Trains one reference per directory with the fixed smoothing
    /// factor, then appends the uniform "random" type, which is already
    /// smooth and is used as-is.
    pub fn build(type_dirs: &[PathBuf], metric: Metric) -> Result<Self> {
        let mut names: Vec<String> = type_dirs.iter().map(|p| p.display().to_string()).collect();
        names.push(RANDOM_TYPE_NAME.to_string());

        let uniform = vec![1u32; BASE_SET_SIZE * BASE_SET_SIZE];
        let mut reader = ByteReader::new(2);

        let analyzer = match metric {
            Metric::MarkovLogLikelihood => {
                let mut chains = Vec::with_capacity(type_dirs.len() + 1);
                for dir in type_dirs {
                    info!("training Markov chain from {}", dir.display());
                    reader.reset();
                    reader.read_path(dir)?;
                    let mut chain =
                        MarkovChain::new(Scheme::new(2, BASE_SET_SIZE, reader.frequencies()));
                    chain.smooth(SMOOTHING_FACTOR);
                    chains.push(chain);
                }
                chains.push(MarkovChain::new(Scheme::new(2, BASE_SET_SIZE, &uniform)));
                Analyzer::MarkovLogLikelihood(chains)
            }
            Metric::InfoDistance | Metric::ChiSquare => {
                let mut schemes = Vec::with_capacity(type_dirs.len() + 1);
                for dir in type_dirs {
                    info!("training scheme from {}", dir.display());
                    reader.reset();
                    reader.read_path(dir)?;
                    let mut scheme = Scheme::new(2, BASE_SET_SIZE, reader.frequencies());
                    scheme.smooth(SMOOTHING_FACTOR);
                    schemes.push(scheme);
                }
                schemes.push(Scheme::new(2, BASE_SET_SIZE, &uniform));
                if metric == Metric::InfoDistance {
                    Analyzer::InfoDistance(schemes)
                } else {
                    Analyzer::ChiSquare(schemes)
                }
            }
        };

        Ok(Self {
            metric,
            names,
            analyzer,
        })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
