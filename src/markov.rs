//! First-order byte-transition matrix derived from a depth-2 scheme.

use crate::scheme::Scheme;

/// Pair probabilities below this floor are zeroed instead of divided by
/// a vanishing marginal.
const PROBABILITY_CUTOFF: f64 = 1e-10;

/// Row-stochastic matrix `M[from][to] = P(from, to) / P(from)`. The
/// originating scheme is retained so the marginal `P(from)` stays
/// available.
#[derive(Clone, Debug)]
pub struct MarkovChain {
    matrix: Vec<f64>,
    scheme: Scheme,
}

impl MarkovChain {
    /// Builds the transition matrix from a depth-2 scheme, zeroing cells
    /// whose pair probability falls below the cutoff.
    pub fn new(scheme: Scheme) -> Self {
        assert_eq!(scheme.depth(), 2, "MarkovChain: needs a depth-2 scheme");
        let size = scheme.size_set();
        let mut matrix = vec![0.0; size * size];
        for from in 0..size {
            let marginal = scheme.probability(from);
            for to in 0..size {
                let pair = scheme.pair_probability(from, to);
                if pair < PROBABILITY_CUTOFF {
                    continue;
                }
                matrix[from * size + to] = pair / marginal;
            }
        }
        Self { matrix, scheme }
    }

    pub fn size(&self) -> usize {
        self.scheme.size_set()
    }

    /// `P(to | from)`.
    pub fn transition(&self, from: usize, to: usize) -> f64 {
        let size = self.size();
        assert!(
            from < size && to < size,
            "MarkovChain::transition: index out of bounds"
        );
        self.matrix[from * size + to]
    }

    /// Marginal `P(from)` from the retained scheme.
    pub fn marginal(&self, i: usize) -> f64 {
        self.scheme.probability(i)
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Smooths the retained scheme and recomputes every cell. After
    /// smoothing no pair probability is zero, so the cutoff no longer
    /// applies and every row sums to one.
    pub fn smooth(&mut self, kappa: f64) {
        self.scheme.smooth(kappa);
        let size = self.scheme.size_set();
        for from in 0..size {
            let marginal = self.scheme.probability(from);
            for to in 0..size {
                self.matrix[from * size + to] =
                    self.scheme.pair_probability(from, to) / marginal;
            }
        }
    }
}
