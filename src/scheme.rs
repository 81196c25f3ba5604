//! Normalized discrete probability distributions over bytes (depth 1)
//! or byte pairs (depth 2), kept together with their raw counts so the
//! count-based metrics stay exact.

/// A probability distribution `p[i] = numerators[i] / denominator`
/// derived from a frequency vector. Depth-2 schemes index pairs at
/// `i + j * size_base_set` where `i` precedes `j`.
#[derive(Clone, Debug)]
pub struct Scheme {
    depth: u8,
    size_base_set: usize,
    numerators: Vec<f64>,
    probabilities: Vec<f64>,
    denominator: f64,
}

impl Scheme {
    /// Builds the distribution from raw counts. An all-zero frequency
    /// vector yields denominator 0 and all-zero probabilities; smoothing
    /// restores a proper distribution.
    pub fn new(depth: u8, size_base_set: usize, frequencies: &[u32]) -> Self {
        assert!(depth == 1 || depth == 2, "Scheme: unsupported depth {depth}");
        let expected = if depth == 2 {
            size_base_set * size_base_set
        } else {
            size_base_set
        };
        assert_eq!(
            frequencies.len(),
            expected,
            "Scheme: frequency vector length does not match depth and base set"
        );

        let numerators: Vec<f64> = frequencies.iter().map(|&f| f64::from(f)).collect();
        let denominator: f64 = numerators.iter().sum();
        let probabilities = if denominator > 0.0 {
            numerators.iter().map(|n| n / denominator).collect()
        } else {
            vec![0.0; numerators.len()]
        };
        Self {
            depth,
            size_base_set,
            numerators,
            probabilities,
            denominator,
        }
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn size_set(&self) -> usize {
        self.size_base_set
    }

    /// Number of cells: the base set size at depth 1, its square at
    /// depth 2.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn denominator(&self) -> f64 {
        self.denominator
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn numerators(&self) -> &[f64] {
        &self.numerators
    }

    /// `P(i)`: direct at depth 1, the marginal sum over `j` of `P(i, j)`
    /// at depth 2.
    pub fn probability(&self, i: usize) -> f64 {
        assert!(i < self.size_base_set, "Scheme::probability: index out of bounds");
        if self.depth == 1 {
            self.probabilities[i]
        } else {
            (0..self.size_base_set)
                .map(|j| self.probabilities[i + j * self.size_base_set])
                .sum()
        }
    }

    /// `P(i, j)` for the pair where `i` precedes `j`. Depth-2 schemes
    /// only; calling this on a depth-1 scheme is a contract violation.
    pub fn pair_probability(&self, i: usize, j: usize) -> f64 {
        assert_eq!(self.depth, 2, "Scheme::pair_probability needs a depth-2 scheme");
        assert!(
            i < self.size_base_set && j < self.size_base_set,
            "Scheme::pair_probability: index out of bounds"
        );
        self.probabilities[i + j * self.size_base_set]
    }

    /// Raw count behind `P(i)`; marginal at depth 2.
    pub fn numerator(&self, i: usize) -> f64 {
        assert!(i < self.size_base_set, "Scheme::numerator: index out of bounds");
        if self.depth == 1 {
            self.numerators[i]
        } else {
            (0..self.size_base_set)
                .map(|j| self.numerators[i + j * self.size_base_set])
                .sum()
        }
    }

    /// Raw count behind `P(i, j)`. Depth-2 schemes only.
    pub fn pair_numerator(&self, i: usize, j: usize) -> f64 {
        assert_eq!(self.depth, 2, "Scheme::pair_numerator needs a depth-2 scheme");
        assert!(
            i < self.size_base_set && j < self.size_base_set,
            "Scheme::pair_numerator: index out of bounds"
        );
        self.numerators[i + j * self.size_base_set]
    }

    /// Additive smoothing, local variant: observed counts are amplified
    /// by `kappa`, empty cells are lifted to a floor of one count, then
    /// the distribution is renormalized.
    pub fn smooth(&mut self, kappa: f64) {
        assert!(kappa > 0.0, "Scheme::smooth: kappa must be positive");
        self.denominator = 0.0;
        for n in &mut self.numerators {
            if *n > 0.0 {
                *n *= kappa;
            } else {
                *n = 1.0;
            }
            self.denominator += *n;
        }
        for (p, n) in self.probabilities.iter_mut().zip(&self.numerators) {
            *p = n / self.denominator;
        }
    }
}
