//! Comparison metrics between byte distributions, plus entropy helpers.
//!
//! Scores accumulate in f64 and the likelihood works entirely in
//! log-space, so long inputs cannot underflow to zero.

use crate::markov::MarkovChain;
use crate::scheme::Scheme;

/// Log-likelihood of observed pair frequencies under a Markov model:
/// the sum of `f(from, to) * log10 M[from][to]` over cells with a
/// nonzero observed count. Higher is better.
pub fn markov_log_likelihood(chain: &MarkovChain, pair_frequencies: &[u32]) -> f64 {
    let size = chain.size();
    assert_eq!(
        pair_frequencies.len(),
        size * size,
        "markov_log_likelihood: frequency vector length mismatch"
    );
    let mut score = 0.0;
    for from in 0..size {
        for to in 0..size {
            let observed = pair_frequencies[from + to * size];
            if observed != 0 {
                score += f64::from(observed) * chain.transition(from, to).log10();
            }
        }
    }
    score
}

/// Chi-square divergence of `test` counts against `theory` counts,
/// skipping cells with no theoretical mass. Lower is better.
pub fn chi_square(test: &Scheme, theory: &Scheme) -> f64 {
    assert_comparable(test, theory, "chi_square");
    test.numerators()
        .iter()
        .zip(theory.numerators())
        .filter(|&(_, &b)| b > 0.0)
        .map(|(&a, &b)| (a - b) * (a - b) / b)
        .sum()
}

/// Kullback-Leibler information distance in log base 2, skipping cells
/// where either side has no mass. Lower is better.
pub fn info_distance(p: &Scheme, q: &Scheme) -> f64 {
    assert_comparable(p, q, "info_distance");
    p.probabilities()
        .iter()
        .zip(q.probabilities())
        .filter(|&(&a, &b)| a > 0.0 && b > 0.0)
        .map(|(&a, &b)| a * (a / b).log2())
        .sum()
}

/// Shannon entropy of a scheme in bits.
pub fn entropy(scheme: &Scheme) -> f64 {
    -scheme
        .probabilities()
        .iter()
        .filter(|&&p| p > 0.0)
        .map(|&p| p * p.log2())
        .sum::<f64>()
}

/// Entropy rate of a chain in bits: the marginal-weighted entropy of
/// each transition row.
pub fn entropy_rate(chain: &MarkovChain) -> f64 {
    let size = chain.size();
    let mut total = 0.0;
    for from in 0..size {
        let marginal = chain.marginal(from);
        if marginal <= 0.0 {
            continue;
        }
        let mut row = 0.0;
        for to in 0..size {
            let t = chain.transition(from, to);
            if t > 0.0 {
                row += t * t.log2();
            }
        }
        total += marginal * row;
    }
    -total
}

fn assert_comparable(a: &Scheme, b: &Scheme, what: &str) {
    assert_eq!(a.depth(), b.depth(), "{what}: schemes must have equal depths");
    assert_eq!(a.len(), b.len(), "{what}: schemes must have equal sizes");
}
