use ptrid::markov::MarkovChain;
use ptrid::reader::ByteReader;
use ptrid::scheme::Scheme;
use std::fs;
use tempfile::tempdir;

const EPSILON: f64 = 1e-10;

fn row_sum(chain: &MarkovChain, from: usize) -> f64 {
    (0..chain.size()).map(|to| chain.transition(from, to)).sum()
}

fn chain_from_training_dir() -> MarkovChain {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("types");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("a.txt"), "aaaaaaaaaa").unwrap();
    fs::write(sub.join("b.txt"), "bbbbb").unwrap();

    let mut reader = ByteReader::new(2);
    reader.read_path(&sub).unwrap();
    MarkovChain::new(Scheme::new(2, reader.size_set(), reader.frequencies()))
}

#[test]
fn raw_rows_sum_to_one_or_zero() {
    let chain = chain_from_training_dir();
    for from in 0..chain.size() {
        let sum = row_sum(&chain, from);
        assert!(
            (sum - 1.0).abs() < EPSILON || sum.abs() < EPSILON,
            "row {from} sums to {sum}"
        );
    }
    // Rows with observed mass normalize; rows without stay empty.
    assert!((row_sum(&chain, b'a' as usize) - 1.0).abs() < EPSILON);
    assert!(row_sum(&chain, b'c' as usize).abs() < EPSILON);
}

#[test]
fn smoothed_rows_all_sum_to_one() {
    let mut chain = chain_from_training_dir();
    chain.smooth(1000.0);
    for from in 0..chain.size() {
        assert!((row_sum(&chain, from) - 1.0).abs() < EPSILON);
    }
    // No transition is left at zero after smoothing.
    assert!(chain.transition(b'c' as usize, b'q' as usize) > 0.0);
}

#[test]
fn transitions_divide_pairs_by_marginals() {
    // Pairs: (0,0)=3 (1,0)=1, nothing else. P(0)=0.75, P(1)=0.25.
    let chain = MarkovChain::new(Scheme::new(2, 2, &[3, 1, 0, 0]));
    assert!((chain.transition(0, 0) - 1.0).abs() < EPSILON);
    assert!(chain.transition(0, 1).abs() < EPSILON);
    assert!((chain.transition(1, 0) - 1.0).abs() < EPSILON);
    assert!(chain.transition(1, 1).abs() < EPSILON);
    assert!((chain.marginal(0) - 0.75).abs() < EPSILON);
    assert!((chain.marginal(1) - 0.25).abs() < EPSILON);
}

#[test]
fn marginals_come_from_the_retained_scheme() {
    let chain = chain_from_training_dir();
    // Directory totals: 15 pairs, 10 of them starting with 'a'.
    assert!((chain.marginal(b'a' as usize) - 10.0 / 15.0).abs() < EPSILON);
    assert!((chain.marginal(b'b' as usize) - 5.0 / 15.0).abs() < EPSILON);
    assert_eq!(chain.scheme().depth(), 2);
}

#[test]
fn vanishing_pairs_are_cut_off() {
    // Three overwhelming pairs push the single (1, 1) observation below
    // the probability cutoff; its transition cell is zeroed rather than
    // divided by the marginal.
    let chain = MarkovChain::new(Scheme::new(2, 2, &[u32::MAX, u32::MAX, u32::MAX, 1]));
    assert_eq!(chain.transition(1, 1), 0.0);
    assert!((chain.transition(1, 0) - 1.0).abs() < 1e-9);
}

#[test]
#[should_panic]
fn depth_one_scheme_is_rejected() {
    let _ = MarkovChain::new(Scheme::new(1, 256, &[1u32; 256]));
}
