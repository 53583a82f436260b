use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Splits `0..n` into `k` shuffled held-out folds.
///
/// The shuffle is seeded so repeated runs over the same file give the same
/// folds. The first `n % k` folds hold one extra row.
pub fn kfold_indices(n: usize, k: usize, seed: u64) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    folds
}

/// Everything in `0..n` not in `held_out`.
pub fn complement(n: usize, held_out: &[usize]) -> Vec<usize> {
    let mut mask = vec![true; n];
    for &i in held_out {
        mask[i] = false;
    }
    (0..n).filter(|&i| mask[i]).collect()
}
