//! Diversity statistics on a sample of gametes.
//!
//! A [`GameteSample`] holds the derived-allele count of every mutation seen in
//! a sample of `n` gametes. The estimators below work on those counts:
//! - Nucleotide diversity (π)
//! - Watterson's estimator (θ_W)
//! - Tajima's D
//! - Normalized Fay and Wu's H (H')
//!
//! Sites at count `0` or `n` are monomorphic in the sample and are ignored.
//! Statistics that are undefined for the sample (no segregating sites, fewer
//! than two gametes, zero variance) are reported as `0.0`.

use crate::simulation::Population;
use rand::Rng;

/// Derived-allele counts of a sample of gametes, split by mutation type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameteSample {
    /// Number of gametes sampled.
    pub size: usize,
    pub neutral: Vec<u32>,
    pub selected: Vec<u32>,
}

impl GameteSample {
    /// Sample `size` gametes from `population`.
    ///
    /// Diploids are drawn uniformly with replacement and contribute both of
    /// their gametes, first then second; an odd `size` takes only the first
    /// gamete of the last diploid. An empty population gives an empty sample.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, population: &Population, size: usize) -> Self {
        let diploids = population.diploids();
        if diploids.is_empty() || size == 0 {
            return Self::default();
        }
        let gametes = population.gametes();
        let mutations = population.mutations();

        let mut counts = vec![0u32; mutations.len()];
        let mut diploid = &diploids[0];
        for i in 0..size {
            let key = if i % 2 == 0 {
                diploid = &diploids[rng.random_range(0..diploids.len())];
                diploid.first
            } else {
                diploid.second
            };
            let g = &gametes[key];
            for &m in g.mutations.iter().chain(&g.smutations) {
                counts[m] += 1;
            }
        }

        let mut sample = Self {
            size,
            ..Self::default()
        };
        for (m, &c) in mutations.iter().zip(&counts).filter(|&(_, &c)| c > 0) {
            if m.neutral {
                sample.neutral.push(c);
            } else {
                sample.selected.push(c);
            }
        }
        sample
    }

    /// Counts at every site, neutral first.
    pub fn combined(&self) -> Vec<u32> {
        self.neutral.iter().chain(&self.selected).copied().collect()
    }
}

/// `a_n = Σ 1/i` and `b_n = Σ 1/i²` for `i` in `1..n`.
fn harmonic_sums(n: usize) -> (f64, f64) {
    (1..n).fold((0.0, 0.0), |(a, b), i| {
        let i = i as f64;
        (a + 1.0 / i, b + 1.0 / (i * i))
    })
}

fn polymorphic(counts: &[u32], n: usize) -> impl Iterator<Item = f64> + '_ {
    counts
        .iter()
        .filter(move |&&k| k > 0 && (k as usize) < n)
        .map(|&k| f64::from(k))
}

/// Number of sites polymorphic among `n` gametes.
pub fn segregating_sites(counts: &[u32], n: usize) -> usize {
    polymorphic(counts, n).count()
}

/// Mean number of pairwise differences between the `n` sampled gametes.
///
/// # Formula
///
/// $$\pi = \sum_{sites} \frac{2k(n-k)}{n(n-1)}$$
///
/// # References
///
/// Tajima, F. (1983). Evolutionary relationship of DNA sequences in finite
/// populations. Genetics, 105(2), 437-460.
pub fn nucleotide_diversity(counts: &[u32], n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let nf = n as f64;
    polymorphic(counts, n)
        .map(|k| 2.0 * k * (nf - k) / (nf * (nf - 1.0)))
        .sum()
}

/// Watterson's estimator `θ_W = S / a_n`.
pub fn wattersons_theta(counts: &[u32], n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    let (a1, _) = harmonic_sums(n);
    segregating_sites(counts, n) as f64 / a1
}

/// `θ_L = Σ k / (n - 1)` over polymorphic sites.
pub fn theta_l(counts: &[u32], n: usize) -> f64 {
    if n < 2 {
        return 0.0;
    }
    polymorphic(counts, n).sum::<f64>() / (n as f64 - 1.0)
}

/// Tajima's D.
///
/// # Formula
///
/// $$D = \frac{\pi - \theta_W}{\sqrt{e_1 S + e_2 S(S-1)}}$$
///
/// Negative values point to an excess of rare variants.
///
/// # References
///
/// Tajima, F. (1989). Statistical method for testing the neutral mutation
/// hypothesis by DNA polymorphism. Genetics, 123(3), 585-595.
pub fn tajimas_d(counts: &[u32], n: usize) -> f64 {
    let s = segregating_sites(counts, n) as f64;
    if n < 2 || s == 0.0 {
        return 0.0;
    }
    let nf = n as f64;
    let (a1, a2) = harmonic_sums(n);

    let b1 = (nf + 1.0) / (3.0 * (nf - 1.0));
    let b2 = 2.0 * (nf * nf + nf + 3.0) / (9.0 * nf * (nf - 1.0));
    let c1 = b1 - 1.0 / a1;
    let c2 = b2 - (nf + 2.0) / (a1 * nf) + a2 / (a1 * a1);
    let e1 = c1 / a1;
    let e2 = c2 / (a1 * a1 + a2);

    let var = e1 * s + e2 * s * (s - 1.0);
    if var <= 0.0 {
        return 0.0;
    }
    (nucleotide_diversity(counts, n) - s / a1) / var.sqrt()
}

/// Normalized Fay and Wu's H.
///
/// # Formula
///
/// $$H' = \frac{\pi - \theta_L}{\sqrt{Var(\pi - \theta_L)}}$$
///
/// with the variance taken from θ_W and its squared estimate
/// `S(S-1) / (a_n² + b_n)`. Negative values point to an excess of
/// high-frequency derived variants.
///
/// # References
///
/// Zeng, K., Fu, Y. X., Shi, S., & Wu, C. I. (2006). Statistical tests for
/// detecting positive selection by utilizing high-frequency variants.
/// Genetics, 174(3), 1431-1439.
pub fn normalized_fay_wu_h(counts: &[u32], n: usize) -> f64 {
    let s = segregating_sites(counts, n) as f64;
    if n < 2 || s == 0.0 {
        return 0.0;
    }
    let nf = n as f64;
    let (a1, b1) = harmonic_sums(n);
    let b_next = b1 + 1.0 / (nf * nf);

    let theta = s / a1;
    let theta_sq = s * (s - 1.0) / (a1 * a1 + b1);
    let var = (nf - 2.0) / (6.0 * (nf - 1.0)) * theta
        + theta_sq
            * (18.0 * nf * nf * (3.0 * nf + 2.0) * b_next
                - (88.0 * nf * nf * nf + 9.0 * nf * nf - 13.0 * nf + 6.0))
            / (9.0 * nf * (nf - 1.0) * (nf - 1.0));
    if var <= 0.0 {
        return 0.0;
    }
    (nucleotide_diversity(counts, n) - theta_l(counts, n)) / var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{Diploid, Gamete, Mutation};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_statistics_on_hand_built_sample() {
        // Four gametes; sites carried by 1, 2 and 3 of them, plus one site
        // fixed in the sample that does not count.
        let counts = [1, 2, 3, 4];
        assert_eq!(segregating_sites(&counts, 4), 3);
        assert!(close(nucleotide_diversity(&counts, 4), 5.0 / 3.0));
        assert!(close(wattersons_theta(&counts, 4), 3.0 / (11.0 / 6.0)));
        assert!(close(theta_l(&counts, 4), 2.0));
        assert!(close(tajimas_d(&counts, 4), 0.167_655_795_033_948_1));
        assert!(close(normalized_fay_wu_h(&counts, 4), -0.709_005_057_840_218_3));
    }

    #[test]
    fn test_rare_variants_give_negative_d() {
        let singletons = [1, 1, 1, 1];
        assert!(close(nucleotide_diversity(&singletons, 10), 0.8));
        assert!(close(tajimas_d(&singletons, 10), -1.667_060_561_962_230_7));
        assert!(close(normalized_fay_wu_h(&singletons, 10), 0.655_628_621_071_693_3));
    }

    #[test]
    fn test_high_frequency_variants_give_negative_h() {
        let counts = [9, 9, 8];
        assert!(close(normalized_fay_wu_h(&counts, 10), -4.777_214_516_571_14));
        assert!(close(tajimas_d(&counts, 10), -1.034_456_093_105_083_5));
    }

    #[test]
    fn test_undefined_statistics_are_zero() {
        assert_eq!(tajimas_d(&[], 10), 0.0);
        assert_eq!(normalized_fay_wu_h(&[10, 0], 10), 0.0);
        assert_eq!(nucleotide_diversity(&[1], 1), 0.0);
        assert_eq!(wattersons_theta(&[1], 0), 0.0);
        // Two gametes leave Tajima's variance at zero.
        assert_eq!(tajimas_d(&[1], 2), 0.0);
    }

    #[test]
    fn test_draw_counts_both_gametes() {
        let mutations = vec![
            Mutation::neutral(0.1, 0),
            Mutation::selected(0.2, -0.1, 0.5, 0),
            Mutation::neutral(0.3, 0),
        ];
        let gametes = vec![
            Gamete::with_mutations(0, vec![0, 2], vec![]),
            Gamete::with_mutations(0, vec![2], vec![1]),
        ];
        let diploids = vec![Diploid::new(0, 1); 5];
        let pop = Population::from_parts(diploids, gametes, mutations).unwrap();
        let mut rng = StdRng::seed_from_u64(42);

        let sample = GameteSample::draw(&mut rng, &pop, 10);
        assert_eq!(sample.size, 10);
        assert_eq!(sample.neutral, vec![5, 10]);
        assert_eq!(sample.selected, vec![5]);
        assert_eq!(sample.combined(), vec![5, 10, 5]);
        assert_eq!(segregating_sites(&sample.combined(), sample.size), 2);

        let odd = GameteSample::draw(&mut rng, &pop, 5);
        assert_eq!(odd.neutral, vec![3, 5]);
        assert_eq!(odd.selected, vec![2]);
    }

    #[test]
    fn test_draw_from_empty_population() {
        let pop = Population::new(0).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(GameteSample::draw(&mut rng, &pop, 100), GameteSample::default());
    }
}
