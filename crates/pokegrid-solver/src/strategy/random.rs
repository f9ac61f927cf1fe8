use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use pokegrid_constraint::NameSet;
use rand::Rng;
use rand_pcg::Pcg32;
use serde_json::{Map, Value};

use super::{RankError, RankedCandidate, RankingStrategy, sort_ranked};

/// Scores every candidate independently and uniformly in `[0, 1)`.
///
/// Without a seed each call draws from a fresh OS-seeded generator, so results
/// differ between calls and between runs. With a seed, call `n` draws from
/// stream `n` of a generator seeded with it: runs are reproducible while
/// successive calls still differ.
#[derive(Debug, Default)]
pub struct RandomStrategy {
    seed: Option<u64>,
    calls: AtomicU64,
}

impl RandomStrategy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            calls: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    fn score_all<R>(rng: &mut R, candidates: &NameSet) -> Vec<RankedCandidate>
    where
        R: Rng,
    {
        let mut ranked: Vec<_> = candidates
            .iter()
            .map(|name| RankedCandidate::new(name.clone(), rng.random::<f64>()))
            .collect();
        sort_ranked(&mut ranked);
        ranked
    }
}

#[async_trait]
impl RankingStrategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        if let Some(seed) = self.seed {
            params.insert("seed".to_owned(), seed.into());
        }
        params
    }

    async fn rank(&self, candidates: &NameSet) -> Result<Vec<RankedCandidate>, RankError> {
        let ranked = match self.seed {
            Some(seed) => {
                let stream = self.calls.fetch_add(1, Ordering::Relaxed);
                Self::score_all(&mut Pcg32::new(seed, stream), candidates)
            }
            None => Self::score_all(&mut rand::rng(), candidates),
        };
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> NameSet {
        (0..n).map(|i| format!("mon-{i:03}")).collect()
    }

    #[tokio::test]
    async fn test_every_candidate_ranked_once_in_order() {
        let candidates = pool(50);
        let ranked = RandomStrategy::new().rank(&candidates).await.unwrap();

        assert_eq!(ranked.len(), candidates.len());
        let names: NameSet = ranked.iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, candidates);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(ranked.iter().all(|c| (0.0..1.0).contains(&c.score)));
    }

    #[tokio::test]
    async fn test_empty_pool() {
        let ranked = RandomStrategy::new().rank(&NameSet::new()).await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_seeded_runs_are_reproducible() {
        let candidates = pool(20);
        let a = RandomStrategy::with_seed(7);
        let b = RandomStrategy::with_seed(7);

        let a1 = a.rank(&candidates).await.unwrap();
        let b1 = b.rank(&candidates).await.unwrap();
        assert_eq!(a1, b1);

        let a2 = a.rank(&candidates).await.unwrap();
        assert_ne!(a1, a2);
        assert_eq!(a.params()["seed"], 7);
    }
}
