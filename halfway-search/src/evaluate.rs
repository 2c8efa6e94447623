//! Batched travel-time evaluation of candidate points.

use futures_util::join;
use halfway_core::{Candidate, DurationMatrixProvider, Evaluation, GeoPoint, SearchConfig};
use log::warn;

/// Evaluates candidates against two origins through the duration-matrix
/// provider.
///
/// One batched matrix call covers a whole round of candidates. Candidates
/// with a missing entry from either origin are silently excluded; they are
/// never represented with a placeholder time. When the batched call itself
/// fails, a capped number of pairwise lookups is issued instead, and an
/// empty result is a valid "no data" outcome - the evaluator never
/// propagates provider errors.
pub struct TravelTimeEvaluator<'a, M> {
    matrix: &'a M,
    config: &'a SearchConfig,
}

impl<'a, M> TravelTimeEvaluator<'a, M>
where
    M: DurationMatrixProvider + Sync,
{
    /// Borrow a provider and configuration for the duration of a search.
    #[must_use]
    pub fn new(matrix: &'a M, config: &'a SearchConfig) -> Self {
        Self { matrix, config }
    }

    /// Evaluate `candidates` from both origins, one [`Evaluation`] per
    /// candidate with both travel times resolved.
    pub async fn evaluate(
        &self,
        origin1: GeoPoint,
        origin2: GeoPoint,
        candidates: &[Candidate],
    ) -> Vec<Evaluation> {
        let points: Vec<GeoPoint> = candidates.iter().map(|c| c.point).collect();
        let times = resolve_pair_times(
            self.matrix,
            origin1,
            origin2,
            &points,
            self.config.pairwise_fallback_limit,
        )
        .await;
        times
            .into_iter()
            .filter_map(|(index, t1, t2)| {
                candidates
                    .get(index)
                    .map(|&candidate| Evaluation::new(candidate, t1, t2))
            })
            .collect()
    }
}

/// Resolve `(t1, t2)` transit times from both origins to each destination.
///
/// Returns `(destination_index, t1, t2)` for every destination where both
/// times resolved. Tries one batched 2xN matrix call first; if that call
/// fails, falls back to sequential paired point-to-point lookups for the
/// first `fallback_limit` destinations. Individual lookup failures drop the
/// destination from the result set.
pub(crate) async fn resolve_pair_times<M>(
    matrix: &M,
    origin1: GeoPoint,
    origin2: GeoPoint,
    destinations: &[GeoPoint],
    fallback_limit: usize,
) -> Vec<(usize, f64, f64)>
where
    M: DurationMatrixProvider + Sync,
{
    if destinations.is_empty() {
        return Vec::new();
    }

    match matrix.durations(&[origin1, origin2], destinations).await {
        Ok(rows) => {
            let row1 = rows.first();
            let row2 = rows.get(1);
            destinations
                .iter()
                .enumerate()
                .filter_map(|(index, _)| {
                    let t1 = row1.and_then(|r| r.get(index).copied().flatten())?;
                    let t2 = row2.and_then(|r| r.get(index).copied().flatten())?;
                    Some((index, t1, t2))
                })
                .collect()
        }
        Err(err) => {
            warn!("duration matrix call failed, using pairwise fallback: {err}");
            pairwise_fallback(matrix, origin1, origin2, destinations, fallback_limit).await
        }
    }
}

async fn pairwise_fallback<M>(
    matrix: &M,
    origin1: GeoPoint,
    origin2: GeoPoint,
    destinations: &[GeoPoint],
    limit: usize,
) -> Vec<(usize, f64, f64)>
where
    M: DurationMatrixProvider + Sync,
{
    let mut resolved = Vec::new();
    for (index, &destination) in destinations.iter().take(limit).enumerate() {
        let (first, second) = join!(
            matrix.duration(origin1, destination),
            matrix.duration(origin2, destination)
        );
        match (first, second) {
            (Ok(Some(t1)), Ok(Some(t2))) => resolved.push((index, t1, t2)),
            (Err(err), _) | (_, Err(err)) => {
                warn!("pairwise duration lookup failed, dropping candidate: {err}");
            }
            _ => {}
        }
    }
    resolved
}
