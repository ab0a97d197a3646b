//! Global-shift detection between two label sets.
//!
//! A drawing revision often re-bases part of the sheet: a block of
//! geometry moves as one, and a naive positional diff reports every
//! label inside it as changed. This module pairs labels common to both
//! sets, clusters their positional deltas, and reports whether a single
//! dominant shift explains a meaningful share of the movement.

use std::collections::BTreeMap;

use serde::Serialize;

use dwg_label::TextLabel;
use dwg_label::quantize::GridPoint;

/// Minimum share (percent) of samples a non-zero cluster must hold to
/// count as a dominant shift worth correcting for.
pub const DOMINANT_SHARE_THRESHOLD: f64 = 15.0;

/// One paired measurement: how far a label moved from B to A.
///
/// The sign convention is `A - B`: adding the sample to B's position
/// lands on A's. Translating the B set by a cluster's offset therefore
/// aligns its members onto their A counterparts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetSample {
    pub dx: f64,
    pub dy: f64,
    pub label: String,
}

/// Samples sharing a quantized `(dx, dy)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OffsetCluster {
    pub dx: f64,
    pub dy: f64,
    pub members: Vec<String>,
}

impl OffsetCluster {
    /// Whether this cluster sits at the origin, i.e. its members did
    /// not move (within half the clustering tolerance).
    fn is_no_change(&self, tolerance: f64) -> bool {
        self.dx.abs() < tolerance / 2.0 && self.dy.abs() < tolerance / 2.0
    }
}

/// The largest cluster away from the origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DominantShift {
    pub dx: f64,
    pub dy: f64,
    pub members: usize,
    /// Percent of all samples in this cluster.
    pub share: f64,
}

impl DominantShift {
    /// Whether correcting for this shift would remove a meaningful
    /// share of the positional differences.
    pub fn is_significant(&self) -> bool {
        self.share > DOMINANT_SHARE_THRESHOLD
    }
}

/// Full result of an offset analysis.
///
/// `total_samples == 0` means the two sets share no label text; that is
/// a valid, information-bearing outcome, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct OffsetReport {
    pub tolerance: f64,
    pub total_samples: usize,
    /// All clusters, largest first.
    pub clusters: Vec<OffsetCluster>,
    /// Samples in the origin cluster.
    pub no_change_members: usize,
    /// Percent of samples that did not move.
    pub no_change_share: f64,
    pub dominant: Option<DominantShift>,
    /// Percent of samples explained by neither the origin cluster nor
    /// the dominant shift.
    pub residual_share: f64,
}

/// Pair up labels common to both sets and measure their deltas.
///
/// When a text occurs the same number of times on both sides, the
/// occurrences are rank-paired after sorting by position. With unequal
/// counts each A occurrence pairs with its nearest B occurrence
/// independently; a B point may then back several samples.
pub fn collect_samples(a: &[TextLabel], b: &[TextLabel]) -> Vec<OffsetSample> {
    fn by_text(labels: &[TextLabel]) -> BTreeMap<&str, Vec<(f64, f64)>> {
        let mut map: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
        for label in labels {
            map.entry(label.text.as_str())
                .or_default()
                .push((label.x, label.y));
        }
        map
    }
    let a_map = by_text(a);
    let b_map = by_text(b);

    let mut samples = Vec::new();
    for (text, positions_a) in &a_map {
        let Some(positions_b) = b_map.get(text) else {
            continue;
        };
        if positions_a.len() == positions_b.len() {
            let mut sorted_a = positions_a.clone();
            let mut sorted_b = positions_b.clone();
            let by_coord =
                |p: &(f64, f64), q: &(f64, f64)| p.0.total_cmp(&q.0).then(p.1.total_cmp(&q.1));
            sorted_a.sort_by(by_coord);
            sorted_b.sort_by(by_coord);
            for (pa, pb) in sorted_a.iter().zip(&sorted_b) {
                samples.push(OffsetSample {
                    dx: pa.0 - pb.0,
                    dy: pa.1 - pb.1,
                    label: text.to_string(),
                });
            }
        } else {
            for pa in positions_a {
                let mut min_dist = f64::INFINITY;
                let mut closest = None;
                for pb in positions_b {
                    let dist = ((pb.0 - pa.0).powi(2) + (pb.1 - pa.1).powi(2)).sqrt();
                    // Strict comparison: the earliest of equidistant
                    // B points wins.
                    if dist < min_dist {
                        min_dist = dist;
                        closest = Some(pb);
                    }
                }
                if let Some(pb) = closest {
                    samples.push(OffsetSample {
                        dx: pa.0 - pb.0,
                        dy: pa.1 - pb.1,
                        label: text.to_string(),
                    });
                }
            }
        }
    }
    samples
}

/// Group samples by quantized delta, largest cluster first.
///
/// Equal-sized clusters order by their `(dx, dy)` key so the ranking is
/// stable across runs.
pub fn cluster_samples(samples: &[OffsetSample], tolerance: f64) -> Vec<OffsetCluster> {
    let mut grouped: BTreeMap<GridPoint, Vec<String>> = BTreeMap::new();
    for sample in samples {
        let key = GridPoint::new(sample.dx, sample.dy, tolerance);
        grouped.entry(key).or_default().push(sample.label.clone());
    }

    let mut clusters: Vec<OffsetCluster> = grouped
        .into_iter()
        .map(|(key, members)| OffsetCluster {
            dx: key.x,
            dy: key.y,
            members,
        })
        .collect();
    clusters.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then(a.dx.total_cmp(&b.dx))
            .then(a.dy.total_cmp(&b.dy))
    });
    clusters
}

/// Run the full analysis: pair, cluster, and summarize.
pub fn analyze_offsets(a: &[TextLabel], b: &[TextLabel], tolerance: f64) -> OffsetReport {
    let samples = collect_samples(a, b);
    let clusters = cluster_samples(&samples, tolerance);
    let total = samples.len();
    log::debug!("collected {total} offset samples in {} clusters", clusters.len());

    if total == 0 {
        return OffsetReport {
            tolerance,
            total_samples: 0,
            clusters,
            no_change_members: 0,
            no_change_share: 0.0,
            dominant: None,
            residual_share: 0.0,
        };
    }

    let share = |count: usize| count as f64 / total as f64 * 100.0;

    let no_change_members = clusters
        .iter()
        .find(|c| c.is_no_change(tolerance))
        .map(|c| c.members.len())
        .unwrap_or(0);

    // Largest cluster away from the origin; the list is already sorted
    // by size.
    let dominant = clusters
        .iter()
        .find(|c| !c.is_no_change(tolerance))
        .map(|c| DominantShift {
            dx: c.dx,
            dy: c.dy,
            members: c.members.len(),
            share: share(c.members.len()),
        });

    let explained = no_change_members + dominant.as_ref().map(|d| d.members).unwrap_or(0);
    OffsetReport {
        tolerance,
        total_samples: total,
        clusters,
        no_change_members,
        no_change_share: share(no_change_members),
        dominant,
        residual_share: share(total - explained),
    }
}
