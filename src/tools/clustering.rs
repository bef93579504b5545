//! Seeded k-means used to group similar texts
//!
//! Deterministic for a given seed so clustered tool output is reproducible
//! (and cacheable) within a process.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

const MAX_ITERATIONS: usize = 100;

/// Result of clustering: one assignment per input point plus the centroids.
#[derive(Debug, Clone)]
pub struct Clustering {
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f32>>,
}

impl Clustering {
    /// Indices of the points assigned to the given cluster.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster)
            .map(|(i, _)| i)
            .collect()
    }
}

pub fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum()
}

/// Clusters points into `k` groups with Lloyd's algorithm.
///
/// `k` is clamped to the number of points. Empty clusters are refilled with
/// the point currently farthest from its own centroid.
pub fn kmeans(points: &[Vec<f32>], k: usize, seed: u64) -> Clustering {
    if points.is_empty() || k == 0 {
        return Clustering {
            assignments: Vec::new(),
            centroids: Vec::new(),
        };
    }

    let k = k.min(points.len());
    let mut rng = StdRng::seed_from_u64(seed);

    // Initial centroids: k distinct points
    let mut centroids: Vec<Vec<f32>> = sample(&mut rng, points.len(), k)
        .into_iter()
        .map(|i| points[i].clone())
        .collect();

    let mut assignments = vec![0usize; points.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let nearest = nearest_centroid(point, &centroids);
            if assignments[i] != nearest {
                assignments[i] = nearest;
                changed = true;
            }
        }

        refill_empty_clusters(points, &centroids, &mut assignments, k);
        recompute_centroids(points, &assignments, &mut centroids);

        if !changed {
            break;
        }
    }

    Clustering {
        assignments,
        centroids,
    }
}

fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best_distance {
            best_distance = distance;
            best = c;
        }
    }
    best
}

fn refill_empty_clusters(
    points: &[Vec<f32>],
    centroids: &[Vec<f32>],
    assignments: &mut [usize],
    k: usize,
) {
    for cluster in 0..k {
        if assignments.iter().any(|&a| a == cluster) {
            continue;
        }

        // Move the point farthest from its current centroid into the
        // empty cluster, but never empty another cluster doing so.
        let farthest = assignments
            .iter()
            .enumerate()
            .filter(|(_, &a)| assignments.iter().filter(|&&x| x == a).count() > 1)
            .max_by(|(i, &a), (j, &b)| {
                let da = squared_distance(&points[*i], &centroids[a]);
                let db = squared_distance(&points[*j], &centroids[b]);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i);

        if let Some(i) = farthest {
            assignments[i] = cluster;
        }
    }
}

fn recompute_centroids(points: &[Vec<f32>], assignments: &[usize], centroids: &mut [Vec<f32>]) {
    let dims = points[0].len();
    for (cluster, centroid) in centroids.iter_mut().enumerate() {
        let members: Vec<&Vec<f32>> = points
            .iter()
            .zip(assignments.iter())
            .filter(|(_, &a)| a == cluster)
            .map(|(p, _)| p)
            .collect();

        if members.is_empty() {
            continue;
        }

        let mut mean = vec![0.0f32; dims];
        for member in &members {
            for (m, v) in mean.iter_mut().zip(member.iter()) {
                *m += v;
            }
        }
        for m in mean.iter_mut() {
            *m /= members.len() as f32;
        }
        *centroid = mean;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<Vec<f32>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.0],
            vec![0.0, 0.1],
            vec![10.0, 10.0],
            vec![10.1, 10.0],
            vec![10.0, 10.1],
        ]
    }

    #[test]
    fn test_separates_two_blobs() {
        let points = two_blobs();
        let result = kmeans(&points, 2, 0);

        assert_eq!(result.assignments.len(), 6);
        assert_eq!(result.centroids.len(), 2);

        // Points within a blob share a cluster, blobs differ
        assert_eq!(result.assignments[0], result.assignments[1]);
        assert_eq!(result.assignments[0], result.assignments[2]);
        assert_eq!(result.assignments[3], result.assignments[4]);
        assert_eq!(result.assignments[3], result.assignments[5]);
        assert_ne!(result.assignments[0], result.assignments[3]);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let points = two_blobs();
        let a = kmeans(&points, 2, 42);
        let b = kmeans(&points, 2, 42);
        assert_eq!(a.assignments, b.assignments);
    }

    #[test]
    fn test_k_clamped_to_point_count() {
        let points = vec![vec![1.0], vec![2.0]];
        let result = kmeans(&points, 10, 0);

        assert_eq!(result.centroids.len(), 2);
        assert_ne!(result.assignments[0], result.assignments[1]);
    }

    #[test]
    fn test_single_cluster() {
        let points = two_blobs();
        let result = kmeans(&points, 1, 0);

        assert!(result.assignments.iter().all(|&a| a == 0));
        assert_eq!(result.centroids.len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let result = kmeans(&[], 3, 0);
        assert!(result.assignments.is_empty());
        assert!(result.centroids.is_empty());
    }

    #[test]
    fn test_members() {
        let points = two_blobs();
        let result = kmeans(&points, 2, 0);

        let cluster = result.assignments[0];
        let members = result.members(cluster);
        assert!(members.contains(&0));
        assert_eq!(members.len(), 3);
    }
}
