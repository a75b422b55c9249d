//! Triangle fan extraction
//!
//! Finds vertices shared by many triangles (poles, such as the tip of a
//! cap where a whole ring of triangles converges) and rewrites each of them
//! as a single [`Fan`] record: the shared vertex becomes the center and the
//! far edges of the triangles become the blade ring.
//!
//! Ring reconstruction is greedy and best-effort. Around a center each
//! triangle contributes one directed edge keyed by its first non-center
//! vertex, and a later triangle with the same key replaces an earlier one.
//! The walk starts at the lowest key and follows edges until it returns to
//! the first triangle or runs out of edges. Whatever prefix it manages to
//! follow becomes the fan; gaps, forks and replaced edges are not reported.

use serde::{Deserialize, Serialize};
use shzmdl_core::{Fan, Model, Triangle, VertexRef};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// A vertex needs strictly more adjacent triangles than this to become a
/// fan center.
pub const DEFAULT_MIN_VALENCE: usize = 10;

/// Configuration for fan extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanExtractionConfig {
    /// Adjacency count a center must exceed
    pub min_valence: usize,
}

impl Default for FanExtractionConfig {
    fn default() -> Self {
        Self {
            min_valence: DEFAULT_MIN_VALENCE,
        }
    }
}

impl FanExtractionConfig {
    pub fn with_min_valence(mut self, min_valence: usize) -> Self {
        self.min_valence = min_valence;
        self
    }
}

/// Summary of one extraction pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Centers whose adjacency exceeded the threshold
    pub candidates: usize,
    pub fans_created: usize,
    pub triangles_consumed: usize,
}

/// Position index -> triangles touching it, in first-seen order
struct VertexAdjacency {
    order: Vec<usize>,
    triangles: HashMap<usize, Vec<usize>>,
}

impl VertexAdjacency {
    fn build(triangles: &[Triangle]) -> Self {
        let mut order = Vec::new();
        let mut map: HashMap<usize, Vec<usize>> = HashMap::new();
        for (ti, tri) in triangles.iter().enumerate() {
            for corner in &tri.corners {
                map.entry(corner.position)
                    .or_insert_with(|| {
                        order.push(corner.position);
                        Vec::new()
                    })
                    .push(ti);
            }
        }
        Self {
            order,
            triangles: map,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> + '_ {
        self.order
            .iter()
            .filter_map(move |v| self.triangles.get(v).map(|t| (*v, t.as_slice())))
    }
}

/// The far edge of one triangle around a center
#[derive(Debug, Clone, Copy)]
struct RingEdge {
    /// Position index the edge leads to
    next: usize,
    triangle: usize,
    center: VertexRef,
    blade: VertexRef,
}

/// Fan extraction pass
#[derive(Debug, Clone, Default)]
pub struct FanExtractor {
    pub config: FanExtractionConfig,
}

impl FanExtractor {
    /// Create an extractor with the default threshold
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FanExtractionConfig) -> Self {
        Self { config }
    }

    /// Extract fans from `model.triangles`.
    ///
    /// New fans are appended to `model.fans` and the triangles they absorb
    /// are removed, keeping the relative order of the rest.
    pub fn extract(&self, model: &mut Model) -> ExtractionReport {
        let adjacency = VertexAdjacency::build(&model.triangles);
        let mut consumed = vec![false; model.triangles.len()];
        let mut report = ExtractionReport::default();

        for (center, adjacent) in adjacency.iter() {
            if adjacent.len() <= self.config.min_valence {
                continue;
            }
            report.candidates += 1;
            debug!(center, triangles = adjacent.len(), "fan candidate");

            let ring = trace_ring(&model.triangles, center, adjacent, &consumed);
            let Some(first) = ring.first() else {
                continue;
            };
            if ring.len() < adjacent.len() {
                debug!(
                    center,
                    traced = ring.len(),
                    adjacent = adjacent.len(),
                    "partial fan ring"
                );
            }

            let fan = Fan::with_blades(first.center, ring.iter().map(|e| e.blade).collect());
            for edge in &ring {
                consumed[edge.triangle] = true;
            }
            report.triangles_consumed += ring.len();
            report.fans_created += 1;
            model.add_fan(fan);
        }

        let triangles = std::mem::take(&mut model.triangles);
        model.triangles = triangles
            .into_iter()
            .zip(&consumed)
            .filter(|(_, &gone)| !gone)
            .map(|(tri, _)| tri)
            .collect();

        info!(
            fans = report.fans_created,
            consumed = report.triangles_consumed,
            remaining = model.triangles.len(),
            "fan extraction finished"
        );
        report
    }
}

/// Walk the ring of triangles around `center`.
///
/// Triangles already absorbed by an earlier fan are skipped.
fn trace_ring(
    triangles: &[Triangle],
    center: usize,
    adjacent: &[usize],
    consumed: &[bool],
) -> Vec<RingEdge> {
    let mut edges: BTreeMap<usize, RingEdge> = BTreeMap::new();
    for &ti in adjacent {
        if consumed[ti] {
            continue;
        }
        let corners = triangles[ti].corners;
        let Some(slot) = corners.iter().position(|c| c.position == center) else {
            continue;
        };
        let (a, b) = match slot {
            0 => (corners[1], corners[2]),
            1 => (corners[0], corners[2]),
            _ => (corners[0], corners[1]),
        };
        // last write wins
        edges.insert(
            a.position,
            RingEdge {
                next: b.position,
                triangle: ti,
                center: corners[slot],
                blade: b,
            },
        );
    }

    let Some(first) = edges.values().next().copied() else {
        return Vec::new();
    };
    let mut ring = vec![first];
    let mut current = first.next;
    while let Some(edge) = edges.remove(&current) {
        if edge.triangle == first.triangle {
            break;
        }
        current = edge.next;
        ring.push(edge);
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use shzmdl_core::Point3f;

    /// Center 0 at the origin, ring vertices 1..=n on the unit circle and
    /// triangles (0, i, i + 1) closing the ring.
    fn make_pole(n: usize) -> Model {
        let mut model = Model::new();
        model.add_position(Point3f::origin());
        for i in 0..n {
            let a = i as f32 / n as f32 * std::f32::consts::TAU;
            model.add_position(Point3f::new(a.cos(), a.sin(), 0.0));
        }
        for i in 1..=n {
            model.add_triangle(Triangle::from_positions(0, i, i % n + 1));
        }
        model
    }

    fn blade_positions(fan: &Fan) -> Vec<usize> {
        fan.blades.iter().map(|b| b.position).collect()
    }

    #[test]
    fn test_closed_ring_of_eleven() {
        let mut model = make_pole(11);
        let report = FanExtractor::new().extract(&mut model);

        assert_eq!(report.fans_created, 1);
        assert_eq!(report.triangles_consumed, 11);
        assert!(model.triangles.is_empty());
        assert_eq!(model.fans.len(), 1);

        let fan = &model.fans[0];
        assert_eq!(fan.center.position, 0);
        assert_eq!(fan.len(), 11);
        let mut expected: Vec<usize> = (2..=11).collect();
        expected.push(1);
        assert_eq!(blade_positions(fan), expected);
    }

    #[test]
    fn test_ten_triangles_stay_triangles() {
        let mut model = make_pole(10);
        let report = FanExtractor::new().extract(&mut model);
        assert_eq!(report.fans_created, 0);
        assert_eq!(report.candidates, 0);
        assert_eq!(model.triangles.len(), 10);
        assert!(model.fans.is_empty());
    }

    #[test]
    fn test_fan_triangles_match_source() {
        let mut model = make_pole(14);
        let mut before: Vec<[usize; 3]> = model.triangles.iter().map(rotate_to_center).collect();
        FanExtractor::new().extract(&mut model);
        let mut after: Vec<[usize; 3]> = model.fans[0].triangles().map(|t| t.positions()).collect();
        before.sort();
        after.sort();
        assert_eq!(before, after);
    }

    fn rotate_to_center(tri: &Triangle) -> [usize; 3] {
        let p = tri.positions();
        let k = p.iter().position(|&v| v == 0).unwrap();
        [p[k], p[(k + 1) % 3], p[(k + 2) % 3]]
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut model = make_pole(16);
        FanExtractor::new().extract(&mut model);
        let report = FanExtractor::new().extract(&mut model);
        assert_eq!(report.fans_created, 0);
        assert_eq!(model.fans.len(), 1);
    }

    #[test]
    fn test_custom_threshold() {
        let mut model = make_pole(6);
        let extractor = FanExtractor::with_config(FanExtractionConfig::default().with_min_valence(5));
        let report = extractor.extract(&mut model);
        assert_eq!(report.fans_created, 1);
        assert_eq!(model.fans[0].len(), 6);
    }

    #[test]
    fn test_gap_yields_partial_fan() {
        let mut model = make_pole(12);
        // drop (0, 5, 6)
        model.triangles.remove(4);
        let report = FanExtractor::new().extract(&mut model);

        assert_eq!(report.fans_created, 1);
        assert_eq!(blade_positions(&model.fans[0]), vec![2, 3, 4, 5]);
        assert_eq!(model.triangles.len(), 7);
        assert_eq!(model.triangles[0].positions(), [0, 6, 7]);
    }

    #[test]
    fn test_shared_edge_key_last_write_wins() {
        let mut model = make_pole(12);
        model.add_triangle(Triangle::from_positions(0, 3, 7));
        FanExtractor::new().extract(&mut model);

        let fan = &model.fans[0];
        assert_eq!(blade_positions(fan), vec![2, 3, 7, 8, 9, 10, 11, 12, 1]);
        let left: Vec<[usize; 3]> = model.triangles.iter().map(|t| t.positions()).collect();
        assert_eq!(left, vec![[0, 3, 4], [0, 4, 5], [0, 5, 6], [0, 6, 7]]);
    }

    #[test]
    fn test_center_keeps_first_triangle_attributes() {
        let mut model = make_pole(11);
        for (i, tri) in model.triangles.iter_mut().enumerate() {
            tri.corners[0] = VertexRef::with_attributes(0, Some(i), Some(100 + i));
        }
        FanExtractor::new().extract(&mut model);
        assert_eq!(
            model.fans[0].center,
            VertexRef::with_attributes(0, Some(0), Some(100))
        );
    }

    #[test]
    fn test_unrelated_triangles_keep_order() {
        let mut model = make_pole(11);
        let base = model.positions.len();
        for i in 0..3 {
            model.add_position(Point3f::new(5.0 + i as f32, 0.0, 0.0));
        }
        let loose = [
            Triangle::from_positions(base, base + 1, base + 2),
            Triangle::from_positions(base + 2, base + 1, base),
        ];
        model.triangles.insert(3, loose[0]);
        model.triangles.push(loose[1]);

        FanExtractor::new().extract(&mut model);
        assert_eq!(model.triangles, loose.to_vec());
    }

    #[test]
    fn test_triangle_shared_by_two_centers_is_used_once() {
        // Two poles, 0 and 1, sharing one triangle (0, 1, x).
        let mut model = Model::new();
        model.add_position(Point3f::origin());
        model.add_position(Point3f::new(10.0, 0.0, 0.0));
        let ring_a: Vec<usize> = (0..11).map(|i| model.add_position(Point3f::new(i as f32, 1.0, 0.0))).collect();
        let ring_b: Vec<usize> = (0..11).map(|i| model.add_position(Point3f::new(i as f32, 2.0, 0.0))).collect();
        model.add_triangle(Triangle::from_positions(0, 1, ring_a[0]));
        for w in ring_a.windows(2) {
            model.add_triangle(Triangle::from_positions(0, w[0], w[1]));
        }
        for w in ring_b.windows(2) {
            model.add_triangle(Triangle::from_positions(1, w[0], w[1]));
        }
        model.add_triangle(Triangle::from_positions(1, ring_b[10], 0));

        let total = model.triangles.len();
        let report = FanExtractor::new().extract(&mut model);
        assert_eq!(report.candidates, 2);
        assert_eq!(report.triangles_consumed + model.triangles.len(), total);

        let fan_triangles: usize = model.fans.iter().map(Fan::len).sum();
        assert_eq!(fan_triangles, report.triangles_consumed);
    }

    #[test]
    fn test_empty_model() {
        let mut model = Model::new();
        let report = FanExtractor::new().extract(&mut model);
        assert_eq!(report, ExtractionReport::default());
    }
}
