//! Ring inset ("shedding")
//!
//! Pulls a fan's blade ring toward its center, bridging the old ring and
//! the new one with a band of quads. With a grouping factor above one the
//! new ring is also simplified: only every `grouping`-th new vertex stays a
//! blade, and the vertices in between are snapped onto the chord joining
//! neighbouring blades so the band of quads still closes the gap.

use serde::{Deserialize, Serialize};
use shzmdl_core::{Error, Model, Point3f, Quad, Result, VertexRef};
use std::ops::Range;
use tracing::info;

/// Parameters for [`shed_fan`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShedOptions {
    /// Inner ring distance as a fraction of the blade distance, in (0, 1)
    pub scale: f32,
    /// New ring vertices per remaining blade, at least 1
    pub grouping: usize,
}

impl Default for ShedOptions {
    fn default() -> Self {
        Self {
            scale: 0.5,
            grouping: 1,
        }
    }
}

impl ShedOptions {
    pub fn new(scale: f32, grouping: usize) -> Self {
        Self { scale, grouping }
    }

    fn validate(&self) -> Result<()> {
        if !(self.scale > 0.0 && self.scale < 1.0) {
            return Err(Error::InvalidParameter(format!(
                "shed scale must be in (0, 1), got {}",
                self.scale
            )));
        }
        if self.grouping == 0 {
            return Err(Error::InvalidParameter(
                "shed grouping must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What a shed pass appended to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShedReport {
    /// Indices of the positions created for the inner ring
    pub new_positions: Range<usize>,
    pub quads_added: usize,
    /// Blade count of the fan afterwards
    pub blades: usize,
}

/// Inset the blade ring of `model.fans[fan_index]`.
///
/// Appends one position per blade and one quad per ring edge, then
/// replaces the fan's blades in place. Nothing else in the model moves.
pub fn shed_fan(model: &mut Model, fan_index: usize, options: &ShedOptions) -> Result<ShedReport> {
    options.validate()?;
    let fan = model.fan(fan_index)?.clone();
    let n = fan.len();
    let kept = n.div_ceil(options.grouping);
    if kept < 3 {
        return Err(Error::InvalidParameter(format!(
            "shedding a fan of {} blades with grouping {} leaves {} blades",
            n, options.grouping, kept
        )));
    }

    let center = model.position(fan.center.position)?;
    let mut inner = Vec::with_capacity(n);
    for blade in &fan.blades {
        let p = model.position(blade.position)?;
        inner.push(center + (p - center) * options.scale);
    }
    if options.grouping > 1 {
        snap_groups(&mut inner, options.grouping);
    }

    let start = model.positions.len();
    let new_refs: Vec<VertexRef> = inner
        .iter()
        .zip(&fan.blades)
        .map(|(p, blade)| blade.with_position(model.add_position(*p)))
        .collect();

    for i in 0..n {
        let j = (i + 1) % n;
        model.add_quad(Quad::new(new_refs[i], fan.blades[i], fan.blades[j], new_refs[j]));
    }

    let blades: Vec<VertexRef> = new_refs.iter().step_by(options.grouping).copied().collect();
    let report = ShedReport {
        new_positions: start..model.positions.len(),
        quads_added: n,
        blades: blades.len(),
    };
    model.fans[fan_index].blades = blades;

    info!(fan = fan_index, quads = n, blades = report.blades, "fan shed");
    Ok(report)
}

/// Project every non-leading vertex of each group onto the segment from
/// its group leader to the next group's leader.
fn snap_groups(ring: &mut [Point3f], grouping: usize) {
    let n = ring.len();
    for lead in (0..n).step_by(grouping) {
        let next = if lead + grouping < n { lead + grouping } else { 0 };
        let a = ring[lead];
        let d = ring[next] - a;
        let len2 = d.norm_squared();
        for j in (lead + 1)..(lead + grouping).min(n) {
            let t = if len2 > 0.0 {
                ((ring[j] - a).dot(&d) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            ring[j] = a + d * t;
        }
    }
}
