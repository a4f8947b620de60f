//! Frame-stepped force-directed organize run.
//!
//! The engine never schedules itself. Its owner calls [`ForceLayout::tick`] once per frame and
//! stops asking once a tick reports [`TickOutcome::Converged`].

use crate::rng::{RandomSource, XorShift64Star};
use crate::settings::LayoutSettings;
use mindweave_core::geom::{LogicalBox, LogicalVector, logical_point, logical_vector};
use mindweave_core::{LogicalPoint, NodeTree, Positions};
use rustc_hash::FxHashMap;

/// Per-node simulation state. Lives only for the duration of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhysicsBody {
    pub velocity: LogicalVector,
    pub force: LogicalVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeStart {
    Started,
    /// A run was already active; its temperature was raised back to the initial value.
    Boosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Converged,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEnd {
    pub frames: usize,
    pub reason: EndReason,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// No run is active.
    Idle,
    Running { temperature: f64 },
    Converged(LayoutEnd),
}

#[derive(Debug)]
struct Run {
    ids: Vec<String>,
    bodies: Vec<PhysicsBody>,
    edges: Vec<(usize, usize)>,
    center: LogicalPoint,
    temperature: f64,
    frames: usize,
}

pub struct ForceLayout {
    settings: LayoutSettings,
    rng: Box<dyn RandomSource>,
    run: Option<Run>,
}

impl std::fmt::Debug for ForceLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceLayout")
            .field("settings", &self.settings)
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}

impl ForceLayout {
    pub fn new(settings: LayoutSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => XorShift64Star::new(seed),
            None => XorShift64Star::from_entropy(),
        };
        Self {
            settings,
            rng: Box::new(rng),
            run: None,
        }
    }

    /// Replaces the source used to seed unplaced nodes.
    pub fn with_random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(source);
        self
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn temperature(&self) -> Option<f64> {
        self.run.as_ref().map(|r| r.temperature)
    }

    /// Begins a run over every node of `tree`, or boosts the active one.
    ///
    /// Nodes without a position are seeded uniformly inside `area` and written to `positions`
    /// right away. Gravity pulls towards the center of `area`.
    pub fn start(
        &mut self,
        tree: &NodeTree,
        positions: &mut Positions,
        area: LogicalBox,
    ) -> OrganizeStart {
        if let Some(run) = self.run.as_mut() {
            run.temperature = self.settings.initial_temperature;
            tracing::debug!(
                nodes = run.ids.len(),
                frames = run.frames,
                "organize boosted"
            );
            return OrganizeStart::Boosted;
        }

        let ids: Vec<String> = tree.ids().map(str::to_string).collect();
        let index: FxHashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut seeded = 0usize;
        for id in &ids {
            if positions.contains_key(id) {
                continue;
            }
            let x = area.min.x + self.rng.next_f64() * area.width();
            let y = area.min.y + self.rng.next_f64() * area.height();
            positions.insert(id.clone(), logical_point(x, y));
            seeded += 1;
        }

        let edges: Vec<(usize, usize)> = tree
            .edges()
            .filter_map(|(parent, child)| Some((*index.get(parent)?, *index.get(child)?)))
            .collect();

        tracing::debug!(
            nodes = ids.len(),
            edges = edges.len(),
            seeded,
            "organize started"
        );

        self.run = Some(Run {
            bodies: vec![PhysicsBody::default(); ids.len()],
            ids,
            edges,
            center: area.center(),
            temperature: self.settings.initial_temperature,
            frames: 0,
        });
        OrganizeStart::Started
    }

    /// Cancels the active run, rounding the positions it touched. Idle engines return `None`.
    pub fn stop(&mut self, positions: &mut Positions) -> Option<LayoutEnd> {
        let run = self.run.take()?;
        round_positions(&run.ids, positions);
        tracing::debug!(frames = run.frames, "organize stopped");
        Some(LayoutEnd {
            frames: run.frames,
            reason: EndReason::Stopped,
        })
    }

    /// Advances the simulation by one frame.
    pub fn tick(&mut self, positions: &mut Positions) -> TickOutcome {
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Idle;
        };

        if !run.ids.is_empty() {
            step(run, &self.settings, positions);
        }
        run.temperature *= self.settings.cooling_rate;
        run.frames += 1;
        tracing::trace!(
            frame = run.frames,
            temperature = run.temperature,
            "organize frame"
        );

        if run.ids.is_empty() || run.temperature < self.settings.min_temperature {
            let frames = run.frames;
            if let Some(run) = self.run.take() {
                round_positions(&run.ids, positions);
            }
            tracing::debug!(frames, "organize converged");
            return TickOutcome::Converged(LayoutEnd {
                frames,
                reason: EndReason::Converged,
            });
        }
        TickOutcome::Running {
            temperature: run.temperature,
        }
    }

    /// Ticks until the active run ends. Returns `None` when idle.
    pub fn run_to_end(&mut self, positions: &mut Positions) -> Option<LayoutEnd> {
        loop {
            match self.tick(positions) {
                TickOutcome::Idle => return None,
                TickOutcome::Running { .. } => {}
                TickOutcome::Converged(end) => return Some(end),
            }
        }
    }
}

fn step(run: &mut Run, s: &LayoutSettings, positions: &mut Positions) {
    // Nodes removed from `positions` mid-run sit out the frame.
    let points: Vec<Option<LogicalPoint>> = run
        .ids
        .iter()
        .map(|id| positions.get(id).copied())
        .collect();

    for (body, p) in run.bodies.iter_mut().zip(&points) {
        body.force = match p {
            Some(p) => (run.center - *p) * s.gravity,
            None => LogicalVector::zero(),
        };
    }

    for i in 0..points.len() {
        let Some(pi) = points[i] else { continue };
        for j in (i + 1)..points.len() {
            let Some(pj) = points[j] else { continue };
            let delta = pi - pj;
            let dist = delta.length();
            let dir = if dist > 0.0 {
                delta / dist
            } else {
                coincident_direction(i, j)
            };
            let d = dist.max(1.0);
            let f = dir * (s.repulsion / (d * d));

            let (left, right) = run.bodies.split_at_mut(j);
            left[i].force += f;
            right[0].force -= f;
        }
    }

    for &(a, b) in &run.edges {
        let (Some(pa), Some(pb)) = (points[a], points[b]) else {
            continue;
        };
        let delta = pb - pa;
        let dist = delta.length();
        if !(dist > 0.0) {
            continue;
        }
        let f = (delta / dist) * (s.attraction * (dist - s.ideal_edge_length));
        run.bodies[a].force += f;
        run.bodies[b].force -= f;
    }

    for ((id, body), p) in run.ids.iter().zip(run.bodies.iter_mut()).zip(&points) {
        let Some(p) = p else { continue };
        let mut v = (body.velocity + body.force * s.time_step) * s.damping;
        let speed = v.length();
        if !speed.is_finite() {
            v = LogicalVector::zero();
        } else if speed > run.temperature {
            v = v * (run.temperature / speed);
        }
        body.velocity = v;

        let next = *p + v;
        if next.x.is_finite() && next.y.is_finite() {
            if let Some(slot) = positions.get_mut(id) {
                *slot = next;
            }
        } else {
            body.velocity = LogicalVector::zero();
        }
    }
}

/// Stable pseudo-direction for two nodes sitting on exactly the same point.
fn coincident_direction(i: usize, j: usize) -> LogicalVector {
    const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
    let angle = (i * 31 + j) as f64 * GOLDEN_ANGLE;
    logical_vector(angle.cos(), angle.sin())
}

fn round_positions(ids: &[String], positions: &mut Positions) {
    for id in ids {
        if let Some(p) = positions.get_mut(id) {
            *p = p.round();
        }
    }
}
