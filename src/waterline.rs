//! Waterline toolpath generation
//!
//! For every Z layer, from the top down:
//!
//! 1. each model triangle reaching the layer yields the edges of its
//!    outline that face away from the solid,
//! 2. each edge is probed sideways with the cutter to find where the tool
//!    rests against the model, and pushed out to that location,
//! 3. the pushed edges are stitched into contours,
//! 4. the contours are cropped to the requested area and run through the
//!    collision oracle, which removes stretches where the tool would cut
//!    into another part of the model.

use tracing::{debug, info, trace};

use crate::collision::{CollisionOracle, TriangleScan, free_stretches};
#[cfg(feature = "mesh-ops")]
use crate::collision::AcceleratedScan;
use crate::config::{Backend, EPSILON, WaterlineConfig, layer_heights};
use crate::cutter::Cutter;
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Line, Plane, Point, Triangle, Vector};
use crate::model::Model;
use crate::progress::{ProgressCounter, ProgressReporter};
use crate::stitcher::WaterlineTriangles;
use crate::toolpath::{Axis, Path, PathAccumulator};

/// Result of a toolpath computation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolpathOutcome {
    /// All paths collected by the accumulator
    pub paths: Vec<Path>,
    /// Heights of the layers that were started, top down
    pub layers: Vec<f64>,
    /// Whether the progress reporter stopped the computation
    pub cancelled: bool,
}

/// Waterline toolpath generator
///
/// # Example
///
/// ```
/// use waterline::cutter::CylindricalCutter;
/// use waterline::geometry::{Bounds, Point};
/// use waterline::mesh::Mesh;
/// use waterline::model::TriangleModel;
/// use waterline::toolpath::SimplePathAccumulator;
/// use waterline::waterline::Waterline;
///
/// # fn main() -> waterline::Result<()> {
/// let mesh = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
/// let model = TriangleModel::from_mesh(&mesh)?;
/// let cutter = CylindricalCutter::new(0.1)?;
/// let mut generator = Waterline::new(&model, cutter, SimplePathAccumulator::new())?;
///
/// let bounds = Bounds::new(-1.0, 2.0, -1.0, 2.0, 0.5, 0.5);
/// let outcome = generator.generate_toolpath(&bounds, 1.0, None)?;
/// assert_eq!(outcome.paths.len(), 1);
/// assert_eq!(outcome.paths[0].points.len(), 5);
/// # Ok(())
/// # }
/// ```
pub struct Waterline<'a, C: Cutter, P: PathAccumulator> {
    model: &'a dyn Model,
    cutter: C,
    pa: P,
    config: WaterlineConfig,
    scan: TriangleScan<'a>,
    oracle: Box<dyn CollisionOracle + 'a>,
    up: Vector,
}

impl<'a, C: Cutter, P: PathAccumulator> Waterline<'a, C, P> {
    /// Create a generator with the default configuration
    pub fn new(model: &'a dyn Model, cutter: C, pa: P) -> Result<Self> {
        Self::with_config(model, cutter, pa, WaterlineConfig::default())
    }

    /// Create a generator
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for inconsistent settings, or any error from
    /// building the selected collision backend.
    pub fn with_config(
        model: &'a dyn Model,
        cutter: C,
        pa: P,
        config: WaterlineConfig,
    ) -> Result<Self> {
        config.validate()?;
        let oracle: Box<dyn CollisionOracle + 'a> = match config.backend {
            Backend::TriangleScan => Box::new(TriangleScan::new(model)),
            #[cfg(feature = "mesh-ops")]
            Backend::Accelerated => {
                let depth = config.tree_depth(model.bounds().max_xy_extent(), cutter.radius());
                Box::new(AcceleratedScan::new(model, depth)?)
            }
        };
        Ok(Self {
            model,
            cutter,
            pa,
            config,
            scan: TriangleScan::new(model),
            oracle,
            up: Vector::up(),
        })
    }

    /// The cutter, at its last location
    pub fn cutter(&self) -> &C {
        &self.cutter
    }

    /// The path accumulator
    pub fn path_accumulator(&self) -> &P {
        &self.pa
    }

    /// The configuration in use
    pub fn config(&self) -> &WaterlineConfig {
        &self.config
    }

    /// Take back the cutter and the path accumulator
    pub fn into_parts(self) -> (C, P) {
        (self.cutter, self.pa)
    }

    /// Generate waterlines for every layer between `bounds.maxz` and
    /// `bounds.minz`, `dz` apart
    ///
    /// Paths are cropped to the XY extent of `bounds`. The progress reporter
    /// receives a text update per layer, counted progress, and every tool
    /// move; returning `true` from it stops the computation with
    /// `cancelled` set.
    ///
    /// An edge is only followed where the cutter touches the model at the
    /// layer height. A ball nose resting on a sloped wall touches it higher
    /// up, so such walls produce no contour (logged at `debug` level per
    /// layer).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] for a bad layer step or Z range,
    /// [`Error::NoCollision`] if an edge probe finds no contact, and any
    /// error from the cutter or the collision backend.
    pub fn generate_toolpath(
        &mut self,
        bounds: &Bounds,
        dz: f64,
        progress: Option<&mut dyn ProgressReporter>,
    ) -> Result<ToolpathOutcome> {
        let layers = layer_heights(bounds.minz, bounds.maxz, dz)?;
        let model = self.model;
        let triangles = model.triangles_within(&bounds.xy());
        info!(
            layers = layers.len(),
            triangles = triangles.len(),
            radius = self.cutter.radius(),
            backend = ?self.config.backend,
            "generating waterline toolpath"
        );

        let mut counter = ProgressCounter::new(2 * layers.len() * triangles.len(), progress);
        let mut started = Vec::with_capacity(layers.len());
        let mut cancelled = false;

        for (index, &z) in layers.iter().enumerate() {
            let text = format!("Waterline: processing layer {}/{}", index + 1, layers.len());
            if counter.report_text(&text) {
                cancelled = true;
                break;
            }
            started.push(z);
            self.pa.new_direction(Axis::X);
            let stopped = self.generate_layer(bounds, z, &triangles, &mut counter)?;
            self.pa.end_direction();
            self.pa.finish();
            if stopped {
                cancelled = true;
                break;
            }
        }

        info!(
            paths = self.pa.paths().len(),
            layers = started.len(),
            cancelled,
            "waterline toolpath done"
        );
        Ok(ToolpathOutcome {
            paths: self.pa.paths().to_vec(),
            layers: started,
            cancelled,
        })
    }

    /// Contours of one layer, sent to the accumulator; `true` if cancelled
    fn generate_layer(
        &mut self,
        bounds: &Bounds,
        z: f64,
        triangles: &[&Triangle],
        counter: &mut ProgressCounter<'_>,
    ) -> Result<bool> {
        let Some(lines) = self.contour_lines(bounds, z, triangles, counter)? else {
            return Ok(true);
        };

        self.pa.new_scanline();
        let mut last: Option<Point> = None;
        let mut stretches = 0usize;
        for line in &lines {
            let events = self.oracle.free_paths(&self.cutter, line.p1, line.p2)?;
            for (from, to) in free_stretches(&events) {
                if last.is_some_and(|p| p != from) {
                    self.pa.end_scanline();
                    self.pa.new_scanline();
                }
                self.pa.append(from);
                self.pa.append(to);
                self.cutter.moveto(to);
                last = Some(to);
                stretches += 1;
                if counter.report_position(to, self.pa.paths(), self.pa.current()) {
                    self.pa.end_scanline();
                    return Ok(true);
                }
            }
            if counter.increment(1) {
                self.pa.end_scanline();
                return Ok(true);
            }
        }
        let stopped = counter.increment(triangles.len().saturating_sub(lines.len()));
        self.pa.end_scanline();
        debug!(z, lines = lines.len(), stretches, "layer emitted");
        Ok(stopped)
    }

    /// Cropped, stitched offset edges of one layer; `None` if cancelled
    fn contour_lines(
        &self,
        bounds: &Bounds,
        z: f64,
        triangles: &[&Triangle],
        counter: &mut ProgressCounter<'_>,
    ) -> Result<Option<Vec<Line>>> {
        let plane = Plane::horizontal(Point::new(0.0, 0.0, z));
        let mut waterlines = WaterlineTriangles::new();
        let mut shadowed = 0usize;

        for triangle in triangles {
            if counter.increment(1) {
                return Ok(None);
            }
            if triangle.maxz() < z {
                continue;
            }
            if triangle.normal.cross(&self.up).norm() < EPSILON {
                continue;
            }
            let (touched, missed) = self.probe_edges(triangle, &plane)?;
            shadowed += missed;
            for (cutter_location, edge) in touched {
                if let Some(shifted) = shifted_waterline(&edge, cutter_location) {
                    waterlines.add(edge, shifted);
                }
            }
        }
        if shadowed > 0 && waterlines.is_empty() {
            debug!(z, shadowed, "every edge of the layer is shadowed, no contour");
        }

        waterlines.extend_shifted_lines();
        let layer_bounds = bounds.at_z(z);
        let lines: Vec<Line> = waterlines
            .shifted_lines()
            .iter()
            .filter_map(|line| line.cropped(&layer_bounds))
            .collect();
        debug!(z, edges = waterlines.len(), lines = lines.len(), "layer contours");
        Ok(Some(lines))
    }

    /// Outward edges of `triangle` at the layer and the cutter location
    /// touching each of them
    ///
    /// Edges whose contact lies on another part of the model are left out.
    pub fn collision_waterline_of_triangle(
        &self,
        triangle: &Triangle,
        plane: &Plane,
    ) -> Result<Vec<(Point, Line)>> {
        Ok(self.probe_edges(triangle, plane)?.0)
    }

    /// Touched edges with their cutter locations, and the number of
    /// shadowed edges
    fn probe_edges(
        &self,
        triangle: &Triangle,
        plane: &Plane,
    ) -> Result<(Vec<(Point, Line)>, usize)> {
        let mut result = Vec::new();
        let mut shadowed = 0usize;
        for edge in outer_edges(triangle, plane) {
            let Some(dir) = edge.dir() else {
                continue;
            };
            let Some(direction) = self.up.cross(&dir).normalized() else {
                continue;
            };
            let start = edge.midpoint();
            let reach = self.model.diagonal() + 2.0 * self.cutter.radius();
            let events = self
                .scan
                .collisions(&self.cutter, start, start + direction * reach)?;

            let hit = events.iter().step_by(2).find_map(|event| {
                let contact = event.contact?;
                ((event.location - start).dot(&direction) >= -EPSILON)
                    .then_some((event.location, contact))
            });
            let Some((cutter_location, contact)) = hit else {
                return Err(Error::NoCollision {
                    edge,
                    start,
                    direction,
                });
            };

            if edge.is_point_inside(&plane.point_projection(&contact.point)) {
                trace!(triangle = triangle.id, %edge, %cutter_location, "edge touched");
                result.push((cutter_location, edge));
            } else {
                trace!(
                    triangle = triangle.id,
                    other = contact.triangle,
                    %edge,
                    "contact lies off the edge"
                );
                shadowed += 1;
            }
        }
        Ok((result, shadowed))
    }
}

/// Edges of `triangle`'s outline at `plane` that face away from the solid
///
/// All edges are oriented clockwise around the solid seen from above.
pub fn outer_edges(triangle: &Triangle, plane: &Plane) -> Vec<Line> {
    let up = plane.normal;
    let z = plane.point.z;
    let orient = |line: Line| plane.oriented_clockwise(line, &triangle.normal);
    // positive when `p` lies right of `line`, seen from above
    let side = |p: &Point, line: &Line| match line.dir() {
        Some(dir) => (*p - line.p1).cross(&dir).dot(&up),
        None => 0.0,
    };

    if triangle.minz() > z {
        let mut projected: Vec<Point> = Vec::with_capacity(3);
        for p in &triangle.points {
            let q = plane.point_projection(p);
            if !projected.contains(&q) {
                projected.push(q);
            }
        }
        return match projected.as_slice() {
            [a, b, c] => {
                let corners = [*a, *b, *c];
                let edges: Vec<(Line, Point)> = (0..3)
                    .map(|i| {
                        let edge = Line::new(corners[(i + 2) % 3], corners[i]);
                        (orient(edge), corners[(i + 1) % 3])
                    })
                    .collect();
                let outer: Vec<Line> = edges
                    .iter()
                    .filter(|(edge, other)| side(other, edge) > EPSILON)
                    .map(|(edge, _)| *edge)
                    .collect();
                if outer.is_empty() {
                    longest(edges.into_iter().map(|(edge, _)| edge)).into_iter().collect()
                } else {
                    outer
                }
            }
            [a, b] => vec![orient(Line::new(*a, *b))],
            _ => Vec::new(),
        };
    }

    let above: Vec<Point> = triangle
        .points
        .iter()
        .filter(|p| p.z > z)
        .map(|p| plane.point_projection(p))
        .collect();

    let Some(waterline) = plane.intersect_triangle(triangle) else {
        return match above.as_slice() {
            [a, b] => vec![orient(Line::new(*a, *b))],
            _ => Vec::new(),
        };
    };

    let others: Vec<Point> = above
        .into_iter()
        .filter(|p| *p != waterline.p1 && *p != waterline.p2)
        .collect();
    match others.as_slice() {
        [] => vec![waterline],
        [other] => {
            let s = side(other, &waterline);
            if s > EPSILON {
                vec![waterline]
            } else if s < -EPSILON {
                vec![
                    orient(Line::new(waterline.p1, *other)),
                    orient(Line::new(waterline.p2, *other)),
                ]
            } else {
                let candidates = [
                    waterline,
                    Line::new(waterline.p1, *other),
                    Line::new(waterline.p2, *other),
                ];
                longest(candidates).map(orient).into_iter().collect()
            }
        }
        [first, second, ..] => {
            let s = side(first, &waterline);
            if s > EPSILON {
                vec![waterline]
            } else if s < -EPSILON {
                vec![orient(Line::new(*first, *second))]
            } else {
                let points = [waterline.p1, waterline.p2, *first, *second];
                let pairs = (0..points.len()).flat_map(|i| {
                    (0..points.len())
                        .filter(move |&j| j != i)
                        .map(move |j| Line::new(points[i], points[j]))
                });
                longest(pairs).map(orient).into_iter().collect()
            }
        }
    }
}

/// Move `waterline` sideways so that it runs through `cutter_location`
///
/// Both are first projected onto the horizontal plane through the cutter
/// location. Returns `None` if the projected edge is shorter than
/// [`EPSILON`].
pub fn shifted_waterline(waterline: &Line, cutter_location: Point) -> Option<Line> {
    let plane = Plane::horizontal(cutter_location);
    let projected = plane.line_projection(waterline);
    if projected.len() < EPSILON {
        return None;
    }
    if projected.dist_to_point(&cutter_location) < EPSILON {
        return Some(projected);
    }
    let shift = cutter_location - projected.closest_point(&cutter_location);
    Some(projected.translated(shift))
}

/// Longest line; the first one wins ties
fn longest(lines: impl IntoIterator<Item = Line>) -> Option<Line> {
    lines.into_iter().fold(None, |best, line| match best {
        Some(best) if best.len() >= line.len() => Some(best),
        _ => Some(line),
    })
}
