//! Rendering of plot specifications.
//!
//! The default renderer draws a two-panel estimation plot as SVG:
//!
//! - top: every observation per condition (jittered swarm) with a gapped
//!   mean ± sd line beside it;
//! - bottom: for each comparator, the bootstrap density of the mean
//!   difference as a half violin, the point estimate and its confidence
//!   interval, against a zero reference line.

use super::plot_spec::PlotSpec;
use crate::error::{EstimationError, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

type DrawResult<DB> = std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

/// Turns a [`PlotSpec`] into image bytes.
///
/// Implementations must not share mutable drawing state; the pipeline may
/// call `render` from several threads at once.
pub trait PlotRenderer: Send + Sync {
    /// Render one entity's plot.
    fn render(&self, spec: &PlotSpec) -> Result<Vec<u8>>;
}

/// SVG estimation plots drawn with plotters.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    /// Radius of observation markers in pixels.
    pub point_radius: u32,
    /// Total horizontal spread of a condition's swarm, in category units.
    pub jitter_width: f64,
    /// Maximum half-violin width, in category units.
    pub violin_width: f64,
    /// Points evaluated along each density curve.
    pub density_points: usize,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            point_radius: 3,
            jitter_width: 0.3,
            violin_width: 0.35,
            density_points: 100,
        }
    }
}

impl PlotRenderer for SvgRenderer {
    fn render(&self, spec: &PlotSpec) -> Result<Vec<u8>> {
        let render_error = |reason: String| EstimationError::Render {
            entity: spec.entity.clone(),
            reason,
        };
        if spec.conditions.is_empty() || spec.value_range().is_none() {
            return Err(render_error("no observed values to plot".to_string()));
        }

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (spec.figure.width, spec.figure.height))
                .into_drawing_area();
            self.draw(&root, spec)
                .map_err(|e| render_error(e.to_string()))?;
        }
        Ok(svg.into_bytes())
    }
}

impl SvgRenderer {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, spec: &PlotSpec) -> DrawResult<DB> {
        root.fill(&WHITE)?;
        let split = spec.figure.height as i32 * 55 / 100;
        let (upper, lower) = root.split_vertically(split);
        self.draw_observations(&upper, spec)?;
        self.draw_effects(&lower, spec)?;
        root.present()
    }

    fn draw_observations<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        spec: &PlotSpec,
    ) -> DrawResult<DB> {
        let n = spec.conditions.len();
        let (y_lo, y_hi) = padded(spec.value_range().unwrap_or((0.0, 1.0)));
        let labels = |x: &f64| category_label(spec, *x);

        let mut chart = ChartBuilder::on(area)
            .caption(&spec.entity, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_lo..y_hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&labels)
            .y_desc(spec.y_label.as_str())
            .draw()?;

        let gap = (y_hi - y_lo) * 0.02;
        for (i, condition) in spec.conditions.iter().enumerate() {
            let color = Palette99::pick(i);
            let x = i as f64;
            chart.draw_series(condition.values.iter().enumerate().map(|(j, &v)| {
                Circle::new(
                    (x + self.jitter(j), v),
                    self.point_radius,
                    color.mix(0.8).filled(),
                )
            }))?;

            if let (Some(mean), Some(sd)) = (condition.mean(), condition.std_dev()) {
                let x_bar = x + self.jitter_width / 2.0 + 0.1;
                for (from, to) in [(mean - sd, mean - gap), (mean + gap, mean + sd)] {
                    if from < to {
                        chart.draw_series(LineSeries::new(
                            [(x_bar, from), (x_bar, to)],
                            BLACK.stroke_width(2),
                        ))?;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_effects<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        spec: &PlotSpec,
    ) -> DrawResult<DB> {
        let n = spec.conditions.len();
        let (y_lo, y_hi) = padded(spec.effect_range().unwrap_or((-1.0, 1.0)));
        let labels = |x: &f64| category_label(spec, *x);

        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_lo..y_hi)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&labels)
            .y_desc("Mean difference")
            .draw()?;

        chart.draw_series(LineSeries::new(
            [(-0.5, 0.0), (n as f64 - 0.5, 0.0)],
            BLACK.mix(0.5).stroke_width(1),
        ))?;
        // Baseline sits at zero difference.
        chart.draw_series(std::iter::once(Circle::new((0.0, 0.0), 4, BLACK.filled())))?;

        for result in &spec.results {
            let Some(i) = spec.condition_index(&result.comparator) else {
                continue;
            };
            let x = i as f64;
            let color = Palette99::pick(i);

            let curve = density_curve(&result.bootstrap_distribution, self.density_points);
            let peak = curve.iter().map(|&(_, d)| d).fold(0.0, f64::max);
            if peak > 0.0 {
                let scale = self.violin_width / peak;
                let mut outline: Vec<(f64, f64)> =
                    curve.iter().map(|&(y, d)| (x + d * scale, y)).collect();
                outline.extend(curve.iter().rev().map(|&(y, _)| (x, y)));
                chart.draw_series(std::iter::once(Polygon::new(outline, color.mix(0.4).filled())))?;
            }

            chart.draw_series(LineSeries::new(
                [(x, result.ci_lower), (x, result.ci_upper)],
                BLACK.stroke_width(2),
            ))?;
            chart.draw_series(std::iter::once(Circle::new(
                (x, result.difference),
                5,
                BLACK.filled(),
            )))?;
        }
        Ok(())
    }

    /// Deterministic horizontal offset of the `j`-th point of a condition.
    fn jitter(&self, j: usize) -> f64 {
        const GOLDEN: f64 = 0.618_033_988_749_894_9;
        ((j as f64 * GOLDEN).fract() - 0.5) * self.jitter_width
    }
}

fn category_label(spec: &PlotSpec, x: f64) -> String {
    let nearest = x.round();
    if (x - nearest).abs() > 1e-6 || nearest < 0.0 {
        return String::new();
    }
    spec.conditions
        .get(nearest as usize)
        .map(|c| format!("{} (n={})", c.label, c.values.len()))
        .unwrap_or_default()
}

fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = hi - lo;
    let pad = if span > 0.0 {
        span * 0.1
    } else {
        lo.abs().max(1.0) * 0.1
    };
    (lo - pad, hi + pad)
}

/// Gaussian kernel density of a sample, evaluated on an even grid.
///
/// Uses Silverman's bandwidth. Large samples are thinned to at most 1000
/// evenly spaced order statistics. Empty when the sample has no spread.
pub fn density_curve(sorted: &[f64], points: usize) -> Vec<(f64, f64)> {
    if sorted.len() < 2 || points < 2 {
        return Vec::new();
    }
    let stride = sorted.len().div_ceil(1000);
    let sample: Vec<f64> = sorted.iter().step_by(stride).copied().collect();
    let n = sample.len() as f64;
    let mean = sample.iter().sum::<f64>() / n;
    let sd = (sample.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    if sd.is_nan() || sd <= 0.0 {
        return Vec::new();
    }
    let bandwidth = 1.06 * sd * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());

    let (lo, hi) = (sorted[0], sorted[sorted.len() - 1]);
    let step = (hi - lo) / (points - 1) as f64;
    (0..points)
        .map(|k| {
            let y = lo + step * k as f64;
            let density: f64 = sample
                .iter()
                .map(|x| (-0.5 * ((y - x) / bandwidth).powi(2)).exp())
                .sum();
            (y, density * norm)
        })
        .collect()
}
