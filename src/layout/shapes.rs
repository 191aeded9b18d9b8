//! The placement formulas.
//!
//! Each function maps an index range to positions/rotations independently;
//! none hold state and none touch anything but their arguments. Constants
//! match the gallery's tuned defaults and are not configurable per call.

use rand::Rng;
use std::f64::consts::{FRAC_PI_2, PI};

use super::Placement;

// Spiral: parametric helix, radius shrinking toward the top.
const SPIRAL_RADIUS: f64 = 15.0;
const SPIRAL_HEIGHT: f64 = 20.0;
const SPIRAL_ROTATIONS: f64 = 3.0;
const SPIRAL_TIGHTNESS: f64 = 0.8;

// Grid: staggered rows with per-item depth jitter.
const GRID_COLS: usize = 5;
const GRID_SPACING: f64 = 4.0;
const GRID_DEPTH_VARIATION: f64 = 3.0;
const GRID_ROW_OFFSET: f64 = 0.5;
const GRID_TILT: f64 = 0.1;

// Sphere: Fibonacci distribution with bounded jitter.
const SPHERE_RADIUS: f64 = 20.0;
const SPHERE_INNER: f64 = 0.7;
const SPHERE_JITTER: f64 = 0.2;

// Wave: grid footprint with sinusoidal height.
const WAVE_COLS: usize = 5;
const WAVE_SPACING: f64 = 4.0;
const WAVE_AMPLITUDE: f64 = 3.0;
const WAVE_FREQUENCY: f64 = 0.5;
const WAVE_TILT: f64 = 0.1;

// Web: random points in a thick spherical shell.
pub(super) const WEB_RADIUS: f64 = 18.0;
pub(super) const WEB_SHELL_INNER: f64 = 0.4;

pub(super) fn spiral(n: usize) -> Vec<Placement> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            let angle = t * 2.0 * PI * SPIRAL_ROTATIONS;
            let radius = SPIRAL_RADIUS * (1.0 - t * SPIRAL_TIGHTNESS);
            Placement {
                position: [
                    angle.cos() * radius,
                    (t - 0.5) * SPIRAL_HEIGHT,
                    angle.sin() * radius,
                ],
                rotation: [0.0, -angle + FRAC_PI_2, 0.0],
            }
        })
        .collect()
}

pub(super) fn grid<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Placement> {
    let row_center = (n / GRID_COLS) as f64 / 2.0;
    (0..n)
        .map(|i| {
            let row = i / GRID_COLS;
            let col = i % GRID_COLS;
            let stagger = if row % 2 == 1 {
                GRID_ROW_OFFSET * GRID_SPACING
            } else {
                0.0
            };
            Placement {
                position: [
                    (col as f64 - GRID_COLS as f64 / 2.0) * GRID_SPACING + stagger,
                    -((row as f64 - row_center) * GRID_SPACING),
                    (rng.random::<f64>() - 0.5) * GRID_DEPTH_VARIATION,
                ],
                rotation: [
                    (rng.random::<f64>() - 0.5) * GRID_TILT,
                    (rng.random::<f64>() - 0.5) * GRID_TILT,
                    0.0,
                ],
            }
        })
        .collect()
}

pub(super) fn sphere<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Placement> {
    (0..n)
        .map(|i| {
            // Fibonacci-sphere angles give even coverage before jitter.
            let phi = (-1.0 + 2.0 * i as f64 / n as f64).acos();
            let theta = (n as f64 * PI).sqrt() * phi;

            let r = SPHERE_RADIUS * (SPHERE_INNER + (1.0 - SPHERE_INNER) * rng.random::<f64>());
            let phi = phi + (rng.random::<f64>() - 0.5) * SPHERE_JITTER;
            let theta = theta + (rng.random::<f64>() - 0.5) * SPHERE_JITTER;

            let x = r * theta.cos() * phi.sin();
            let y = r * phi.cos();
            let z = r * theta.sin() * phi.sin();
            Placement {
                position: [x, y, z],
                rotation: [0.0, x.atan2(z), 0.0],
            }
        })
        .collect()
}

pub(super) fn wave(n: usize) -> Vec<Placement> {
    let row_center = (n / WAVE_COLS) as f64 / 2.0;
    (0..n)
        .map(|i| {
            let row = i / WAVE_COLS;
            let col = i % WAVE_COLS;
            let x = (col as f64 - WAVE_COLS as f64 / 2.0) * WAVE_SPACING;
            let z = (row as f64 - row_center) * WAVE_SPACING;
            let y = (x * WAVE_FREQUENCY).sin() * WAVE_AMPLITUDE
                + (z * WAVE_FREQUENCY).cos() * WAVE_AMPLITUDE;
            Placement {
                position: [x, y, z],
                rotation: [
                    (x * WAVE_FREQUENCY).sin() * WAVE_TILT,
                    0.0,
                    (z * WAVE_FREQUENCY).cos() * WAVE_TILT,
                ],
            }
        })
        .collect()
}

pub(super) fn web<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Placement> {
    (0..n)
        .map(|_| {
            let theta = rng.random::<f64>() * 2.0 * PI;
            let phi = (rng.random::<f64>() * 2.0 - 1.0).acos();

            // Cube root spreads points evenly by volume; the inner shell
            // boundary keeps the cloud a thick crust rather than a ball.
            let r = WEB_RADIUS
                * (WEB_SHELL_INNER + (1.0 - WEB_SHELL_INNER) * rng.random::<f64>().cbrt());

            Placement {
                position: [
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                ],
                // Cards in web mode are billboarded by the renderer; the
                // rotation is carried but ignored.
                rotation: [0.0, 0.0, 0.0],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn norm(p: [f64; 3]) -> f64 {
        (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
    }

    #[test]
    fn spiral_spans_the_declared_height() {
        let placements = spiral(40);
        for p in &placements {
            assert!(p.position[1].abs() <= SPIRAL_HEIGHT / 2.0 + 1e-9);
            assert!(norm(p.position).is_finite());
        }
        // First card sits at the bottom of the vertical span.
        assert!((placements[0].position[1] - (-SPIRAL_HEIGHT / 2.0)).abs() < 1e-9);
    }

    #[test]
    fn spiral_radius_shrinks_monotonically() {
        let placements = spiral(30);
        let radial =
            |p: &Placement| (p.position[0].powi(2) + p.position[2].powi(2)).sqrt();
        for pair in placements.windows(2) {
            assert!(radial(&pair[1]) <= radial(&pair[0]) + 1e-9);
        }
    }

    #[test]
    fn grid_wraps_rows_at_fixed_columns() {
        let mut rng = StdRng::seed_from_u64(7);
        let placements = grid(12, &mut rng);
        // Items 0 and 5 share a column; row 1 is staggered to the right.
        assert!(
            (placements[5].position[0] - placements[0].position[0] - GRID_ROW_OFFSET * GRID_SPACING)
                .abs()
                < 1e-9
        );
        assert!(placements[5].position[1] < placements[0].position[1]);
    }

    #[test]
    fn wave_height_stays_within_double_amplitude() {
        for p in wave(37) {
            assert!(p.position[1].abs() <= 2.0 * WAVE_AMPLITUDE + 1e-9);
        }
    }

    proptest! {
        #[test]
        fn grid_depth_jitter_is_bounded(n in 1usize..48, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            for p in grid(n, &mut rng) {
                prop_assert!(p.position[2].abs() <= GRID_DEPTH_VARIATION / 2.0 + 1e-9);
            }
        }

        #[test]
        fn sphere_radius_stays_in_band(n in 1usize..48, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            for p in sphere(n, &mut rng) {
                let r = norm(p.position);
                prop_assert!(r <= SPHERE_RADIUS + 1e-9);
                prop_assert!(r >= SPHERE_RADIUS * SPHERE_INNER - 1e-9);
            }
        }

        #[test]
        fn web_points_stay_inside_the_shell(n in 1usize..48, seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            for p in web(n, &mut rng) {
                let r = norm(p.position);
                prop_assert!(r <= WEB_RADIUS + 1e-9);
                prop_assert!(r >= WEB_RADIUS * WEB_SHELL_INNER - 1e-9);
            }
        }
    }
}
