use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::math::{Point3, Vector3};

/// Seeded 3D coherent-noise field producing "clouds"-style fractal values.
///
/// `sample` returns values in `[0, 1]` with a mid-level of 0.5. Two fields
/// built from the same seed, scale, and depth are identical.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u64,
    scale: f64,
    depth: u32,
    offset: Vector3,
    perm: Vec<u8>,
}

impl NoiseField {
    /// Builds a noise field.
    ///
    /// * `seed` - permutation seed; `None` draws one from the thread RNG.
    /// * `scale` - feature size in model units (coordinates are divided by it).
    /// * `depth` - number of additional octaves above the base frequency.
    #[must_use]
    pub fn new(seed: Option<u64>, scale: f64, depth: u32) -> Self {
        let seed = seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);

        let mut table: Vec<u8> = (0..=255).collect();
        table.shuffle(&mut rng);
        let mut perm = table.clone();
        perm.extend_from_slice(&table);

        // Keeps lattice points (where gradient noise is zero) off round coordinates.
        let offset = Vector3::new(
            rng.gen_range(0.0..256.0),
            rng.gen_range(0.0..256.0),
            rng.gen_range(0.0..256.0),
        );

        Self {
            seed,
            scale: if scale.abs() > f64::EPSILON { scale } else { 1.0 },
            depth,
            offset,
            perm,
        }
    }

    /// The seed actually used, including one drawn from entropy.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Feature size in model units.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of extra octaves.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Samples the field at a point, returning a value in `[0, 1]`.
    #[must_use]
    pub fn sample(&self, p: &Point3) -> f64 {
        let q = p.coords / self.scale + self.offset;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut sum = 0.0;
        let mut norm = 0.0;
        for _ in 0..=self.depth {
            sum += amplitude * self.gradient_noise(&(q * frequency));
            norm += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }
        (0.5 + 0.5 * sum / norm).clamp(0.0, 1.0)
    }

    /// Improved Perlin gradient noise in roughly `[-1, 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn gradient_noise(&self, q: &Vector3) -> f64 {
        let cell = |c: f64| (c.floor() as i64 & 255) as usize;
        let (xi, yi, zi) = (cell(q.x), cell(q.y), cell(q.z));
        let (x, y, z) = (q.x - q.x.floor(), q.y - q.y.floor(), q.z - q.z.floor());
        let (u, v, w) = (fade(x), fade(y), fade(z));

        let p = &self.perm;
        let a = p[xi] as usize + yi;
        let aa = p[a] as usize + zi;
        let ab = p[a + 1] as usize + zi;
        let b = p[xi + 1] as usize + yi;
        let ba = p[b] as usize + zi;
        let bb = p[b + 1] as usize + zi;

        lerp(
            w,
            lerp(
                v,
                lerp(u, grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z)),
                lerp(u, grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z)),
            ),
            lerp(
                v,
                lerp(
                    u,
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                ),
                lerp(
                    u,
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                ),
            ),
        )
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: u8, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points() -> Vec<Point3> {
        let mut pts = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                pts.push(Point3::new(f64::from(i) * 1.7, f64::from(j) * 2.3, 0.4));
            }
        }
        pts
    }

    #[test]
    fn samples_stay_in_unit_range() {
        let field = NoiseField::new(Some(7), 5.0, 2);
        for p in grid_points() {
            let s = field.sample(&p);
            assert!((0.0..=1.0).contains(&s), "sample {s} out of range");
        }
    }

    #[test]
    fn same_seed_is_deterministic() {
        let a = NoiseField::new(Some(42), 5.0, 2);
        let b = NoiseField::new(Some(42), 5.0, 2);
        for p in grid_points() {
            assert!((a.sample(&p) - b.sample(&p)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = NoiseField::new(Some(1), 5.0, 2);
        let b = NoiseField::new(Some(2), 5.0, 2);
        let differs = grid_points()
            .iter()
            .any(|p| (a.sample(p) - b.sample(p)).abs() > 1e-6);
        assert!(differs);
    }

    #[test]
    fn field_is_not_constant() {
        let field = NoiseField::new(Some(3), 5.0, 2);
        let samples: Vec<f64> = grid_points().iter().map(|p| field.sample(p)).collect();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(max - min > 0.05);
    }

    #[test]
    fn entropy_seed_is_reported() {
        let field = NoiseField::new(None, 5.0, 1);
        let replay = NoiseField::new(Some(field.seed()), 5.0, 1);
        let p = Point3::new(1.3, 2.9, -0.7);
        assert!((field.sample(&p) - replay.sample(&p)).abs() < f64::EPSILON);
    }
}
