use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternType {
    Scatter,
    Ring,
    Line,
    Cluster,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Scatter => "scatter",
            PatternType::Ring => "ring",
            PatternType::Line => "line",
            PatternType::Cluster => "cluster",
        }
    }
}

pub fn sample_pattern_type<R: Rng>(rng: &mut R) -> PatternType {
    match rng.gen_range(0..4) {
        0 => PatternType::Scatter,
        1 => PatternType::Ring,
        2 => PatternType::Line,
        _ => PatternType::Cluster,
    }
}

/// Place `count` sources on an `n x n` mesh as `(x, y, temperature)`.
/// Every coordinate is inside the mesh.
pub fn generate_sources<R: Rng>(
    rng: &mut R,
    n: usize,
    count: usize,
    pattern: PatternType,
) -> Vec<(usize, usize, f64)> {
    let mut out = Vec::with_capacity(count);
    let last = (n - 1) as f64;

    match pattern {
        PatternType::Scatter => {
            for _ in 0..count {
                let x = rng.gen_range(0..n);
                let y = rng.gen_range(0..n);
                out.push((x, y, source_temp(rng)));
            }
        }

        PatternType::Ring => {
            let cx = rng.gen_range(0.35..0.65) * last;
            let cy = rng.gen_range(0.35..0.65) * last;
            let radius = rng.gen_range(0.1..0.3) * last;
            let phase = rng.gen_range(0.0..std::f64::consts::TAU);
            for k in 0..count {
                let a = phase + std::f64::consts::TAU * k as f64 / count as f64;
                let x = snap(cx + radius * a.cos(), last);
                let y = snap(cy + radius * a.sin(), last);
                out.push((x, y, source_temp(rng)));
            }
        }

        PatternType::Line => {
            let (x0, y0) = (rng.gen_range(0.1..0.9) * last, rng.gen_range(0.1..0.9) * last);
            let (x1, y1) = (rng.gen_range(0.1..0.9) * last, rng.gen_range(0.1..0.9) * last);
            for k in 0..count {
                let t = if count > 1 {
                    k as f64 / (count - 1) as f64
                } else {
                    0.5
                };
                let x = snap(x0 + t * (x1 - x0), last);
                let y = snap(y0 + t * (y1 - y0), last);
                out.push((x, y, source_temp(rng)));
            }
        }

        PatternType::Cluster => {
            let cx = rng.gen_range(0.2..0.8) * last;
            let cy = rng.gen_range(0.2..0.8) * last;
            let spread = rng.gen_range(1.0..4.0);
            for _ in 0..count {
                let x = snap(cx + rng.gen_range(-spread..spread), last);
                let y = snap(cy + rng.gen_range(-spread..spread), last);
                out.push((x, y, source_temp(rng)));
            }
        }
    }

    out
}

fn source_temp<R: Rng>(rng: &mut R) -> f64 {
    rng.gen_range(600.0..1000.0)
}

fn snap(v: f64, last: f64) -> usize {
    v.round().clamp(0.0, last) as usize
}
