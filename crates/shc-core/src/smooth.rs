//! Zero-phase Gaussian low-pass used on per-chunk spectra.

/// Normalized Gaussian spanning ±3σ with an odd number of taps derived from
/// `ceil(width / df)`. A single tap is the identity.
pub fn gaussian_kernel(df: f64, width: f64) -> Vec<f64> {
    let ratio = (width / df).ceil();
    let mut taps = if ratio.is_finite() && ratio >= 1.0 {
        ratio as usize
    } else {
        1
    };
    if taps % 2 == 0 {
        taps += 1;
    }
    if taps == 1 {
        return vec![1.0];
    }
    let denom = (taps - 1) as f64;
    let mut kernel: Vec<f64> = (0..taps)
        .map(|j| {
            let n = 3.0 * (2.0 * j as f64 / denom - 1.0);
            (-n * n / 2.0).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

/// Same-length convolution with zero padding outside `f`.
pub fn convolve_same(f: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = f.len();
    let m = kernel.len();
    if m == 1 {
        return f.iter().map(|v| v * kernel[0]).collect();
    }
    let half = (m - 1) / 2;
    let mut out = vec![0.0f64; n];
    for (i, slot) in out.iter_mut().enumerate() {
        // full[k] = sum_j f[k - j] * g[j], taken at k = i + half
        let k = i + half;
        let j_lo = k.saturating_sub(n - 1);
        let j_hi = k.min(m - 1);
        let mut acc = 0.0f64;
        for j in j_lo..=j_hi {
            acc += f[k - j] * kernel[j];
        }
        *slot = acc;
    }
    out
}

pub fn smooth(f: &[f64], df: f64, width: f64) -> Vec<f64> {
    if f.is_empty() {
        return Vec::new();
    }
    let kernel = gaussian_kernel(df, width);
    if kernel.len() == 1 {
        return f.to_vec();
    }
    convolve_same(f, &kernel)
}

/// Smoothing window fixed for a run; the bin spacing varies with the chunk length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    width: f64,
}

impl Smoother {
    pub fn new(width: f64) -> Self {
        Self { width }
    }

    pub fn apply(&self, f: &[f64], df: f64) -> Vec<f64> {
        smooth(f, df, self.width)
    }
}
