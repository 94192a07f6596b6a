use crate::foundation::math::SplitMix64;

/// Synthetic speech-like amplitude envelope.
///
/// This is a visual placeholder, not derived from any audio. Each sample is a random base
/// level in `[0.2, 0.7)` shaped by two sine patterns, with roughly one sample in twenty
/// dropped to a tenth to read as a pause. Values are signed and bounded by `0.28` in
/// magnitude. The same `(len, seed)` always yields the same samples.
pub fn synth_envelope(len: usize, seed: u64) -> Vec<f64> {
    let mut rng = SplitMix64::new(seed);
    (0..len)
        .map(|i| {
            let base = rng.next_f64() * 0.5 + 0.2;
            let t = i as f64;
            let pattern = (t / 20.0).sin() * 0.3 + (t / 10.0).sin() * 0.1;
            let silence = if rng.next_f64() > 0.95 { 0.1 } else { 1.0 };
            base * pattern * silence
        })
        .collect()
}

/// Closed outline of the envelope band for a `width` x `height` strip.
///
/// Even samples trace one edge left to right, odd samples trace the mirrored edge back.
/// Peak excursion is 40% of the height around the middle line.
pub fn envelope_outline(samples: &[f64], width: f64, height: f64) -> kurbo::BezPath {
    let mut path = kurbo::BezPath::new();
    let n = samples.len();
    if n == 0 || width <= 0.0 || height <= 0.0 {
        return path;
    }

    let middle = height / 2.0;
    let wave_height = height * 0.4;
    let x_at = |i: usize| i as f64 / n as f64 * width;

    for i in (0..n).step_by(2) {
        let p = kurbo::Point::new(x_at(i), middle + samples[i] * wave_height);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    for i in (0..n).rev().step_by(2) {
        path.line_to(kurbo::Point::new(x_at(i), middle - samples[i] * wave_height));
    }
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/waveform/envelope.rs"]
mod tests;
