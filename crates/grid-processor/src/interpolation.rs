//! Interpolation methods for grid resampling.

/// Nearest neighbor interpolation.
///
/// `x`/`y` are fractional column/row indices addressing pixel centres.
/// Returns NaN when the nearest pixel lies outside the grid.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    let col = x.round();
    let row = y.round();

    // Casting a negative float to usize saturates to zero, so test first.
    if !(col >= 0.0 && row >= 0.0) || col >= width as f64 || row >= height as f64 {
        return f32::NAN;
    }

    data[row as usize * width + col as usize]
}
