// src/utils/fixed_point.rs

/// Nodata marker for scaled `i16` NDVI output.
pub const FIXED_POINT_NODATA: i16 = -10000;

/// Scaled NDVI values plus the number that had to be clamped to fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPoint {
    pub data: Vec<i16>,
    pub clamped: usize,
}

/// Scales NDVI values to `i16`. `NaN` becomes `nodata_value`.
///
/// Values are kept as-is up to `i16::MAX / scale_factor`; below zero they stop
/// one step above the nodata marker so a real value never reads back as nodata.
/// Anything outside that range is clamped and counted.
pub fn to_fixed_point(data: &[f32], scale_factor: i32, nodata_value: i16) -> FixedPoint {
    let scale = scale_factor as f32;
    let upper = i16::MAX as f32 / scale;
    let lower = (nodata_value as f32 + 1.0) / scale;

    let mut clamped = 0;
    let data = data
        .iter()
        .map(|&value| {
            if value.is_nan() {
                return nodata_value;
            }
            if value > upper || value < lower {
                clamped += 1;
            }
            // float-to-int casts saturate, so rounding at the top edge stays in range
            (value.max(lower).min(upper) * scale).round() as i16
        })
        .collect();

    FixedPoint { data, clamped }
}
