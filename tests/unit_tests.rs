// tests/unit_tests.rs
use approx::assert_abs_diff_eq;
use std::path::PathBuf;
use ndvi_calc::cli::SceneArgs;
use ndvi_calc::config::{BatchConfig, NdviConfig};
use ndvi_calc::io::{Band, BandPair};
use ndvi_calc::present::colormap::{parse_hex_color, preview, render_class_map, to_hex_color};
use ndvi_calc::present::export::{export_rows, read_csv, write_csv};
use ndvi_calc::present::{Histogram, NdviReport};
use ndvi_calc::processing::classify::{default_bins, UNDEFINED_LABEL};
use ndvi_calc::processing::{ClassBin, Classifier, Grid, NdviEngine};
use ndvi_calc::utils::fixed_point::to_fixed_point;
use ndvi_calc::NdviError;

/// Helper function to build a band from a repeating value pattern
fn create_band(width: usize, height: usize, values: &[f32], nodata: Option<f64>) -> Band {
    let data = (0..width * height).map(|i| values[i % values.len()]).collect();
    Band::new(Grid::new(width, height, data), nodata)
}

fn label_at(classifier: &Classifier, value: f32) -> &str {
    classifier.label(classifier.classify_value(value))
}

/// Test NDVI calculation with known values
#[test]
fn test_ndvi_calculation() {
    let test_cases = [
        // NIR, RED, Expected NDVI
        (5000.0, 2500.0, 0.33333), // (5000-2500)/(5000+2500)
        (3000.0, 3000.0, 0.0),
        (1000.0, 500.0, 0.33333),
        (0.0, 0.0, f32::NAN), // zero denominator
    ];

    let nir_values: Vec<f32> = test_cases.iter().map(|(nir, _, _)| *nir).collect();
    let red_values: Vec<f32> = test_cases.iter().map(|(_, red, _)| *red).collect();
    let nir = create_band(2, 2, &nir_values, None);
    let red = create_band(2, 2, &red_values, None);

    let result = NdviEngine::new().compute(&red, &nir).unwrap();
    assert_eq!(result.shape(), (2, 2));

    for (i, (_, _, expected)) in test_cases.iter().enumerate() {
        let value = result.data()[i];
        if expected.is_nan() {
            assert!(value.is_nan(), "expected sentinel at index {i}, got {value}");
        } else {
            assert!(
                (value - expected).abs() < 0.0001,
                "Expected {}, got {} at index {}",
                expected,
                value,
                i
            );
        }
    }
}

#[test]
fn test_two_by_two_scenario() {
    let red = Band::new(Grid::from_rows(vec![vec![0.1, 0.2], vec![0.3, 0.0]]), None);
    let nir = Band::new(Grid::from_rows(vec![vec![0.3, 0.2], vec![0.1, 0.0]]), None);

    let ndvi = NdviEngine::new().compute(&red, &nir).unwrap();
    let classifier = Classifier::default();
    let classes = classifier.classify(&ndvi);

    assert_abs_diff_eq!(*ndvi.get(0, 0).unwrap(), 0.5, epsilon = 1e-6);
    assert_eq!(*ndvi.get(0, 1).unwrap(), 0.0);
    assert_abs_diff_eq!(*ndvi.get(1, 0).unwrap(), -0.5, epsilon = 1e-6);
    assert!(ndvi.get(1, 1).unwrap().is_nan());

    // f32 rounding puts (0.3 - 0.1) / 0.4 just above 0.5
    assert_eq!(classifier.label(*classes.get(0, 0).unwrap()), "Dense Vegetation");
    assert_eq!(classifier.label(*classes.get(0, 1).unwrap()), "No Vegetation / Water");
    assert_eq!(classifier.label(*classes.get(1, 0).unwrap()), "No Vegetation / Water");
    assert_eq!(classifier.label(*classes.get(1, 1).unwrap()), UNDEFINED_LABEL);
}

#[test]
fn test_reflectance_inputs_stay_in_range() {
    let steps: Vec<f32> = (0..=20).map(|i| i as f32 / 20.0).collect();
    let mut red_values = Vec::new();
    let mut nir_values = Vec::new();
    for &r in &steps {
        for &n in &steps {
            red_values.push(r);
            nir_values.push(n);
        }
    }
    let size = steps.len();
    let red = create_band(size, size, &red_values, None);
    let nir = create_band(size, size, &nir_values, None);

    let ndvi = NdviEngine::new().compute(&red, &nir).unwrap();
    assert_eq!(ndvi.shape(), red.shape());

    for (i, value) in ndvi.data().iter().enumerate() {
        if red_values[i] + nir_values[i] == 0.0 {
            assert!(value.is_nan());
        } else {
            assert!((-1.0..=1.0).contains(value), "{value} out of range");
        }
    }
}

#[test]
fn test_zero_denominator_never_infinite() {
    let red = create_band(3, 1, &[0.0, -0.25, 0.0], None);
    let nir = create_band(3, 1, &[0.0, 0.25, -0.0], None);

    let ndvi = NdviEngine::new().compute(&red, &nir).unwrap();
    assert!(ndvi.data().iter().all(|v| v.is_nan()));
    assert!(!ndvi.data().iter().any(|v| v.is_infinite()));
}

#[test]
fn test_ndvi_with_nodata() {
    let red = create_band(2, 2, &[2500.0, -9999.0, 2500.0, 2500.0], Some(-9999.0));
    let nir = create_band(2, 2, &[5000.0, 5000.0, -9999.0, f32::NAN], Some(-9999.0));

    let ndvi = NdviEngine::new().compute(&red, &nir).unwrap();
    assert!((ndvi.data()[0] - 0.33333).abs() < 0.0001);
    assert!(ndvi.data()[1].is_nan());
    assert!(ndvi.data()[2].is_nan());
    assert!(ndvi.data()[3].is_nan());
}

#[test]
fn test_nan_nodata_marker() {
    let red = create_band(2, 1, &[f32::NAN, 0.1], Some(f64::NAN));
    let nir = create_band(2, 1, &[0.4, 0.3], Some(f64::NAN));

    let ndvi = NdviEngine::new().compute(&red, &nir).unwrap();
    assert!(ndvi.data()[0].is_nan());
    assert_abs_diff_eq!(ndvi.data()[1], 0.5, epsilon = 1e-6);
}

#[test]
fn test_out_of_range_values_pass_through() {
    // Negative inputs (bad atmospheric correction) push NDVI past the ideal range
    let red = create_band(2, 1, &[-999.0, 2500.0], None);
    let nir = create_band(2, 1, &[5000.0, -999.0], None);

    let raw = NdviEngine::new().compute(&red, &nir).unwrap();
    assert!((raw.data()[0] - 1.4993).abs() < 0.0001);
    assert!((raw.data()[1] - (-2.3311)).abs() < 0.0001);

    let clipped = NdviEngine::with_clip(true).compute(&red, &nir).unwrap();
    assert_eq!(clipped.data(), &[1.0, -1.0]);
}

#[test]
fn test_shape_mismatch() {
    let red = create_band(3, 3, &[0.1], None);
    let nir = create_band(4, 4, &[0.3], None);

    match NdviEngine::new().compute(&red, &nir) {
        Err(NdviError::ShapeMismatch { red, nir }) => {
            assert_eq!(red, (3, 3));
            assert_eq!(nir, (4, 4));
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
    assert!(matches!(
        BandPair::new(red, nir),
        Err(NdviError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_default_bins_partition_range() {
    let classifier = Classifier::default();
    let bins = classifier.bins();

    for i in 0..=20000 {
        let value = -1.0 + i as f32 / 10000.0;
        let matching: Vec<usize> = bins
            .iter()
            .enumerate()
            .filter(|(index, bin)| {
                let above_lower = if *index == 0 {
                    value >= bin.lower
                } else {
                    value > bin.lower
                };
                above_lower && value <= bin.upper
            })
            .map(|(index, _)| index)
            .collect();

        assert_eq!(matching.len(), 1, "{value} matched {matching:?}");
        assert_eq!(classifier.classify_value(value), Some(matching[0]));
    }
}

#[test]
fn test_boundary_values() {
    let classifier = Classifier::default();
    assert_eq!(label_at(&classifier, -1.0), "No Vegetation / Water");
    assert_eq!(label_at(&classifier, 0.0), "No Vegetation / Water");
    assert_eq!(label_at(&classifier, 0.2), "Sparse Vegetation");
    assert_eq!(label_at(&classifier, 0.2000001), "Moderate Vegetation");
    assert_eq!(label_at(&classifier, 0.5), "Moderate Vegetation");
    assert_eq!(label_at(&classifier, 1.0), "Dense Vegetation");
    assert_eq!(label_at(&classifier, f32::NAN), UNDEFINED_LABEL);
}

#[test]
fn test_out_of_range_values_use_end_bins() {
    let classifier = Classifier::default();
    assert_eq!(classifier.classify_value(-2.33), Some(0));
    assert_eq!(classifier.classify_value(1.4993), Some(3));
}

#[test]
fn test_invalid_bins_rejected() {
    let gap = vec![
        ClassBin::new(-1.0, 0.0, "low", [0, 0, 0]),
        ClassBin::new(0.1, 1.0, "high", [255, 255, 255]),
    ];
    let overlap = vec![
        ClassBin::new(-1.0, 0.3, "low", [0, 0, 0]),
        ClassBin::new(0.2, 1.0, "high", [255, 255, 255]),
    ];
    let short = vec![ClassBin::new(-1.0, 0.8, "all", [0, 0, 0])];
    let empty_range = vec![
        ClassBin::new(-1.0, 0.0, "low", [0, 0, 0]),
        ClassBin::new(0.0, 0.0, "none", [1, 1, 1]),
        ClassBin::new(0.0, 1.0, "high", [255, 255, 255]),
    ];
    let shared_color = vec![
        ClassBin::new(-1.0, 0.0, "low", [34, 139, 34]),
        ClassBin::new(0.0, 0.5, "mid", [200, 200, 0]),
        ClassBin::new(0.5, 1.0, "high", [34, 139, 34]),
    ];

    for bins in [gap, overlap, short, empty_range, shared_color, Vec::new()] {
        assert!(matches!(
            Classifier::new(bins),
            Err(NdviError::InvalidClassification(_))
        ));
    }
    assert!(Classifier::new(default_bins()).is_ok());
}

#[test]
fn test_custom_scheme() {
    let bins = vec![
        ClassBin::new(-1.0, -0.1, "Water", [0, 0, 255]),
        ClassBin::new(-0.1, 0.1, "Bare Soil", [150, 100, 50]),
        ClassBin::new(0.1, 1.0, "Vegetation", [0, 200, 0]),
    ];
    let classifier = Classifier::new(bins).unwrap();
    assert_eq!(label_at(&classifier, -0.1), "Water");
    assert_eq!(label_at(&classifier, 0.05), "Bare Soil");
    assert_eq!(label_at(&classifier, 0.75), "Vegetation");
}

#[test]
fn test_histogram_counts() {
    let ndvi = Grid::new(3, 2, vec![-1.0, -0.5, 0.0, 0.5, 1.0, f32::NAN]);
    let histogram = Histogram::from_grid(&ndvi, 4, 1);

    assert_eq!(histogram.edges, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    assert_eq!(histogram.counts, vec![1, 1, 1, 2]);
    assert_eq!(histogram.total(), 5);
}

#[test]
fn test_histogram_widens_for_unclipped_values() {
    let ndvi = Grid::new(2, 1, vec![0.25, 1.5]);
    let histogram = Histogram::from_grid(&ndvi, 5, 1);

    assert_eq!(histogram.bins(), 5);
    assert_eq!(histogram.edges.first(), Some(&-1.0));
    assert_eq!(histogram.edges.last(), Some(&1.5));
    assert_eq!(histogram.counts[4], 1);
    assert_eq!(histogram.total(), 2);
}

#[test]
fn test_histogram_stride_samples() {
    let ndvi = Grid::new(4, 4, vec![0.3; 16]);
    let histogram = Histogram::from_grid(&ndvi, 10, 2);
    // rows 0, 2 and columns 0, 2
    assert_eq!(histogram.total(), 4);
}

#[test]
fn test_histogram_chart_size() {
    let ndvi = Grid::new(2, 2, vec![-0.4, 0.1, 0.3, 0.8]);
    let histogram = Histogram::from_grid(&ndvi, 50, 1);
    let chart = histogram.render(400, 200, &Classifier::default());
    assert_eq!(chart.dimensions(), (400, 200));
}

#[test]
fn test_class_map_colors() {
    let classifier = Classifier::default();
    let classes = Grid::new(3, 1, vec![Some(0), None, Some(3)]);
    let image = render_class_map(&classes, &classifier);

    let water = classifier.bins()[0].color;
    let dense = classifier.bins()[3].color;
    assert_eq!(image.dimensions(), (3, 1));
    assert_eq!(image.get_pixel(0, 0).0, [water[0], water[1], water[2], 255]);
    assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0, 0]);
    assert_eq!(image.get_pixel(2, 0).0, [dense[0], dense[1], dense[2], 255]);
}

#[test]
fn test_default_colors_distinct() {
    let bins = default_bins();
    for (i, a) in bins.iter().enumerate() {
        for b in &bins[i + 1..] {
            assert_ne!(a.color, b.color);
        }
    }
}

#[test]
fn test_preview_keeps_aspect() {
    let classes = Grid::new(1000, 500, vec![Some(1); 500_000]);
    let image = render_class_map(&classes, &Classifier::default());

    assert_eq!(preview(&image, 100).dimensions(), (100, 50));
    assert_eq!(preview(&image, 2000).dimensions(), (1000, 500));
}

#[test]
fn test_hex_colors() {
    assert_eq!(parse_hex_color("#1a9641"), Some([26, 150, 65]));
    assert_eq!(parse_hex_color("FFFFFF"), Some([255, 255, 255]));
    assert_eq!(parse_hex_color("#12345"), None);
    assert_eq!(parse_hex_color("#zzzzzz"), None);
    assert_eq!(to_hex_color([26, 150, 65]), "#1a9641");
}

#[test]
fn test_csv_round_trip() {
    let ndvi = Grid::new(
        3,
        2,
        vec![0.123456, f32::NAN, -0.5, 1e-8, 0.99999994, f32::NAN],
    );

    let mut buffer = Vec::new();
    let written = write_csv(export_rows(&ndvi), &mut buffer).unwrap();
    assert_eq!(written, 4);

    let text = String::from_utf8(buffer.clone()).unwrap();
    assert!(text.starts_with("row,column,ndvi_value\n"));
    for line in text.lines().skip(1) {
        assert!(!line.contains('e'), "values must be plain decimals: {line}");
    }

    let rows = read_csv(buffer.as_slice()).unwrap();
    let expected: Vec<_> = export_rows(&ndvi).collect();
    assert_eq!(rows, expected);

    let positions: Vec<(usize, usize)> = rows.iter().map(|r| (r.row, r.column)).collect();
    assert_eq!(positions, vec![(0, 0), (0, 2), (1, 0), (1, 1)]);
}

#[test]
fn test_csv_header_without_rows() {
    let ndvi = Grid::new(1, 1, vec![f32::NAN]);
    let mut buffer = Vec::new();
    assert_eq!(write_csv(export_rows(&ndvi), &mut buffer).unwrap(), 0);
    assert_eq!(String::from_utf8(buffer).unwrap(), "row,column,ndvi_value\n");
}

#[test]
fn test_report_summary() {
    let ndvi = Grid::new(2, 2, vec![-0.5, 0.1, 0.7, f32::NAN]);
    let classifier = Classifier::default();
    let classes = classifier.classify(&ndvi);
    let histogram = Histogram::from_grid(&ndvi, 10, 1);

    let report = NdviReport::build(&ndvi, &classes, &classifier, histogram, None, false);

    assert_eq!(report.valid_pixels, 3);
    assert_eq!(report.undefined_pixels, 1);
    assert_eq!(report.min, Some(-0.5));
    assert_eq!(report.max, Some(0.7));
    assert_abs_diff_eq!(report.mean.unwrap(), 0.1, epsilon = 1e-6);

    let pixels: Vec<usize> = report.classes.iter().map(|c| c.pixels).collect();
    assert_eq!(pixels, vec![1, 1, 0, 1]);
    let percent: f64 = report.classes.iter().map(|c| c.percent).sum();
    assert_abs_diff_eq!(percent, 100.0, epsilon = 1e-9);
}

#[test]
fn test_config_defaults() {
    let config = NdviConfig::from_json("{}").unwrap();
    assert_eq!(config, NdviConfig::default());
    assert_eq!(config.histogram_bins, 50);
    assert!(!config.clip);
    assert_eq!(config.classifier().unwrap(), Classifier::default());
}

#[test]
fn test_config_custom_classes() {
    let json = r##"{
        "clip": true,
        "histogram_bins": 20,
        "classes": [
            {"lower": -1.0, "upper": 0.1, "label": "Bare", "color": "#a0522d"},
            {"lower": 0.1, "upper": 1.0, "label": "Green", "color": "#228b22"}
        ]
    }"##;
    let config = NdviConfig::from_json(json).unwrap();
    assert!(config.clip);
    assert_eq!(config.histogram_bins, 20);

    let classifier = config.classifier().unwrap();
    assert_eq!(classifier.bins().len(), 2);
    assert_eq!(classifier.bins()[1].color, [34, 139, 34]);
}

fn scene_args() -> SceneArgs {
    SceneArgs {
        red: PathBuf::from("red.tif"),
        nir: PathBuf::from("nir.tif"),
        satellite: None,
        config: None,
        clip: false,
        histogram_bins: None,
        histogram_stride: None,
        preview_size: None,
    }
}

#[test]
fn test_command_line_overrides() {
    let file = NdviConfig::from_json(
        r#"{"clip": true, "histogram_bins": 20, "histogram_stride": 4, "preview_size": 256}"#,
    )
    .unwrap();

    // unset flags keep the file values; --clip absent does not turn clipping off
    let mut config = file.clone();
    config.apply_overrides(&scene_args());
    assert_eq!(config, file);

    let mut config = NdviConfig::default();
    config.apply_overrides(&SceneArgs {
        clip: true,
        histogram_bins: Some(10),
        histogram_stride: Some(2),
        preview_size: Some(128),
        ..scene_args()
    });
    assert!(config.clip);
    assert_eq!(config.histogram_bins, 10);
    assert_eq!(config.histogram_stride, 2);
    assert_eq!(config.preview_size, Some(128));
    assert_eq!(config.classes, NdviConfig::default().classes);
}

#[test]
fn test_batch_scene_overrides() {
    let json = r#"{
        "global": {"clip": true, "histogram_bins": 30, "raster": {"fixed_point": true}},
        "scenes": [
            {"red": "a_red.tif", "nir": "a_nir.tif", "output": "out/a"},
            {"red": "b_red.tif", "nir": "b_nir.tif", "output": "out/b", "clip": false, "geotiff": true}
        ]
    }"#;
    let batch: BatchConfig = serde_json::from_str(json).unwrap();

    let first = batch.scene_config(&batch.scenes[0]);
    assert!(first.clip);
    assert_eq!(first.histogram_bins, 30);
    assert!(!batch.scene_outputs(&batch.scenes[0]).geotiff);

    let second = batch.scene_config(&batch.scenes[1]);
    assert!(!second.clip);
    assert_eq!(second.histogram_bins, 30);
    let outputs = batch.scene_outputs(&batch.scenes[1]);
    assert!(outputs.geotiff);
    assert!(outputs.csv);
    assert!(outputs.raster.fixed_point);
}

#[test]
fn test_config_rejects_bad_scheme() {
    let bad_color = r##"{"classes": [{"lower": -1.0, "upper": 1.0, "label": "All", "color": "green"}]}"##;
    let gap = r##"{"classes": [
        {"lower": -1.0, "upper": 0.0, "label": "Low", "color": "#000000"},
        {"lower": 0.5, "upper": 1.0, "label": "High", "color": "#ffffff"}
    ]}"##;

    assert!(matches!(
        NdviConfig::from_json(bad_color),
        Err(NdviError::InvalidClassification(_))
    ));
    assert!(matches!(
        NdviConfig::from_json(gap),
        Err(NdviError::InvalidClassification(_))
    ));
    let same_color = r##"{"classes": [
        {"lower": -1.0, "upper": 0.0, "label": "Low", "color": "#228b22"},
        {"lower": 0.0, "upper": 1.0, "label": "High", "color": "#228B22"}
    ]}"##;
    assert!(matches!(
        NdviConfig::from_json(same_color),
        Err(NdviError::InvalidClassification(_))
    ));
    assert!(matches!(
        NdviConfig::from_json("{\"histogram_bins\": \"many\"}"),
        Err(NdviError::Json(_))
    ));
}

#[test]
fn test_grid_length_checked() {
    let grid = Grid::try_new(3, 2, vec![0.0f32; 6]).unwrap();
    assert_eq!(grid.shape(), (3, 2));
    assert_eq!(grid, Grid::from_rows(vec![vec![0.0; 3], vec![0.0; 3]]));

    assert!(matches!(
        Grid::try_new(3, 2, vec![0.0f32; 5]),
        Err(NdviError::GridSize {
            width: 3,
            height: 2,
            len: 5
        })
    ));
}

#[test]
#[should_panic(expected = "ragged rows")]
fn test_grid_ragged_rows_panic() {
    Grid::from_rows(vec![vec![1.0f32, 2.0], vec![3.0]]);
}

#[test]
fn test_fixed_point_conversion() {
    let scaled = to_fixed_point(&[0.5, f32::NAN, 1.0, 0.0, 1.4993, -0.25], 10000, -10000);
    assert_eq!(scaled.data, vec![5000, -10000, 10000, 0, 14993, -2500]);
    assert_eq!(scaled.clamped, 0);
}

#[test]
fn test_fixed_point_clamps_only_what_cannot_fit() {
    // -1.0 would land on the nodata marker; 4.0 overflows i16 at this scale
    let scaled = to_fixed_point(&[-1.0, -2.3311, 4.0, 3.2767], 10000, -10000);
    assert_eq!(scaled.data, vec![-9999, -9999, i16::MAX, i16::MAX]);
    assert_eq!(scaled.clamped, 3);

    let coarse = to_fixed_point(&[-1.0, 1.0, f32::NAN], 1000, -10000);
    assert_eq!(coarse.data, vec![-1000, 1000, -10000]);
    assert_eq!(coarse.clamped, 0);
}
