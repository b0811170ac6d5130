use serde::{Deserialize, Serialize};

use crate::color::ColorAssignment;
use crate::data::model::{BladeDataset, BladeRecord, Dimension};

use super::scale::{SizeScale, SizeTransform};
use super::spec::{ChartPoint, ChartSpec, PointMeta, Series, SizeLegend, SizeLegendEntry, TrendSegment};
use super::trend::{fit_linear, LinearFit};

/// Ratios of 1.0 are the neutral value, so both axes always show it.
pub const REFERENCE_VALUE: f64 = 1.0;

/// Marker diameter when a chart has no size dimension.
pub const DEFAULT_MARKER_PX: f32 = 6.0;

/// Reference values shown in the size legend, in the metric's own units.
pub const LEGEND_REFERENCE_VALUES: [f64; 3] = [1.0, 1.5, 2.0];

fn default_legend_values() -> Vec<f64> {
    LEGEND_REFERENCE_VALUES.to_vec()
}

fn default_legend_transform() -> SizeTransform {
    SizeTransform::Identity
}

// ---------------------------------------------------------------------------
// Chart configuration
// ---------------------------------------------------------------------------

/// Third, size-encoded dimension of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeConfig {
    pub dimension: Dimension,
    /// Transform for plotted markers.
    pub marker: SizeTransform,
    /// Transform for the legend's reference markers.
    #[serde(default = "default_legend_transform")]
    pub legend: SizeTransform,
    #[serde(default = "default_legend_values")]
    pub legend_values: Vec<f64>,
}

/// One comparison to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub title: String,
    pub x: Dimension,
    pub y: Dimension,
    #[serde(default)]
    pub size: Option<SizeConfig>,
    #[serde(default)]
    pub trend_line: bool,
    #[serde(default)]
    pub scale: SizeScale,
}

/// The three comparisons of the blade overview page.
pub fn default_charts(scale: SizeScale) -> Vec<ChartConfig> {
    vec![
        ChartConfig {
            title: "Comparison by Elasticity Indices".to_string(),
            x: Dimension::Ep,
            y: Dimension::EcEp,
            size: Some(SizeConfig {
                dimension: Dimension::Vp,
                marker: SizeTransform::inverse_power(8.0),
                legend: SizeTransform::InversePower {
                    coefficient: 10.0,
                    exponent: 1.0,
                },
                legend_values: default_legend_values(),
            }),
            trend_line: false,
            scale,
        },
        ChartConfig {
            title: "Comparison by Vibration Indices".to_string(),
            x: Dimension::Vp,
            y: Dimension::VlVp,
            size: Some(SizeConfig {
                dimension: Dimension::Ep,
                marker: SizeTransform::power(3.8),
                legend: SizeTransform::power(3.0),
                legend_values: default_legend_values(),
            }),
            trend_line: false,
            scale,
        },
        ChartConfig {
            title: "Primary Elasticity vs. Primary Vibration".to_string(),
            x: Dimension::Ep,
            y: Dimension::Vp,
            size: None,
            trend_line: true,
            scale,
        },
    ]
}

// ---------------------------------------------------------------------------
// Building a chart
// ---------------------------------------------------------------------------

/// Build the chart for `filtered`, using `full` as the reference for marker
/// scaling and trend fitting so neither changes as the filter moves.
pub fn build_chart(
    full: &BladeDataset,
    filtered: &BladeDataset,
    config: &ChartConfig,
    colors: &ColorAssignment,
) -> ChartSpec {
    let marker_reference = config.size.as_ref().and_then(|size| {
        SizeScale::reference_max(
            full.records
                .iter()
                .map(|r| size.marker.apply(size.dimension.value(r))),
        )
    });

    // Partition by type in order of first appearance in the filtered rows.
    let mut groups: Vec<(&str, Vec<&BladeRecord>)> = Vec::new();
    for rec in &filtered.records {
        match groups.iter_mut().find(|(t, _)| *t == rec.blade_type) {
            Some((_, members)) => members.push(rec),
            None => groups.push((rec.blade_type.as_str(), vec![rec])),
        }
    }

    let series = groups
        .into_iter()
        .map(|(blade_type, members)| Series {
            name: blade_type.to_string(),
            color: colors.color_for(blade_type),
            points: members
                .into_iter()
                .map(|rec| chart_point(config, rec, marker_reference))
                .collect(),
        })
        .collect();

    let trend = if config.trend_line {
        fit_linear(&full.column(config.x), &full.column(config.y))
            .and_then(|fit| trend_segment(fit, filtered, config.x))
    } else {
        None
    };

    ChartSpec {
        title: config.title.clone(),
        x_label: config.x.label().to_string(),
        y_label: config.y.label().to_string(),
        series,
        size_legend: config
            .size
            .as_ref()
            .map(|size| size_legend(size, config.scale)),
        reference_x: REFERENCE_VALUE,
        reference_y: REFERENCE_VALUE,
        trend,
    }
}

fn chart_point(config: &ChartConfig, rec: &BladeRecord, marker_reference: Option<f64>) -> ChartPoint {
    let size_value = config.size.as_ref().map(|size| size.dimension.value(rec));
    let diameter = match (&config.size, size_value) {
        (Some(size), Some(v)) => config
            .scale
            .diameter(size.marker.apply(v), marker_reference.unwrap_or(0.0)),
        _ => DEFAULT_MARKER_PX,
    };

    let (x, y) = (config.x.value(rec), config.y.value(rec));
    let meta = PointMeta {
        brand: rec.brand.clone(),
        name: rec.name.clone(),
        blade_type: rec.blade_type.clone(),
        size_value,
    };
    let hover = hover_text(config, &meta, x, y);
    ChartPoint {
        x,
        y,
        diameter,
        meta,
        hover,
    }
}

/// Hover label: blade name, both axes (y to two decimals), the size
/// metric if any, and the type.
pub fn hover_text(config: &ChartConfig, meta: &PointMeta, x: f64, y: f64) -> String {
    let mut text = format!(
        "{} {}\n{} = {x}\n{} = {y:.2}",
        meta.brand,
        meta.name,
        config.x.label(),
        config.y.label(),
    );
    if let (Some(size), Some(value)) = (&config.size, meta.size_value) {
        text.push_str(&format!("\n{} = {value}", size.dimension.label()));
    }
    text.push_str(&format!("\nType = {}", meta.blade_type));
    text
}

/// Legend markers are normalised against their own largest reference.
fn size_legend(size: &SizeConfig, scale: SizeScale) -> SizeLegend {
    let transformed: Vec<f64> = size.legend_values.iter().map(|&v| size.legend.apply(v)).collect();
    let reference = SizeScale::reference_max(transformed.iter().copied()).unwrap_or(0.0);

    SizeLegend {
        title: size.dimension.label().to_string(),
        entries: size
            .legend_values
            .iter()
            .zip(transformed)
            .map(|(&value, t)| SizeLegendEntry {
                name: format!("{} = {value:.1}", size.dimension.label()),
                value,
                diameter: scale.diameter(t, reference),
            })
            .collect(),
        hidden_by_default: true,
    }
}

/// Segment over the filtered x extent, widened to cover the reference value.
fn trend_segment(fit: LinearFit, filtered: &BladeDataset, x: Dimension) -> Option<TrendSegment> {
    let range = filtered.range_of(x)?;
    let start = range.min.min(REFERENCE_VALUE);
    let end = range.max.max(REFERENCE_VALUE);
    Some(TrendSegment {
        fit,
        start: [start, fit.at(start)],
        end: [end, fit.at(end)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{PaletteMode, FALLBACK_COLOR, PLOTLY_PALETTE};
    use crate::data::filter::{filter, init_selection, FilterSelection};
    use crate::data::model::NumericRange;

    fn sample() -> BladeDataset {
        BladeDataset::from_records(vec![
            BladeRecord::new("Stiga", "Clipper", "7-Ply", 1.20, 1.26, 1.10, 0.99),
            BladeRecord::new("Butterfly", "Viscaria", "Carbon Outer", 1.45, 1.30, 0.80, 0.92),
            BladeRecord::new("Nittaku", "Acoustic", "5-Ply", 0.85, 0.94, 1.30, 1.17),
            BladeRecord::new("Yasaka", "Ma Lin Extra Offensive", "5-Ply", 0.95, 1.00, 1.25, 1.10),
            BladeRecord::new("Butterfly", "Innerforce ZLC", "Carbon Inner", 1.10, 1.21, 0.95, 0.90),
        ])
    }

    fn colors(ds: &BladeDataset) -> ColorAssignment {
        ColorAssignment::new(&ds.types, PaletteMode::Wrap)
    }

    fn charts() -> Vec<ChartConfig> {
        default_charts(SizeScale::default())
    }

    fn only_types(ds: &BladeDataset, types: &[&str]) -> BladeDataset {
        let mut selection = init_selection(ds);
        selection.types = types.iter().map(|t| t.to_string()).collect();
        filter(ds, &selection)
    }

    #[test]
    fn one_series_per_filtered_type_in_first_seen_order() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[0], &colors(&ds));
        let names: Vec<_> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["7-Ply", "Carbon Outer", "5-Ply", "Carbon Inner"]);
        assert_eq!(spec.series[2].points.len(), 2);

        let filtered = only_types(&ds, &["5-Ply"]);
        let spec = build_chart(&ds, &filtered, &charts()[0], &colors(&ds));
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].name, "5-Ply");
    }

    #[test]
    fn series_colours_come_from_the_full_assignment() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[0], &colors(&ds));
        // Sorted types: 5-Ply, 7-Ply, Carbon Inner, Carbon Outer
        let colour_of = |name: &str| spec.series.iter().find(|s| s.name == name).unwrap().color;
        assert_eq!(colour_of("5-Ply"), PLOTLY_PALETTE[0]);
        assert_eq!(colour_of("Carbon Outer"), PLOTLY_PALETTE[3]);

        let unknown = ColorAssignment::new(&[], PaletteMode::Wrap);
        let spec = build_chart(&ds, &ds, &charts()[0], &unknown);
        assert!(spec.series.iter().all(|s| s.color == FALLBACK_COLOR));
    }

    #[test]
    fn marker_scale_is_invariant_to_filtering() {
        let ds = sample();
        let config = &charts()[1];
        let full_spec = build_chart(&ds, &ds, config, &colors(&ds));
        let filtered = only_types(&ds, &["5-Ply", "Carbon Inner"]);
        let sub_spec = build_chart(&ds, &filtered, config, &colors(&ds));

        for p in sub_spec.points() {
            let same = full_spec
                .points()
                .find(|q| q.meta.name == p.meta.name)
                .unwrap();
            assert_eq!(p.diameter, same.diameter);
        }
        // The largest Ep in the filtered view is not the global one, so
        // nothing in it reaches the maximum size.
        assert!(sub_spec.points().all(|p| p.diameter < config.scale.max_px));
        assert!(full_spec
            .points()
            .any(|p| (p.diameter - config.scale.max_px).abs() < 1e-4));
    }

    #[test]
    fn inverse_transform_makes_low_vibration_largest() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[0], &colors(&ds));
        let largest = spec
            .points()
            .max_by(|a, b| a.diameter.total_cmp(&b.diameter))
            .unwrap();
        assert_eq!(largest.meta.name, "Viscaria");
        assert_eq!(largest.meta.size_value, Some(0.80));
        assert!(spec.points().all(|p| p.diameter >= 4.0));
    }

    #[test]
    fn size_legend_uses_its_own_reference() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[1], &colors(&ds));
        let legend = spec.size_legend.unwrap();
        assert!(legend.hidden_by_default);
        assert_eq!(legend.title, "Ep");
        let values: Vec<f64> = legend.entries.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1.0, 1.5, 2.0]);
        // x^3: 2.0 is the legend maximum, 1.0 is an eighth of it.
        assert_eq!(legend.entries[2].diameter, 25.0);
        let expected = 25.0 * (1.0f64 / 8.0).sqrt();
        assert!((legend.entries[0].diameter as f64 - expected).abs() < 1e-4);
        assert_eq!(legend.entries[0].name, "Ep = 1.0");
    }

    #[test]
    fn charts_without_size_have_uniform_markers_and_no_size_legend() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[2], &colors(&ds));
        assert!(spec.size_legend.is_none());
        assert!(spec.points().all(|p| p.diameter == DEFAULT_MARKER_PX));
        assert!(spec.points().all(|p| p.meta.size_value.is_none()));
    }

    #[test]
    fn trend_fit_is_stable_and_segment_tracks_filter() {
        let ds = sample();
        let config = &charts()[2];
        let full_spec = build_chart(&ds, &ds, config, &colors(&ds));
        let full_trend = full_spec.trend.unwrap();
        assert_eq!(full_trend.start[0], 0.85);
        assert_eq!(full_trend.end[0], 1.45);

        let mut selection = init_selection(&ds);
        selection.ep = NumericRange::new(1.1, 1.5);
        let filtered = filter(&ds, &selection);
        let sub_trend = build_chart(&ds, &filtered, config, &colors(&ds)).trend.unwrap();

        assert_eq!(sub_trend.fit, full_trend.fit);
        // Filtered Ep spans 1.10..1.45, widened down to 1.0.
        assert_eq!(sub_trend.start[0], 1.0);
        assert_eq!(sub_trend.end[0], 1.45);
        assert!((sub_trend.start[1] - full_trend.fit.at(1.0)).abs() < 1e-12);
        // Elasticity and vibration move in opposite directions here.
        assert!(full_trend.fit.slope < 0.0);
    }

    #[test]
    fn trend_segment_always_covers_reference() {
        let ds = sample();
        let mut selection = init_selection(&ds);
        selection.ep = NumericRange::new(0.8, 0.9);
        let filtered = filter(&ds, &selection);
        let trend = build_chart(&ds, &filtered, &charts()[2], &colors(&ds))
            .trend
            .unwrap();
        assert_eq!(trend.start[0], 0.85);
        assert_eq!(trend.end[0], 1.0);
    }

    #[test]
    fn empty_filter_result_renders_without_series() {
        let ds = sample();
        let selection = FilterSelection {
            ep: NumericRange::new(5.0, 6.0),
            ..init_selection(&ds)
        };
        let filtered = filter(&ds, &selection);
        for config in charts() {
            let spec = build_chart(&ds, &filtered, &config, &colors(&ds));
            assert!(spec.series.is_empty());
            assert_eq!(spec.point_count(), 0);
            assert!(spec.trend.is_none());
            assert_eq!(spec.reference_x, 1.0);
            assert_eq!(spec.size_legend.is_some(), config.size.is_some());
        }
    }

    #[test]
    fn hover_text_template() {
        let ds = BladeDataset::from_records(vec![BladeRecord::new(
            "Stiga", "Clipper", "7-Ply", 1.2, 1.26, 1.1, 0.99,
        )]);
        let spec = build_chart(&ds, &ds, &charts()[0], &colors(&ds));
        let point = spec.points().next().unwrap();
        assert_eq!(point.meta.size_value, Some(1.1));
        assert_eq!(
            point.hover,
            "Stiga Clipper\nEp = 1.2\nEc/Ep = 1.05\nVp = 1.1\nType = 7-Ply"
        );
        let spec = build_chart(&ds, &ds, &charts()[2], &colors(&ds));
        let point = spec.points().next().unwrap();
        assert_eq!(point.hover, "Stiga Clipper\nEp = 1.2\nVp = 1.10\nType = 7-Ply");
    }

    #[test]
    fn hover_text_reads_point_metadata() {
        let meta = PointMeta {
            brand: "Yasaka".to_string(),
            name: "Sweden Extra".to_string(),
            blade_type: "5-Ply".to_string(),
            size_value: Some(1.3),
        };
        let text = hover_text(&charts()[1], &meta, 1.25, 1.104);
        assert_eq!(
            text,
            "Yasaka Sweden Extra\nVp = 1.25\nVl/Vp = 1.10\nEp = 1.3\nType = 5-Ply"
        );
    }

    #[test]
    fn hover_near_picks_the_closest_point() {
        let ds = sample();
        let spec = build_chart(&ds, &ds, &charts()[2], &colors(&ds));
        let hover = spec.hover_near(1.44, 0.81, 0.05).unwrap();
        assert!(hover.starts_with("Butterfly Viscaria"));
        assert!(spec.hover_near(5.0, 5.0, 0.05).is_none());
    }

    #[test]
    fn end_to_end_two_row_scenario() {
        let ds = BladeDataset::from_records(vec![
            BladeRecord::new("A", "One", "5-Ply", 1.0, 1.0, 1.0, 1.0),
            BladeRecord::new("B", "Two", "7-Ply", 2.0, 3.0, 0.5, 0.4),
        ]);
        let wide = FilterSelection {
            ep: NumericRange::new(0.0, 3.0),
            ec_ep: NumericRange::new(0.0, 2.0),
            vp: NumericRange::new(0.0, 2.0),
            vl_vp: NumericRange::new(0.0, 2.0),
            ..FilterSelection::default()
        };
        let filtered = filter(&ds, &wide);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.column(Dimension::EcEp), vec![1.0, 1.5]);

        let narrow = FilterSelection {
            ep: NumericRange::new(1.5, 3.0),
            ..wide
        };
        let filtered = filter(&ds, &narrow);
        assert_eq!(filtered.len(), 1);
        let spec = build_chart(&ds, &filtered, &charts()[0], &colors(&ds));
        assert_eq!(spec.series.len(), 1);
        assert_eq!(spec.series[0].name, "7-Ply");
    }
}
