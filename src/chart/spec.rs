use eframe::egui::Color32;

use super::trend::LinearFit;

/// Metadata attached to each plotted point for hover display.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMeta {
    pub brand: String,
    pub name: String,
    pub blade_type: String,
    /// Raw (untransformed) value of the sizing metric, if the chart has one.
    pub size_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    /// Rendered marker diameter in points.
    pub diameter: f32,
    pub meta: PointMeta,
    pub hover: String,
}

/// All points of one blade type.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: Color32,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeLegendEntry {
    /// Legend label, unique within the chart.
    pub name: String,
    /// Reference value in the sizing metric's own units.
    pub value: f64,
    pub diameter: f32,
}

/// Reference markers explaining the size dimension. Hidden until toggled.
#[derive(Debug, Clone, PartialEq)]
pub struct SizeLegend {
    pub title: String,
    pub entries: Vec<SizeLegendEntry>,
    pub hidden_by_default: bool,
}

/// Drawn trend segment; the fit comes from the full dataset, the
/// endpoints from the filtered one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSegment {
    pub fit: LinearFit,
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// A fully resolved scatter chart, independent of any drawing toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    pub size_legend: Option<SizeLegend>,
    /// Dashed reference lines, also forced into the axis ranges.
    pub reference_x: f64,
    pub reference_y: f64,
    pub trend: Option<TrendSegment>,
}

impl ChartSpec {
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.series.iter().flat_map(|s| s.points.iter())
    }

    /// Hover text of the point closest to `(x, y)`, if one lies within
    /// `tolerance` (a fraction of the data extent on each axis).
    pub fn hover_near(&self, x: f64, y: f64, tolerance: f64) -> Option<&str> {
        let (mut x_min, mut x_max) = (self.reference_x, self.reference_x);
        let (mut y_min, mut y_max) = (self.reference_y, self.reference_y);
        for p in self.points() {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        let x_span = (x_max - x_min).max(f64::EPSILON);
        let y_span = (y_max - y_min).max(f64::EPSILON);

        self.points()
            .map(|p| {
                let dx = (p.x - x) / x_span;
                let dy = (p.y - y) / y_span;
                (dx * dx + dy * dy, p)
            })
            .filter(|(d2, _)| *d2 <= tolerance * tolerance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p.hover.as_str())
    }
}
