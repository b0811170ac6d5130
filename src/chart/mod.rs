//! Chart construction, independent of the drawing toolkit.
//!
//! [`builder::build_chart`] turns the full and filtered datasets into a
//! [`spec::ChartSpec`]; `ui::plot` draws it.

pub mod builder;
pub mod scale;
pub mod spec;
pub mod trend;
