//! Campaign reporting: synthetic A/B traffic, calendar rollups with
//! weighted rates and axis scaling, plus the comparison chart view model.

pub mod aggregate;
pub mod chart;
pub mod comparison;
pub mod metric;
pub mod samples;

pub use aggregate::{aggregate, AggregatedBucket, VariantTotals};
pub use chart::{ChartView, ComparisonChart};
pub use comparison::{best_variants, BestVariants, PerformanceSnapshot};
pub use metric::{spec, AxisScale, MetricSpec};
pub use samples::{generate_samples, MetricSample};
