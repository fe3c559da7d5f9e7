pub mod chart_range;
