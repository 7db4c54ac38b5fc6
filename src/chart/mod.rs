//! Chart rendering: autoscaling, the long history bar chart and the panel mini charts

pub mod bar;
pub mod mini;
pub mod scale;
