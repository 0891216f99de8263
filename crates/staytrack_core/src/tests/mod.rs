//! Engine tests organised by topic:
//! - `scenarios` - worked examples and cross-calculator properties
//! - `continuous_residence` - rolling 12-month absence test and validation
//! - `citizenship` - naturalisation requirements and date search
//! - `tax_year` - presence thresholds within a tax year
//! - `threshold_window` - fixed trailing windows such as 90/180
//! - `dispatch` - config narrowing, validation and batch evaluation

mod continuous_residence;
mod scenarios;
mod threshold_window;
