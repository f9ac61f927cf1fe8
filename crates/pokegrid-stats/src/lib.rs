//! Statistics for summarizing experiment logs.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`paired`]: Statistics over paired observations (suggested vs. actual scores)
//!
//! # Examples
//!
//! ```
//! use pokegrid_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.count, 5);
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
pub mod paired;
