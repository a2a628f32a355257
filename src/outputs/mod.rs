//! Output generation.
//!
//! - [`csv_writer`]: the single serializing writer that owns the output file
//!
//! # Output Format
//!
//! ```text
//! \u{feff}ID,Title,Location,Company,Condition,ExpireDate
//! https://www.saramin.co.kr/zf_user/jobs/relay/view?&rec_idx=48213,Backend Engineer,Seoul,Acme,3 years,~ 12/31(Wed)
//! ...
//! ```

pub mod csv_writer;
