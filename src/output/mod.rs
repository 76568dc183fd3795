mod csv_writer;
mod diagnostics;

pub use csv_writer::{write_rejections, CsvWriter};
pub use diagnostics::Diagnostics;
