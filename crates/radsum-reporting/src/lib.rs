mod export;
mod table;

pub use export::{CSV_HEADER, FileExporter, OUTPUT_BASENAME, export_csv, export_json};
pub use table::render_table;
