pub mod json_lines_sink;
pub mod json_lines_source;
