mod chunked;
mod commands;
mod dispatch;
mod line_reader;
mod parser;
mod responses;
#[cfg(test)]
mod tests;

pub use chunked::ChunkedWriter;
pub use commands::Command;
pub use line_reader::{LineReadEvent, LineReader};
pub use parser::parse_command;
pub use responses::ERR_LINE_TOO_LONG;
