//! Tables for listing easyblocks

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use eb_core::registry::{Entry, Kind};

/// Render the easyblock registry as a borderless table.
pub fn easyblock_table(entries: &[Entry]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("easyblock").fg(Color::DarkGrey),
            Cell::new("kind").fg(Color::DarkGrey),
            Cell::new("description").fg(Color::DarkGrey),
        ]);

    for entry in entries {
        let kind = match entry.kind {
            Kind::Package => "package",
            Kind::Generic => "generic",
        };
        table.add_row(vec![
            Cell::new(entry.name).fg(Color::Cyan),
            Cell::new(kind),
            Cell::new(entry.summary).fg(Color::DarkGrey),
        ]);
    }
    table
}
