//! List command

use eb_core::registry;

use crate::ui::table::easyblock_table;

/// List every registered easyblock.
pub fn list() {
    println!("{}", easyblock_table(registry::available()));
}
