//! Infrastructure adapters

mod rule_table;
mod system_clock;
mod toolbar;

pub use rule_table::SessionRuleTable;
pub use system_clock::SystemClock;
pub use toolbar::ToolbarState;
