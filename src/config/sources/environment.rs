//! Environment source: `DEEPHASH__SECTION__KEY=value`, e.g.
//! `DEEPHASH__TREE__ALGORITHM=sha512` or
//! `DEEPHASH__TREE__IGNORE_PATTERNS=.git,rand*`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

pub const PREFIX: &str = "DEEPHASH";

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("tree.ignore_patterns"),
    )
}
