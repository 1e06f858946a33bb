//! Environment source: REELSMITH__SECTION__KEY overrides (e.g. REELSMITH__POLL__MAX_ATTEMPTS=30).

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment};

pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("REELSMITH")
            .separator("__")
            .try_parsing(true),
    )
}
