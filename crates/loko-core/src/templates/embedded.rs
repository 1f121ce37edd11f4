//! Default template packs, embedded into the binary so `loko init`/`loko
//! new` work with zero external files.

use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates/"]
pub struct Templates;
