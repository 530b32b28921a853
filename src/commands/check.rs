//! Validate every content entry

use anyhow::Result;

use crate::content::{Collection, ContentLoader, ContentSet};
use crate::Site;

/// Load and validate all collections; any invalid entry fails the run
pub fn run(site: &Site) -> Result<ContentSet> {
    let loader = ContentLoader::new(site)?;
    let set = loader.load_all()?;

    for collection in Collection::ALL {
        println!("{}: {} valid entries", collection, set.get(collection).len());
    }

    Ok(set)
}
