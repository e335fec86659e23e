use std::path::Path;

use opendal::{services::Fs, Operator};

use crate::error::{BucketDiffError, Result};
use crate::store::OperatorStore;

/// Treat a local directory as a bucket; keys are paths relative to `root`
pub fn open(root: &Path) -> Result<OperatorStore> {
    let label = root.display().to_string();

    if !root.is_dir() {
        return Err(BucketDiffError::store_access(
            &label,
            None,
            "opening",
            "directory does not exist",
        ));
    }

    let builder = Fs::default().root(&root.to_string_lossy());
    let operator = Operator::new(builder)
        .map_err(|e| BucketDiffError::store_access(&label, None, "configuring", e))?
        .finish();

    Ok(OperatorStore::new(operator, &label, "file"))
}
