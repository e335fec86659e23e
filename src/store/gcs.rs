use opendal::{services::Gcs, Operator};

use crate::config::SideConfig;
use crate::error::{BucketDiffError, Result};
use crate::store::OperatorStore;

/// Open a Google Cloud Storage bucket.
///
/// With no credential file configured the standard Google chain applies:
/// GOOGLE_APPLICATION_CREDENTIALS, the gcloud well-known file, then the
/// GCE metadata server / GKE Workload Identity.
pub fn open(bucket: &str, side: &SideConfig) -> Result<OperatorStore> {
    let mut builder = Gcs::default().bucket(bucket);

    if let Some(path) = &side.credential_path {
        builder = builder.credential_path(&path.to_string_lossy());
    }
    if let Some(endpoint) = &side.endpoint {
        builder = builder.endpoint(endpoint);
    }

    let operator = Operator::new(builder)
        .map_err(|e| BucketDiffError::store_access(bucket, None, "configuring", e))?
        .finish();

    Ok(OperatorStore::new(operator, bucket, "gs"))
}
