use opendal::{services::S3, Operator};
use tracing::{debug, warn};

use crate::config::{AwsProfile, SideConfig};
use crate::error::{BucketDiffError, Result};
use crate::store::OperatorStore;

const DEFAULT_REGION: &str = "us-east-1";
const AWS_ENDPOINT: &str = "https://s3.amazonaws.com";

/// Open an S3 or S3-compatible bucket.
///
/// Credentials come from the side's AWS profile when one was given, resolved
/// through the AWS SDK; otherwise OpenDAL loads the standard AWS chain:
/// 1. Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
/// 2. Shared credentials file (~/.aws/credentials)
/// 3. EC2 Instance Profile / ECS Task Role / EKS Pod Identity
pub async fn open(bucket: &str, side: &SideConfig) -> Result<OperatorStore> {
    let mut builder = S3::default().bucket(bucket);

    if let Some(endpoint) = &side.endpoint {
        builder = builder.endpoint(endpoint);
    }

    let profile = match &side.profile {
        Some(name) => Some(AwsProfile::load(name).await?),
        None => None,
    };

    let region = match resolve_region(bucket, side, profile.as_ref()).await {
        Some(region) => region,
        None => {
            warn!(bucket, "could not determine bucket region, assuming {}", DEFAULT_REGION);
            DEFAULT_REGION.to_string()
        }
    };
    builder = builder.region(&region);

    if let Some(profile) = &profile {
        // Only the profile's credentials; never fall back to the ambient chain
        builder = builder
            .disable_config_load()
            .access_key_id(&profile.access_key_id)
            .secret_access_key(&profile.secret_access_key);
        if let Some(token) = &profile.session_token {
            builder = builder.session_token(token);
        }
    }

    let operator = Operator::new(builder)
        .map_err(|e| BucketDiffError::store_access(bucket, None, "configuring", e))?
        .finish();

    debug!(bucket, region = %region, "opened S3 bucket");
    Ok(OperatorStore::new(operator, bucket, "s3"))
}

/// Explicit region first, then the profile's, then ask the endpoint
async fn resolve_region(bucket: &str, side: &SideConfig, profile: Option<&AwsProfile>) -> Option<String> {
    if let Some(region) = &side.region {
        return Some(region.clone());
    }
    if let Some(region) = profile.and_then(|p| p.region.clone()) {
        return Some(region);
    }
    let endpoint = side.endpoint.as_deref().unwrap_or(AWS_ENDPOINT);
    S3::detect_region(endpoint, bucket).await
}
