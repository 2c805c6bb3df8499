//! Shared AWS SDK configuration.

use tracing::debug;

/// Region and credential profile used by every AWS-backed adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    pub profile: Option<String>,
}

impl Default for AwsSettings {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            profile: None,
        }
    }
}

/// Resolve credentials and region into an SDK config.
///
/// Credential resolution is lazy: a missing profile only surfaces on the
/// first request, as a service error.
pub async fn load_sdk_config(settings: &AwsSettings) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(settings.region.clone()));

    if let Some(ref profile) = settings.profile {
        loader = loader.profile_name(profile);
    }

    debug!(region = %settings.region, profile = ?settings.profile, "Loading AWS SDK config");
    loader.load().await
}
