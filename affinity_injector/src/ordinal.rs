use crate::error::OrdinalError;

/// Recovers the replica ordinal from a StatefulSet pod name (`<prefix>-<ordinal>`)
pub fn extract_ordinal(pod_name: &str) -> Result<u64, OrdinalError> {
    pod_name
        .rsplit('-')
        .next()
        .filter(|suffix| !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|suffix| suffix.parse().ok())
        .ok_or_else(|| OrdinalError::NoOrdinalSuffix {
            name: pod_name.to_string(),
        })
}
