//! Submission validation.
//!
//! Everything here runs synchronously before a job record exists: a rejected
//! submission creates nothing. Unknown operation kinds never reach this
//! module; the tagged union rejects them during deserialization.

use validator::Validate;

use vedit_models::EditOperation;

use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::SubmitJobRequest;

/// Upper bound on operations per job.
pub const MAX_OPERATIONS: usize = 500;

/// Validate a submission payload.
pub fn validate_submission(request: &SubmitJobRequest) -> ApiResult<()> {
    if request.source_uri.trim().is_empty() {
        return Err(ApiError::validation("source_uri must not be empty"));
    }

    if let Some((scheme, _)) = request.source_uri.split_once("://") {
        if !matches!(scheme, "file" | "http" | "https") {
            return Err(ApiError::validation(format!(
                "unsupported source_uri scheme: {}",
                scheme
            )));
        }
    }

    if request.operations.len() > MAX_OPERATIONS {
        return Err(ApiError::validation(format!(
            "too many operations (max {})",
            MAX_OPERATIONS
        )));
    }

    for (index, op) in request.operations.iter().enumerate() {
        validate_operation(index, op, request.source_duration_hint_secs)?;
    }

    if let Some(settings) = &request.settings {
        settings
            .validate()
            .map_err(|e| ApiError::validation(format!("invalid settings: {}", e)))?;
    }

    if let Some(hint) = request.source_duration_hint_secs {
        if !hint.is_finite() || hint <= 0.0 {
            return Err(ApiError::validation(
                "source_duration_hint_secs must be positive",
            ));
        }
    }

    Ok(())
}

fn validate_operation(
    index: usize,
    op: &EditOperation,
    duration_hint: Option<f64>,
) -> ApiResult<()> {
    let ts = op.timestamp_seconds();

    if !ts.is_finite() || ts < 0.0 {
        return Err(ApiError::validation(format!(
            "operation {} ({}): timestamp_seconds must be a non-negative number",
            index,
            op.kind_name()
        )));
    }

    if let Some(hint) = duration_hint {
        if hint.is_finite() && ts > hint {
            return Err(ApiError::validation(format!(
                "operation {} ({}): timestamp {}s is beyond the source duration {}s",
                index,
                op.kind_name(),
                ts,
                hint
            )));
        }
    }

    if let Some(duration) = op.duration_seconds() {
        if !duration.is_finite() || duration < 0.0 {
            return Err(ApiError::validation(format!(
                "operation {} ({}): duration_seconds must be a non-negative number",
                index,
                op.kind_name()
            )));
        }
    }

    if let Some(asset_uri) = op.asset_uri() {
        if asset_uri.trim().is_empty() {
            return Err(ApiError::validation(format!(
                "operation {} ({}): asset_uri must not be empty",
                index,
                op.kind_name()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vedit_models::EditSettings;

    fn base_request() -> SubmitJobRequest {
        SubmitJobRequest {
            source_uri: "https://assets.example.com/raw/talk.mp4".to_string(),
            preset_id: None,
            operations: Vec::new(),
            settings: None,
            source_duration_hint_secs: None,
        }
    }

    #[test]
    fn test_valid_submission() {
        let mut req = base_request();
        req.operations = vec![
            EditOperation::JumpCut {
                timestamp_seconds: 5.0,
            },
            EditOperation::VoiceOver {
                timestamp_seconds: 10.0,
                asset_uri: "https://assets.example.com/vo.wav".to_string(),
                duration_seconds: Some(3.0),
            },
        ];
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        let mut req = base_request();
        req.operations = vec![EditOperation::JumpCut {
            timestamp_seconds: -1.0,
        }];
        let err = validate_submission(&req).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_nan_timestamp_rejected() {
        let mut req = base_request();
        req.operations = vec![EditOperation::JumpCut {
            timestamp_seconds: f64::NAN,
        }];
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn test_timestamp_beyond_hint_rejected() {
        let mut req = base_request();
        req.source_duration_hint_secs = Some(30.0);
        req.operations = vec![EditOperation::JumpCut {
            timestamp_seconds: 45.0,
        }];
        assert!(validate_submission(&req).is_err());

        // Without the hint the same operation is accepted; windows clamp to
        // the probed duration during processing
        req.source_duration_hint_secs = None;
        assert!(validate_submission(&req).is_ok());
    }

    #[test]
    fn test_empty_source_uri_rejected() {
        let mut req = base_request();
        req.source_uri = "  ".to_string();
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let mut req = base_request();
        req.source_uri = "ftp://example.com/a.mp4".to_string();
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn test_empty_asset_uri_rejected() {
        let mut req = base_request();
        req.operations = vec![EditOperation::SoundEffect {
            timestamp_seconds: 1.0,
            asset_uri: "".to_string(),
            duration_seconds: None,
        }];
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut req = base_request();
        req.settings = Some(EditSettings {
            jump_cut_frequency: -3.0,
            music_volume: 50,
        });
        assert!(validate_submission(&req).is_err());
    }

    #[test]
    fn test_unknown_kind_rejected_at_deserialization() {
        let json = r#"{ "kind": "color_grade", "timestamp_seconds": 1.0 }"#;
        assert!(serde_json::from_str::<EditOperation>(json).is_err());
    }
}
