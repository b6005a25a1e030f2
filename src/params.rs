use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

pub const ALLOWED_MODELS: [&str; 2] = ["sora-2", "sora-2-pro"];
pub const ALLOWED_SECONDS: [&str; 3] = ["4", "8", "12"];
pub const ALLOWED_SIZES: [&str; 4] = ["720x1280", "1280x720", "1024x1792", "1792x1024"];

pub const DEFAULT_MODEL: &str = "sora-2";
pub const DEFAULT_SECONDS: &str = "4";
pub const DEFAULT_SIZE: &str = "720x1280";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("prompt is required")]
    PromptRequired,
    #[error("invalid model: {0}")]
    InvalidModel(String),
    #[error("invalid seconds: {0}")]
    InvalidSeconds(String),
    #[error("invalid size: {0}")]
    InvalidSize(String),
}

/// A genuine file attachment from the create form. A plain text field posing
/// as `input_reference` never becomes one of these.
#[derive(Debug, Clone)]
pub struct InputReference {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl InputReference {
    /// Re-encode as an outbound multipart part, keeping the caller's filename
    /// and content type.
    pub fn into_part(self) -> reqwest::multipart::Part {
        let part = reqwest::multipart::Part::bytes(self.data.to_vec()).file_name(self.filename);
        match self.content_type {
            Some(content_type) => part
                .mime_str(&content_type)
                // already parsed as a mime by the multipart reader
                .expect("multipart field content type is a valid mime"),
            None => part,
        }
    }
}

/// Fields collected from the inbound create form before validation. Anything
/// not named here was dropped at collection time.
#[derive(Debug, Default)]
pub struct RawCreateForm {
    pub prompt: Option<String>,
    pub model: Option<String>,
    pub seconds: Option<String>,
    pub size: Option<String>,
    pub input_reference: Option<InputReference>,
}

/// A validated create request, every field a member of its allowed set.
#[derive(Debug)]
pub struct CreateJobParams {
    pub prompt: String,
    pub model: String,
    pub seconds: String,
    pub size: String,
    pub input_reference: Option<InputReference>,
}

impl RawCreateForm {
    /// Normalize and whitelist the create fields, first failure wins.
    pub fn validate(self) -> Result<CreateJobParams, ValidationError> {
        let prompt = self.prompt.as_deref().unwrap_or_default().trim().to_string();
        let model = normalized(self.model, DEFAULT_MODEL);
        let seconds = normalized(self.seconds, DEFAULT_SECONDS);
        let size = normalized(self.size, DEFAULT_SIZE);

        if prompt.is_empty() {
            return Err(ValidationError::PromptRequired);
        }
        if !ALLOWED_MODELS.contains(&model.as_str()) {
            return Err(ValidationError::InvalidModel(model));
        }
        if !ALLOWED_SECONDS.contains(&seconds.as_str()) {
            return Err(ValidationError::InvalidSeconds(seconds));
        }
        if !ALLOWED_SIZES.contains(&size.as_str()) {
            return Err(ValidationError::InvalidSize(size));
        }

        Ok(CreateJobParams {
            prompt,
            model,
            seconds,
            size,
            input_reference: self.input_reference,
        })
    }
}

fn normalized(value: Option<String>, default: &str) -> String {
    let value = value.as_deref().unwrap_or_default().trim();
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// ?after=..&limit=..&order=..
///
/// Unknown query parameters are dropped here by deserialization, so nothing
/// unexpected ever reaches the upstream.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub after: Option<String>,
    pub limit: Option<String>,
    pub order: Option<String>,
}

impl ListJobsQuery {
    /// Encode only the present, non-empty parameters.
    pub fn to_query_string(&self) -> Option<String> {
        let pairs = [
            ("after", &self.after),
            ("limit", &self.limit),
            ("order", &self.order),
        ];

        let encoded = pairs
            .iter()
            .filter_map(|(name, value)| {
                let value = value.as_deref()?;
                (!value.is_empty()).then(|| format!("{name}={}", urlencoding::encode(value)))
            })
            .collect::<Vec<_>>();

        (!encoded.is_empty()).then(|| encoded.join("&"))
    }
}

/// ?variant=...
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    pub variant: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form_with_prompt(prompt: &str) -> RawCreateForm {
        RawCreateForm {
            prompt: Some(prompt.to_string()),
            ..RawCreateForm::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let params = form_with_prompt("a cat surfing").validate().unwrap();
        assert_eq!(params.prompt, "a cat surfing");
        assert_eq!(params.model, "sora-2");
        assert_eq!(params.seconds, "4");
        assert_eq!(params.size, "720x1280");
        assert!(params.input_reference.is_none());
    }

    #[test]
    fn test_blank_fields_fall_back_to_defaults() {
        let form = RawCreateForm {
            prompt: Some("a cat".into()),
            model: Some("  ".into()),
            seconds: Some(String::new()),
            size: Some(" ".into()),
            ..RawCreateForm::default()
        };

        let params = form.validate().unwrap();
        assert_eq!(params.model, "sora-2");
        assert_eq!(params.seconds, "4");
        assert_eq!(params.size, "720x1280");
    }

    #[test]
    fn test_prompt_required() {
        let err = form_with_prompt("   ").validate().unwrap_err();
        assert_eq!(err, ValidationError::PromptRequired);
        assert_eq!(err.to_string(), "prompt is required");

        let err = RawCreateForm::default().validate().unwrap_err();
        assert_eq!(err, ValidationError::PromptRequired);
    }

    #[test]
    fn test_enum_rejections_name_field_and_value() {
        let form = RawCreateForm {
            model: Some("dall-e".into()),
            ..form_with_prompt("a cat")
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "invalid model: dall-e"
        );

        let form = RawCreateForm {
            seconds: Some("5".into()),
            ..form_with_prompt("a cat")
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "invalid seconds: 5"
        );

        let form = RawCreateForm {
            size: Some("640x480".into()),
            ..form_with_prompt("a cat")
        };
        assert_eq!(
            form.validate().unwrap_err().to_string(),
            "invalid size: 640x480"
        );
    }

    #[test]
    fn test_prompt_failure_wins_over_enum_failures() {
        let form = RawCreateForm {
            prompt: None,
            model: Some("dall-e".into()),
            ..RawCreateForm::default()
        };
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::PromptRequired
        );
    }

    #[test]
    fn test_list_query_encoding() {
        let query = ListJobsQuery {
            after: Some("video_123".into()),
            limit: Some("10".into()),
            order: None,
        };
        assert_eq!(
            query.to_query_string().as_deref(),
            Some("after=video_123&limit=10")
        );

        let query = ListJobsQuery {
            after: Some("a b/c".into()),
            ..ListJobsQuery::default()
        };
        assert_eq!(query.to_query_string().as_deref(), Some("after=a%20b%2Fc"));

        assert_eq!(ListJobsQuery::default().to_query_string(), None);

        let query = ListJobsQuery {
            after: Some(String::new()),
            ..ListJobsQuery::default()
        };
        assert_eq!(query.to_query_string(), None);
    }
}
