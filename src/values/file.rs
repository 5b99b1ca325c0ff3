use crate::codec::{self, TokenCodec};
use crate::config::{DecodeConfig, EncodeConfig, FileEncoding};
use crate::error::{DecodeError, EncodeError};
use serde_json::Value;
use url::{ParseError, Url};

/// Reference to an asset such as an icon or font file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileValue {
    Url(Url),
    /// A relative reference read without a base to anchor it.
    Relative(String),
}

impl FileValue {
    pub fn url(&self) -> Option<&Url> {
        match self {
            FileValue::Url(url) => Some(url),
            FileValue::Relative(_) => None,
        }
    }

    /// Parse `raw`, anchoring relative references at `base` when given.
    pub fn parse(raw: &str, base: Option<&Url>) -> Result<Self, DecodeError> {
        match Url::parse(raw) {
            Ok(url) => Ok(FileValue::Url(url)),
            Err(ParseError::RelativeUrlWithoutBase) => match base {
                Some(base) => append_to_base(base, raw).map(FileValue::Url),
                None => Ok(FileValue::Relative(raw.to_string())),
            },
            Err(_) => Err(DecodeError::InvalidUrl(raw.to_string())),
        }
    }

    fn absolute_string(&self) -> &str {
        match self {
            FileValue::Url(url) => url.as_str(),
            FileValue::Relative(path) => path,
        }
    }
}

/// Join `relative` below `base` as a path, never replacing its last segment.
fn append_to_base(base: &Url, relative: &str) -> Result<Url, DecodeError> {
    let mut directory = base.clone();
    if !directory.path().ends_with('/') {
        let path = format!("{}/", directory.path());
        directory.set_path(&path);
    }
    directory
        .join(relative.trim_start_matches('/'))
        .map_err(|_| DecodeError::InvalidUrl(relative.to_string()))
}

impl TokenCodec for FileValue {
    fn decode(value: &Value, config: &DecodeConfig) -> Result<Self, DecodeError> {
        let raw = codec::expect_str(value, "file URL")?;
        Self::parse(raw, config.file_base.as_ref())
    }

    fn encode(&self, config: &EncodeConfig) -> Result<Value, EncodeError> {
        let encoded = match (&config.file, self) {
            (FileEncoding::Absolute, _) => self.absolute_string().to_string(),
            (FileEncoding::Relative { .. }, FileValue::Relative(path)) => path.clone(),
            (FileEncoding::Relative { base: None }, FileValue::Url(url)) => url.path().to_string(),
            (FileEncoding::Relative { base: Some(base) }, FileValue::Url(url)) => url
                .as_str()
                .strip_prefix(base.as_str())
                .map(str::to_string)
                .ok_or_else(|| EncodeError::NotRelative {
                    url: url.to_string(),
                    base: base.to_string(),
                })?,
        };
        Ok(Value::String(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Url {
        Url::parse("https://cdn.example.com/assets").unwrap()
    }

    #[test]
    fn test_absolute_url_ignores_base() {
        let config = DecodeConfig::new().with_file_base(base());
        let file = FileValue::decode(&json!("https://other.example.com/a.svg"), &config).unwrap();
        assert_eq!(file.url().unwrap().as_str(), "https://other.example.com/a.svg");
    }

    #[test]
    fn test_relative_reference_is_appended() {
        let config = DecodeConfig::new().with_file_base(base());
        let file = FileValue::decode(&json!("icons/close.svg"), &config).unwrap();
        assert_eq!(
            file.url().unwrap().as_str(),
            "https://cdn.example.com/assets/icons/close.svg"
        );
    }

    #[test]
    fn test_relative_reference_without_base() {
        let file = FileValue::decode(&json!("icons/close.svg"), &DecodeConfig::default()).unwrap();
        assert_eq!(file, FileValue::Relative("icons/close.svg".to_string()));
        assert_eq!(file.encode(&EncodeConfig::default()).unwrap(), json!("icons/close.svg"));
    }

    #[test]
    fn test_relative_encodings() {
        let file = FileValue::parse("https://cdn.example.com/assets/icons/close.svg", None).unwrap();

        let path_only = EncodeConfig::default().with_file(FileEncoding::Relative { base: None });
        assert_eq!(file.encode(&path_only).unwrap(), json!("/assets/icons/close.svg"));

        let anchored = EncodeConfig::default().with_file(FileEncoding::Relative {
            base: Some(Url::parse("https://cdn.example.com/assets/").unwrap()),
        });
        assert_eq!(file.encode(&anchored).unwrap(), json!("icons/close.svg"));

        let elsewhere = EncodeConfig::default().with_file(FileEncoding::Relative {
            base: Some(Url::parse("https://other.example.com/").unwrap()),
        });
        assert!(matches!(file.encode(&elsewhere), Err(EncodeError::NotRelative { .. })));
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            FileValue::parse("http://[::1", None),
            Err(DecodeError::InvalidUrl(_))
        ));
        assert!(FileValue::decode(&json!(3), &DecodeConfig::default()).is_err());
    }
}
