//! Tag Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TagError;

/// 标签唯一标识
///
/// 服务端下发时使用服务端 id，否则在客户端生成 UUID v4
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(String);

impl TagId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TagId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// 标签分类（仅供展示参考）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// 错误信息，需要纠正
    Misinformation,
    /// 可补充的背景信息
    Enrichment,
}

impl Classification {
    /// 宽松解析，未知取值返回 None
    ///
    /// 同时接受上游决策词汇 CORRECT / EXPAND
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "misinformation" | "correct" => Some(Self::Misinformation),
            "enrichment" | "expand" => Some(Self::Enrichment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Misinformation => "misinformation",
            Self::Enrichment => "enrichment",
        }
    }
}

const AUDIO_SCHEMES: &[&str] = &["http://", "https://", "file://"];

/// 音频资源定位符
///
/// 反序列化同样经过 [`AudioRef::parse`] 校验
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AudioRef(String);

impl AudioRef {
    pub fn parse(locator: impl Into<String>) -> Result<Self, TagError> {
        let locator = locator.into().trim().to_string();
        if locator.is_empty() {
            return Err(TagError::InvalidAudioRef("audio locator is empty".to_string()));
        }

        let lower = locator.to_lowercase();
        let rest = AUDIO_SCHEMES
            .iter()
            .find(|scheme| lower.starts_with(*scheme))
            .map(|scheme| &locator[scheme.len()..])
            .ok_or_else(|| TagError::InvalidAudioRef(format!("unsupported scheme: {}", locator)))?;

        if rest.is_empty() {
            return Err(TagError::InvalidAudioRef(format!("missing location: {}", locator)));
        }

        Ok(Self(locator))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// file:// 定位符对应的本地路径
    pub fn local_path(&self) -> Option<&str> {
        match self.0.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("file://") => self.0.get(7..).filter(|p| !p.is_empty()),
            _ => None,
        }
    }
}

impl TryFrom<String> for AudioRef {
    type Error = TagError;

    fn try_from(locator: String) -> Result<Self, Self::Error> {
        Self::parse(locator)
    }
}

impl From<AudioRef> for String {
    fn from(audio_ref: AudioRef) -> Self {
        audio_ref.0
    }
}

impl std::fmt::Display for AudioRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TagId::new(), TagId::new());
    }

    #[test]
    fn test_classification_parse() {
        assert_eq!(Classification::parse("misinformation"), Some(Classification::Misinformation));
        assert_eq!(Classification::parse("CORRECT"), Some(Classification::Misinformation));
        assert_eq!(Classification::parse(" Expand "), Some(Classification::Enrichment));
        assert_eq!(Classification::parse("IGNORE"), None);
    }

    #[test]
    fn test_audio_ref_accepts_supported_schemes() {
        assert!(AudioRef::parse("https://cdn.example.com/a.mp3").is_ok());
        assert!(AudioRef::parse("http://localhost:8000/tts/1").is_ok());
        let local = AudioRef::parse("file:///tmp/clip.wav").unwrap();
        assert_eq!(local.local_path(), Some("/tmp/clip.wav"));
    }

    #[test]
    fn test_audio_ref_rejects_invalid() {
        assert!(AudioRef::parse("").is_err());
        assert!(AudioRef::parse("   ").is_err());
        assert!(AudioRef::parse("ftp://example.com/a.mp3").is_err());
        assert!(AudioRef::parse("https://").is_err());
        assert!(AudioRef::parse("try.mp3").is_err());
    }

    #[test]
    fn test_audio_ref_serde_goes_through_parse() {
        let audio_ref: AudioRef = serde_json::from_str(r#"" file:///tmp/a.wav ""#).unwrap();
        assert_eq!(audio_ref.local_path(), Some("/tmp/a.wav"));
        assert_eq!(serde_json::to_string(&audio_ref).unwrap(), r#""file:///tmp/a.wav""#);

        assert!(serde_json::from_str::<AudioRef>(r#""ftp://x/a.mp3""#).is_err());
        assert!(serde_json::from_str::<AudioRef>(r#""""#).is_err());
    }
}
