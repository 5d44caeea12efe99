use std::fmt;

/// Why the SDK loader gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkErrorKind {
    /// The CDN global never appeared within the polling window
    CdnLoad,
    /// Manual retry budget exhausted; only a page reload helps
    Initialization,
    /// No global environment to probe at all
    NotAvailable,
}

impl SdkErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SdkErrorKind::CdnLoad => "cdn-load",
            SdkErrorKind::Initialization => "initialization",
            SdkErrorKind::NotAvailable => "not-available",
        }
    }
}

impl fmt::Display for SdkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SDK loader failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SdkError {
    pub kind: SdkErrorKind,
    pub message: String,
    pub details: Option<String>,
    pub attempts_made: u32,
}

impl SdkError {
    pub fn cdn_load(attempts_made: u32) -> Self {
        Self {
            kind: SdkErrorKind::CdnLoad,
            message: "Failed to load the live streaming engine SDK".to_string(),
            details: Some(
                "The SDK could not be loaded from CDN. Please check your internet connection and refresh the page."
                    .to_string(),
            ),
            attempts_made,
        }
    }

    pub fn retries_exhausted(attempts_made: u32) -> Self {
        Self {
            kind: SdkErrorKind::Initialization,
            message: "Maximum retry attempts reached".to_string(),
            details: Some("Please refresh the page to try again.".to_string()),
            attempts_made,
        }
    }

    pub fn not_available(reason: impl Into<String>) -> Self {
        Self {
            kind: SdkErrorKind::NotAvailable,
            message: "Live streaming is not available in this environment".to_string(),
            details: Some(reason.into()),
            attempts_made: 0,
        }
    }
}

/// Token acquisition failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("You must be logged in to host a stream")]
    NotAuthenticated,

    #[error("Live streaming credentials are not yet configured. Please contact the administrator.")]
    NotConfigured,

    #[error("You do not have permission to access this stream.")]
    Unauthorized,

    #[error("This room does not exist.")]
    RoomNotFound,

    #[error("Backend actor not available")]
    ActorUnavailable,

    #[error("Failed to generate live streaming token. Please try again.")]
    Unknown(String),
}

impl TokenError {
    /// Map a raw backend rejection onto the taxonomy.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("not configured") {
            TokenError::NotConfigured
        } else if raw.contains("Unauthorized") {
            TokenError::Unauthorized
        } else if raw.contains("Room not found") {
            TokenError::RoomNotFound
        } else {
            TokenError::Unknown(raw.to_string())
        }
    }
}

/// Why local camera/microphone capture failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaErrorReason {
    PermissionDenied,
    NoDevice,
    DeviceInUse,
    Other,
}

impl MediaErrorReason {
    /// Classify a DOMException name from `getUserMedia`.
    pub fn from_dom_name(name: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => MediaErrorReason::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => MediaErrorReason::NoDevice,
            "NotReadableError" | "TrackStartError" => MediaErrorReason::DeviceInUse,
            _ => MediaErrorReason::Other,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            MediaErrorReason::PermissionDenied => {
                "Camera and microphone access denied. Please allow access to start streaming."
            }
            MediaErrorReason::NoDevice => {
                "No camera or microphone found. Please connect a device and try again."
            }
            MediaErrorReason::DeviceInUse => {
                "Camera or microphone is already in use by another application."
            }
            MediaErrorReason::Other => {
                "Failed to access camera and microphone. Please check your device settings."
            }
        }
    }
}

/// Local media acquisition failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .reason.user_message())]
pub struct MediaError {
    pub reason: MediaErrorReason,
    pub detail: String,
}

impl MediaError {
    pub fn new(reason: MediaErrorReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Failure reported by the streaming engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed: {message}")]
pub struct EngineError {
    pub operation: &'static str,
    /// JS error name when the engine rejected with a DOMException
    pub name: Option<String>,
    pub message: String,
}

impl EngineError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            name: None,
            message: message.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reinterpret a capture failure as a media error.
    pub fn into_media_error(self) -> MediaError {
        let reason = self
            .name
            .as_deref()
            .map(MediaErrorReason::from_dom_name)
            .unwrap_or(MediaErrorReason::Other);
        MediaError::new(reason, self.message)
    }
}

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Streaming AppID is not configured")]
    MissingAppId,

    #[error("Streaming server URL is not configured")]
    MissingServer,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}

/// How the UI should present an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Not the user's fault and not fixable by them
    Informational,
    Destructive,
}

/// What the user can do about an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remediation {
    RetrySdkLoad,
    RetryToken,
    Reload,
    ContactAdministrator,
}

/// Errors surfaced to the presentation layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LiveError {
    #[error("SDK load failed: {0}")]
    SdkLoad(SdkError),

    #[error("SDK initialization failed: {0}")]
    SdkInit(SdkError),

    #[error("{}", TokenError::NotConfigured)]
    TokenConfig,

    #[error("Token authorization failed: {0}")]
    TokenAuth(TokenError),

    #[error("{}", TokenError::RoomNotFound)]
    TokenNotFound,

    #[error("Token request failed: {0}")]
    Token(TokenError),

    #[error("Media acquisition failed: {0}")]
    MediaAcquisition(MediaError),

    #[error("Engine initialization failed: {0}")]
    EngineInit(EngineError),

    #[error("Configuration error: {0}")]
    Config(ConfigError),
}

impl LiveError {
    pub fn severity(&self) -> Severity {
        match self {
            LiveError::TokenConfig | LiveError::Config(_) => Severity::Informational,
            _ => Severity::Destructive,
        }
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            LiveError::SdkLoad(_) => Remediation::RetrySdkLoad,
            LiveError::SdkInit(_) => Remediation::Reload,
            LiveError::TokenConfig | LiveError::Config(_) => Remediation::ContactAdministrator,
            LiveError::TokenAuth(_) | LiveError::TokenNotFound | LiveError::Token(_) => {
                Remediation::RetryToken
            }
            LiveError::MediaAcquisition(_) | LiveError::EngineInit(_) => Remediation::Reload,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            LiveError::TokenConfig | LiveError::Config(_) => "Configuration Required",
            LiveError::MediaAcquisition(_) => "Camera or Microphone Unavailable",
            LiveError::SdkLoad(_) | LiveError::SdkInit(_) => "Live Streaming Unavailable",
            _ => "Error",
        }
    }

    /// Text shown to the user (no internal detail)
    pub fn user_message(&self) -> String {
        match self {
            LiveError::SdkLoad(e) | LiveError::SdkInit(e) => match &e.details {
                Some(details) => format!("{} {}", e.message, details),
                None => e.message.clone(),
            },
            LiveError::TokenConfig => {
                "Live streaming credentials need to be configured. Please contact the administrator to set up live streaming."
                    .to_string()
            }
            LiveError::TokenAuth(e) | LiveError::Token(e) => e.to_string(),
            LiveError::TokenNotFound => TokenError::RoomNotFound.to_string(),
            LiveError::MediaAcquisition(e) => e.to_string(),
            LiveError::EngineInit(_) => {
                "Failed to initialize live streaming. Please try again.".to_string()
            }
            LiveError::Config(e) => e.to_string(),
        }
    }
}

impl From<SdkError> for LiveError {
    fn from(e: SdkError) -> Self {
        match e.kind {
            SdkErrorKind::Initialization => LiveError::SdkInit(e),
            SdkErrorKind::CdnLoad | SdkErrorKind::NotAvailable => LiveError::SdkLoad(e),
        }
    }
}

impl From<TokenError> for LiveError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::NotConfigured => LiveError::TokenConfig,
            TokenError::NotAuthenticated | TokenError::Unauthorized => LiveError::TokenAuth(e),
            TokenError::RoomNotFound => LiveError::TokenNotFound,
            TokenError::ActorUnavailable | TokenError::Unknown(_) => LiveError::Token(e),
        }
    }
}

impl From<MediaError> for LiveError {
    fn from(e: MediaError) -> Self {
        LiveError::MediaAcquisition(e)
    }
}

impl From<EngineError> for LiveError {
    fn from(e: EngineError) -> Self {
        LiveError::EngineInit(e)
    }
}

impl From<ConfigError> for LiveError {
    fn from(e: ConfigError) -> Self {
        LiveError::Config(e)
    }
}

pub type Result<T> = std::result::Result<T, LiveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_backend_messages() {
        assert_eq!(
            TokenError::classify("Streaming credentials not configured"),
            TokenError::NotConfigured
        );
        assert_eq!(
            TokenError::classify("Unauthorized: Only users can generate tokens"),
            TokenError::Unauthorized
        );
        assert_eq!(
            TokenError::classify("Room not found"),
            TokenError::RoomNotFound
        );
        assert!(matches!(
            TokenError::classify("canister trapped"),
            TokenError::Unknown(_)
        ));
    }

    #[test]
    fn test_config_token_error_is_informational() {
        let err = LiveError::from(TokenError::classify("ZEGO not configured"));
        assert_eq!(err, LiveError::TokenConfig);
        assert_eq!(err.severity(), Severity::Informational);
        assert_eq!(err.remediation(), Remediation::ContactAdministrator);
        assert_eq!(err.title(), "Configuration Required");
    }

    #[test]
    fn test_sdk_errors_map_by_kind() {
        let load = LiveError::from(SdkError::cdn_load(30));
        assert_eq!(load.remediation(), Remediation::RetrySdkLoad);

        let init = LiveError::from(SdkError::retries_exhausted(3));
        assert!(matches!(init, LiveError::SdkInit(_)));
        assert_eq!(init.remediation(), Remediation::Reload);
    }

    #[test]
    fn test_media_errors_get_tailored_messages() {
        let denied = EngineError::new("createStream", "Permission denied")
            .with_name("NotAllowedError")
            .into_media_error();
        assert_eq!(denied.reason, MediaErrorReason::PermissionDenied);

        let busy = MediaError::new(MediaErrorReason::from_dom_name("NotReadableError"), "");
        assert!(busy.to_string().contains("already in use"));

        let err = LiveError::from(denied);
        assert_eq!(err.severity(), Severity::Destructive);
        assert_eq!(err.remediation(), Remediation::Reload);
    }

    #[test]
    fn test_auth_errors_offer_token_retry() {
        let err = LiveError::from(TokenError::NotAuthenticated);
        assert!(matches!(err, LiveError::TokenAuth(_)));
        assert_eq!(err.remediation(), Remediation::RetryToken);
    }
}
