//! Credential cookie and signing-secret configuration.
//!
//! Settings are read from the environment through [`mockable::Env`] so the
//! build-mode rules can be tested without touching process state. Debug
//! builds fall back to defaults with a warning; release builds require every
//! toggle and a real secret file.

use std::path::PathBuf;
use std::time::Duration;

use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

const SECRET_DEFAULT_PATH: &str = "/var/run/secrets/token_secret";
const SECRET_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;
const SECRET_FILE_ENV: &str = "TOKEN_SECRET_FILE";
const COOKIE_SECURE_ENV: &str = "TOKEN_COOKIE_SECURE";
const ALLOW_EPHEMERAL_ENV: &str = "TOKEN_ALLOW_EPHEMERAL";
const ACCESS_TTL_ENV: &str = "TOKEN_ACCESS_TTL_SECS";
const REFRESH_TTL_ENV: &str = "TOKEN_REFRESH_TTL_SECS";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SECONDS_EXPECTED: &str = "a positive number of seconds";
const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);
const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults are tolerated with a warning.
    Debug,
    /// Every toggle must be explicit and valid.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::inbound::http::token_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated token settings.
pub struct TokenSettings {
    /// HMAC signing secret.
    pub secret: Zeroizing<Vec<u8>>,
    /// Whether credential cookies carry the `Secure` attribute.
    pub cookie_secure: bool,
    /// Lifetime of access tokens.
    pub access_ttl: Duration,
    /// Lifetime of refresh tokens.
    pub refresh_ttl: Duration,
}

impl TokenSettings {
    /// Truncated SHA-256 of the secret, safe to log.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::time::Duration;
    /// use backend::inbound::http::token_config::TokenSettings;
    /// use zeroize::Zeroizing;
    ///
    /// let settings = TokenSettings {
    ///     secret: Zeroizing::new(vec![7; 32]),
    ///     cookie_secure: true,
    ///     access_ttl: Duration::from_secs(900),
    ///     refresh_ttl: Duration::from_secs(3600),
    /// };
    /// let fingerprint = settings.secret_fingerprint();
    /// assert_eq!(fingerprint.len(), 16);
    /// assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    /// ```
    #[must_use]
    pub fn secret_fingerprint(&self) -> String {
        let digest = Sha256::digest(self.secret.as_slice());
        hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
    }
}

/// Errors raised while validating token configuration.
#[derive(thiserror::Error, Debug)]
pub enum TokenConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// A variable is present but holds an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// Reading the secret file failed.
    #[error("failed to read token secret at {path}: {source}")]
    SecretRead {
        /// Secret file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The secret file is too short.
    #[error("token secret at {path} too short: need >= {min_len} bytes, got {length}")]
    SecretTooShort {
        /// Secret file path.
        path: PathBuf,
        /// Actual secret length in bytes.
        length: usize,
        /// Minimum secret length in bytes.
        min_len: usize,
    },
    /// Release builds must not sign with a generated secret.
    #[error("TOKEN_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
    /// The access lifetime must be shorter than the refresh lifetime.
    #[error("access token lifetime must be shorter than refresh token lifetime")]
    TtlOrder,
}

/// Build token settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use backend::inbound::http::token_config::{BuildMode, token_settings_from_env};
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = tempfile::NamedTempFile::new()?;
/// std::fs::write(secret.path(), vec![b'k'; 32])?;
/// let path = secret.path().to_string_lossy().into_owned();
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "TOKEN_SECRET_FILE" => Some(path.clone()),
///     "TOKEN_COOKIE_SECURE" => Some("1".to_owned()),
///     "TOKEN_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let settings = token_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.access_ttl.as_secs(), 900);
/// # Ok(())
/// # }
/// ```
pub fn token_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<TokenSettings, TokenConfigError> {
    let cookie_secure = required_bool(env, mode, COOKIE_SECURE_ENV, true)?;
    let allow_ephemeral = required_bool(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(TokenConfigError::EphemeralNotAllowed);
    }
    let access_ttl = seconds(env, ACCESS_TTL_ENV, DEFAULT_ACCESS_TTL)?;
    let refresh_ttl = seconds(env, REFRESH_TTL_ENV, DEFAULT_REFRESH_TTL)?;
    if access_ttl >= refresh_ttl {
        return Err(TokenConfigError::TtlOrder);
    }
    let secret = secret_from_env(env, mode, allow_ephemeral)?;
    Ok(TokenSettings {
        secret,
        cookie_secure,
        access_ttl,
        refresh_ttl,
    })
}

fn required_bool<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    debug_default: bool,
) -> Result<bool, TokenConfigError> {
    let Some(value) = env.string(name) else {
        if mode.is_debug() {
            warn!(variable = name, default = debug_default, "not set; using default");
            return Ok(debug_default);
        }
        return Err(TokenConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(variable = name, value = %value, default = debug_default, "invalid; using default");
            Ok(debug_default)
        }
        None => Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn seconds<E: Env>(
    env: &E,
    name: &'static str,
    default: Duration,
) -> Result<Duration, TokenConfigError> {
    let Some(value) = env.string(name) else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(TokenConfigError::InvalidEnv {
            name,
            value,
            expected: SECONDS_EXPECTED,
        }),
    }
}

fn secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Zeroizing<Vec<u8>>, TokenConfigError> {
    let path = PathBuf::from(
        env.string(SECRET_FILE_ENV)
            .unwrap_or_else(|| SECRET_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(bytes) => {
            let bytes = Zeroizing::new(bytes);
            if bytes.len() < SECRET_MIN_LEN {
                return Err(TokenConfigError::SecretTooShort {
                    path,
                    length: bytes.len(),
                    min_len: SECRET_MIN_LEN,
                });
            }
            Ok(bytes)
        }
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using ephemeral token secret (dev only)"
            );
            Ok(Zeroizing::new(ephemeral_secret()))
        }
        Err(source) => Err(TokenConfigError::SecretRead { path, source }),
    }
}

fn ephemeral_secret() -> Vec<u8> {
    use rand::RngCore;

    let mut secret = vec![0_u8; SECRET_MIN_LEN * 2];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
