//! Google Sheets access through a service account.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{
    Url,
    blocking::{Client, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    domain::SheetConfig,
    storage::{StoreError, sheet::RowStore},
};

/// Environment variable that overrides the configured credentials path.
pub const CREDENTIALS_ENV: &str = "DIETWEEK_SHEET_CREDENTIALS";

const API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file that are needed to sign in.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default = "default_token_uri")]
    token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<[&'a str; 1]>,
}

/// One column of a Google spreadsheet, read and written as the service
/// account named in a key file.
pub struct GoogleSheet {
    client: Client,
    spreadsheet_id: String,
    range: String,
    account: ServiceAccountKey,
    signing_key: EncodingKey,
    token: RefCell<Option<AccessToken>>,
}

impl std::fmt::Debug for GoogleSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheet")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("range", &self.range)
            .field("account", &self.account.client_email)
            .finish_non_exhaustive()
    }
}

impl GoogleSheet {
    /// Signs in to the spreadsheet described by `config`.
    ///
    /// The key file is taken from [`CREDENTIALS_ENV`] if set, otherwise from
    /// the configured path, resolved against `root`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotConfigured`] if the spreadsheet id or credentials
    ///   are missing or unusable
    /// - [`StoreError::Unreachable`] if signing in fails
    pub fn connect(config: &SheetConfig, root: &Path) -> Result<Self, StoreError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| StoreError::NotConfigured("no spreadsheet id set".to_string()))?;

        let credentials = credentials_path(config, root).ok_or_else(|| {
            StoreError::NotConfigured(format!(
                "no service-account key configured (set sheet.credentials or {CREDENTIALS_ENV})"
            ))
        })?;

        let sheet = Self::with_key_file(spreadsheet_id, config.range.clone(), &credentials)?;
        sheet.access_token()?;
        tracing::info!("Connected to spreadsheet {}", sheet.spreadsheet_id);
        Ok(sheet)
    }

    fn with_key_file(
        spreadsheet_id: String,
        range: String,
        credentials: &Path,
    ) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(credentials).map_err(|e| {
            StoreError::NotConfigured(format!(
                "cannot read service-account key {}: {e}",
                credentials.display()
            ))
        })?;
        let account: ServiceAccountKey = serde_json::from_str(&content).map_err(|e| {
            StoreError::NotConfigured(format!(
                "invalid service-account key {}: {e}",
                credentials.display()
            ))
        })?;
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| StoreError::NotConfigured(format!("invalid private key: {e}")))?;

        Ok(Self {
            client: Client::new(),
            spreadsheet_id,
            range,
            account,
            signing_key,
            token: RefCell::new(None),
        })
    }

    /// Returns a valid bearer token, signing in again if the cached one is
    /// about to expire.
    fn access_token(&self) -> Result<String, StoreError> {
        let now = Utc::now();
        if let Some(token) = self.token.borrow().as_ref() {
            if token.expires > now {
                return Ok(token.value.clone());
            }
        }

        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: &self.account.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let assertion = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| StoreError::NotConfigured(format!("cannot sign token request: {e}")))?;

        tracing::debug!("Requesting access token from {}", self.account.token_uri);
        let response = self
            .client
            .post(self.account.token_uri.as_str())
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .map_err(|e| StoreError::Unreachable(format!("token request failed: {e}")))?;
        let response = check_status(response).map_err(StoreError::Unreachable)?;
        let token: TokenResponse = response
            .json()
            .map_err(|e| StoreError::Unreachable(format!("unexpected token response: {e}")))?;

        let access = AccessToken {
            value: token.access_token,
            expires: now + Duration::seconds(token.expires_in - EXPIRY_MARGIN_SECS),
        };
        let value = access.value.clone();
        *self.token.borrow_mut() = Some(access);
        Ok(value)
    }

    fn values_url(&self, suffix: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(API_BASE)
            .map_err(|e| StoreError::NotConfigured(format!("invalid API address: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StoreError::NotConfigured("invalid API address".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{suffix}", self.range));
        Ok(url)
    }
}

impl RowStore for GoogleSheet {
    fn read_rows(&self) -> Result<Vec<String>, StoreError> {
        let token = self.access_token()?;
        let url = self.values_url("")?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .map_err(|e| StoreError::Unreachable(format!("failed to read spreadsheet: {e}")))?;
        let response = check_status(response).map_err(StoreError::Unreachable)?;
        let range: ValueRange = response.json().map_err(|e| {
            StoreError::Unreachable(format!("unexpected spreadsheet response: {e}"))
        })?;

        Ok(range
            .values
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .collect())
    }

    fn replace_rows(&mut self, rows: &[String]) -> Result<(), StoreError> {
        let token = self.access_token()?;

        let response = self
            .client
            .post(self.values_url(":clear")?)
            .bearer_auth(&token)
            .json(&serde_json::json!({}))
            .send()
            .map_err(|e| StoreError::Unreachable(format!("failed to clear spreadsheet: {e}")))?;
        check_status(response).map_err(StoreError::Rejected)?;

        if rows.is_empty() {
            return Ok(());
        }

        let mut url = self.values_url("")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        let update = ValueUpdate {
            range: &self.range,
            major_dimension: "ROWS",
            values: rows.iter().map(|row| [row.as_str()]).collect(),
        };

        let response = self
            .client
            .put(url)
            .bearer_auth(&token)
            .json(&update)
            .send()
            .map_err(|e| StoreError::Unreachable(format!("failed to write spreadsheet: {e}")))?;
        check_status(response).map_err(StoreError::Rejected)?;
        Ok(())
    }
}

fn credentials_path(config: &SheetConfig, root: &Path) -> Option<PathBuf> {
    std::env::var_os(CREDENTIALS_ENV)
        .map(PathBuf::from)
        .or_else(|| config.credentials.as_ref().map(|path| root.join(path)))
}

/// Passes successful responses through, turning any other into a message
/// carrying the status and whatever the server said.
fn check_status(response: Response) -> Result<Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(format!("HTTP {status}: {message}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn sheet_config(credentials: Option<&str>) -> SheetConfig {
        SheetConfig {
            spreadsheet_id: Some("spreadsheet".to_string()),
            credentials: credentials.map(PathBuf::from),
            ..SheetConfig::default()
        }
    }

    #[test]
    fn missing_spreadsheet_id_is_not_configured() {
        let tmp = TempDir::new().unwrap();
        let config = SheetConfig::default();

        assert!(matches!(
            GoogleSheet::connect(&config, tmp.path()),
            Err(StoreError::NotConfigured(_))
        ));
    }

    #[test]
    fn unreadable_key_file_is_not_configured() {
        let tmp = TempDir::new().unwrap();
        let error = GoogleSheet::with_key_file(
            "spreadsheet".to_string(),
            "Sheet1!A:A".to_string(),
            &tmp.path().join("missing.json"),
        )
        .unwrap_err();

        assert!(matches!(error, StoreError::NotConfigured(message) if message.contains("missing.json")));
    }

    #[test]
    fn malformed_private_key_is_not_configured() {
        let tmp = TempDir::new().unwrap();
        let key = tmp.path().join("key.json");
        std::fs::write(
            &key,
            r#"{"client_email": "bot@example.iam.gserviceaccount.com", "private_key": "not a key"}"#,
        )
        .unwrap();

        let error = GoogleSheet::with_key_file(
            "spreadsheet".to_string(),
            "Sheet1!A:A".to_string(),
            &key,
        )
        .unwrap_err();

        assert!(matches!(error, StoreError::NotConfigured(message) if message.contains("private key")));
    }

    #[test]
    fn configured_credentials_resolve_against_root() {
        let root = Path::new("/data");
        let config = sheet_config(Some("keys/bot.json"));

        if std::env::var_os(CREDENTIALS_ENV).is_none() {
            assert_eq!(
                credentials_path(&config, root),
                Some(PathBuf::from("/data/keys/bot.json"))
            );
        }
    }

    #[test]
    fn value_rows_are_written_as_single_cells() {
        let update = ValueUpdate {
            range: "Sheet1!A:A",
            major_dimension: "ROWS",
            values: vec![["{\"id\":\"a\"}"], ["{\"id\":\"b\"}"]],
        };
        let json = serde_json::to_value(&update).unwrap();

        assert_eq!(json["majorDimension"], "ROWS");
        assert_eq!(json["values"][1][0], "{\"id\":\"b\"}");
    }
}
