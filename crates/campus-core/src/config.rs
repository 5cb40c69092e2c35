//! Configuration module
//!
//! This module provides the client configuration: backend location, the
//! injected access token, resumable-upload settings and probe settings.
//! Values come from the environment (a `.env` file is honoured by the
//! binaries through `dotenvy`).

use std::env;

use crate::constants::{MIN_VIDEO_DURATION_SECS, UPLOAD_CHUNK_SIZE};

// Common constants
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_API_VERSION: &str = "v1";
const HTTP_TIMEOUT_SECS: u64 = 60;
const UPLOAD_CHUNK_SIZE_MB: usize = UPLOAD_CHUNK_SIZE / (1024 * 1024);

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_version: String,
    pub access_token: Option<String>,
    pub http_timeout_secs: u64,
    pub environment: String,
    // Resumable upload configuration
    pub upload_endpoint: String,
    pub upload_chunk_size: usize,
    pub min_video_duration_secs: f64,
    // Media probe configuration
    pub ffprobe_path: String,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ClientConfig>);

impl Config {
    fn as_client(&self) -> &ClientConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.as_client().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClientConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_client().validate()
    }

    pub fn api_url(&self) -> &str {
        &self.as_client().api_url
    }

    /// API prefix, e.g. "/api/v1".
    pub fn api_prefix(&self) -> String {
        format!("/api/{}", self.as_client().api_version)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.as_client().access_token.as_deref()
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.as_client().http_timeout_secs
    }

    pub fn environment(&self) -> &str {
        &self.as_client().environment
    }

    pub fn upload_endpoint(&self) -> &str {
        &self.as_client().upload_endpoint
    }

    pub fn upload_chunk_size(&self) -> usize {
        self.as_client().upload_chunk_size
    }

    pub fn min_video_duration_secs(&self) -> f64 {
        self.as_client().min_video_duration_secs
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_client().ffprobe_path
    }
}

/// `FFPROBE_PATH`, or `ffprobe` from `PATH`. Needs no backend settings.
pub fn ffprobe_path_from_env() -> String {
    env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string())
}

fn is_production_env(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let api_url = env::var("CAMPUS_API_URL")
            .or_else(|_| env::var("API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let api_version =
            env::var("CAMPUS_API_VERSION").unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let upload_endpoint = env::var("CAMPUS_UPLOAD_ENDPOINT")
            .unwrap_or_else(|_| format!("{}/api/{}/files/", api_url, api_version));

        let config = ClientConfig {
            access_token: env::var("CAMPUS_ACCESS_TOKEN")
                .or_else(|_| env::var("ACCESS_TOKEN"))
                .ok()
                .filter(|s| !s.trim().is_empty()),
            http_timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            upload_chunk_size: env::var("CAMPUS_UPLOAD_CHUNK_SIZE_MB")
                .unwrap_or_else(|_| UPLOAD_CHUNK_SIZE_MB.to_string())
                .parse::<usize>()
                .map_err(|_| {
                    anyhow::anyhow!("CAMPUS_UPLOAD_CHUNK_SIZE_MB must be a valid number")
                })?
                * 1024
                * 1024,
            min_video_duration_secs: env::var("CAMPUS_MIN_VIDEO_SECONDS")
                .unwrap_or_else(|_| MIN_VIDEO_DURATION_SECS.to_string())
                .parse()
                .unwrap_or(MIN_VIDEO_DURATION_SECS),
            ffprobe_path: ffprobe_path_from_env(),
            api_url,
            api_version,
            upload_endpoint,
            environment,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !is_http_url(&self.api_url) {
            return Err(anyhow::anyhow!(
                "CAMPUS_API_URL must start with http:// or https://"
            ));
        }

        if !is_http_url(&self.upload_endpoint) {
            return Err(anyhow::anyhow!(
                "CAMPUS_UPLOAD_ENDPOINT must start with http:// or https://"
            ));
        }

        if self.upload_chunk_size == 0 {
            return Err(anyhow::anyhow!(
                "CAMPUS_UPLOAD_CHUNK_SIZE_MB must be greater than zero"
            ));
        }

        if !self.min_video_duration_secs.is_finite() || self.min_video_duration_secs < 0.0 {
            return Err(anyhow::anyhow!(
                "CAMPUS_MIN_VIDEO_SECONDS must be a non-negative number"
            ));
        }

        if is_production_env(&self.environment) && self.access_token.is_none() {
            return Err(anyhow::anyhow!(
                "CAMPUS_ACCESS_TOKEN must be set in production"
            ));
        }

        Ok(())
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientConfig {
        ClientConfig {
            api_url: "http://localhost:8080".to_string(),
            api_version: "v1".to_string(),
            access_token: Some("token".to_string()),
            http_timeout_secs: 60,
            environment: "development".to_string(),
            upload_endpoint: "http://localhost:8080/api/v1/files/".to_string(),
            upload_chunk_size: UPLOAD_CHUNK_SIZE,
            min_video_duration_secs: MIN_VIDEO_DURATION_SECS,
            ffprobe_path: "ffprobe".to_string(),
        }
    }

    #[test]
    fn test_sample_config_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = sample();
        config.api_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let mut config = sample();
        config.upload_chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_requires_token() {
        let mut config = sample();
        config.environment = "Production".to_string();
        config.access_token = None;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("CAMPUS_ACCESS_TOKEN"));
    }

    #[test]
    fn test_api_prefix_uses_version() {
        let config = Config(Box::new(sample()));
        assert_eq!(config.api_prefix(), "/api/v1");
        assert!(!config.is_production());
    }
}
