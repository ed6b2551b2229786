//! Transport configuration: retries and timeouts, with presets

use super::retry::RetryConfig;
use std::time::Duration;

use crate::config::Settings;

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            request_timeout: Duration::from_millis(10_000),
            connect_timeout: Duration::from_millis(5_000),
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::builder()
            .max_attempts(settings.max_attempts)
            .request_timeout(settings.api_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
    }

    /// No retries and short timeouts (for tests against unreachable hosts)
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::none(),
            request_timeout: Duration::from_millis(500),
            connect_timeout: Duration::from_millis(250),
        }
    }
}

pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.config.retry = self.config.retry.with_max_attempts(max_attempts);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let mut settings = Settings::default();
        settings.max_attempts = 5;
        settings.api_timeout = Duration::from_secs(2);

        let config = ResilienceConfig::from_settings(&settings);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(2));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_builder_never_allows_zero_attempts() {
        let config = ResilienceConfig::builder().max_attempts(0).build();
        assert_eq!(config.retry.max_attempts, 1);
    }
}
