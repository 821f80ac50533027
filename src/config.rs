//! Configuration for rsplink
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for a server instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen port; 0 lets the platform choose (the bound port is
    /// discoverable through `RspServer::port` after construction)
    pub port: u16,

    // -------------------------------------------------------------------------
    // Diagnostics Configuration
    // -------------------------------------------------------------------------
    /// Log every packet and acknowledgment byte on the wire at debug level
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 0,
            echo: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen port (0 = platform-assigned)
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable per-packet wire logging
    pub fn echo(mut self, echo: bool) -> Self {
        self.config.echo = echo;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
