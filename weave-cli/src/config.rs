//! CLI 配置
//!
//! 包含 CLI 特有的配置：日志级别及各阶段的覆盖

use tracing::Level;
use weave_config::{LogLevel, Phase};

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub parser: Option<Level>,
    pub finder: Option<Level>,
    pub loader: Option<Level>,
    pub hoist: Option<Level>,
    pub generator: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::WARN,
            parser: None,
            finder: None,
            loader: None,
            hoist: None,
            generator: None,
        }
    }
}

impl LogConfig {
    /// Get log level for a specific phase
    pub fn level_for(&self, phase: Phase) -> Level {
        let level = match phase {
            Phase::Parser => self.parser,
            Phase::Finder => self.finder,
            Phase::Loader => self.loader,
            Phase::Hoist => self.hoist,
            Phase::Generator => self.generator,
        };
        level.unwrap_or(self.global)
    }

    /// Raise the global level by `-v` occurrences (warn -> info -> debug -> trace)
    pub fn with_verbosity(mut self, verbose: u8) -> Self {
        self.global = match verbose {
            0 => self.global,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        self
    }
}

/// Map the shared level vocabulary onto tracing levels
pub fn to_tracing_level(level: LogLevel) -> Level {
    match level {
        LogLevel::Trace => Level::TRACE,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Info => Level::INFO,
        LogLevel::Warn => Level::WARN,
        LogLevel::Error => Level::ERROR,
    }
}

/// Parse a level name given on the command line
pub fn parse_level(s: &str) -> Result<Level, String> {
    LogLevel::parse(s)
        .map(to_tracing_level)
        .ok_or_else(|| format!("unknown log level '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_falls_back_to_global() {
        let config = LogConfig {
            loader: Some(Level::TRACE),
            ..Default::default()
        };
        assert_eq!(config.level_for(Phase::Loader), Level::TRACE);
        assert_eq!(config.level_for(Phase::Finder), Level::WARN);
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(LogConfig::default().with_verbosity(0).global, Level::WARN);
        assert_eq!(LogConfig::default().with_verbosity(2).global, Level::DEBUG);
        assert_eq!(LogConfig::default().with_verbosity(7).global, Level::TRACE);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("silent"), Ok(Level::ERROR));
        assert_eq!(parse_level("DEBUG"), Ok(Level::DEBUG));
        assert!(parse_level("loud").is_err());
    }
}
