//! scada.toml configuration parser.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::types::{
    DEFAULT_ALARM_COUNT, DEFAULT_ANOMALY_PROBABILITY, MAX_REFRESH_PERIOD, ScreenKind,
    SustainabilityMetrics,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScadaConfig {
    pub feed: Option<FeedConfig>,
    pub refresh: Option<RefreshConfig>,
    pub sustainability: Option<SustainabilityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    /// Base seed for every screen's RNG. Entropy-seeded when absent.
    pub seed: Option<u64>,
    pub alarm_count: Option<usize>,
    pub anomaly_probability: Option<f64>,
}

/// Per-screen refresh periods, e.g. `"8s"` or `"500ms"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RefreshConfig {
    pub alarms: Option<String>,
    pub maintenance: Option<String>,
    pub pipeline: Option<String>,
    pub sustainability: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SustainabilityConfig {
    pub current_usage: Option<f64>,
    pub avg_next_24h: Option<f64>,
    pub savings_vs_last_week: Option<f64>,
    pub carbon_reduction_progress: Option<f64>,
    pub renewable_percentage: Option<f64>,
}

impl ScadaConfig {
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a config document.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: ScadaConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every field that can be wrong independently of the others.
    pub fn validate(&self) -> ConfigResult<()> {
        for kind in ScreenKind::ALL {
            self.period(kind)?;
        }
        self.anomaly_probability()?;
        Ok(())
    }

    /// Refresh period for a screen, falling back to its default.
    pub fn period(&self, kind: ScreenKind) -> ConfigResult<Duration> {
        let raw = self.refresh.as_ref().and_then(|r| match kind {
            ScreenKind::Alarms => r.alarms.as_deref(),
            ScreenKind::Maintenance => r.maintenance.as_deref(),
            ScreenKind::Pipeline => r.pipeline.as_deref(),
            ScreenKind::Sustainability => r.sustainability.as_deref(),
        });

        let Some(raw) = raw else {
            return Ok(kind.default_period());
        };

        let period = parse_duration(raw).ok_or_else(|| ConfigError::InvalidDuration {
            field: kind.name(),
            value: raw.to_string(),
        })?;
        if period.is_zero() {
            return Err(ConfigError::ZeroPeriod(kind.name()));
        }
        if period > MAX_REFRESH_PERIOD {
            return Err(ConfigError::PeriodTooLong {
                field: kind.name(),
                max_secs: MAX_REFRESH_PERIOD.as_secs(),
            });
        }
        Ok(period)
    }

    /// RNG seed for a screen, or `None` to seed from entropy.
    pub fn seed_for(&self, kind: ScreenKind) -> Option<u64> {
        self.feed
            .as_ref()
            .and_then(|f| f.seed)
            .map(|seed| seed.wrapping_add(kind.seed_offset()))
    }

    pub fn alarm_count(&self) -> usize {
        self.feed
            .as_ref()
            .and_then(|f| f.alarm_count)
            .unwrap_or(DEFAULT_ALARM_COUNT)
    }

    pub fn anomaly_probability(&self) -> ConfigResult<f64> {
        let p = self
            .feed
            .as_ref()
            .and_then(|f| f.anomaly_probability)
            .unwrap_or(DEFAULT_ANOMALY_PROBABILITY);
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::InvalidProbability(p));
        }
        Ok(p)
    }

    /// Static KPIs for the sustainability screen, overlaid on the defaults.
    pub fn sustainability_metrics(&self) -> SustainabilityMetrics {
        let defaults = SustainabilityMetrics::default();
        let Some(s) = self.sustainability.as_ref() else {
            return defaults;
        };
        SustainabilityMetrics {
            current_usage: s.current_usage.unwrap_or(defaults.current_usage),
            avg_next_24h: s.avg_next_24h.unwrap_or(defaults.avg_next_24h),
            savings_vs_last_week: s
                .savings_vs_last_week
                .unwrap_or(defaults.savings_vs_last_week),
            carbon_reduction_progress: s
                .carbon_reduction_progress
                .unwrap_or(defaults.carbon_reduction_progress),
            renewable_percentage: s
                .renewable_percentage
                .unwrap_or(defaults.renewable_percentage),
        }
    }

    /// A fully populated scada.toml with every default spelled out.
    pub fn scaffold() -> Self {
        let metrics = SustainabilityMetrics::default();
        let period = |kind: ScreenKind| Some(format_duration(kind.default_period()));
        ScadaConfig {
            feed: Some(FeedConfig {
                seed: None,
                alarm_count: Some(DEFAULT_ALARM_COUNT),
                anomaly_probability: Some(DEFAULT_ANOMALY_PROBABILITY),
            }),
            refresh: Some(RefreshConfig {
                alarms: period(ScreenKind::Alarms),
                maintenance: period(ScreenKind::Maintenance),
                pipeline: period(ScreenKind::Pipeline),
                sustainability: period(ScreenKind::Sustainability),
            }),
            sustainability: Some(SustainabilityConfig {
                current_usage: Some(metrics.current_usage),
                avg_next_24h: Some(metrics.avg_next_24h),
                savings_vs_last_week: Some(metrics.savings_vs_last_week),
                carbon_reduction_progress: Some(metrics.carbon_reduction_progress),
                renewable_percentage: Some(metrics.renewable_percentage),
            }),
        }
    }
}

/// Parse a duration string like "5s", "500ms", "1m".
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(secs) = s.strip_suffix('s') {
        if let Some(ms) = secs.strip_suffix('m') {
            ms.parse::<u64>().ok().map(Duration::from_millis)
        } else {
            secs.parse::<u64>().ok().map(Duration::from_secs)
        }
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Inverse of [`parse_duration`] for whole seconds or milliseconds.
pub fn format_duration(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        format!("{}s", d.as_secs())
    } else {
        format!("{}ms", d.as_millis())
    }
}
