//! Synthetic snapshot generators.
//!
//! Each generator is memoryless: a snapshot depends only on the random
//! source and the `now` instant handed in by the caller. Seeding the RNG
//! makes output reproducible.

use std::f64::consts::PI;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;

use scada_core::*;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Produces one snapshot per invocation. Generation cannot fail.
pub trait Generator: Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Self::Snapshot;
}

fn pick<T: Copy, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> T {
    // Every call site passes a non-empty constant table.
    items[rng.gen_range(0..items.len())]
}

fn within_past<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>, span_ms: i64) -> DateTime<Utc> {
    now - ChronoDuration::milliseconds(rng.gen_range(0..=span_ms))
}

// ── Alarms ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AlarmGenerator {
    count: usize,
}

impl AlarmGenerator {
    pub fn new(count: usize) -> Self {
        Self { count }
    }
}

impl Default for AlarmGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALARM_COUNT)
    }
}

impl Generator for AlarmGenerator {
    type Snapshot = Vec<Alarm>;

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Alarm> {
        (0..self.count)
            .map(|i| Alarm {
                id: alarm_id(i),
                pressure: rng.gen_range(50.0..150.0),
                temperature: rng.gen_range(70.0..120.0),
                severity: rng.gen_range(1..=5),
                false_probability: rng.gen_range(0.0..1.0),
                timestamp: within_past(rng, now, DAY_MS),
                kind: pick(rng, &AlarmKind::ALL),
            })
            .collect()
    }
}

// ── Machines ──────────────────────────────────────────────────────

/// Generates the fixed maintenance fleet with fresh RUL predictions.
#[derive(Debug, Clone, Default)]
pub struct MachineGenerator;

impl Generator for MachineGenerator {
    type Snapshot = Vec<Machine>;

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> Vec<Machine> {
        MACHINE_ROSTER
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let raw_rul: f64 = rng.gen_range(0.0..100.0);
                let rul = raw_rul.round() as u32;
                let trend = (0..TREND_LEN)
                    .map(|_| raw_rul + rng.gen_range(-10.0..10.0))
                    .collect();
                Machine {
                    id: machine_id(i),
                    name: (*name).to_string(),
                    rul,
                    last_maintenance: within_past(rng, now, 30 * DAY_MS),
                    trend,
                    status: MachineStatus::classify(rul),
                    location: pick(rng, &MACHINE_LOCATIONS).to_string(),
                    kind: pick(rng, &MachineKind::ALL),
                }
            })
            .collect()
    }
}

// ── Pipeline ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PipelineGenerator {
    anomaly_probability: f64,
}

impl PipelineGenerator {
    /// `anomaly_probability` is clamped to `[0, 1]`.
    pub fn new(anomaly_probability: f64) -> Self {
        let anomaly_probability = if anomaly_probability.is_nan() {
            DEFAULT_ANOMALY_PROBABILITY
        } else {
            anomaly_probability.clamp(0.0, 1.0)
        };
        Self {
            anomaly_probability,
        }
    }
}

impl Default for PipelineGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ANOMALY_PROBABILITY)
    }
}

impl Generator for PipelineGenerator {
    type Snapshot = PipelineReading;

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> PipelineReading {
        let anomalous = rng.gen_bool(self.anomaly_probability);
        PipelineReading {
            pressure: rng.gen_range(75.0..125.0),
            flow: rng.gen_range(20.0..50.0),
            temperature: rng.gen_range(180.0..200.0),
            anomaly: anomalous.then(|| pick(rng, &AnomalyKind::ALL)),
            timestamp: now,
        }
    }
}

// ── Sustainability ────────────────────────────────────────────────

/// Generates the 24-hour energy forecast; KPIs stay fixed.
#[derive(Debug, Clone, Default)]
pub struct EnergyGenerator {
    metrics: SustainabilityMetrics,
}

impl EnergyGenerator {
    pub fn new(metrics: SustainabilityMetrics) -> Self {
        Self { metrics }
    }
}

/// Smoothed daily consumption baseline for an hour offset.
pub fn baseline(hour_offset: usize) -> f64 {
    450.0 + 100.0 * (hour_offset as f64 * PI / 12.0).sin()
}

impl Generator for EnergyGenerator {
    type Snapshot = EnergySnapshot;

    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, now: DateTime<Utc>) -> EnergySnapshot {
        let samples = (0..FORECAST_HOURS)
            .map(|i| {
                let at = now + ChronoDuration::hours(i as i64);
                let base = baseline(i);
                EnergySample {
                    at,
                    time: at.format("%H:%M").to_string(),
                    consumption: (base + rng.gen_range(-25.0..25.0)).round() as u32,
                    forecast: (0.95 * base + rng.gen_range(-15.0..15.0)).round() as u32,
                }
            })
            .collect();

        EnergySnapshot {
            samples,
            metrics: self.metrics,
        }
    }
}
