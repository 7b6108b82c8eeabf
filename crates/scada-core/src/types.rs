//! Domain types for the SCADA feed.
//!
//! These records only live for the lifetime of one snapshot. Nothing is
//! persisted. Types serialize to JSON for the CLI and any presentation
//! layer that consumes derived views.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Screens ───────────────────────────────────────────────────────

/// Longest refresh period a screen may be configured with.
pub const MAX_REFRESH_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// The four independent dashboard screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenKind {
    Alarms,
    Maintenance,
    Pipeline,
    Sustainability,
}

impl ScreenKind {
    pub const ALL: [ScreenKind; 4] = [
        ScreenKind::Alarms,
        ScreenKind::Maintenance,
        ScreenKind::Pipeline,
        ScreenKind::Sustainability,
    ];

    /// Stable lowercase name, used in logs and config keys.
    pub fn name(self) -> &'static str {
        match self {
            ScreenKind::Alarms => "alarms",
            ScreenKind::Maintenance => "maintenance",
            ScreenKind::Pipeline => "pipeline",
            ScreenKind::Sustainability => "sustainability",
        }
    }

    /// Human-readable screen title.
    pub fn title(self) -> &'static str {
        match self {
            ScreenKind::Alarms => "Alarm Manager",
            ScreenKind::Maintenance => "Predictive Maintenance",
            ScreenKind::Pipeline => "Pipeline Anomaly Detection",
            ScreenKind::Sustainability => "Sustainability",
        }
    }

    /// Route the navigation shell mounts this screen under.
    pub fn route(self) -> &'static str {
        match self {
            ScreenKind::Alarms => "/alarms",
            ScreenKind::Maintenance => "/maintenance",
            ScreenKind::Pipeline => "/pipeline",
            ScreenKind::Sustainability => "/sustainability",
        }
    }

    /// Refresh period used when the config does not override it.
    pub fn default_period(self) -> Duration {
        match self {
            ScreenKind::Alarms => Duration::from_millis(8_000),
            ScreenKind::Maintenance => Duration::from_millis(10_000),
            ScreenKind::Pipeline => Duration::from_millis(6_000),
            ScreenKind::Sustainability => Duration::from_millis(15_000),
        }
    }

    /// Offset mixed into the base seed so screens never share an RNG stream.
    pub fn seed_offset(self) -> u64 {
        match self {
            ScreenKind::Alarms => 0x01,
            ScreenKind::Maintenance => 0x02,
            ScreenKind::Pipeline => 0x03,
            ScreenKind::Sustainability => 0x04,
        }
    }
}

impl fmt::Display for ScreenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Alarms ────────────────────────────────────────────────────────

/// Number of alarms in a generated snapshot unless configured otherwise.
pub const DEFAULT_ALARM_COUNT: usize = 12;

/// Severity at or above which an alarm counts as critical.
pub const CRITICAL_SEVERITY: u8 = 4;

/// Severity that counts as a warning.
pub const WARNING_SEVERITY: u8 = 3;

/// A single alarm raised by a plant sensor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alarm {
    /// `ALM-NNN`, unique within a snapshot.
    pub id: String,
    /// Pressure in PSI.
    pub pressure: f64,
    /// Temperature in °F.
    pub temperature: f64,
    /// 1 (lowest) to 5 (highest).
    pub severity: u8,
    /// Estimated probability that this alarm is spurious (0.0–1.0).
    pub false_probability: f64,
    pub timestamp: DateTime<Utc>,
    pub kind: AlarmKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmKind {
    Pressure,
    Temperature,
    Flow,
    Vibration,
}

impl AlarmKind {
    pub const ALL: [AlarmKind; 4] = [
        AlarmKind::Pressure,
        AlarmKind::Temperature,
        AlarmKind::Flow,
        AlarmKind::Vibration,
    ];
}

/// Format the snapshot-scoped identifier for the `index`-th alarm (0-based).
pub fn alarm_id(index: usize) -> String {
    format!("ALM-{:03}", index + 1)
}

// ── Machines ──────────────────────────────────────────────────────

/// Number of points in each machine's RUL trend.
pub const TREND_LEN: usize = 10;

/// The fixed fleet monitored by the maintenance screen, in display order.
pub const MACHINE_ROSTER: [&str; 8] = [
    "Pump A-1",
    "Compressor B-2",
    "Motor C-3",
    "Valve D-4",
    "Generator E-5",
    "Turbine F-6",
    "Boiler G-7",
    "Heater H-8",
];

pub const MACHINE_LOCATIONS: [&str; 3] = ["Building A", "Building B", "Building C"];

/// A piece of equipment with a predicted remaining useful life.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    /// `MCH-NNN`.
    pub id: String,
    pub name: String,
    /// Remaining useful life in days.
    pub rul: u32,
    pub last_maintenance: DateTime<Utc>,
    /// Recent RUL estimates. Noisy, unclamped, may dip below zero.
    pub trend: Vec<f64>,
    /// Always `MachineStatus::classify(rul)`.
    pub status: MachineStatus,
    pub location: String,
    pub kind: MachineKind,
}

impl Machine {
    /// Whether the stored status agrees with the RUL thresholds.
    pub fn status_is_consistent(&self) -> bool {
        self.status == MachineStatus::classify(self.rul)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineKind {
    Pump,
    Compressor,
    Motor,
    Valve,
}

impl MachineKind {
    pub const ALL: [MachineKind; 4] = [
        MachineKind::Pump,
        MachineKind::Compressor,
        MachineKind::Motor,
        MachineKind::Valve,
    ];
}

/// Maintenance urgency bucket derived from RUL.
///
/// Variant order is the display order when sorting by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineStatus {
    Critical,
    Warning,
    Good,
}

impl MachineStatus {
    /// Critical at 20 days or less, warning up to 50, good above.
    pub fn classify(rul: u32) -> Self {
        if rul > 50 {
            MachineStatus::Good
        } else if rul > 20 {
            MachineStatus::Warning
        } else {
            MachineStatus::Critical
        }
    }
}

/// Format the snapshot-scoped identifier for the `index`-th machine (0-based).
pub fn machine_id(index: usize) -> String {
    format!("MCH-{:03}", index + 1)
}

// ── Pipeline ──────────────────────────────────────────────────────

/// Default probability that a pipeline reading is anomalous.
pub const DEFAULT_ANOMALY_PROBABILITY: f64 = 0.2;

/// One reading from the pipeline's instrumentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineReading {
    /// Pressure in PSI.
    pub pressure: f64,
    /// Flow in GPM.
    pub flow: f64,
    /// Fluid temperature in °F.
    pub temperature: f64,
    /// Present iff an anomaly was detected.
    pub anomaly: Option<AnomalyKind>,
    pub timestamp: DateTime<Utc>,
}

impl PipelineReading {
    pub fn is_anomalous(&self) -> bool {
        self.anomaly.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    PressureSpike,
    FlowReduction,
    TemperatureRise,
    Vibration,
}

impl AnomalyKind {
    pub const ALL: [AnomalyKind; 4] = [
        AnomalyKind::PressureSpike,
        AnomalyKind::FlowReduction,
        AnomalyKind::TemperatureRise,
        AnomalyKind::Vibration,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnomalyKind::PressureSpike => "pressure_spike",
            AnomalyKind::FlowReduction => "flow_reduction",
            AnomalyKind::TemperatureRise => "temperature_rise",
            AnomalyKind::Vibration => "vibration",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Pump,
    Valve,
    Sensor,
    Tank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Normal,
    Warning,
    Anomaly,
}

/// A fixed element of the pipeline schematic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineNode {
    pub id: &'static str,
    pub x: u16,
    pub y: u16,
    pub kind: NodeKind,
    pub status: NodeStatus,
    pub label: &'static str,
}

/// Directed pipe segment between two nodes, by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PipelineLink {
    pub from: &'static str,
    pub to: &'static str,
}

const fn node(
    id: &'static str,
    x: u16,
    y: u16,
    kind: NodeKind,
    label: &'static str,
) -> PipelineNode {
    PipelineNode {
        id,
        x,
        y,
        kind,
        status: NodeStatus::Normal,
        label,
    }
}

/// Static schematic topology. Never regenerated.
pub const PIPELINE_NODES: [PipelineNode; 7] = [
    node("tank1", 50, 150, NodeKind::Tank, "Storage Tank A"),
    node("pump1", 150, 150, NodeKind::Pump, "Main Pump"),
    node("valve1", 250, 100, NodeKind::Valve, "Control Valve 1"),
    node("valve2", 250, 200, NodeKind::Valve, "Control Valve 2"),
    node("sensor1", 350, 100, NodeKind::Sensor, "Pressure Sensor"),
    node("sensor2", 350, 200, NodeKind::Sensor, "Flow Sensor"),
    node("tank2", 450, 150, NodeKind::Tank, "Storage Tank B"),
];

pub const PIPELINE_LINKS: [PipelineLink; 7] = [
    PipelineLink { from: "tank1", to: "pump1" },
    PipelineLink { from: "pump1", to: "valve1" },
    PipelineLink { from: "pump1", to: "valve2" },
    PipelineLink { from: "valve1", to: "sensor1" },
    PipelineLink { from: "valve2", to: "sensor2" },
    PipelineLink { from: "sensor1", to: "tank2" },
    PipelineLink { from: "sensor2", to: "tank2" },
];

// ── Sustainability ────────────────────────────────────────────────

/// Hours covered by one energy forecast snapshot.
pub const FORECAST_HOURS: usize = 24;

/// Energy use for one hour offset from the snapshot instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnergySample {
    pub at: DateTime<Utc>,
    /// `HH:MM` label for chart axes.
    pub time: String,
    /// Observed consumption pattern in kWh.
    pub consumption: u32,
    /// Optimized forecast in kWh.
    pub forecast: u32,
}

/// Site-wide sustainability KPIs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SustainabilityMetrics {
    /// kWh.
    pub current_usage: f64,
    /// kWh.
    pub avg_next_24h: f64,
    /// Percent.
    pub savings_vs_last_week: f64,
    /// Percent of the 2030 carbon target reached.
    pub carbon_reduction_progress: f64,
    /// Percent.
    pub renewable_percentage: f64,
}

impl Default for SustainabilityMetrics {
    fn default() -> Self {
        Self {
            current_usage: 425.0,
            avg_next_24h: 410.0,
            savings_vs_last_week: 12.5,
            carbon_reduction_progress: 68.0,
            renewable_percentage: 34.0,
        }
    }
}

/// One refresh of the sustainability screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnergySnapshot {
    pub samples: Vec<EnergySample>,
    pub metrics: SustainabilityMetrics,
}
