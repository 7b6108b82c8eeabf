//! Derived views for each screen.
//!
//! A derived view is a pure function of one snapshot plus the screen's
//! view options. Views carry pre-computed counts, sort order, tones, and
//! display strings so the presentation layer stays trivial.

use serde::{Deserialize, Serialize};

use scada_core::*;

/// Projection of a snapshot under a set of user view options.
pub trait DerivedView: Sized + Send + Sync + 'static {
    type Snapshot: Send + Sync + 'static;
    type Options: Clone + Default + PartialEq + Send + Sync + 'static;

    fn derive(snapshot: &Self::Snapshot, options: &Self::Options) -> Self;
}

/// Status-card color variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Default,
    Success,
    Warning,
    Danger,
}

// ── Alarms ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmOptions {
    /// Keeps alarms with severity ≥ 3, warnings included.
    pub show_critical_only: bool,
}

/// Severity badge shown next to each alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeverityLabel {
    Critical,
    Warning,
    Normal,
}

impl SeverityLabel {
    pub fn for_severity(severity: u8) -> Self {
        if severity >= CRITICAL_SEVERITY {
            SeverityLabel::Critical
        } else if severity == WARNING_SEVERITY {
            SeverityLabel::Warning
        } else {
            SeverityLabel::Normal
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
}

impl SeverityCounts {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.normal
    }
}

pub fn severity_counts(alarms: &[Alarm]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for alarm in alarms {
        match SeverityLabel::for_severity(alarm.severity) {
            SeverityLabel::Critical => counts.critical += 1,
            SeverityLabel::Warning => counts.warning += 1,
            SeverityLabel::Normal => counts.normal += 1,
        }
    }
    counts
}

/// Alarms passing the critical-only toggle, snapshot order preserved.
///
/// The toggle admits severity ≥ 3 even though the summary card only calls
/// ≥ 4 critical. Operators rely on this threshold; do not tighten it
/// without sign-off.
pub fn filter_alarms(alarms: &[Alarm], show_critical_only: bool) -> Vec<&Alarm> {
    alarms
        .iter()
        .filter(|a| !show_critical_only || a.severity >= WARNING_SEVERITY)
        .collect()
}

/// Tone of the false-alarm probability indicator.
pub fn false_alarm_tone(probability: f64) -> Tone {
    if probability < 0.3 {
        Tone::Success
    } else if probability < 0.6 {
        Tone::Warning
    } else {
        Tone::Danger
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmRow {
    #[serde(flatten)]
    pub alarm: Alarm,
    pub severity_label: SeverityLabel,
    pub false_alarm_tone: Tone,
    pub false_probability_display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmView {
    pub show_critical_only: bool,
    pub total: usize,
    pub critical_count: usize,
    pub warning_count: usize,
    pub normal_count: usize,
    pub alarms: Vec<AlarmRow>,
}

impl DerivedView for AlarmView {
    type Snapshot = Vec<Alarm>;
    type Options = AlarmOptions;

    fn derive(alarms: &Vec<Alarm>, options: &AlarmOptions) -> Self {
        let counts = severity_counts(alarms);
        let rows = filter_alarms(alarms, options.show_critical_only)
            .into_iter()
            .map(|a| AlarmRow {
                alarm: a.clone(),
                severity_label: SeverityLabel::for_severity(a.severity),
                false_alarm_tone: false_alarm_tone(a.false_probability),
                false_probability_display: format!("{:.1}%", a.false_probability * 100.0),
            })
            .collect();

        Self {
            show_critical_only: options.show_critical_only,
            total: alarms.len(),
            critical_count: counts.critical,
            warning_count: counts.warning,
            normal_count: counts.normal,
            alarms: rows,
        }
    }
}

// ── Maintenance ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Rul,
    Name,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceOptions {
    pub sort_by: SortBy,
}

/// Machines in display order. The sort is stable, so ties keep
/// snapshot order.
pub fn sort_machines(machines: &[Machine], sort_by: SortBy) -> Vec<&Machine> {
    let mut sorted: Vec<&Machine> = machines.iter().collect();
    match sort_by {
        SortBy::Rul => sorted.sort_by_key(|m| m.rul),
        SortBy::Name => sorted.sort_by(|a, b| a.name.cmp(&b.name)),
        SortBy::Status => sorted.sort_by_key(|m| m.status),
    }
    sorted
}

/// Rounded mean RUL, `None` for an empty fleet.
pub fn average_rul(machines: &[Machine]) -> Option<u32> {
    if machines.is_empty() {
        return None;
    }
    let sum: u64 = machines.iter().map(|m| m.rul as u64).sum();
    Some((sum as f64 / machines.len() as f64).round() as u32)
}

/// Scale a series into `0.0..=1.0` for a sparkline.
///
/// A flat series has range 1, so every point maps to 0.
pub fn normalize_sparkline(data: &[f64]) -> Vec<f64> {
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let range = if max - min == 0.0 { 1.0 } else { max - min };
    data.iter().map(|v| (v - min) / range).collect()
}

pub fn status_tone(status: MachineStatus) -> Tone {
    match status {
        MachineStatus::Critical => Tone::Danger,
        MachineStatus::Warning => Tone::Warning,
        MachineStatus::Good => Tone::Success,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MachineRow {
    #[serde(flatten)]
    pub machine: Machine,
    pub tone: Tone,
    pub sparkline: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceView {
    pub sort_by: SortBy,
    pub critical_count: usize,
    pub warning_count: usize,
    pub good_count: usize,
    pub avg_rul: Option<u32>,
    pub machines: Vec<MachineRow>,
}

impl DerivedView for MaintenanceView {
    type Snapshot = Vec<Machine>;
    type Options = MaintenanceOptions;

    fn derive(machines: &Vec<Machine>, options: &MaintenanceOptions) -> Self {
        let count = |status: MachineStatus| machines.iter().filter(|m| m.status == status).count();

        let rows = sort_machines(machines, options.sort_by)
            .into_iter()
            .map(|m| MachineRow {
                machine: m.clone(),
                tone: status_tone(m.status),
                sparkline: normalize_sparkline(&m.trend),
            })
            .collect();

        Self {
            sort_by: options.sort_by,
            critical_count: count(MachineStatus::Critical),
            warning_count: count(MachineStatus::Warning),
            good_count: count(MachineStatus::Good),
            avg_rul: average_rul(machines),
            machines: rows,
        }
    }
}

// ── Pipeline ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeColor {
    Green,
    Amber,
    Red,
}

impl NodeColor {
    pub fn hex(self) -> &'static str {
        match self {
            NodeColor::Green => "#10b981",
            NodeColor::Amber => "#f59e0b",
            NodeColor::Red => "#ef4444",
        }
    }
}

/// Sensors turn red while any anomaly is active; nothing localizes the
/// fault to a specific node.
pub fn node_color(node: &PipelineNode, reading: &PipelineReading) -> NodeColor {
    if reading.is_anomalous() && node.kind == NodeKind::Sensor {
        return NodeColor::Red;
    }
    match node.status {
        NodeStatus::Anomaly => NodeColor::Red,
        NodeStatus::Warning => NodeColor::Amber,
        NodeStatus::Normal => NodeColor::Green,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: PipelineNode,
    pub color: NodeColor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineView {
    pub reading: PipelineReading,
    /// "ALERT" while anomalous, else "NORMAL".
    pub health: &'static str,
    /// Banner headline, e.g. "PRESSURE SPIKE".
    pub alert: Option<String>,
    pub pressure_tone: Tone,
    pub flow_tone: Tone,
    pub temperature_tone: Tone,
    pub nodes: Vec<NodeView>,
    pub links: Vec<PipelineLink>,
}

impl DerivedView for PipelineView {
    type Snapshot = PipelineReading;
    type Options = ();

    fn derive(reading: &PipelineReading, _: &()) -> Self {
        let nodes = PIPELINE_NODES
            .iter()
            .map(|node| NodeView {
                node: *node,
                color: node_color(node, reading),
            })
            .collect();

        Self {
            reading: reading.clone(),
            health: if reading.is_anomalous() { "ALERT" } else { "NORMAL" },
            alert: reading
                .anomaly
                .map(|kind| kind.as_str().replacen('_', " ", 1).to_uppercase()),
            pressure_tone: if reading.pressure > 100.0 {
                Tone::Warning
            } else {
                Tone::Success
            },
            flow_tone: if reading.flow < 25.0 {
                Tone::Warning
            } else {
                Tone::Success
            },
            temperature_tone: if reading.temperature > 195.0 {
                Tone::Danger
            } else {
                Tone::Success
            },
            nodes,
            links: PIPELINE_LINKS.to_vec(),
        }
    }
}

// ── Sustainability ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub title: &'static str,
    pub detail: &'static str,
    pub tone: Tone,
}

pub const RECOMMENDATIONS: [Recommendation; 3] = [
    Recommendation {
        title: "Optimize Peak Hours",
        detail: "Shift non-critical operations to off-peak hours (2-6 AM) to reduce costs by 18%",
        tone: Tone::Success,
    },
    Recommendation {
        title: "Increase Renewable Mix",
        detail: "Installing 50kW solar capacity could increase renewable percentage to 45%",
        tone: Tone::Default,
    },
    Recommendation {
        title: "Equipment Efficiency",
        detail: "HVAC system optimization could reduce consumption by 12% during peak hours",
        tone: Tone::Warning,
    },
];

/// Year-over-year efficiency deltas, in percent.
pub const EFFICIENCY_DELTAS: [(&str, f64); 4] = [
    ("Energy Efficiency", 15.2),
    ("Waste Reduction", 22.8),
    ("Water Conservation", 8.1),
    ("Renewable Integration", 5.3),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SustainabilityView {
    pub samples: Vec<EnergySample>,
    pub metrics: SustainabilityMetrics,
    pub efficiency: Vec<(&'static str, f64)>,
    pub recommendations: Vec<Recommendation>,
}

impl DerivedView for SustainabilityView {
    type Snapshot = EnergySnapshot;
    type Options = ();

    fn derive(snapshot: &EnergySnapshot, _: &()) -> Self {
        Self {
            samples: snapshot.samples.clone(),
            metrics: snapshot.metrics,
            efficiency: EFFICIENCY_DELTAS.to_vec(),
            recommendations: RECOMMENDATIONS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn alarm(id: &str, severity: u8) -> Alarm {
        Alarm {
            id: id.to_string(),
            pressure: 100.0,
            temperature: 90.0,
            severity,
            false_probability: 0.5,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            kind: AlarmKind::Pressure,
        }
    }

    fn machine(name: &str, rul: u32) -> Machine {
        Machine {
            id: format!("MCH-{name}"),
            name: name.to_string(),
            rul,
            last_maintenance: Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            trend: vec![rul as f64; TREND_LEN],
            status: MachineStatus::classify(rul),
            location: "Building A".to_string(),
            kind: MachineKind::Pump,
        }
    }

    fn reading(anomaly: Option<AnomalyKind>) -> PipelineReading {
        PipelineReading {
            pressure: 90.0,
            flow: 30.0,
            temperature: 185.0,
            anomaly,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn alarm_counts_worked_example() {
        let alarms = vec![alarm("a", 5), alarm("b", 3), alarm("c", 1)];
        let view = AlarmView::derive(&alarms, &AlarmOptions::default());
        assert_eq!(view.critical_count, 1);
        assert_eq!(view.warning_count, 1);
        assert_eq!(view.normal_count, 1);
        assert_eq!(view.alarms.len(), 3);

        let view = AlarmView::derive(
            &alarms,
            &AlarmOptions {
                show_critical_only: true,
            },
        );
        let ids: Vec<_> = view.alarms.iter().map(|r| r.alarm.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn alarm_counts_partition_total() {
        let alarms: Vec<_> = (1..=5)
            .cycle()
            .take(17)
            .enumerate()
            .map(|(i, s)| alarm(&i.to_string(), s))
            .collect();
        let counts = severity_counts(&alarms);
        assert_eq!(counts.total(), alarms.len());
    }

    #[test]
    fn critical_only_keeps_severity_three_and_up_in_order() {
        let alarms = vec![
            alarm("a", 3),
            alarm("b", 2),
            alarm("c", 4),
            alarm("d", 1),
            alarm("e", 5),
        ];
        let kept: Vec<_> = filter_alarms(&alarms, true).into_iter().map(|a| a.id.as_str()).collect();
        assert_eq!(kept, ["a", "c", "e"]);

        let all: Vec<_> = filter_alarms(&alarms, false).into_iter().map(|a| a.id.as_str()).collect();
        assert_eq!(all, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn alarm_row_display_fields() {
        let mut a = alarm("a", 4);
        a.false_probability = 0.1234;
        let view = AlarmView::derive(&vec![a], &AlarmOptions::default());
        let row = &view.alarms[0];
        assert_eq!(row.severity_label, SeverityLabel::Critical);
        assert_eq!(row.false_alarm_tone, Tone::Success);
        assert_eq!(row.false_probability_display, "12.3%");
    }

    #[test]
    fn false_alarm_tone_thresholds() {
        assert_eq!(false_alarm_tone(0.0), Tone::Success);
        assert_eq!(false_alarm_tone(0.29), Tone::Success);
        assert_eq!(false_alarm_tone(0.3), Tone::Warning);
        assert_eq!(false_alarm_tone(0.59), Tone::Warning);
        assert_eq!(false_alarm_tone(0.6), Tone::Danger);
    }

    #[test]
    fn sort_by_rul_non_decreasing() {
        let machines = vec![machine("x", 70), machine("y", 5), machine("z", 30), machine("w", 5)];
        let sorted = sort_machines(&machines, SortBy::Rul);
        let ruls: Vec<_> = sorted.iter().map(|m| m.rul).collect();
        assert_eq!(ruls, [5, 5, 30, 70]);
        // Stable: "y" came before "w" in the snapshot.
        assert_eq!(sorted[0].name, "y");
        assert_eq!(sorted[1].name, "w");
    }

    #[test]
    fn sort_by_status_is_stable() {
        let machines = vec![
            machine("good-1", 80),
            machine("crit-1", 10),
            machine("warn-1", 40),
            machine("crit-2", 15),
            machine("good-2", 60),
            machine("warn-2", 25),
        ];
        let names: Vec<_> = sort_machines(&machines, SortBy::Status)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            names,
            ["crit-1", "crit-2", "warn-1", "warn-2", "good-1", "good-2"]
        );
    }

    #[test]
    fn sort_by_name_lexicographic() {
        let machines = vec![machine("Valve D-4", 10), machine("Boiler G-7", 90), machine("Motor C-3", 50)];
        let names: Vec<_> = sort_machines(&machines, SortBy::Name)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["Boiler G-7", "Motor C-3", "Valve D-4"]);
    }

    #[test]
    fn maintenance_counts_and_average() {
        let machines = vec![machine("a", 10), machine("b", 40), machine("c", 90), machine("d", 91)];
        let view = MaintenanceView::derive(&machines, &MaintenanceOptions::default());
        assert_eq!(view.critical_count, 1);
        assert_eq!(view.warning_count, 1);
        assert_eq!(view.good_count, 2);
        // (10 + 40 + 90 + 91) / 4 = 57.75
        assert_eq!(view.avg_rul, Some(58));
        assert_eq!(view.machines[0].tone, Tone::Danger);
    }

    #[test]
    fn average_rul_empty_fleet() {
        assert_eq!(average_rul(&[]), None);
        let view = MaintenanceView::derive(&Vec::new(), &MaintenanceOptions::default());
        assert_eq!(view.avg_rul, None);
        assert!(view.machines.is_empty());
    }

    #[test]
    fn sparkline_flat_series_is_finite() {
        let flat = normalize_sparkline(&[42.0; 5]);
        assert!(flat.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn sparkline_spans_unit_interval() {
        let line = normalize_sparkline(&[-5.0, 0.0, 5.0]);
        assert_eq!(line, [0.0, 0.5, 1.0]);
        assert!(normalize_sparkline(&[]).is_empty());
    }

    #[test]
    fn sensors_turn_red_on_anomaly() {
        let view = PipelineView::derive(&reading(Some(AnomalyKind::PressureSpike)), &());
        for n in &view.nodes {
            let expected = if n.node.kind == NodeKind::Sensor {
                NodeColor::Red
            } else {
                NodeColor::Green
            };
            assert_eq!(n.color, expected, "{}", n.node.id);
        }
        assert_eq!(view.health, "ALERT");
        assert_eq!(view.alert.as_deref(), Some("PRESSURE SPIKE"));
    }

    #[test]
    fn all_green_without_anomaly() {
        let view = PipelineView::derive(&reading(None), &());
        assert_eq!(view.nodes.len(), 7);
        assert!(view.nodes.iter().all(|n| n.color == NodeColor::Green));
        assert_eq!(view.health, "NORMAL");
        assert_eq!(view.alert, None);
        assert_eq!(view.links.len(), 7);
    }

    #[test]
    fn node_status_drives_color_when_calm() {
        let mut node = PIPELINE_NODES[1];
        node.status = NodeStatus::Warning;
        assert_eq!(node_color(&node, &reading(None)), NodeColor::Amber);
        node.status = NodeStatus::Anomaly;
        assert_eq!(node_color(&node, &reading(None)), NodeColor::Red);
        assert_eq!(NodeColor::Red.hex(), "#ef4444");
    }

    #[test]
    fn reading_tones() {
        let mut r = reading(None);
        r.pressure = 101.0;
        r.flow = 24.0;
        r.temperature = 196.0;
        let view = PipelineView::derive(&r, &());
        assert_eq!(view.pressure_tone, Tone::Warning);
        assert_eq!(view.flow_tone, Tone::Warning);
        assert_eq!(view.temperature_tone, Tone::Danger);

        let view = PipelineView::derive(&reading(None), &());
        assert_eq!(view.pressure_tone, Tone::Success);
        assert_eq!(view.flow_tone, Tone::Success);
        assert_eq!(view.temperature_tone, Tone::Success);
    }

    #[test]
    fn sustainability_passes_through() {
        let snapshot = EnergySnapshot {
            samples: Vec::new(),
            metrics: SustainabilityMetrics::default(),
        };
        let view = SustainabilityView::derive(&snapshot, &());
        assert_eq!(view.metrics.current_usage, 425.0);
        assert_eq!(view.recommendations.len(), 3);
        assert_eq!(view.efficiency[0].0, "Energy Efficiency");
    }

    #[test]
    fn derive_is_idempotent() {
        let machines = vec![machine("a", 33), machine("b", 12), machine("c", 77)];
        let options = MaintenanceOptions {
            sort_by: SortBy::Status,
        };
        assert_eq!(
            MaintenanceView::derive(&machines, &options),
            MaintenanceView::derive(&machines, &options)
        );

        let alarms = vec![alarm("a", 4), alarm("b", 2)];
        let options = AlarmOptions {
            show_critical_only: true,
        };
        assert_eq!(
            AlarmView::derive(&alarms, &options),
            AlarmView::derive(&alarms, &options)
        );
    }

    #[test]
    fn views_serialize_flat_rows() {
        let view = AlarmView::derive(&vec![alarm("ALM-001", 5)], &AlarmOptions::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["alarms"][0]["id"], "ALM-001");
        assert_eq!(json["alarms"][0]["severity_label"], "Critical");
        assert_eq!(json["critical_count"], 1);
    }
}
