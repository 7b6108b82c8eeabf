//! `scada watch` — mount screens and follow their derived views.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{info, warn};

use scada_core::ScreenKind;
use scada_core::config::parse_duration;
use scada_views::{
    AlarmView, Dashboard, DerivedView, MaintenanceView, PipelineView, SustainabilityView,
    ViewWatcher,
};

pub fn watch(
    config: Option<&Path>,
    screens: &[ScreenKind],
    duration: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = super::load_config(config)?;
    let duration = duration
        .map(|d| parse_duration(d).ok_or_else(|| anyhow!("invalid duration: {d:?}")))
        .transpose()?;

    let mut dashboard = Dashboard::from_config(&config)?;
    let screens = select_screens(screens);

    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async move {
        let mut watchers = JoinSet::new();
        for kind in &screens {
            spawn_watcher(&dashboard, *kind, json, &mut watchers);
            dashboard.mount(*kind);
        }
        info!(screens = ?screens, "dashboard mounted");

        match duration {
            Some(limit) => {
                tokio::select! {
                    _ = tokio::time::sleep(limit) => {}
                    res = tokio::signal::ctrl_c() => res?,
                }
            }
            None => tokio::signal::ctrl_c().await?,
        }

        dashboard.unmount_all();
        watchers.shutdown().await;
        info!("dashboard unmounted");
        Ok::<_, anyhow::Error>(())
    })
}

/// Requested screens in catalogue order, all four when none are named.
fn select_screens(requested: &[ScreenKind]) -> Vec<ScreenKind> {
    if requested.is_empty() {
        return ScreenKind::ALL.to_vec();
    }
    ScreenKind::ALL
        .into_iter()
        .filter(|kind| requested.contains(kind))
        .collect()
}

fn spawn_watcher(dashboard: &Dashboard, kind: ScreenKind, json: bool, set: &mut JoinSet<()>) {
    match kind {
        ScreenKind::Alarms => {
            set.spawn(follow(kind, dashboard.alarms.watch(), json));
        }
        ScreenKind::Maintenance => {
            set.spawn(follow(kind, dashboard.maintenance.watch(), json));
        }
        ScreenKind::Pipeline => {
            set.spawn(follow(kind, dashboard.pipeline.watch(), json));
        }
        ScreenKind::Sustainability => {
            set.spawn(follow(kind, dashboard.sustainability.watch(), json));
        }
    }
}

async fn follow<V>(kind: ScreenKind, mut watcher: ViewWatcher<V>, json: bool)
where
    V: DerivedView + Summary + Serialize,
{
    while let Some(view) = watcher.changed().await {
        view.log_summary();
        if json {
            match json_line(kind, &view) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(screen = %kind, error = %e, "failed to encode view"),
            }
        }
    }
}

#[derive(Serialize)]
struct ViewLine<'a, V> {
    screen: ScreenKind,
    view: &'a V,
}

fn json_line<V: Serialize>(screen: ScreenKind, view: &V) -> serde_json::Result<String> {
    serde_json::to_string(&ViewLine { screen, view })
}

/// One structured log line per refreshed view.
trait Summary {
    fn log_summary(&self);
}

impl Summary for AlarmView {
    fn log_summary(&self) {
        info!(
            screen = "alarms",
            total = self.total,
            critical = self.critical_count,
            warning = self.warning_count,
            normal = self.normal_count,
            shown = self.alarms.len(),
            critical_only = self.show_critical_only,
            "alarm view"
        );
    }
}

impl Summary for MaintenanceView {
    fn log_summary(&self) {
        info!(
            screen = "maintenance",
            critical = self.critical_count,
            warning = self.warning_count,
            good = self.good_count,
            avg_rul = ?self.avg_rul,
            sort_by = ?self.sort_by,
            "maintenance view"
        );
    }
}

impl Summary for PipelineView {
    fn log_summary(&self) {
        let r = &self.reading;
        if let Some(alert) = &self.alert {
            warn!(screen = "pipeline", %alert, "anomaly detected");
        }
        info!(
            screen = "pipeline",
            health = self.health,
            pressure_psi = r.pressure,
            flow_gpm = r.flow,
            temperature_f = r.temperature,
            "pipeline view"
        );
    }
}

impl Summary for SustainabilityView {
    fn log_summary(&self) {
        let peak = self.samples.iter().map(|s| s.consumption).max();
        info!(
            screen = "sustainability",
            samples = self.samples.len(),
            peak_kwh = ?peak,
            current_usage_kwh = self.metrics.current_usage,
            renewable_pct = self.metrics.renewable_percentage,
            "sustainability view"
        );
    }
}
