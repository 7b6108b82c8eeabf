//! `scada snapshot` — one-shot generation of a screen's derived view.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use scada_core::{ScadaConfig, ScreenKind};
use scada_feed::{AlarmGenerator, EnergyGenerator, Generator, MachineGenerator, PipelineGenerator};
use scada_views::{
    AlarmOptions, AlarmView, DerivedView, MaintenanceOptions, MaintenanceView, PipelineView,
    SortBy, SustainabilityView,
};

pub fn snapshot(
    kind: ScreenKind,
    config: Option<&Path>,
    seed: Option<u64>,
    critical_only: bool,
    sort_by: SortBy,
) -> Result<()> {
    let mut config = super::load_config(config)?;
    if let Some(seed) = seed {
        config.feed.get_or_insert_with(Default::default).seed = Some(seed);
    }

    let value = render(kind, &config, critical_only, sort_by, Utc::now())?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Generate a snapshot for `kind` and derive its view as JSON.
pub fn render(
    kind: ScreenKind,
    config: &ScadaConfig,
    critical_only: bool,
    sort_by: SortBy,
    now: DateTime<Utc>,
) -> Result<Value> {
    let mut rng = match config.seed_for(kind) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let view = match kind {
        ScreenKind::Alarms => {
            let alarms = AlarmGenerator::new(config.alarm_count()).generate(&mut rng, now);
            let options = AlarmOptions {
                show_critical_only: critical_only,
            };
            serde_json::to_value(AlarmView::derive(&alarms, &options))?
        }
        ScreenKind::Maintenance => {
            let machines = MachineGenerator.generate(&mut rng, now);
            let options = MaintenanceOptions { sort_by };
            serde_json::to_value(MaintenanceView::derive(&machines, &options))?
        }
        ScreenKind::Pipeline => {
            let generator = PipelineGenerator::new(config.anomaly_probability()?);
            let reading = generator.generate(&mut rng, now);
            serde_json::to_value(PipelineView::derive(&reading, &()))?
        }
        ScreenKind::Sustainability => {
            let generator = EnergyGenerator::new(config.sustainability_metrics());
            let energy = generator.generate(&mut rng, now);
            serde_json::to_value(SustainabilityView::derive(&energy, &()))?
        }
    };

    Ok(json!({
        "screen": kind,
        "generated_at": now,
        "view": view,
    }))
}
