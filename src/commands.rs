use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use rust_data_cleaning::cleaning::{Plan, Report};
use rust_data_cleaning::envelope::{CleanEnvelope, PlanEnvelope, ProfileEnvelope};
use rust_data_cleaning::execution::CleaningExecutor;
use rust_data_cleaning::export::save_to_path;
use rust_data_cleaning::ingestion::{load_from_path, IngestionOptions, TracingObserver};
use rust_data_cleaning::planning::{suggest_plan, SuggestedPlan};
use rust_data_cleaning::profiling::{profile, DatasetProfile};

use crate::cli::{CleanArgs, InputArgs};

pub fn run_clean(args: &CleanArgs) -> CleanEnvelope {
    CleanEnvelope::from_result(clean(&args.input, &args.output, &args.plan).map_err(|e| format!("{e:#}")))
}

pub fn run_profile(args: &InputArgs) -> ProfileEnvelope {
    ProfileEnvelope::from_result(profile_file(&args.input).map_err(|e| format!("{e:#}")))
}

pub fn run_plan(args: &InputArgs) -> PlanEnvelope {
    PlanEnvelope::from_result(suggest_for_file(&args.input).map_err(|e| format!("{e:#}")))
}

fn clean(input: &Path, output: &Path, plan_source: &str) -> Result<Report> {
    let span = info_span!("clean", input = %input.display());
    let _guard = span.enter();

    let plan = Plan::from_source(plan_source).context("load cleaning plan")?;
    let dataset = load_from_path(input, &ingestion_options())?;

    let executor = CleaningExecutor::new();
    let outcome = executor.apply(&dataset, &plan);
    let written = save_to_path(&outcome.dataset, output)
        .with_context(|| format!("save {}", output.display()))?;

    info!(
        output = %written.display(),
        rows = outcome.dataset.row_count(),
        metrics = %executor.metrics().snapshot(),
        "clean finished"
    );
    Ok(outcome.report)
}

fn profile_file(input: &Path) -> Result<DatasetProfile> {
    let span = info_span!("profile", input = %input.display());
    let _guard = span.enter();

    let dataset = load_from_path(input, &ingestion_options())?;
    Ok(profile(&dataset))
}

fn suggest_for_file(input: &Path) -> Result<SuggestedPlan> {
    let span = info_span!("plan", input = %input.display());
    let _guard = span.enter();

    let dataset = load_from_path(input, &ingestion_options())?;
    let plan = suggest_plan(&profile(&dataset));
    info!(steps = plan.len(), "plan suggested");
    Ok(plan)
}

fn ingestion_options() -> IngestionOptions {
    IngestionOptions {
        observer: Some(std::sync::Arc::new(TracingObserver)),
        ..IngestionOptions::default()
    }
}
