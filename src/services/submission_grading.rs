use std::time::Instant;

use anyhow::{Context, Result};

use crate::domain::answer_key::AnswerMap;
use crate::grading::{assembler, bands};
use crate::schemas::breakdown::GradingRecord;
use crate::services::session_store::SessionStore;

/// Entry point for the submit path. Re-derives the full breakdown from the
/// current stored answers on every call; any previously cached record is
/// ignored, so retried submissions cannot double-count or drift.
pub async fn grade_and_persist(
    store: &dyn SessionStore,
    session_id: &str,
    final_patch: Option<AnswerMap>,
) -> Result<GradingRecord> {
    let started = Instant::now();
    match run(store, session_id, final_patch).await {
        Ok(record) => {
            metrics::counter!("grading_runs_total", "status" => "success").increment(1);
            metrics::histogram!("grading_run_duration_seconds")
                .record(started.elapsed().as_secs_f64());
            Ok(record)
        }
        Err(err) => {
            metrics::counter!("grading_runs_total", "status" => "failed").increment(1);
            Err(err)
        }
    }
}

async fn run(
    store: &dyn SessionStore,
    session_id: &str,
    final_patch: Option<AnswerMap>,
) -> Result<GradingRecord> {
    // Single-writer discipline: held until the record is persisted, so a
    // concurrent sync cannot land between the read and the upsert.
    let _submit_lock =
        store.lock_session(session_id).await.context("Failed to take submit lock")?;

    if let Some(patch) = final_patch.filter(|patch| !patch.is_empty()) {
        store
            .merge_answers(session_id, patch)
            .await
            .context("Failed to merge last-moment answers")?;
    }

    let session =
        store.load_session(session_id).await.context("Failed to load session")?;
    let test =
        store.load_test(&session.test_id).await.context("Failed to load test definition")?;

    let breakdown = assembler::assemble(&test, &session.answers);
    let band_score =
        bands::table_for(test.module).convert(breakdown.raw_score, breakdown.total_score);
    let record = GradingRecord {
        raw_score: breakdown.raw_score,
        total_score: breakdown.total_score,
        band_score,
        breakdown,
    };

    store
        .upsert_result(session_id, &record)
        .await
        .context("Failed to persist grading record")?;

    tracing::info!(
        session_id,
        test_id = %test.id,
        module = test.module.as_str(),
        raw_score = record.raw_score,
        total_score = record.total_score,
        band_score = record.band_score,
        "Graded submission"
    );

    Ok(record)
}
