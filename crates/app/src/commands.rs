use std::io::Write;

use brevet_core::model::{ExamDefinition, ExamResult, SessionStatus};
use brevet_core::{format_duration, remaining_time};
use services::{CatalogService, ExamSessionTracker};

use crate::cli::Command;
use crate::error::AppError;

/// Runs one subcommand against the tracker and writes a human-readable report to `out`.
pub async fn execute(
    command: Command,
    catalog: &CatalogService,
    tracker: &mut ExamSessionTracker,
    out: &mut impl Write,
) -> Result<(), AppError> {
    match command {
        Command::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let exams: Vec<ExamDefinition> = serde_json::from_str(&raw)?;
            let count = catalog.import(&exams).await?;
            writeln!(out, "imported {count} exam(s) from {}", file.display())?;
        }
        Command::List => {
            for exam in catalog.list().await? {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{} questions\t{} min",
                    exam.id,
                    exam.year,
                    exam.title,
                    exam.question_count(),
                    exam.duration_minutes
                )?;
            }
        }
        Command::Start { exam_id } => match tracker.start_exam(&exam_id).await? {
            Some(exam) => writeln!(
                out,
                "started {} ({} exercises, {} min)",
                exam.id,
                exam.exercise_count(),
                exam.duration_minutes
            )?,
            None => writeln!(out, "unknown exam: {exam_id}")?,
        },
        Command::Answer { question_id, text } => {
            tracker.save_answer(question_id, text).await?;
            write_progress(tracker, out).await?;
        }
        Command::Flag { question_id } => {
            tracker.toggle_flag(question_id.clone()).await?;
            let flagged = tracker
                .session()
                .answer(&question_id)
                .is_some_and(|a| a.flagged);
            let label = if flagged { "flagged" } else { "unflagged" };
            writeln!(out, "{question_id} {label}")?;
        }
        Command::Exercise { index } => {
            tracker.set_current_exercise(index).await?;
            writeln!(out, "current exercise: {}", index.saturating_add(1))?;
        }
        Command::Elapsed { seconds } => {
            tracker.update_elapsed_time(seconds).await?;
            writeln!(out, "elapsed: {}", format_duration(seconds))?;
        }
        Command::Pause => {
            tracker.pause_exam().await?;
            writeln!(out, "paused")?;
        }
        Command::Resume => {
            tracker.resume_exam().await?;
            writeln!(out, "resumed")?;
        }
        Command::Finish { score } => match tracker.finish_exam(score).await {
            Ok(Some(result)) => write_result(&result, out)?,
            Ok(None) => writeln!(out, "no exam in progress")?,
            Err(err) => {
                // Report the attempt before surfacing the storage failure.
                if let Some(result) = err.unsaved_result() {
                    write_result(result, out)?;
                }
                return Err(err.into());
            }
        },
        Command::Cancel => {
            tracker.cancel_exam().await?;
            writeln!(out, "cancelled")?;
        }
        Command::Status => write_status(tracker, out).await?,
        Command::Stats => {
            let stats = tracker.exam_stats();
            writeln!(
                out,
                "exams: {}\taverage: {}\tbest: {}",
                stats.total_exams, stats.average_score, stats.best_score
            )?;
        }
        Command::History => {
            for result in tracker.history() {
                writeln!(
                    out,
                    "{}\t{}\t{}/100\t{}",
                    result.completed_at.format("%Y-%m-%d %H:%M"),
                    result.exam_id,
                    result.score,
                    format_duration(result.total_time)
                )?;
            }
        }
    }
    Ok(())
}

fn write_result(result: &ExamResult, out: &mut impl Write) -> Result<(), AppError> {
    writeln!(
        out,
        "recorded {}: {}/100 in {}",
        result.exam_id,
        result.score,
        format_duration(result.total_time)
    )?;
    Ok(())
}

async fn write_progress(
    tracker: &ExamSessionTracker,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let progress = tracker.exam_progress().await?;
    writeln!(
        out,
        "answered {}/{} ({} flagged)",
        progress.answered, progress.total, progress.flagged
    )?;
    Ok(())
}

async fn write_status(tracker: &ExamSessionTracker, out: &mut impl Write) -> Result<(), AppError> {
    let session = tracker.session();
    let state = match tracker.status() {
        SessionStatus::Idle => {
            writeln!(out, "no exam in progress")?;
            return Ok(());
        }
        SessionStatus::Active => "running",
        SessionStatus::Paused => "paused",
    };

    let exam = tracker.current_annale().await?;
    let title = exam.as_ref().map_or("(not in catalog)", |e| e.title.as_str());
    let exam_id = session
        .current_exam_id()
        .map(ToString::to_string)
        .unwrap_or_default();
    writeln!(out, "{exam_id} {title} [{state}]")?;
    writeln!(
        out,
        "exercise {}\telapsed {}",
        session.current_exercise_index().saturating_add(1),
        format_duration(session.elapsed_time())
    )?;
    if let Some(exam) = &exam {
        let left = remaining_time(session.elapsed_time(), exam.duration_minutes);
        writeln!(out, "remaining {}", format_duration(left))?;
    }
    write_progress(tracker, out).await
}
