use std::path::PathBuf;

use brevet_core::model::{ExamId, QuestionId};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "brevet",
    version,
    about = "Practise past brevet maths papers and keep track of attempts"
)]
pub struct Cli {
    /// SQLite URL (overrides BREVET_DB_URL)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Storage key of the tracker snapshot (overrides BREVET_NAMESPACE)
    #[arg(long, global = true)]
    pub namespace: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Import exam definitions from a JSON array
    Import { file: PathBuf },
    /// List the annales in the catalog
    List,
    /// Start an exam, discarding any unfinished attempt
    Start { exam_id: ExamId },
    /// Record or revise an answer
    Answer { question_id: QuestionId, text: String },
    /// Toggle the review flag on a question
    Flag { question_id: QuestionId },
    /// Move to an exercise (0-based)
    Exercise { index: usize },
    /// Report the elapsed exam time in seconds
    Elapsed { seconds: u32 },
    Pause,
    Resume,
    /// Record the active exam with a score out of 100
    Finish {
        #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
        score: u32,
    },
    /// Drop the active exam without recording it
    Cancel,
    /// Show the active exam and its progress
    Status,
    /// Show aggregate scores
    Stats,
    /// List finished attempts
    History,
}
