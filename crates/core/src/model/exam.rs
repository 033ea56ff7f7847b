use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ExamId, QuestionId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

/// Reasons a catalog entry is rejected on import.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExamDefinitionError {
    #[error("exam id must not be blank")]
    BlankId,

    #[error("exam {0} has no exercises")]
    NoExercises(ExamId),

    #[error("question {question} appears more than once in exam {exam}")]
    DuplicateQuestion { exam: ExamId, question: QuestionId },
}

//
// ─── DEFINITION ───────────────────────────────────────────────────────────────
//

/// One question of an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub statement: String,
}

/// A grouped set of questions within an exam paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub points: u32,
    pub questions: Vec<Question>,
}

/// A past exam paper ("annale") as stored in the catalog.
///
/// The tracker never mutates definitions; it only counts their questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDefinition {
    pub id: ExamId,
    pub title: String,
    pub year: u16,
    /// Official allotted time for the paper.
    pub duration_minutes: u32,
    pub exercises: Vec<Exercise>,
}

impl ExamDefinition {
    /// Total number of questions across all exercises.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.exercises.iter().map(|e| e.questions.len()).sum()
    }

    #[must_use]
    pub fn exercise_count(&self) -> usize {
        self.exercises.len()
    }

    /// Checks that the definition can be served by the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ExamDefinitionError` if the id is blank, there are no exercises,
    /// or a question id is reused within the paper.
    pub fn validate(&self) -> Result<(), ExamDefinitionError> {
        if self.id.as_str().trim().is_empty() {
            return Err(ExamDefinitionError::BlankId);
        }
        if self.exercises.is_empty() {
            return Err(ExamDefinitionError::NoExercises(self.id.clone()));
        }

        let mut seen = HashSet::new();
        for question in self.exercises.iter().flat_map(|e| &e.questions) {
            if !seen.insert(&question.id) {
                return Err(ExamDefinitionError::DuplicateQuestion {
                    exam: self.id.clone(),
                    question: question.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(id: &str, questions: &[&str]) -> Exercise {
        Exercise {
            id: id.to_owned(),
            title: String::new(),
            points: 20,
            questions: questions
                .iter()
                .map(|q| Question {
                    id: QuestionId::new(*q),
                    statement: String::new(),
                })
                .collect(),
        }
    }

    fn definition(exercises: Vec<Exercise>) -> ExamDefinition {
        ExamDefinition {
            id: ExamId::new("brevet-2023-metropole"),
            title: "Métropole 2023".to_owned(),
            year: 2023,
            duration_minutes: 120,
            exercises,
        }
    }

    #[test]
    fn counts_questions_across_exercises() {
        let def = definition(vec![
            exercise("ex1", &["1a", "1b"]),
            exercise("ex2", &["2a", "2b", "2c"]),
        ]);
        assert_eq!(def.question_count(), 5);
        assert_eq!(def.exercise_count(), 2);
        assert!(def.validate().is_ok());
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let def = definition(vec![exercise("ex1", &["q"]), exercise("ex2", &["q"])]);
        assert!(matches!(
            def.validate(),
            Err(ExamDefinitionError::DuplicateQuestion { .. })
        ));
    }

    #[test]
    fn rejects_empty_papers_and_blank_ids() {
        assert!(matches!(
            definition(Vec::new()).validate(),
            Err(ExamDefinitionError::NoExercises(_))
        ));

        let mut blank = definition(vec![exercise("ex1", &["q"])]);
        blank.id = ExamId::new("  ");
        assert_eq!(blank.validate(), Err(ExamDefinitionError::BlankId));
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let json = r#"{
            "id": "brevet-2022-asie",
            "title": "Asie 2022",
            "year": 2022,
            "duration_minutes": 120,
            "exercises": [{ "id": "ex1", "questions": [{ "id": "1" }] }]
        }"#;
        let def: ExamDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.exercises[0].points, 0);
        assert_eq!(def.question_count(), 1);
    }
}
