use std::collections::HashMap;

use crate::models::attempt::{GradedAnswer, Score};
use crate::models::question::{Question, QuestionId};

pub struct GradingService;

impl GradingService {
    /// Exact, case-sensitive comparison after trimming both sides. A
    /// missing answer never matches, not even an empty correct answer.
    pub fn is_correct(question: &Question, given: Option<&str>) -> bool {
        match given {
            Some(answer) => answer.trim() == question.correct_answer.trim(),
            None => false,
        }
    }

    /// `total_count` is the size of the question set, not the number of
    /// answered questions.
    pub fn score(questions: &[Question], answers: &HashMap<QuestionId, String>) -> Score {
        let mut correct_count = 0;
        let mut earned_points = 0.0;
        let mut max_points = 0.0;
        let mut graded = Vec::with_capacity(questions.len());

        for q in questions {
            let given = answers.get(&q.id).map(String::as_str);
            let is_correct = Self::is_correct(q, given);
            let points_earned = if is_correct { q.points } else { 0.0 };

            max_points += q.points;
            if is_correct {
                correct_count += 1;
                earned_points += points_earned;
            }

            graded.push(GradedAnswer {
                question_id: q.id.clone(),
                question_text: q.question_text.clone(),
                given_answer: given.map(str::to_string),
                correct_answer: q.correct_answer.clone(),
                is_correct,
                points_earned,
                max_points: q.points,
                explanation: q.explanation.clone(),
            });
        }

        Score {
            correct_count,
            total_count: questions.len(),
            earned_points,
            max_points,
            graded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, &str)]) -> HashMap<QuestionId, String> {
        pairs
            .iter()
            .map(|(k, v)| (QuestionId::from(*k), v.to_string()))
            .collect()
    }

    fn two_questions() -> Vec<Question> {
        vec![
            Question::short_answer("1", "First", "A"),
            Question::short_answer("2", "Second", "B"),
        ]
    }

    #[test]
    fn wrong_case_does_not_match() {
        let score = GradingService::score(&two_questions(), &answers(&[("1", "A"), ("2", "c")]));
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total_count, 2);
        assert!(!GradingService::is_correct(&two_questions()[1], Some("b")));
    }

    #[test]
    fn whitespace_is_trimmed_and_missing_answers_fail() {
        let score = GradingService::score(&two_questions(), &answers(&[("1", " A ")]));
        assert_eq!(score.correct_count, 1);
        assert_eq!(score.total_count, 2);
        assert_eq!(score.graded[1].given_answer, None);
        assert!(!score.graded[1].is_correct);
    }

    #[test]
    fn missing_answer_never_matches_an_empty_key() {
        let q = Question::short_answer("1", "Blank key", "");
        assert!(!GradingService::is_correct(&q, None));
        assert!(GradingService::is_correct(&q, Some("  ")));
    }

    #[test]
    fn points_follow_correct_answers() {
        let mut qs = two_questions();
        qs[0].points = 2.0;
        let score = GradingService::score(&qs, &answers(&[("1", "A"), ("2", "B")]));
        assert_eq!(score.earned_points, 3.0);
        assert_eq!(score.max_points, 3.0);
        assert_eq!(score.percentage(), 100.0);
    }
}
