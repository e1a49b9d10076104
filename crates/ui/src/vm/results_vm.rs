use services::SubmissionOutcome;

use crate::vm::html::sanitize_html;
use crate::vm::time_fmt::format_clock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewVm {
    pub number: usize,
    pub question_html: String,
    pub images: Vec<String>,
    pub your_answer_html: String,
    /// Shown only when the selection missed the key.
    pub correct_answer_html: Option<String>,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub title: String,
    pub raw_score: String,
    pub comment: String,
    pub percentage: u32,
    pub timed_out: bool,
    pub time_taken: Option<String>,
    pub reviews: Vec<ReviewVm>,
}

impl From<&SubmissionOutcome> for ResultsVm {
    fn from(outcome: &SubmissionOutcome) -> Self {
        let document = &outcome.document;
        let reviews = outcome
            .card
            .reviews
            .iter()
            .filter_map(|review| {
                let question = document.question(review.index)?;
                let your_answer_html = review
                    .selected
                    .and_then(|i| question.option(i))
                    .map_or_else(|| "No answer".to_string(), sanitize_html);
                Some(ReviewVm {
                    number: review.index + 1,
                    question_html: sanitize_html(&question.q),
                    images: question.image_sources().into_iter().map(String::from).collect(),
                    your_answer_html,
                    correct_answer_html: (!review.matches_key)
                        .then(|| question.correct_option().map(sanitize_html))
                        .flatten(),
                    is_correct: review.matches_key,
                })
            })
            .collect();

        Self {
            title: outcome.result.title(),
            raw_score: outcome.raw_score(),
            comment: outcome.comment(),
            percentage: outcome.result.percentage,
            timed_out: outcome.timed_out,
            time_taken: outcome.result.time_taken.map(format_clock),
            reviews,
        }
    }
}
