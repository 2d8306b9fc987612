//! Turns aggregated results into chart-ready summaries.
//!
//! Rendering never fails: results that carry nothing to draw become
//! [`Summary::Empty`].

use std::fmt::{Display, Formatter};

use crate::model::{
    question::{Question, MAX_RATING},
    results::{AggregatedResult, QuestionResult, SurveyResults},
};

/// Axis labels longer than this many characters are shortened.
pub const AXIS_LABEL_LEN: usize = 15;

/// Width of the text gauge drawn for the largest bar.
const GAUGE_WIDTH: usize = 20;

/// What to draw for one question.
#[derive(Debug, Clone, PartialEq)]
pub enum Summary {
    /// Nothing to draw yet.
    Empty,
    /// One bar per option.
    Bars(ChoiceChart),
    /// Ratings histogram plus the average.
    Histogram(RatingChart),
    /// Number of text answers. The answers themselves are never shown.
    Count(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// The full option label, for the stat list.
    pub label: String,
    /// The label shown under the bar.
    pub axis_label: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceChart {
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatingChart {
    pub average: f64,
    /// Number of responses for each rating from 1 up to [`MAX_RATING`].
    pub bars: [u64; MAX_RATING as usize],
}

impl RatingChart {
    /// The average rounded to one decimal place, halves away from zero.
    pub fn rounded_average(&self) -> f64 {
        (self.average * 10.0).round() / 10.0
    }
}

/// Shorten `label` to [`AXIS_LABEL_LEN`] characters followed by `...` if it is
/// any longer.
pub fn axis_label(label: &str) -> String {
    if label.chars().count() > AXIS_LABEL_LEN {
        let mut short = label.chars().take(AXIS_LABEL_LEN).collect::<String>();
        short.push_str("...");
        short
    } else {
        label.to_string()
    }
}

/// Decide what to draw for one question's results.
///
/// Choice bars follow the declared option order of `question` when it is
/// given, and the order of the results payload otherwise. Blank options get
/// no bar.
pub fn render(result: &QuestionResult, question: Option<&Question>) -> Summary {
    match &result.results {
        AggregatedResult::Choice(counts) => {
            let bars = match question.and_then(Question::options) {
                Some(options) => {
                    let mut bars: Vec<Bar> = Vec::with_capacity(options.len());
                    for option in options {
                        if option.trim().is_empty()
                            || bars.iter().any(|bar| &bar.label == option)
                        {
                            continue;
                        }
                        let count = counts
                            .iter()
                            .find(|(label, _)| label == option)
                            .map_or(0, |(_, count)| *count);
                        bars.push(bar(option, count));
                    }
                    bars
                }
                None => counts
                    .iter()
                    .filter(|(label, _)| !label.trim().is_empty())
                    .map(|(label, count)| bar(label, *count))
                    .collect(),
            };
            if bars.iter().all(|bar| bar.count == 0) {
                Summary::Empty
            } else {
                Summary::Bars(ChoiceChart { bars })
            }
        }
        AggregatedResult::Rating(summary) => {
            if summary.distribution.is_empty() {
                return Summary::Empty;
            }
            let mut bars = [0; MAX_RATING as usize];
            for (rating, bar) in (1..=MAX_RATING).zip(bars.iter_mut()) {
                *bar = summary.distribution.get(&rating).copied().unwrap_or_default();
            }
            Summary::Histogram(RatingChart {
                average: summary.average,
                bars,
            })
        }
        AggregatedResult::Text(summary) => match summary.count {
            Some(count) => Summary::Count(count),
            None => Summary::Empty,
        },
    }
}

fn bar(label: &str, count: u64) -> Bar {
    Bar {
        label: label.to_string(),
        axis_label: axis_label(label),
        count,
    }
}

/// One rendered question of a results report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedQuestion {
    pub question_index: usize,
    pub question_text: String,
    pub summary: Summary,
}

/// A whole survey's results, ready to display.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub title: String,
    pub total_responses: u64,
    pub questions: Vec<RenderedQuestion>,
}

/// Render every question of `results`. `questions` supplies the declared
/// option order where the survey definition is at hand.
pub fn render_results(results: &SurveyResults, questions: Option<&[Question]>) -> Report {
    let questions = results
        .aggregated_results
        .iter()
        .map(|result| {
            let question = questions.and_then(|qs| qs.get(result.question_index));
            RenderedQuestion {
                question_index: result.question_index,
                question_text: result.question_text.clone(),
                summary: render(result, question),
            }
        })
        .collect();
    Report {
        title: results.title.clone(),
        total_responses: results.total_responses,
        questions,
    }
}

/// A bar of `count` scaled so that `max` fills the whole gauge.
fn gauge(count: u64, max: u64) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((count as f64 / max as f64) * GAUGE_WIDTH as f64).round() as usize
    };
    format!("{}{}", "█".repeat(filled), " ".repeat(GAUGE_WIDTH - filled))
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => writeln!(f, "No responses yet"),
            Self::Bars(chart) => {
                let max = chart.bars.iter().map(|bar| bar.count).max().unwrap_or(0);
                for bar in &chart.bars {
                    writeln!(
                        f,
                        "{:<width$} |{}| {}",
                        bar.axis_label,
                        gauge(bar.count, max),
                        bar.count,
                        width = AXIS_LABEL_LEN + 3
                    )?;
                }
                for bar in &chart.bars {
                    writeln!(f, "  {}: {} votes", bar.label, bar.count)?;
                }
                Ok(())
            }
            Self::Histogram(chart) => {
                writeln!(f, "Average rating: {:.1} ★", chart.rounded_average())?;
                let max = chart.bars.iter().copied().max().unwrap_or(0);
                for (rating, count) in (1..=MAX_RATING).zip(chart.bars) {
                    writeln!(
                        f,
                        "{:<5} |{}| {count} responses",
                        "★".repeat(rating.into()),
                        gauge(count, max)
                    )?;
                }
                Ok(())
            }
            Self::Count(count) => writeln!(f, "{count} text responses"),
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let noun = if self.total_responses == 1 {
            "Response"
        } else {
            "Responses"
        };
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{} {noun}", self.total_responses)?;
        for question in &self.questions {
            writeln!(f)?;
            writeln!(
                f,
                "Question {}: {}",
                question.question_index + 1,
                question.question_text
            )?;
            write!(f, "{}", question.summary)?;
        }
        Ok(())
    }
}
