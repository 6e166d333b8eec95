//! Content Catalog
//!
//! Static lookup tables for the practice service: the interview types and
//! difficulties a user can pick, the topics offered for each type, the fixed
//! interviewer lines, and the text of the instructions page.

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest input that is matched fuzzily against topic names.
const MIN_FUZZY_CHARS: usize = 3;

/// The kind of interview being practiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewType {
    Coding,
    SystemDesign,
    Behavioral,
    Sql,
}

impl InterviewType {
    pub const ALL: [InterviewType; 4] = [
        InterviewType::Coding,
        InterviewType::SystemDesign,
        InterviewType::Behavioral,
        InterviewType::Sql,
    ];

    /// The topics a user may choose for this interview type.
    pub fn topics(self) -> &'static [&'static str] {
        match self {
            InterviewType::Coding => &[
                "Arrays",
                "Linked Lists",
                "Trees",
                "Graphs",
                "Dynamic Programming",
            ],
            InterviewType::SystemDesign => &[
                "Distributed Systems",
                "Scalability",
                "Database Design",
                "Caching",
            ],
            InterviewType::Behavioral => &[
                "Leadership",
                "Teamwork",
                "Conflict Resolution",
                "Problem Solving",
            ],
            InterviewType::Sql => &[
                "Joins",
                "Aggregation",
                "Window Functions",
                "Subqueries",
                "Indexing",
            ],
        }
    }

    /// Label for the free-form area where the candidate works on the problem.
    pub fn solution_label(self) -> &'static str {
        match self {
            InterviewType::Coding => "Write your code here",
            InterviewType::SystemDesign => "Write your system design here",
            InterviewType::Behavioral => "Write your behavioral responses here",
            InterviewType::Sql => "Write your query here",
        }
    }

    /// Resolves user input to the canonical catalog topic for this type.
    ///
    /// Exact (case-insensitive) matches win. Otherwise the best fuzzy match is
    /// taken, so "dynamc programming" still lands on "Dynamic Programming".
    /// Inputs shorter than three characters only match exactly. Returns `None`
    /// when nothing in the catalog resembles the input.
    pub fn resolve_topic(self, input: &str) -> Option<&'static str> {
        let needle = input.trim();
        if needle.is_empty() {
            return None;
        }

        let topics = self.topics();
        if let Some(exact) = topics.iter().find(|t| t.eq_ignore_ascii_case(needle)) {
            return Some(exact);
        }
        if needle.chars().count() < MIN_FUZZY_CHARS {
            return None;
        }

        let matcher = SkimMatcherV2::default().ignore_case();
        topics
            .iter()
            .filter_map(|topic| {
                // Input may be a shorthand of the topic ("dyn prog") or a
                // longer phrase containing it ("binary trees").
                let forward = matcher.fuzzy_match(topic, needle);
                let backward = matcher.fuzzy_match(needle, topic);
                forward.max(backward).map(|score| (score, *topic))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, topic)| topic)
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterviewType::Coding => write!(f, "coding"),
            InterviewType::SystemDesign => write!(f, "system design"),
            InterviewType::Behavioral => write!(f, "behavioral"),
            InterviewType::Sql => write!(f, "sql"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Interviewer line used to open every session.
pub const START_MESSAGE: &str = "Let's begin the interview. I'll present a problem, and you can ask questions or provide your solution.";

/// Interviewer line used when the candidate ends the session.
pub const END_MESSAGE: &str =
    "Thank you for participating in this interview. I'll provide feedback shortly.";

/// The full greeting an interviewer opens with.
pub fn greeting() -> String {
    format!("Hello! I'm your AI interviewer. {}", START_MESSAGE)
}

/// The sections of the instructions page, in display order.
#[derive(Debug, Clone, Serialize)]
pub struct Instructions {
    pub introduction: &'static str,
    pub quick_start: &'static str,
    pub interface: &'static str,
    pub models: &'static str,
    pub acknowledgements: &'static str,
    pub legal: &'static str,
}

pub const INSTRUCTIONS: Instructions = Instructions {
    introduction: "Welcome to the AI Interviewer! This service lets you rehearse technical and behavioral interviews against a simulated interviewer.",
    quick_start: "Pick an interview type, a topic and a difficulty, accept the terms of use, then generate a problem. Talk it through with the interviewer and finish the interview to receive feedback.",
    interface: "Send text messages, or record audio and process it to have it transcribed and sent. The interviewer replies to every message. Finishing the interview locks the conversation and produces a feedback summary.",
    models: "Problems, replies and feedback come from a language model. Replies can be read aloud by a speech synthesizer and recorded answers are transcribed by a speech recognizer. The status of each is shown alongside these instructions.",
    acknowledgements: "Thanks to the open-source projects this service is built on.",
    legal: "Generated problems and feedback are for practice only. Do not submit confidential or personal information. By generating a problem you agree to the terms and conditions.",
};
