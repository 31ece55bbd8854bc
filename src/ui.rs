//! Heads-up display state
//!
//! The HUD never reads the controller directly; it folds the score and
//! remaining-count events it is sent, plus the final score at session end.

use serde::Serialize;

use crate::sim::GameEvent;

/// End-of-session verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    NoScore,
    Fair,
    Good,
    Great,
    Perfect,
}

impl Rating {
    pub fn message(&self) -> &'static str {
        match self {
            Rating::NoScore => "Better luck next time!",
            Rating::Fair => "Good effort!",
            Rating::Good => "Well done!",
            Rating::Great => "Excellent job!",
            Rating::Perfect => "Perfect score! Amazing!",
        }
    }
}

/// Rate a final score against the session quota
pub fn rating_for(score: u32, quota: u32) -> Rating {
    match score {
        0 => Rating::NoScore,
        s if s < 3 => Rating::Fair,
        s if s < 7 => Rating::Good,
        s if s < quota => Rating::Great,
        _ => Rating::Perfect,
    }
}

/// What the overlay shows
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub score: u32,
    pub apples_remaining: u32,
    pub quota: u32,
    /// Set once the session has reported its final score
    pub final_score: Option<u32>,
}

impl Hud {
    pub fn new(quota: u32) -> Self {
        Self {
            score: 0,
            apples_remaining: quota,
            quota,
            final_score: None,
        }
    }

    /// Update from one frame's events
    pub fn apply(&mut self, events: &[GameEvent]) {
        for event in events {
            match *event {
                GameEvent::ScoreChanged { score } => self.score = score,
                GameEvent::RemainingChanged { remaining } => self.apples_remaining = remaining,
                GameEvent::SessionEnded { score } => {
                    self.score = score;
                    self.final_score = Some(score);
                }
                _ => {}
            }
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    pub fn apples_text(&self) -> String {
        format!("Apples: {}", self.apples_remaining)
    }

    /// Final score line and rating, once the session is over
    pub fn summary(&self) -> Option<(String, &'static str)> {
        self.final_score.map(|score| {
            (
                format!("Final Score: {} / {}", score, self.quota),
                rating_for(score, self.quota).message(),
            )
        })
    }
}
