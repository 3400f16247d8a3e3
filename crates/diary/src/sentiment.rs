//! Sentiment polarity scoring.
//!
//! Polarity is a value in `[-1.0, 1.0]`: negative for unhappy text, positive
//! for happy text, `0.0` when nothing opinionated is found.

use std::collections::HashMap;

/// Scores the polarity of a piece of text.
pub trait SentimentScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f32;
}

/// Tokens a modifier can reach ahead before it expires.
const MODIFIER_REACH: usize = 3;

/// Factor applied to a negated polarity. Negation softens and flips rather
/// than mirroring, so "not great" is mildly negative.
const NEGATION_FACTOR: f32 = -0.5;

const POLARITY: &[(&str, f32)] = &[
    // positive
    ("wonderful", 1.0),
    ("excellent", 1.0),
    ("perfect", 1.0),
    ("awesome", 1.0),
    ("best", 1.0),
    ("fantastic", 0.9),
    ("beautiful", 0.85),
    ("happy", 0.8),
    ("great", 0.8),
    ("proud", 0.8),
    ("grateful", 0.8),
    ("joyful", 0.8),
    ("delighted", 0.7),
    ("cheerful", 0.7),
    ("good", 0.7),
    ("loved", 0.7),
    ("pleasant", 0.7),
    ("amazing", 0.6),
    ("nice", 0.6),
    ("excited", 0.5),
    ("glad", 0.5),
    ("lovely", 0.5),
    ("love", 0.5),
    ("better", 0.5),
    ("enjoyed", 0.4),
    ("fun", 0.3),
    ("calm", 0.3),
    ("relaxed", 0.3),
    ("peaceful", 0.25),
    ("relaxing", 0.2),
    ("content", 0.2),
    ("okay", 0.1),
    // negative
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("miserable", -1.0),
    ("worst", -1.0),
    ("boring", -1.0),
    ("hated", -0.9),
    ("hate", -0.8),
    ("disappointed", -0.75),
    ("bad", -0.7),
    ("sick", -0.7),
    ("mad", -0.6),
    ("furious", -0.6),
    ("unhappy", -0.6),
    ("depressed", -0.6),
    ("upset", -0.6),
    ("sad", -0.5),
    ("lonely", -0.5),
    ("bored", -0.5),
    ("angry", -0.5),
    ("frustrated", -0.4),
    ("frustrating", -0.4),
    ("annoyed", -0.4),
    ("annoying", -0.4),
    ("irritated", -0.4),
    ("tired", -0.4),
    ("stressed", -0.4),
    ("slow", -0.3),
    ("worried", -0.3),
    ("hurt", -0.3),
    ("anxious", -0.25),
];

const INTENSIFIERS: &[(&str, f32)] = &[
    ("extremely", 1.5),
    ("incredibly", 1.5),
    ("really", 1.3),
    ("very", 1.3),
    ("so", 1.3),
    ("super", 1.3),
    ("quite", 1.1),
    ("somewhat", 0.7),
    ("slightly", 0.5),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "cannot", "nothing", "hardly"];

/// Lexicon-based scorer with intensifiers and negation.
///
/// Each opinion word contributes its polarity, scaled by a preceding
/// intensifier and flipped by a preceding negation; the text scores the mean
/// of those contributions.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    polarity: HashMap<String, f32>,
    intensifiers: HashMap<String, f32>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            polarity: POLARITY.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
            intensifiers: INTENSIFIERS.iter().map(|(w, f)| (w.to_string(), *f)).collect(),
        }
    }

    fn is_negation(token: &str) -> bool {
        NEGATIONS.contains(&token) || token.ends_with("n't")
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl SentimentScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f32 {
        let mut scores = Vec::new();
        let mut intensity = 1.0f32;
        let mut negated = false;
        let mut since_modifier = 0usize;

        for token in tokenize(text) {
            if Self::is_negation(&token) {
                negated = true;
                since_modifier = 0;
                continue;
            }
            if let Some(factor) = self.intensifiers.get(&token) {
                intensity *= factor;
                since_modifier = 0;
                continue;
            }

            if let Some(polarity) = self.polarity.get(&token) {
                let mut score = polarity * intensity;
                if negated {
                    score *= NEGATION_FACTOR;
                }
                scores.push(score.clamp(-1.0, 1.0));
                intensity = 1.0;
                negated = false;
                continue;
            }

            since_modifier += 1;
            if since_modifier >= MODIFIER_REACH {
                intensity = 1.0;
                negated = false;
            }
        }

        if scores.is_empty() {
            return 0.0;
        }

        let mean = scores.iter().sum::<f32>() / scores.len() as f32;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(text: &str) -> f32 {
        LexiconScorer::new().polarity(text)
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        assert_eq!(score(""), 0.0);
        assert_eq!(score("June 01, 2024:\nWent to the store and bought milk."), 0.0);
    }

    #[test]
    fn test_strongly_positive() {
        assert!(score("June 01, 2024:\nI had a wonderful day at the park!") > 0.5);
        assert!(score("So happy, it was a great afternoon") > 0.5);
    }

    #[test]
    fn test_strongly_negative() {
        assert!(score("I felt terrible and miserable today.") < -0.5);
    }

    #[test]
    fn test_mildly_negative() {
        let s = score("I was annoyed at the slow traffic.");
        assert!((-0.5..0.0).contains(&s), "got {}", s);
    }

    #[test]
    fn test_mildly_positive() {
        let s = score("A calm evening reading by the window.");
        assert!((0.0..=0.5).contains(&s), "got {}", s);
    }

    #[test]
    fn test_negation_flips_and_softens() {
        let s = score("I was not happy with the result");
        assert!(s < 0.0 && s > -0.5, "got {}", s);

        let s = score("The movie wasn't bad");
        assert!(s > 0.0, "got {}", s);
    }

    #[test]
    fn test_intensifier_scales_and_clamps() {
        assert!(score("very nice") > score("nice"));
        assert_eq!(score("extremely wonderful"), 1.0);
    }

    #[test]
    fn test_modifier_expires() {
        // "not" is too far from "happy" to apply
        assert!(score("not at all in the mood, but happy") > 0.5);
    }

    #[test]
    fn test_curly_apostrophe_negation() {
        assert!(score("I didn\u{2019}t feel good") < 0.0);
    }

    #[test]
    fn test_polarity_bounds() {
        let scorer = LexiconScorer::new();
        for text in ["awful awful awful", "best best best", "so so so so so happy"] {
            let s = scorer.polarity(text);
            assert!((-1.0..=1.0).contains(&s));
        }
    }
}
