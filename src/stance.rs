// Stance extraction from the user role's self-report
//
// The user role is told to open every reply with `[新的立场强度 L: x]`. Model
// output drifts, so extraction is total: every input yields a finite value in
// [MIN_STANCE, MAX_STANCE], falling back to the previous stance (or the
// neutral midpoint) when the report is missing or malformed.

use once_cell::sync::Lazy;
use regex::Regex;

/// Lowest reportable stance
pub const MIN_STANCE: f64 = 1.0;

/// Highest reportable stance
pub const MAX_STANCE: f64 = 10.0;

/// Used when no stance has been observed yet, or the payload is unusable
pub const NEUTRAL_STANCE: f64 = 5.5;

/// Label the user role must print before its stance value
pub const STANCE_LABEL: &str = "新的立场强度 L:";

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    build_pattern(STANCE_LABEL).expect("built-in stance pattern must compile")
});

fn build_pattern(label: &str) -> Result<Regex, regex::Error> {
    // Only unsigned numbers match: "L: -3]" is a miss, not a clamp to 1.0.
    Regex::new(&format!(r"\[{}\s*(\d{{1,2}}(?:\.\d+)?)\]", regex::escape(label)))
}

/// How a stance value was obtained
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StanceOutcome {
    /// Report found and already within bounds
    Parsed,
    /// Report found but outside bounds; `raw` is what the model wrote
    Clamped { raw: f64 },
    /// Label matched but the payload wasn't a usable number
    Degraded,
    /// No report found; fell back to the last known stance or neutral
    Missed,
}

/// A stance value together with how it was derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StanceReading {
    pub value: f64,
    pub outcome: StanceOutcome,
}

/// Anything that can turn free text into a bounded stance.
///
/// Implementations must be pure and total: same input, same output, and the
/// value is always finite and within [MIN_STANCE, MAX_STANCE].
pub trait StanceExtractor: Send + Sync {
    fn parse(&self, text: &str, last_known: Option<f64>) -> StanceReading;

    fn extract(&self, text: &str, last_known: Option<f64>) -> f64 {
        self.parse(text, last_known).value
    }
}

/// Clamp into [MIN_STANCE, MAX_STANCE]; non-finite input becomes neutral
pub fn clamp_stance(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(MIN_STANCE, MAX_STANCE)
    } else {
        NEUTRAL_STANCE
    }
}

/// Regex-based extractor for the bracketed self-report
#[derive(Debug, Clone)]
pub struct StanceParser {
    pattern: Regex,
}

impl StanceParser {
    pub fn new() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
        }
    }
}

impl Default for StanceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StanceExtractor for StanceParser {
    fn parse(&self, text: &str, last_known: Option<f64>) -> StanceReading {
        let Some(captures) = self.pattern.captures(text) else {
            let value = last_known.map(clamp_stance).unwrap_or(NEUTRAL_STANCE);
            tracing::warn!(
                "No stance report found, falling back to L={}. Output: {}",
                value,
                text
            );
            return StanceReading {
                value,
                outcome: StanceOutcome::Missed,
            };
        };

        let payload = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        match payload.parse::<f64>() {
            Ok(raw) if raw.is_finite() => {
                let value = clamp_stance(raw);
                let outcome = if value == raw {
                    StanceOutcome::Parsed
                } else {
                    tracing::debug!("Stance {} clamped to {}", raw, value);
                    StanceOutcome::Clamped { raw }
                };
                StanceReading { value, outcome }
            }
            _ => {
                tracing::warn!(
                    "Stance payload {:?} is not a number, using neutral L={}",
                    payload,
                    NEUTRAL_STANCE
                );
                StanceReading {
                    value: NEUTRAL_STANCE,
                    outcome: StanceOutcome::Degraded,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(value: &str) -> String {
        format!("[{} {}]\n同意", STANCE_LABEL, value)
    }

    #[test]
    fn test_parses_integer_report() {
        let parser = StanceParser::new();
        assert_eq!(parser.extract("[新的立场强度 L: 9]\n同意", None), 9.0);
    }

    #[test]
    fn test_parses_decimal_report_without_space() {
        let parser = StanceParser::new();
        let reading = parser.parse("前言 [新的立场强度 L:6.5] 后续", Some(2.0));
        assert_eq!(reading.value, 6.5);
        assert_eq!(reading.outcome, StanceOutcome::Parsed);
    }

    #[test]
    fn test_first_report_wins() {
        let parser = StanceParser::new();
        let text = format!("{}\n{}", report("3"), report("8"));
        assert_eq!(parser.extract(&text, None), 3.0);
    }

    #[test]
    fn test_clamps_above_range() {
        let parser = StanceParser::new();
        let reading = parser.parse("[新的立场强度 L: 15.7]", Some(4.0));
        assert_eq!(reading.value, 10.0);
        assert_eq!(reading.outcome, StanceOutcome::Clamped { raw: 15.7 });
    }

    #[test]
    fn test_clamps_zero_up_to_minimum() {
        let parser = StanceParser::new();
        assert_eq!(parser.extract(&report("0"), None), 1.0);
        assert_eq!(parser.extract(&report("0.4"), None), 1.0);
    }

    #[test]
    fn test_negative_value_is_a_miss() {
        let parser = StanceParser::new();
        let reading = parser.parse("[新的立场强度 L: -3]", Some(6.0));
        assert_eq!(reading.outcome, StanceOutcome::Missed);
        assert_eq!(reading.value, 6.0);
        assert_eq!(parser.extract("[新的立场强度 L: -3]", None), NEUTRAL_STANCE);
    }

    #[test]
    fn test_three_digit_value_is_a_miss() {
        // \d{1,2} followed directly by `]` cannot match "100".
        let parser = StanceParser::new();
        assert_eq!(parser.parse(&report("100"), None).outcome, StanceOutcome::Missed);
    }

    #[test]
    fn test_missing_report_falls_back_to_last_known() {
        let parser = StanceParser::new();
        assert_eq!(parser.extract("我还在考虑。", Some(7.0)), 7.0);
    }

    #[test]
    fn test_missing_report_without_history_is_neutral() {
        let parser = StanceParser::new();
        assert_eq!(parser.extract("我还在考虑。", None), NEUTRAL_STANCE);
        assert_eq!(parser.extract("", None), NEUTRAL_STANCE);
    }

    #[test]
    fn test_fallback_law_for_every_valid_prior() {
        let parser = StanceParser::new();
        let mut prior = MIN_STANCE;
        while prior <= MAX_STANCE {
            assert_eq!(parser.extract("no label here", Some(prior)), prior);
            prior += 0.1;
        }
    }

    #[test]
    fn test_non_finite_prior_never_leaks() {
        let parser = StanceParser::new();
        assert_eq!(parser.extract("nothing", Some(f64::NAN)), NEUTRAL_STANCE);
        assert_eq!(parser.extract("nothing", Some(f64::INFINITY)), NEUTRAL_STANCE);
        assert_eq!(parser.extract("nothing", Some(42.0)), MAX_STANCE);
    }

    #[test]
    fn test_result_always_in_range() {
        let parser = StanceParser::new();
        let inputs = [
            "",
            "[新的立场强度 L: ]",
            "[新的立场强度 L: abc]",
            "[新的立场强度 L: 99.99]",
            "[新的立场强度 L: 00]",
            "[新的立场强度 L: 5.]",
            "[新的立场强度 L: 7.25]",
            "新的立场强度 L: 8",
            "[API_ERROR: user failed to update stance]",
            "[新的立场强度 L: 1e9]",
            "[[新的立场强度 L: 10]]",
        ];
        let priors = [None, Some(1.0), Some(10.0), Some(f64::NAN), Some(-5.0)];

        for text in inputs {
            for prior in priors {
                let value = parser.extract(text, prior);
                assert!(value.is_finite(), "{:?} / {:?} gave {}", text, prior, value);
                assert!(
                    (MIN_STANCE..=MAX_STANCE).contains(&value),
                    "{:?} / {:?} gave {}",
                    text,
                    prior,
                    value
                );
            }
        }
    }

    #[test]
    fn test_extract_is_idempotent() {
        let parser = StanceParser::new();
        for (text, prior) in [
            ("[新的立场强度 L: 3.3]", None),
            ("garbage", Some(4.5)),
            ("[新的立场强度 L: 42]", Some(1.0)),
        ] {
            assert_eq!(parser.extract(text, prior), parser.extract(text, prior));
        }
    }
}
