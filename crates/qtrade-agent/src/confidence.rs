//! Confidence scoring: how sure the agent is that its selected action is
//! worth submitting as a trade.

use qtrade_patterns::Severity;

#[derive(Clone, Debug)]
pub struct ConfidenceInputs {
    /// `best_q - second_best_q` for the selected state, unbounded.
    pub q_value_gap: f64,
    pub severity: Severity,
    /// `true` if the candlestick/pattern signal agrees with the selected
    /// action's direction.
    pub pattern_signal_agrees: bool,
    /// Fraction, in `[0,1]`, of configured higher timeframes whose trend
    /// agrees with the selected action's direction.
    pub cross_timeframe_agreement: f64,
}

const WEIGHT_Q_GAP: f64 = 0.4;
const WEIGHT_SEVERITY: f64 = 0.3;
const WEIGHT_PATTERN: f64 = 0.1;
const WEIGHT_TIMEFRAME: f64 = 0.2;

/// Weighted average of the four confidence factors, clamped to `[0,1]`.
pub fn score(inputs: &ConfidenceInputs) -> f64 {
    let normalized_gap = if inputs.q_value_gap <= 0.0 {
        0.0
    } else {
        inputs.q_value_gap / (inputs.q_value_gap + 1.0)
    };
    let severity_factor = inputs.severity.size_multiplier();
    let pattern_factor = if inputs.pattern_signal_agrees { 1.0 } else { 0.5 };
    let timeframe_factor = inputs.cross_timeframe_agreement.clamp(0.0, 1.0);

    let combined = WEIGHT_Q_GAP * normalized_gap
        + WEIGHT_SEVERITY * severity_factor
        + WEIGHT_PATTERN * pattern_factor
        + WEIGHT_TIMEFRAME * timeframe_factor;

    combined.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_agreement_and_safety_yields_high_confidence() {
        let inputs = ConfidenceInputs {
            q_value_gap: 10.0,
            severity: Severity::Safe,
            pattern_signal_agrees: true,
            cross_timeframe_agreement: 1.0,
        };
        assert!(score(&inputs) > 0.9);
    }

    #[test]
    fn blocked_severity_caps_confidence_low() {
        let inputs = ConfidenceInputs {
            q_value_gap: 10.0,
            severity: Severity::Blocked,
            pattern_signal_agrees: true,
            cross_timeframe_agreement: 1.0,
        };
        assert!(score(&inputs) < 0.8);
    }

    #[test]
    fn negative_gap_contributes_nothing() {
        let inputs = ConfidenceInputs {
            q_value_gap: -5.0,
            severity: Severity::Safe,
            pattern_signal_agrees: false,
            cross_timeframe_agreement: 0.0,
        };
        let result = score(&inputs);
        assert!(result >= 0.0 && result < 0.5);
    }
}
