use std::env;

use once_cell::sync::OnceCell;

use crate::market::MarketPolarity;
use crate::odds::OddsError;

/// Probability adjustment applied at a mental score of +/-1.0.
pub const DEFAULT_MAX_ADJUSTMENT: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentConfig {
    pub max_adjustment: f64,
}

impl Default for AdjustmentConfig {
    fn default() -> Self {
        Self {
            max_adjustment: DEFAULT_MAX_ADJUSTMENT,
        }
    }
}

impl AdjustmentConfig {
    pub fn from_env() -> Self {
        let pct = env::var("HEADPRO_MAX_ADJ_PCT")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(DEFAULT_MAX_ADJUSTMENT * 100.0)
            .clamp(0.0, 100.0);
        Self {
            max_adjustment: pct / 100.0,
        }
    }

    /// Process-wide config, read from the environment once.
    pub fn shared() -> Self {
        static CONFIG: OnceCell<AdjustmentConfig> = OnceCell::new();
        *CONFIG.get_or_init(Self::from_env)
    }
}

/// Figures that only exist when a mental score is known. Absence of the
/// score propagates as absence of these, never as a neutral zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustedFigures {
    pub mental_adjustment_pct: f64,
    pub adjustment_factor: f64,
    pub adjusted_probability: f64,
    pub adjusted_ev_pct: f64,
    pub clamped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub base_ev_pct: f64,
    pub adjusted: Option<AdjustedFigures>,
}

impl Evaluation {
    /// EV used for ranking: adjusted when a mental score is known, else base.
    pub fn effective_ev_pct(&self) -> f64 {
        self.adjusted
            .map(|a| a.adjusted_ev_pct)
            .unwrap_or(self.base_ev_pct)
    }
}

/// Evaluate one proposition: base EV from the model probability and the book
/// price, plus the mental-form adjusted figures when a score is present.
pub fn evaluate(
    model_probability: f64,
    book_decimal_odds: f64,
    mental_score: Option<f64>,
    polarity: MarketPolarity,
    cfg: AdjustmentConfig,
) -> Result<Evaluation, OddsError> {
    if !model_probability.is_finite() || model_probability <= 0.0 || model_probability > 1.0 {
        return Err(OddsError::InvalidInput);
    }
    if !book_decimal_odds.is_finite() || book_decimal_odds <= 1.0 {
        return Err(OddsError::InvalidInput);
    }
    if let Some(score) = mental_score {
        if !score.is_finite() || !(-1.0..=1.0).contains(&score) {
            return Err(OddsError::InvalidInput);
        }
    }

    let base_ev_pct = (model_probability * book_decimal_odds - 1.0) * 100.0;

    let adjusted = mental_score.map(|score| {
        let mental_adjustment_pct = polarity.factor() * score * cfg.max_adjustment * 100.0;
        let adjustment_factor = 1.0 + mental_adjustment_pct / 100.0;
        let raw = model_probability * adjustment_factor;

        // Probabilities live in (0, 1]. Report the clamp, never hide it.
        let (adjusted_probability, clamped) = if raw > 1.0 {
            (1.0, true)
        } else if raw <= 0.0 {
            (f64::EPSILON, true)
        } else {
            (raw, false)
        };

        AdjustedFigures {
            mental_adjustment_pct,
            adjustment_factor,
            adjusted_probability,
            adjusted_ev_pct: (adjusted_probability * book_decimal_odds - 1.0) * 100.0,
            clamped,
        }
    });

    Ok(Evaluation {
        base_ev_pct,
        adjusted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> AdjustmentConfig {
        AdjustmentConfig::default()
    }

    #[test]
    fn worked_example_matches_hand_arithmetic() {
        let ev = evaluate(0.20, 6.0, Some(0.5), MarketPolarity::Positive, cfg()).unwrap();
        assert!((ev.base_ev_pct - 20.0).abs() < 1e-9);
        let adj = ev.adjusted.unwrap();
        assert!((adj.mental_adjustment_pct - 7.5).abs() < 1e-9);
        assert!((adj.adjustment_factor - 1.075).abs() < 1e-9);
        assert!((adj.adjusted_probability - 0.215).abs() < 1e-9);
        assert!((adj.adjusted_ev_pct - 29.0).abs() < 1e-9);
        assert!(!adj.clamped);
    }

    #[test]
    fn absent_score_leaves_adjusted_figures_absent() {
        let ev = evaluate(0.20, 6.0, None, MarketPolarity::Positive, cfg()).unwrap();
        assert!((ev.base_ev_pct - 20.0).abs() < 1e-9);
        assert!(ev.adjusted.is_none());
        assert!((ev.effective_ev_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn neutral_score_reproduces_base_exactly() {
        let ev = evaluate(0.37, 3.1, Some(0.0), MarketPolarity::Positive, cfg()).unwrap();
        let adj = ev.adjusted.unwrap();
        assert_eq!(adj.adjusted_ev_pct, ev.base_ev_pct);
        assert_eq!(adj.mental_adjustment_pct, 0.0);
        assert!(!adj.clamped);
    }

    #[test]
    fn adjusted_ev_is_monotone_in_score() {
        let scores = [-1.0, -0.5, -0.1, 0.0, 0.1, 0.5, 1.0];
        let mut prev: Option<f64> = None;
        for s in scores {
            let ev = evaluate(0.30, 4.0, Some(s), MarketPolarity::Positive, cfg()).unwrap();
            let v = ev.adjusted.unwrap().adjusted_ev_pct;
            if let Some(p) = prev {
                assert!(v >= p, "positive polarity must be non-decreasing");
            }
            prev = Some(v);
        }
        prev = None;
        for s in scores {
            let ev = evaluate(0.30, 4.0, Some(s), MarketPolarity::Negative, cfg()).unwrap();
            let v = ev.adjusted.unwrap().adjusted_ev_pct;
            if let Some(p) = prev {
                assert!(v <= p, "negative polarity must be non-increasing");
            }
            prev = Some(v);
        }
    }

    #[test]
    fn miss_cut_polarity_flips_the_sign() {
        let ev = evaluate(0.40, 3.0, Some(-0.8), MarketPolarity::Negative, cfg()).unwrap();
        let adj = ev.adjusted.unwrap();
        // A struggling player is more likely to miss the cut.
        assert!(adj.mental_adjustment_pct > 0.0);
        assert!(adj.adjusted_ev_pct > ev.base_ev_pct);
    }

    #[test]
    fn probability_clamp_is_reported() {
        let ev = evaluate(0.95, 1.5, Some(1.0), MarketPolarity::Positive, cfg()).unwrap();
        let adj = ev.adjusted.unwrap();
        assert!(adj.clamped);
        assert_eq!(adj.adjusted_probability, 1.0);
        assert!((adj.adjusted_ev_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_out_of_range_input() {
        let err = |m, d, s| evaluate(m, d, s, MarketPolarity::Positive, cfg()).unwrap_err();
        assert_eq!(err(0.0, 2.0, None), OddsError::InvalidInput);
        assert_eq!(err(-0.1, 2.0, None), OddsError::InvalidInput);
        assert_eq!(err(1.1, 2.0, None), OddsError::InvalidInput);
        assert_eq!(err(0.5, 1.0, None), OddsError::InvalidInput);
        assert_eq!(err(0.5, 0.9, None), OddsError::InvalidInput);
        assert_eq!(err(0.5, 2.0, Some(1.5)), OddsError::InvalidInput);
        assert_eq!(err(0.5, f64::NAN, None), OddsError::InvalidInput);
    }

    #[test]
    fn unset_env_falls_back_to_the_default() {
        let cfg = AdjustmentConfig::default();
        assert!((cfg.max_adjustment - 0.15).abs() < 1e-12);
        unsafe { env::remove_var("HEADPRO_MAX_ADJ_PCT") };
        assert_eq!(AdjustmentConfig::from_env(), cfg);
    }
}
