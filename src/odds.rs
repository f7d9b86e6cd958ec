use thiserror::Error;

/// Local, recoverable data-quality conditions. Callers render "N/A" for the
/// affected figure instead of propagating these to the user-facing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OddsError {
    #[error("decimal odds must be finite and greater than 1.0")]
    InvalidOdds,
    #[error("probability must be in (0, 1]")]
    InvalidProbability,
    #[error("proposition input out of range")]
    InvalidInput,
}

/// Convert decimal odds to American odds (signed integer, magnitude >= 100).
///
/// The +/-100 crossing sits exactly at decimal odds 2.0: 2.0 maps to +100,
/// anything below maps negative. Rounding is half-up and happens only here,
/// so every surface renders the same integer for the same price.
pub fn decimal_to_american(decimal: f64) -> Result<i64, OddsError> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(OddsError::InvalidOdds);
    }
    if decimal >= 2.0 {
        Ok(round_half_up((decimal - 1.0) * 100.0))
    } else {
        Ok(round_half_up(-100.0 / (decimal - 1.0)))
    }
}

// Half-up, not half-away-from-zero: -187.5 rounds to -187.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub fn american_to_decimal(american: i64) -> Result<f64, OddsError> {
    if american >= 100 {
        Ok(1.0 + american as f64 / 100.0)
    } else if american <= -100 {
        Ok(1.0 + 100.0 / american.unsigned_abs() as f64)
    } else {
        Err(OddsError::InvalidOdds)
    }
}

pub fn implied_to_decimal(probability: f64) -> Result<f64, OddsError> {
    if !probability.is_finite() || probability <= 0.0 || probability > 1.0 {
        return Err(OddsError::InvalidProbability);
    }
    Ok(1.0 / probability)
}

pub fn decimal_to_implied(decimal: f64) -> Result<f64, OddsError> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(OddsError::InvalidOdds);
    }
    Ok(1.0 / decimal)
}

/// Positive American odds always carry an explicit leading `+`.
pub fn format_american(american: i64) -> String {
    if american >= 0 {
        format!("+{american}")
    } else {
        american.to_string()
    }
}

pub fn decimal_to_american_display(decimal: f64) -> Result<String, OddsError> {
    decimal_to_american(decimal).map(format_american)
}
