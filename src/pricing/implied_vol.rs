//! European Black–Scholes-on-forward pricer and bisection implied-volatility inverter.

use crate::config::ImpliedVolConfig;
use crate::identifier::Side;
use crate::models::IvResult;

/// Standard normal CDF, `0.5 * (1 + erf(x / sqrt(2)))`.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + libm::erf(x / std::f64::consts::SQRT_2))
}

/// European option price under Black–Scholes-on-forward, discounted by `discount`.
pub fn bs_price(side: Side, forward: f64, strike: f64, vol: f64, years: f64, discount: f64) -> f64 {
    let sqrt_t = years.sqrt();
    let d1 = ((forward / strike).ln() + 0.5 * vol * vol * years) / (vol * sqrt_t);
    let d2 = d1 - vol * sqrt_t;
    match side {
        Side::Call => discount * (forward * norm_cdf(d1) - strike * norm_cdf(d2)),
        Side::Put => discount * (strike * norm_cdf(-d2) - forward * norm_cdf(-d1)),
    }
}

fn no_arbitrage_bounds(side: Side, forward: f64, strike: f64, discount: f64) -> (f64, f64) {
    match side {
        Side::Call => (discount * (forward - strike).max(0.0), discount * forward),
        Side::Put => (discount * (strike - forward).max(0.0), discount * strike),
    }
}

/// Invert implied volatility by bisection over the forward-measure pricer.
///
/// Returns `None` if any input is non-finite/non-positive, if `price` falls
/// outside the no-arbitrage band, if the volatility bracket cannot be
/// expanded to contain `price`, or if a bisection step produces a
/// non-finite intermediate.
pub fn invert_implied_vol(
    side: Side,
    price: f64,
    forward: f64,
    strike: f64,
    years: f64,
    discount: f64,
    config: &ImpliedVolConfig,
) -> Option<IvResult> {
    for v in [price, forward, strike, years, discount] {
        if !v.is_finite() || v <= 0.0 {
            return None;
        }
    }

    let (lb, ub) = no_arbitrage_bounds(side, forward, strike, discount);
    if price < lb - 1e-10 || price > ub + 1e-10 {
        return None;
    }

    let (mut vol_low, mut vol_high) = config.initial_bracket;
    if (price - lb).abs() <= 1e-12 {
        return Some(IvResult {
            sigma: vol_low,
            iterations: 0,
            price_fit: bs_price(side, forward, strike, vol_low, years, discount),
        });
    }

    let price_at = |vol: f64| bs_price(side, forward, strike, vol, years, discount);

    let mut expansions = 0;
    while price_at(vol_high) < price && expansions < config.max_bracket_expansions && vol_high <= 10.0 {
        vol_high *= 1.5;
        expansions += 1;
    }
    if price_at(vol_high) < price {
        return None;
    }

    let mut iterations = 0;
    let mut sigma = (vol_low + vol_high) / 2.0;
    let mut price_fit = price_at(sigma);

    while iterations < config.max_iterations && (price_fit - price).abs() > config.price_tolerance {
        if !price_fit.is_finite() {
            return None;
        }
        if price_fit < price {
            vol_low = sigma;
        } else {
            vol_high = sigma;
        }
        sigma = (vol_low + vol_high) / 2.0;
        price_fit = price_at(sigma);
        iterations += 1;
    }

    if !sigma.is_finite() || !price_fit.is_finite() {
        return None;
    }

    Some(IvResult {
        sigma,
        iterations,
        price_fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_cdf_at_zero() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invert_implied_vol_round_trips() {
        let config = ImpliedVolConfig::default();
        let true_vol = 0.3;
        let price = bs_price(Side::Call, 100.0, 100.0, true_vol, 0.25, 1.0);
        let result = invert_implied_vol(Side::Call, price, 100.0, 100.0, 0.25, 1.0, &config).unwrap();
        assert!((result.sigma - true_vol).abs() < 1e-4);
    }

    #[test]
    fn test_invert_implied_vol_rejects_out_of_bounds_price() {
        let config = ImpliedVolConfig::default();
        // Call price above the no-arbitrage upper bound D*F.
        let result = invert_implied_vol(Side::Call, 200.0, 100.0, 100.0, 0.25, 1.0, &config);
        assert!(result.is_none());
    }

    #[test]
    fn test_invert_implied_vol_rejects_non_positive_inputs() {
        let config = ImpliedVolConfig::default();
        assert!(invert_implied_vol(Side::Call, -1.0, 100.0, 100.0, 0.25, 1.0, &config).is_none());
        assert!(invert_implied_vol(Side::Call, 5.0, 100.0, 100.0, 0.0, 1.0, &config).is_none());
    }

    #[test]
    fn test_invert_implied_vol_at_lower_bound() {
        let config = ImpliedVolConfig::default();
        // Out-of-the-money call (F < K) has a zero intrinsic lower bound.
        let result = invert_implied_vol(Side::Call, 1e-13, 80.0, 100.0, 0.25, 1.0, &config);
        let result = result.unwrap();
        assert_eq!(result.iterations, 0);
        assert_eq!(result.sigma, 1e-6);
    }
}
