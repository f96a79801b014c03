// src/earnings.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::classify::ShiftKind;
use crate::model::{PaymentMethod, SystemPaySettings, UserWorkSettings};

/// The three rates a user's shifts can be priced at, with custom overrides
/// already resolved against the organization defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateCard {
    pub hourly: Decimal,
    pub per_shift: Decimal,
    pub extra: Decimal,
}

impl RateCard {
    /// Custom rates apply only when the user opted in and actually set one;
    /// otherwise the organization default wins. Extra hours always use the
    /// user's own extra rate.
    pub fn resolve(user: &UserWorkSettings, system: &SystemPaySettings) -> Self {
        let hourly = match (user.use_custom_rates, user.custom_hourly_rate) {
            (true, Some(rate)) => rate,
            _ => system.default_hourly_rate,
        };
        let per_shift = match (user.use_custom_rates, user.custom_shift_rate) {
            (true, Some(rate)) => rate,
            _ => system.default_shift_rate,
        };
        Self {
            hourly,
            per_shift,
            extra: user.extra_rate,
        }
    }
}

/// Raw contract earnings for a block of hours or shifts. No rounding here;
/// rounding to currency precision happens only at display or persistence
/// time via [`round_currency`].
pub fn compute_earnings(
    hours: Decimal,
    shift_count: u32,
    method: PaymentMethod,
    hourly_rate: Decimal,
    shift_rate: Decimal,
) -> Decimal {
    match method {
        PaymentMethod::Hourly => hours * hourly_rate,
        PaymentMethod::PerShift => Decimal::from(shift_count) * shift_rate,
    }
}

/// Earnings contribution of a single classified shift.
pub fn shift_earnings(
    kind: ShiftKind,
    hours: Decimal,
    method: PaymentMethod,
    rates: &RateCard,
) -> Decimal {
    match kind {
        ShiftKind::Contract => compute_earnings(hours, 1, method, rates.hourly, rates.per_shift),
        ShiftKind::Extra => hours * rates.extra,
    }
}

/// Rounds a final total to currency precision, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn hourly_method_multiplies_hours() {
        let amount = compute_earnings(dec!(7.5), 1, PaymentMethod::Hourly, dec!(12), dec!(50));
        assert_eq!(amount, dec!(90));
    }

    #[test]
    fn per_shift_method_multiplies_count() {
        let amount = compute_earnings(dec!(7.5), 3, PaymentMethod::PerShift, dec!(12), dec!(50));
        assert_eq!(amount, dec!(150));
    }

    #[test]
    fn earnings_are_monotone_in_hours_and_count() {
        let mut previous = Decimal::MIN;
        for h in 0..=40 {
            let amount = compute_earnings(
                Decimal::from(h),
                1,
                PaymentMethod::Hourly,
                dec!(11.5),
                dec!(50),
            );
            assert!(amount >= previous);
            previous = amount;
        }
        let mut previous = Decimal::MIN;
        for count in 0..=10 {
            let amount =
                compute_earnings(dec!(8), count, PaymentMethod::PerShift, dec!(11.5), dec!(50));
            assert!(amount >= previous);
            previous = amount;
        }
    }

    #[test]
    fn custom_rates_only_apply_when_enabled_and_set() {
        let system = SystemPaySettings::default();

        let mut user = UserWorkSettings::for_user("u1");
        user.custom_hourly_rate = Some(dec!(14));
        user.custom_shift_rate = Some(dec!(65));

        // opted out: defaults win
        let rates = RateCard::resolve(&user, &system);
        assert_eq!(rates.hourly, dec!(10));
        assert_eq!(rates.per_shift, dec!(50));

        // opted in: overrides win
        user.use_custom_rates = true;
        let rates = RateCard::resolve(&user, &system);
        assert_eq!(rates.hourly, dec!(14));
        assert_eq!(rates.per_shift, dec!(65));

        // opted in but one rate unset: that one falls back
        user.custom_shift_rate = None;
        let rates = RateCard::resolve(&user, &system);
        assert_eq!(rates.hourly, dec!(14));
        assert_eq!(rates.per_shift, dec!(50));
    }

    #[test]
    fn extra_shifts_ignore_the_payment_method() {
        let rates = RateCard {
            hourly: dec!(12),
            per_shift: dec!(50),
            extra: dec!(9),
        };
        let hourly = shift_earnings(ShiftKind::Extra, dec!(4), PaymentMethod::Hourly, &rates);
        let per_shift = shift_earnings(ShiftKind::Extra, dec!(4), PaymentMethod::PerShift, &rates);
        assert_eq!(hourly, dec!(36));
        assert_eq!(per_shift, dec!(36));
    }

    #[test]
    fn contract_shift_under_per_shift_earns_flat_rate() {
        let rates = RateCard {
            hourly: dec!(12),
            per_shift: dec!(50),
            extra: dec!(9),
        };
        let amount = shift_earnings(ShiftKind::Contract, dec!(4), PaymentMethod::PerShift, &rates);
        assert_eq!(amount, dec!(50));
    }

    #[test]
    fn round_currency_is_half_away_from_zero() {
        assert_eq!(round_currency(dec!(1.005)), dec!(1.01));
        assert_eq!(round_currency(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_currency(dec!(2.674)), dec!(2.67));
    }
}
