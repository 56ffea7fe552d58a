//! Stay/volume discount tables
//!
//! Pure functions, no side effects, no I/O. Discounts apply to the
//! room-nights cost only, never to the flat reservation fee.

use costera_core::{models::RoomCategory, Role};
use rust_decimal::Decimal;

/// Discount percentage for a stay
///
/// Two tier tables exist:
/// - Direct customers earn a loyalty discount on suite stays only:
///   3% from 7 days, 5% from 14, 8% from 21, 10% from 28.
/// - Travel companies earn a volume discount on blocks of 3+ rooms in
///   any category: 5% from 3 days, 10% from 7, 15% from 14, 20% from 28,
///   25% from 60. Below 3 rooms the volume discount never applies.
///
/// `stay_days` is the whole-day difference between check-out and check-in.
pub fn stay_discount_percent(
    role: Role,
    category: RoomCategory,
    stay_days: i64,
    room_count: i32,
) -> Decimal {
    match role {
        Role::TravelCompany => company_tier(stay_days, room_count),
        _ => direct_tier(category, stay_days),
    }
}

fn direct_tier(category: RoomCategory, stay_days: i64) -> Decimal {
    if category != RoomCategory::Suite {
        return Decimal::ZERO;
    }

    let percent = match stay_days {
        d if d >= 28 => 10,
        d if d >= 21 => 8,
        d if d >= 14 => 5,
        d if d >= 7 => 3,
        _ => 0,
    };
    Decimal::from(percent)
}

fn company_tier(stay_days: i64, room_count: i32) -> Decimal {
    if room_count < 3 {
        return Decimal::ZERO;
    }

    let percent = match stay_days {
        d if d >= 60 => 25,
        d if d >= 28 => 20,
        d if d >= 14 => 15,
        d if d >= 7 => 10,
        d if d >= 3 => 5,
        _ => 0,
    };
    Decimal::from(percent)
}

/// Discount amount for a base room-nights cost
pub fn discount_amount(base: Decimal, percent: Decimal) -> Decimal {
    base * percent / Decimal::from(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_direct_suite_tiers() {
        let cases = [
            (1, 0),
            (6, 0),
            (7, 3),
            (13, 3),
            (14, 5),
            (20, 5),
            (21, 8),
            (27, 8),
            (28, 10),
            (90, 10),
        ];
        for (days, expected) in cases {
            assert_eq!(
                stay_discount_percent(Role::Customer, RoomCategory::Suite, days, 1),
                Decimal::from(expected),
                "suite stay of {} days",
                days
            );
        }
    }

    #[test]
    fn test_direct_non_suite_never_discounted() {
        for days in [1, 7, 14, 28, 365] {
            assert_eq!(
                stay_discount_percent(Role::Customer, RoomCategory::Single, days, 1),
                Decimal::ZERO
            );
            assert_eq!(
                stay_discount_percent(Role::Customer, RoomCategory::Double, days, 2),
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn test_company_tiers() {
        let cases = [(1, 0), (3, 5), (6, 5), (7, 10), (14, 15), (28, 20), (59, 20), (60, 25)];
        for (days, expected) in cases {
            assert_eq!(
                stay_discount_percent(Role::TravelCompany, RoomCategory::Double, days, 3),
                Decimal::from(expected),
                "company stay of {} days",
                days
            );
        }
    }

    #[test]
    fn test_company_below_three_rooms() {
        for days in [3, 7, 60, 365] {
            assert_eq!(
                stay_discount_percent(Role::TravelCompany, RoomCategory::Suite, days, 2),
                Decimal::ZERO
            );
        }
    }

    #[test]
    fn test_spec_scenarios() {
        // direct customer, 1 suite, 10 days at $200/night
        let pct = stay_discount_percent(Role::Customer, RoomCategory::Suite, 10, 1);
        assert_eq!(pct, dec!(3));
        let base = dec!(200) * dec!(10);
        assert_eq!(base - discount_amount(base, pct), dec!(1940.00));

        // travel company, 4 doubles, 8 days at $100/night
        let pct = stay_discount_percent(Role::TravelCompany, RoomCategory::Double, 8, 4);
        assert_eq!(pct, dec!(10));
        let base = dec!(100) * dec!(8) * dec!(4);
        assert_eq!(base - discount_amount(base, pct), dec!(2880.00));
    }

    proptest! {
        /// Within each tier table the percentage never decreases as the
        /// stay gets longer.
        #[test]
        fn prop_monotonic_in_days(days in 0i64..400, rooms in 1i32..10) {
            for role in [Role::Customer, Role::TravelCompany] {
                for category in [RoomCategory::Single, RoomCategory::Double, RoomCategory::Suite] {
                    let shorter = stay_discount_percent(role, category, days, rooms);
                    let longer = stay_discount_percent(role, category, days + 1, rooms);
                    prop_assert!(longer >= shorter);
                }
            }
        }

        /// Volume discount never fires below three rooms, loyalty discount
        /// never fires off-suite.
        #[test]
        fn prop_zero_cases(days in 0i64..400) {
            prop_assert_eq!(
                stay_discount_percent(Role::TravelCompany, RoomCategory::Suite, days, 2),
                Decimal::ZERO
            );
            prop_assert_eq!(
                stay_discount_percent(Role::Customer, RoomCategory::Double, days, 5),
                Decimal::ZERO
            );
        }

        /// Percentages stay within the 0-25 band.
        #[test]
        fn prop_bounded(days in 0i64..10_000, rooms in 1i32..50) {
            for role in [Role::Customer, Role::TravelCompany, Role::Clerk] {
                for category in [RoomCategory::Single, RoomCategory::Double, RoomCategory::Suite] {
                    let pct = stay_discount_percent(role, category, days, rooms);
                    prop_assert!(pct >= Decimal::ZERO && pct <= Decimal::from(25));
                }
            }
        }
    }
}
