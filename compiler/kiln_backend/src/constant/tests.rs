use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn decimal_and_hex_literals() {
    assert_eq!(parse_int_literal("10", 32, true), Ok(10));
    assert_eq!(parse_int_literal("0x1F", 32, true), Ok(31));
    assert_eq!(parse_int_literal("+7", 8, false), Ok(7));
}

#[test]
fn negative_values_are_twos_complement() {
    assert_eq!(parse_int_literal("-1", 8, true), Ok(0xFF));
    assert_eq!(parse_int_literal("-128", 8, true), Ok(0x80));
    assert_eq!(sign_extend(0x80, 8), -128);
}

#[test]
fn signed_bounds_are_exact() {
    assert_eq!(parse_int_literal("127", 8, true), Ok(127));
    assert!(matches!(
        parse_int_literal("128", 8, true),
        Err(BackendError::LiteralOutOfRange { .. })
    ));
    assert!(matches!(
        parse_int_literal("-129", 8, true),
        Err(BackendError::LiteralOutOfRange { .. })
    ));
}

#[test]
fn unsigned_rejects_negatives_and_overflow() {
    assert_eq!(parse_int_literal("255", 8, false), Ok(255));
    assert_eq!(parse_int_literal("-0", 8, false), Ok(0));
    assert_eq!(
        parse_int_literal("256", 8, false),
        Err(BackendError::LiteralOutOfRange {
            text: "256".to_owned(),
            ty: "u8".to_owned(),
        })
    );
    assert!(parse_int_literal("-1", 32, false).is_err());
}

#[test]
fn wide_literals_overflowing_u128_are_out_of_range() {
    let huge = "1".repeat(50);
    assert!(matches!(
        parse_int_literal(&huge, 128, false),
        Err(BackendError::LiteralOutOfRange { .. })
    ));
    assert_eq!(
        parse_int_literal("340282366920938463463374607431768211455", 128, false),
        Ok(u128::MAX)
    );
}

#[test]
fn malformed_text_is_invalid() {
    for text in ["", "-", "0x", "12a", "++3", "1_000", " 4"] {
        assert_eq!(
            parse_int_literal(text, 32, true),
            Err(BackendError::InvalidLiteral(text.to_owned())),
            "{text:?}"
        );
    }
}

proptest! {
    #[test]
    fn every_i16_value_parses_back(v in any::<i16>()) {
        let raw = parse_int_literal(&v.to_string(), 16, true);
        prop_assert_eq!(raw.map(|r| sign_extend(r, 16)), Ok(i128::from(v)));
    }

    #[test]
    fn values_past_the_width_are_rejected(extra in 1u32..1000) {
        let text = (i128::from(i32::MAX) + i128::from(extra)).to_string();
        let rejected = matches!(
            parse_int_literal(&text, 32, true),
            Err(BackendError::LiteralOutOfRange { .. })
        );
        prop_assert!(rejected);
    }
}
