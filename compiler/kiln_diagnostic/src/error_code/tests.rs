use super::*;

const ALL: &[ErrorCode] = &[
    ErrorCode::E1001,
    ErrorCode::E1002,
    ErrorCode::E1003,
    ErrorCode::E1004,
    ErrorCode::E1005,
    ErrorCode::E1006,
    ErrorCode::E2001,
    ErrorCode::E2002,
    ErrorCode::E2003,
    ErrorCode::E2004,
    ErrorCode::E2005,
    ErrorCode::E2006,
    ErrorCode::E2007,
    ErrorCode::E2008,
    ErrorCode::E2009,
    ErrorCode::E2010,
    ErrorCode::E2011,
    ErrorCode::E2012,
    ErrorCode::E3001,
    ErrorCode::E3002,
    ErrorCode::E3003,
    ErrorCode::E3004,
    ErrorCode::E3005,
    ErrorCode::E4001,
    ErrorCode::E4002,
    ErrorCode::E5001,
    ErrorCode::E6001,
    ErrorCode::E9001,
];

#[test]
fn every_code_belongs_to_exactly_one_phase() {
    for code in ALL {
        let phases = [
            code.is_form_error(),
            code.is_type_error(),
            code.is_declaration_error(),
            code.is_lifetime_error(),
            code.is_backend_error(),
            code.is_macro_error(),
            code.is_internal_error(),
        ];
        let count = phases.iter().filter(|&&p| p).count();
        assert_eq!(count, 1, "{code} is in {count} phases");
    }
}

#[test]
fn phase_digit_matches_predicate() {
    for code in ALL {
        let digit = code.as_str().as_bytes()[1];
        let expected = match digit {
            b'1' => code.is_form_error(),
            b'2' => code.is_type_error(),
            b'3' => code.is_declaration_error(),
            b'4' => code.is_lifetime_error(),
            b'5' => code.is_backend_error(),
            b'6' => code.is_macro_error(),
            b'9' => code.is_internal_error(),
            _ => false,
        };
        assert!(expected, "{code} has no phase for digit {}", digit as char);
    }
}

#[test]
fn display_matches_as_str() {
    assert_eq!(ErrorCode::E2001.to_string(), "E2001");
    assert_eq!(
        ErrorCode::E2002.description(),
        "cannot dereference void pointer"
    );
}
