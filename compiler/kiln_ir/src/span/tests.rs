use super::*;
use pretty_assertions::assert_eq;

#[test]
fn merge_covers_both_ranges() {
    let a = Span::new(4, 9);
    let b = Span::new(1, 6);
    assert_eq!(a.merge(b), Span::new(1, 9));
    assert_eq!(b.merge(a), Span::new(1, 9));
}

#[test]
fn dummy_span_is_empty() {
    assert!(Span::DUMMY.is_empty());
    assert!(Span::DUMMY.is_dummy());
    assert!(!Span::new(3, 3).is_dummy());
}

#[test]
fn display_uses_range_syntax() {
    assert_eq!(Span::new(2, 7).to_string(), "2..7");
    assert_eq!(Span::new(2, 7).len(), 5);
}
