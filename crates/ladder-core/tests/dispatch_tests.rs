use ladder_core::{Token, DEFAULT_EPSILON};

fn t(text: &str) -> Token {
    text.parse().unwrap()
}

#[test]
fn forward_and_reverse_agree_across_the_ordering() {
    let pairs = [
        (t("3ub"), t("40")),
        (t("7"), t("0.5")),
        (t("7"), t("1.0 + 2.0i")),
        (t("2.5"), t("1.0 - 1.0i")),
        (t("5ub"), t("9L")),
    ];
    for (a, b) in &pairs {
        assert_eq!(a.add(b).unwrap(), b.add_reverse(a).unwrap());
        assert_eq!(a.subtract(b).unwrap(), b.subtract_reverse(a).unwrap());
        assert_eq!(a.multiply(b).unwrap(), b.multiply_reverse(a).unwrap());
    }
}

#[test]
fn opposite_differences_cancel() {
    let pairs = [
        (t("3ub"), t("40")),
        (t("7"), t("0.5")),
        (t("2.5"), t("1.0 - 1.0i")),
    ];
    for (a, b) in &pairs {
        let sum = a.subtract(b).unwrap().add(&b.subtract(a).unwrap()).unwrap();
        assert!(sum.is_equal_to(&sum.zero().unwrap()).unwrap());
    }
}

#[test]
fn the_result_lands_at_the_higher_kind() {
    assert_eq!(t("3ub").add(&t("40")).unwrap(), t("43"));
    assert_eq!(t("7").subtract(&t("0.5")).unwrap(), t("6.5"));
    assert_eq!(t("2").multiply(&t("1.0 + 2.0i")).unwrap(), t("2.0 + 4.0i"));
    assert_eq!(t("5ub").add(&t("9L")).unwrap(), t("14L"));
}

#[test]
fn nil_absorbs_arithmetic_and_fails_predicates() {
    assert_eq!(Token::Nil.add(&t("5")).unwrap(), Token::Nil);
    assert_eq!(t("5").multiply(&Token::Nil).unwrap(), Token::Nil);
    assert!(!Token::Nil.is_equal_to(&Token::Nil).unwrap());
    assert!(!t("5").is_less_than(&Token::Nil).unwrap());
    assert!(!Token::Nil.is_close_to(&t("5"), DEFAULT_EPSILON).unwrap());
}

#[test]
fn unrelated_kinds_refuse_with_the_incomparability_note() {
    let err = t("1L").add(&t("1.0")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add method not supported between long '1L' and double '1.0' \
         because the types are incomparable."
    );
    let err = t("fix(1.5,8,4)").add(&t("1.0")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add method not supported between fixedpoint 'fix(1.5,8,4)' and double '1.0' \
         because the types are incomparable."
    );
}

#[test]
fn reverse_dispatch_reports_under_its_own_name() {
    let err = t("1.0").add_reverse(&t("1L")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add_reverse method not supported between double '1.0' and long '1L' \
         because the types are incomparable."
    );
}

#[test]
fn identities_hold_for_every_kind_that_has_them() {
    let tokens = [
        t("200ub"),
        t("-7"),
        t("9L"),
        t("2.5"),
        t("1.0 + 2.0i"),
        t("fix(5.34375,10,4)"),
        Token::smooth(2.0, vec![1.0]),
        t("{1, 2, 3}"),
        t("[1, 2; 3, 4]"),
    ];
    for token in &tokens {
        let zero = token.zero().unwrap();
        let one = token.one().unwrap();
        assert!(token.is_equal_to(&token.add(&zero).unwrap()).unwrap());
        assert!(token.is_equal_to(&token.multiply(&one).unwrap()).unwrap());
    }
    let s = t("\"ab\"");
    assert_eq!(s.add(&s.zero().unwrap()).unwrap(), s);
}

#[test]
fn failures_after_promotion_name_the_original_operands() {
    let err = t("1.0 + 2.0i").modulo(&t("3")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "modulo operation not supported between complex '1.0 + 2.0i' and int '3'"
    );
}

#[test]
fn ordering_and_bitwise_widen_the_lower_receiver() {
    assert!(t("5ub").is_less_than(&t("9")).unwrap());
    assert!(!t("9").is_less_than(&t("5")).unwrap());
    assert_eq!(t("6").bitwise_and(&t("3L")).unwrap(), t("2L"));
    assert_eq!(t("6").bitwise_or(&t("3")).unwrap(), t("7"));
    assert_eq!(t("6").bitwise_xor(&t("3")).unwrap(), t("5"));
}

#[test]
fn closeness_promotes_either_side() {
    assert!(t("1").is_close_to(&t("1.0000000001"), 1e-9).unwrap());
    assert!(t("1.0000000001").is_close_to(&t("1"), 1e-9).unwrap());
    assert!(!t("1").is_close_to_default(&t("1.1")).unwrap());
}

#[test]
fn string_is_the_top_of_the_ordering() {
    assert_eq!(t("2").add(&t("\"x\"")).unwrap(), t("\"2x\""));
    assert_eq!(t("\"x\"").add(&t("2")).unwrap(), t("\"x2\""));
    assert_eq!(t("true").add(&t("\"!\"")).unwrap(), t("\"true!\""));
    assert!(t("\"2\"").is_equal_to(&t("2")).unwrap());
}
