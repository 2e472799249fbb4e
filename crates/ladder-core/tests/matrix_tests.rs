use ladder_core::Token;
use pretty_assertions::assert_eq;

fn t(text: &str) -> Token {
    text.parse().unwrap()
}

#[test]
fn multiplying_by_the_identity_changes_nothing() {
    let m = t("[1, 2; 3, 4]");
    assert_eq!(m.multiply(&m.one().unwrap()).unwrap(), m);
    let wide = t("[1, 2, 3]");
    assert_eq!(wide.multiply(&wide.one_right().unwrap()).unwrap(), wide);
    assert_eq!(wide.one().unwrap().multiply(&wide).unwrap(), wide);
}

#[test]
fn shape_violations_carry_the_dimensions() {
    let err = t("[1, 2, 3]").multiply(&t("[1, 2; 3, 4]")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot multiply matrix with 3 columns by a matrix with 2 rows."
    );
    let err = t("[1, 2]").add(&t("[1, 2; 3, 4]")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot add two matrices with different dimensions."
    );
}

#[test]
fn a_scalar_at_the_element_kind_broadcasts() {
    assert_eq!(t("[1, 2; 3, 4]").add(&t("1")).unwrap(), t("[2, 3; 4, 5]"));
    assert_eq!(t("[1, 2; 3, 4]").subtract(&t("1")).unwrap(), t("[0, 1; 2, 3]"));
    assert_eq!(t("[0.5, 1.5]").multiply(&t("2")).unwrap(), t("[1.0, 3.0]"));
}

#[test]
fn a_scalar_on_the_left_broadcasts_through_reverse_dispatch() {
    assert_eq!(t("10").subtract(&t("[1, 2; 3, 4]")).unwrap(), t("[9, 8; 7, 6]"));
    assert_eq!(t("3").add(&t("[1, 2]")).unwrap(), t("[4, 5]"));
}

#[test]
fn broadcast_never_divides() {
    let err = t("[1, 2; 3, 4]").divide(&t("2")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "divide operation not supported between [int] '[1, 2; 3, 4]' and int '2'"
    );
    let err = t("[1, 2]").divide(&t("[3, 4]")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "divide operation not supported between [int] '[1, 2]' and [int] '[3, 4]'"
    );
}

#[test]
fn a_scalar_above_the_element_kind_is_incomparable() {
    let err = t("[1, 2]").add(&t("0.5")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add method not supported between [int] '[1, 2]' and double '0.5' \
         because the types are incomparable."
    );
    let err = t("[1, 2]").add(&t("5L")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add method not supported between [int] '[1, 2]' and long '5L' \
         because the types are incomparable."
    );
}

#[test]
fn matrices_promote_along_their_own_chain() {
    assert_eq!(t("[1, 2]").add(&t("[10L, 20L]")).unwrap(), t("[11L, 22L]"));
    assert_eq!(t("[1, 2]").add(&t("[0.5, 0.5]")).unwrap(), t("[1.5, 2.5]"));
    assert_eq!(
        t("[1, 2]").add(&t("[1.0 + 1.0i, 0.0 + 0.0i]")).unwrap(),
        t("[2.0 + 1.0i, 2.0 + 0.0i]")
    );
    let err = t("[1L, 2L]").add(&t("[0.5, 0.5]")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "add method not supported between [long] '[1L, 2L]' and [double] '[0.5, 0.5]' \
         because the types are incomparable."
    );
}

#[test]
fn matrix_arithmetic_wraps_like_the_scalar_kinds() {
    assert_eq!(
        t("[2147483647]").add(&t("[1]")).unwrap(),
        t("[-2147483648]")
    );
    assert_eq!(
        t("[2147483647]").multiply(&t("[2]")).unwrap(),
        t("[-2]")
    );
    assert_eq!(
        t("[-9223372036854775808L]").subtract(&t("[1L]")).unwrap(),
        t("[9223372036854775807L]")
    );
}

#[test]
fn comparisons_answer_rather_than_refuse() {
    assert!(!t("[1, 2]").is_equal_to(&t("[1; 2]")).unwrap());
    assert!(t("[1, 2]").is_equal_to(&t("[1, 2]")).unwrap());
    assert!(t("[1.0, 2.0]")
        .is_close_to(&t("[1.0, 2.0000000001]"), 1e-9)
        .unwrap());
    assert!(!t("[1.0, 2.0]")
        .is_close_to(&t("[1.0, 2.1]"), 1e-9)
        .unwrap());
}

#[test]
fn zero_matches_the_shape_one_matches_the_rows() {
    let wide = t("[1, 2, 3]");
    assert_eq!(wide.zero().unwrap().to_string(), "[0, 0, 0]");
    assert_eq!(wide.one().unwrap().to_string(), "[1]");
    assert_eq!(wide.one_right().unwrap().to_string(), "[1, 0, 0; 0, 1, 0; 0, 0, 1]");
}
