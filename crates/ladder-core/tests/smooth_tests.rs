use ladder_core::Token;

fn smooth(value: f64, derivatives: &[f64]) -> Token {
    Token::smooth(value, derivatives.to_vec())
}

#[test]
fn products_follow_the_first_order_rule() {
    let product = smooth(2.0, &[1.0]).multiply(&smooth(3.0, &[1.0])).unwrap();
    assert_eq!(product, smooth(6.0, &[5.0]));
}

#[test]
fn addition_merges_derivative_lists_positionwise() {
    let sum = smooth(1.0, &[1.0, 2.0]).add(&smooth(2.0, &[3.0])).unwrap();
    assert_eq!(sum, smooth(3.0, &[4.0, 2.0]));
    let difference = smooth(5.0, &[2.0, 1.0])
        .subtract(&smooth(1.0, &[1.0]))
        .unwrap();
    assert_eq!(difference, smooth(4.0, &[1.0, 1.0]));
}

#[test]
fn a_smooth_receiver_keeps_derivatives_a_plain_one_drops_them() {
    let kept = smooth(2.0, &[1.0]).add(&Token::int(1)).unwrap();
    assert_eq!(kept, smooth(3.0, &[1.0]));
    let dropped = Token::int(1).add(&smooth(2.0, &[1.0])).unwrap();
    assert_eq!(dropped, Token::double(3.0));
    let dropped = Token::double(1.0).add(&smooth(2.0, &[1.0])).unwrap();
    assert_eq!(dropped, Token::double(3.0));
}

#[test]
fn division_scales_the_receiver_derivatives() {
    let quotient = smooth(6.0, &[3.0]).divide(&Token::double(2.0)).unwrap();
    assert_eq!(quotient, smooth(3.0, &[1.5]));
    let quotient = smooth(6.0, &[2.0]).divide(&smooth(2.0, &[1.0])).unwrap();
    assert_eq!(quotient, smooth(3.0, &[1.0]));
}

#[test]
fn modulo_falls_back_to_a_plain_double() {
    let remainder = smooth(7.5, &[1.0]).modulo(&Token::double(2.0)).unwrap();
    assert_eq!(remainder, Token::double(1.5));
}

#[test]
fn comparisons_look_only_at_the_sample_value() {
    assert!(smooth(1.0, &[9.0]).is_equal_to(&Token::double(1.0)).unwrap());
    assert!(smooth(1.0, &[9.0])
        .is_equal_to(&smooth(1.0, &[-9.0]))
        .unwrap());
    assert!(smooth(1.0, &[9.0])
        .is_close_to(&Token::double(1.0 + 1e-10), 1e-9)
        .unwrap());
}

#[test]
fn multiplying_by_a_plain_double_scales_the_derivatives() {
    let scaled = smooth(2.0, &[3.0]).multiply(&Token::double(4.0)).unwrap();
    assert_eq!(scaled, smooth(8.0, &[12.0]));
}
