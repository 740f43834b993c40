/// Check that `value` lies within `tol` of `expected`, with a message
/// naming the metric under test.
#[macro_export]
macro_rules! assert_within {
    ($expected:expr, $value:expr, $tol:expr, $msg:expr) => {{
        let expected = $expected;
        let value = $value;
        assert!(
            (value - expected).abs() <= $tol,
            "{}: expected about {}, got {}",
            $msg,
            expected,
            value
        );
    }};
}
