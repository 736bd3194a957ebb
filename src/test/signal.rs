use crate::signal::{Shape, Signal, SignalPath};

#[test]
fn signal_json_carries_shape_and_row_major_data() {
    let s = Signal::from_rows_cols(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    let raw = serde_json::to_string(&s).expect("serialize");
    assert_eq!(raw, r#"{"shape":[2,2],"data":[1.0,2.0,3.0,4.0]}"#);
    assert_eq!(s.get(1, 0), Some(3.0));
}

#[test]
fn signal_json_rejects_inconsistent_data_length() {
    let err = serde_json::from_str::<Signal>(r#"{"shape":[2,2],"data":[1.0]}"#);
    assert!(err.is_err());
}

#[test]
fn matmul_checks_inner_dimension() {
    let k = Signal::from_rows_cols(2, 2, vec![1.0, 2.0, 3.0, 4.0]).expect("2x2");
    let u = Signal::column(vec![1.0, 1.0]);
    let y = k.matmul(&u).expect("2x2 @ 2x1");
    assert_eq!(y.shape(), Shape::column(2));
    assert_eq!(y.data(), &[3.0, 7.0]);

    let bad = Signal::row(vec![1.0, 1.0]);
    assert!(k.matmul(&bad).is_none());
}

#[test]
fn zip_with_requires_equal_shapes() {
    let a = Signal::column(vec![1.0, 2.0]);
    let b = Signal::column(vec![10.0, 20.0]);
    assert_eq!(a.zip_with(&b, |x, y| x + y).expect("same shape").data(), &[11.0, 22.0]);
    assert!(a.zip_with(&Signal::scalar(1.0), |x, y| x + y).is_none());
}

#[test]
fn scalar_conversion() {
    let s: Signal = 2.5.into();
    assert!(s.is_scalar());
    assert_eq!(s.as_scalar(), Some(2.5));
    assert_eq!(Signal::column(vec![1.0, 2.0]).as_scalar(), None);
    assert_eq!(Shape::new(3, 2).to_string(), "(3, 2)");
}

#[test]
fn signal_path_accepts_long_and_short_forms() {
    let long = SignalPath::parse("x.outputs.out").expect("long form");
    let short: SignalPath = "x.out".parse().expect("short form");
    assert_eq!(long, short);
    assert_eq!(long.to_string(), "x.outputs.out");

    assert!(SignalPath::parse("x").is_err());
    assert!(SignalPath::parse("x.inputs.in.extra").is_err());
    assert!(SignalPath::parse(".out").is_err());
}
