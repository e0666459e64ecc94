use super::*;

#[test]
fn page_number_rejects_zero() {
    assert!(PageNumber::new(0).is_err());
    assert_eq!(PageNumber::new(3).unwrap().get(), 3);
    assert_eq!(PageNumber::FIRST.next().map(PageNumber::get), Some(2));
    assert_eq!(PageNumber::new(u32::MAX).unwrap().next(), None);
}

#[test]
fn page_number_serde_is_transparent_and_validated() {
    let p: PageNumber = serde_json::from_str("7").unwrap();
    assert_eq!(p.get(), 7);
    assert_eq!(serde_json::to_string(&p).unwrap(), "7");
    assert!(serde_json::from_str::<PageNumber>("0").is_err());
}

#[test]
fn percent_box_rect_conversion_is_consistent() {
    let size = Size::new(400.0, 200.0);
    let b = PercentBox {
        left: 10.0,
        top: 25.0,
        width: 50.0,
        height: 50.0,
    };
    let r = b.to_rect(size);
    assert_eq!(r, Rect::new(40.0, 50.0, 240.0, 150.0));
    assert_eq!(PercentBox::from_rect(r, size), b);
}

#[test]
fn percent_box_contains_edges() {
    let b = PercentBox {
        left: 10.0,
        top: 10.0,
        width: 20.0,
        height: 20.0,
    };
    assert!(b.contains(10.0, 30.0));
    assert!(!b.contains(9.9, 20.0));
    assert!(!b.contains(20.0, 30.1));
}

#[test]
fn metrics_measurable_rejects_degenerate_sizes() {
    let ok = ImageMetrics {
        natural: Size::new(100.0, 100.0),
        rendered: Size::new(50.0, 50.0),
    };
    assert!(ok.is_measurable());
    let zero = ImageMetrics {
        rendered: Size::ZERO,
        ..ok
    };
    assert!(!zero.is_measurable());
}
