use super::*;

#[test]
fn endpoints_are_fixed() {
    for e in [Ease::Linear, Ease::InQuad, Ease::OutCubic] {
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert_eq!(e.apply(-3.0), 0.0);
        assert_eq!(e.apply(7.0), 1.0);
    }
}

#[test]
fn out_cubic_leads_linear() {
    assert!(Ease::OutCubic.apply(0.25) > 0.25);
    assert!(Ease::InQuad.apply(0.25) < 0.25);
}

#[test]
fn pulse_wave_cycles() {
    assert!(pulse_wave(0.0, 1.0).abs() < 1e-12);
    assert!((pulse_wave(0.5, 1.0) - 1.0).abs() < 1e-12);
    assert!(pulse_wave(1.0, 1.0).abs() < 1e-12);
    assert_eq!(pulse_wave(0.3, 0.0), 0.0);
}
