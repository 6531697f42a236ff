mod test_signals;

use approx::assert_abs_diff_eq;
use tapflow::design::{Band, FirWindow, peak_gain};
use tapflow::FilterError;
use tapflow::signal_processing::Fir;

/// Amplitude of a unit sine at `f` after the filter, by RMS over whole
/// periods.
fn sine_gain(fir: &mut Fir<f64>, f: f64) -> f64 {
    let signal = test_signals::sine(f, 1.0, 2200, 1);
    let out: Vec<f64> = signal.iter().map(|&x| fir.process(x)).collect();
    let power = out[200..].iter().map(|y| y * y).sum::<f64>() / 2000.0;
    (2.0 * power).sqrt()
}

#[test]
fn test_lowpass_design() {
    let design = Band::lowpass(0.25)
        .unwrap()
        .fir(&FirWindow::blackman(40, 40))
        .unwrap();
    assert_eq!(design.coeffs().len(), 81);
    assert_abs_diff_eq!(peak_gain(design.coeffs()), 1.0, epsilon = 1e-9);

    let mut fir = Fir::from_design(&design);
    assert_eq!(fir.length(), 81);
    assert!(sine_gain(&mut fir, 0.05) > 0.98);
    fir.initialize();
    assert!(sine_gain(&mut fir, 0.6) < 1e-3);
}

#[test]
fn test_highpass_rejects_dc() {
    let design = Band::highpass(0.5)
        .unwrap()
        .fir(&FirWindow::hamming(30, 30))
        .unwrap();
    let dc: f64 = design.coeffs().iter().sum();
    assert_abs_diff_eq!(dc, 0.0, epsilon = 1e-12);

    let mut fir = Fir::from_design(&design);
    assert!(sine_gain(&mut fir, 0.9) > 0.95);
    fir.initialize();
    assert!(sine_gain(&mut fir, 0.1) < 1e-2);
}

#[test]
fn test_bandpass_design() {
    let design = Band::bandpass(0.3, 0.5)
        .unwrap()
        .fir(&FirWindow::hann(50, 50))
        .unwrap();
    let dc: f64 = design.coeffs().iter().sum();
    assert_abs_diff_eq!(dc, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(peak_gain(design.coeffs()), 1.0, epsilon = 1e-9);

    let mut fir = Fir::from_design(&design);
    assert!(sine_gain(&mut fir, 0.4) > 0.95);
    fir.initialize();
    assert!(sine_gain(&mut fir, 0.05) < 1e-2);
    fir.initialize();
    assert!(sine_gain(&mut fir, 0.9) < 1e-2);
}

#[test]
fn test_single_precision_taps() {
    let design = Band::lowpass(0.4)
        .unwrap()
        .fir(&FirWindow::hann(8, 8))
        .unwrap();
    let taps: Vec<f32> = design.taps();
    for (t, c) in taps.iter().zip(design.coeffs()) {
        assert!((*t as f64 - c).abs() < 1e-6);
    }
    let mut fir = Fir::<f32>::from_design(&design);
    let mut y = 0.0;
    for _ in 0..40 {
        y = fir.process(1.0);
    }
    let dc: f64 = design.coeffs().iter().sum();
    assert!((y as f64 - dc).abs() < 1e-5);
}

#[test]
fn test_design_without_response_is_rejected() {
    // A one-tap window leaves nothing once the DC component is removed.
    let bandpass = Band::bandpass(0.1, 0.3).unwrap().fir(&FirWindow::hann(0, 0));
    assert!(matches!(bandpass, Err(FilterError::FilterDesign(_))));
    let highpass = Band::highpass(0.5).unwrap().fir(&FirWindow::blackman(0, 0));
    assert!(matches!(highpass, Err(FilterError::FilterDesign(_))));

    // Without DC removal the single tap survives and is scaled to unity.
    let lowpass = Band::lowpass(0.5).unwrap().fir(&FirWindow::hann(0, 0)).unwrap();
    assert_eq!(lowpass.coeffs(), &[1.0]);
}
