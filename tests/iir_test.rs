mod test_signals;

use approx::assert_abs_diff_eq;
use tapflow::FilterError;
use tapflow::design::{Band, IirDesign, IirPrototype};
use tapflow::signal_processing::{Iir, IirDf1, IirDf2, SecondOrderSections};

fn designs() -> Vec<(&'static str, IirDesign)> {
    let butter = IirPrototype::butterworth(5).unwrap();
    let cheby1 = IirPrototype::chebyshev1(4, 1.0).unwrap();
    let cheby2 = IirPrototype::chebyshev2(4, 40.0).unwrap();
    let shelf = IirPrototype::butterworth_shelf(3, 6.0).unwrap();
    vec![
        ("butterworth lowpass", Band::lowpass(0.2).unwrap().iir(&butter).unwrap()),
        ("chebyshev1 highpass", Band::highpass(0.3).unwrap().iir(&cheby1).unwrap()),
        ("chebyshev2 bandpass", Band::bandpass(0.2, 0.4).unwrap().iir(&cheby2).unwrap()),
        ("butterworth bandstop", Band::bandstop(0.3, 0.5).unwrap().iir(&butter).unwrap()),
        ("shelf lowpass", Band::lowpass(0.25).unwrap().iir(&shelf).unwrap()),
        ("notch", IirDesign::notch(0.4, 0.05).unwrap()),
    ]
}

/// Amplitude of a unit sine at `f` after the filter settles, from the RMS
/// of 2000 samples (a whole number of periods for every tested `f`).
fn measured_gain(design: &IirDesign, f: f64) -> f64 {
    let mut iir = Iir::<f64>::from_design(design);
    let signal = test_signals::sine(f, 1.0, 6000, 1);
    let out: Vec<f64> = signal.iter().map(|&x| iir.process(x)).collect();
    let power = out[4000..].iter().map(|y| y * y).sum::<f64>() / 2000.0;
    (2.0 * power).sqrt()
}

#[test]
fn test_topologies_agree() {
    let input = test_signals::uniform(41, 400 * 2, -1.0, 1.0);
    for (name, design) in designs() {
        let mut df1 = IirDf1::<f64>::from_design(&design);
        let mut df2 = IirDf2::<f64>::from_design(&design);
        let mut df2t = Iir::<f64>::from_design(&design);

        let mut a = input.clone();
        let mut b = input.clone();
        let mut c = input.clone();
        df1.apply_block(&mut a, 2);
        df2.apply_block(&mut b, 2);
        df2t.apply_block(&mut c, 2);
        for k in 0..a.len() {
            assert!((a[k] - b[k]).abs() < 1e-8, "{}: DF1 vs DF2 at {}", name, k);
            assert!((a[k] - c[k]).abs() < 1e-8, "{}: DF1 vs DF2T at {}", name, k);
        }
    }
}

#[test]
fn test_response_predicts_sine_gain() {
    for (name, design) in designs() {
        let sos = SecondOrderSections::<f64>::from_design(&design);
        for f in [0.05, 0.3, 0.45, 0.7] {
            let predicted = sos.response_normalized(f).norm();
            let measured = measured_gain(&design, f);
            assert!(
                (predicted - measured).abs() < 1e-2,
                "{} at {}: predicted {}, measured {}",
                name,
                f,
                predicted,
                measured
            );
        }
    }
}

#[test]
fn test_normalization_gain() {
    let butter = IirPrototype::butterworth(4).unwrap();
    let lowpass =
        SecondOrderSections::<f64>::from_design(&Band::lowpass(0.3).unwrap().iir(&butter).unwrap());
    assert_abs_diff_eq!(lowpass.dc_gain(), 1.0, epsilon = 1e-9);
    let highpass = SecondOrderSections::<f64>::from_design(
        &Band::highpass(0.3).unwrap().iir(&butter).unwrap(),
    );
    assert_abs_diff_eq!(highpass.response_normalized(1.0).norm(), 1.0, epsilon = 1e-9);
    let notch = SecondOrderSections::<f64>::from_design(&IirDesign::notch(0.4, 0.05).unwrap());
    assert_abs_diff_eq!(notch.dc_gain(), 1.0, epsilon = 1e-9);
    assert!(notch.response_normalized(0.4).norm() < 1e-9);
}

#[test]
fn test_steady_state_matches_settled_filter() {
    let x_ss = [1.5, -0.25];
    for (name, design) in designs() {
        let mut settled = Iir::<f64>::from_design(&design);
        for _ in 0..5000 {
            let mut frame = x_ss;
            settled.apply_frame(&mut frame);
        }
        let mut expected = x_ss;
        settled.apply_frame(&mut expected);

        let mut df1 = IirDf1::<f64>::from_design(&design);
        let mut df2 = IirDf2::<f64>::from_design(&design);
        let mut df2t = Iir::<f64>::from_design(&design);
        df1.initialize_steady(&x_ss);
        df2.initialize_steady(&x_ss);
        df2t.initialize_steady(&x_ss);

        let mut frames = [x_ss; 3];
        df1.apply_frame(&mut frames[0]);
        df2.apply_frame(&mut frames[1]);
        df2t.apply_frame(&mut frames[2]);
        for frame in &frames {
            for (y, e) in frame.iter().zip(&expected) {
                assert!((y - e).abs() < 1e-6, "{}: {} vs {}", name, y, e);
            }
        }
    }
}

#[test]
fn test_stage_count_mismatch() {
    let design = Band::bandpass(0.1, 0.2)
        .unwrap()
        .iir(&IirPrototype::butterworth(4).unwrap())
        .unwrap();
    let err = Iir::<f64>::from_design_with_stages(&design, 3).unwrap_err();
    assert_eq!(
        err,
        FilterError::StageMismatch {
            expected: 3,
            actual: 4
        }
    );
}

#[test]
fn test_invalid_designs() {
    assert!(matches!(Band::lowpass(1.5), Err(FilterError::InvalidCutoff(_))));
    assert!(matches!(Band::bandpass(0.3, 0.2), Err(FilterError::InvalidBand { .. })));
    assert!(matches!(IirPrototype::butterworth(0), Err(FilterError::InvalidOrder(0))));
    assert!(matches!(IirPrototype::chebyshev1(3, 0.0), Err(FilterError::InvalidRipple(_))));
}
