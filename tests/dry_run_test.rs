//! Dry runs must leave a filter exactly where processing would have.

mod test_signals;

use std::fmt::Debug;

use tapflow::design::{Band, IirPrototype};
use tapflow::signal_processing::{
    CumulativeMovingAverage, Delay, Filter, Fir, Iir, IirBandRms, IirDf1, IirDf2, MovingAverage,
    PolynomialFir, RunningMax, RunningMin, RunningRange, State,
};

const CHANNELS: usize = 3;

fn check<S>(name: &str, filter: Filter<S>)
where
    S: State<Sample = f64> + PartialEq + Debug,
{
    let input = test_signals::uniform(51, 120 * CHANNELS, -3.0, 3.0);
    let (warmup, rest) = input.split_at(77 * CHANNELS);

    let mut processed = filter.clone();
    let mut dry = filter;
    processed.apply_block(&mut warmup.to_vec(), CHANNELS);
    dry.dry_run_block(warmup, CHANNELS);
    assert_eq!(processed.state(), dry.state(), "{}: state after dry run", name);

    let mut a = rest.to_vec();
    let mut b = rest.to_vec();
    processed.apply_block(&mut a, CHANNELS);
    dry.apply_block(&mut b, CHANNELS);
    assert_eq!(a, b, "{}: output after dry run", name);
}

#[test]
fn test_dry_run_equivalence() {
    let design = Band::bandpass(0.1, 0.3)
        .unwrap()
        .iir(&IirPrototype::butterworth(3).unwrap())
        .unwrap();

    check("fir", Fir::new(vec![0.5, -0.25, 0.125, 1.0]));
    check("delay", Delay::new(6));
    check("iir df1", IirDf1::from_design(&design));
    check("iir df2", IirDf2::from_design(&design));
    check("iir df2t", Iir::from_design(&design));
    check("moving average", MovingAverage::cascaded(9, 2));
    check("cumulative", CumulativeMovingAverage::new());
    check(
        "polynomial fir",
        PolynomialFir::new(
            vec![vec![1.0], vec![0.5]],
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            11,
        )
        .unwrap(),
    );
    check("running min", RunningMin::new(7));
    check("running max", RunningMax::new(7));
    check("running range", RunningRange::new(7));
}

#[test]
fn test_band_rms_dry_run() {
    let design = Band::bandpass(0.1, 0.3)
        .unwrap()
        .iir(&IirPrototype::butterworth(3).unwrap())
        .unwrap();
    let mut processed =
        IirBandRms::from_filters(Iir::<f64>::from_design(&design), MovingAverage::new(5));
    let mut dry = processed.clone();

    let input = test_signals::uniform(52, 60, -1.0, 1.0);
    processed.apply_block(&mut input.clone(), 2);
    dry.dry_run_block(&input, 2);

    let mut a = vec![0.5, -0.5, 0.25, 0.75];
    let mut b = a.clone();
    processed.apply_block(&mut a, 2);
    dry.apply_block(&mut b, 2);
    assert_eq!(a, b);
}
