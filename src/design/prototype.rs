//! Analog lowpass and low-shelf prototypes
//!
//! Poles and zeros are placed in the s-plane for a half-band response; the
//! band transforms in [`super::band`] map them to the z-plane.

use std::f64::consts::{FRAC_PI_2, PI};

use num_complex::Complex64;

use super::pole_zero::{PoleZeroLayout, infinity};
use crate::error::{FilterError, Result};

/// Analog prototype: s-plane poles and zeros plus normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct IirPrototype {
    layout: PoleZeroLayout,
}

impl IirPrototype {
    pub fn layout(&self) -> &PoleZeroLayout {
        &self.layout
    }

    pub fn num_poles(&self) -> usize {
        self.layout.num_poles()
    }

    /// Butterworth lowpass with `order` poles on the left half of the unit
    /// circle.
    pub fn butterworth(order: usize) -> Result<Self> {
        check_order(order)?;
        let mut layout = PoleZeroLayout::new();
        layout.set_normal(0.0, 1.0);

        let n2 = 2.0 * order as f64;
        for i in 0..order / 2 {
            let theta = FRAC_PI_2 + (2 * i + 1) as f64 * PI / n2;
            layout.add_conjugate_pair(Complex64::from_polar(1.0, theta), infinity());
        }
        if order % 2 == 1 {
            layout.add_single(Complex64::new(-1.0, 0.0), infinity());
        }
        Ok(Self { layout })
    }

    /// Butterworth low shelf with `gain_db` of boost (or cut) below the
    /// corner.
    pub fn butterworth_shelf(order: usize, gain_db: f64) -> Result<Self> {
        check_order(order)?;
        let mut layout = PoleZeroLayout::new();
        layout.set_normal(PI, 1.0);

        let n2 = 2.0 * order as f64;
        let gz = -(10f64.powf(gain_db / 20.0 / n2));
        let gp = 1.0 / gz;
        for i in 1..=order / 2 {
            let theta = FRAC_PI_2 - (2 * i - 1) as f64 * PI / n2;
            let c = Complex64::from_polar(1.0, theta);
            layout.add_conjugate_pair(c * gp, c * gz);
        }
        if order % 2 == 1 {
            layout.add_single(Complex64::new(gp, 0.0), Complex64::new(gz, 0.0));
        }
        Ok(Self { layout })
    }

    /// Chebyshev type I lowpass with `ripple_db` of passband ripple.
    pub fn chebyshev1(order: usize, ripple_db: f64) -> Result<Self> {
        check_order(order)?;
        check_ripple(ripple_db)?;
        let mut layout = PoleZeroLayout::new();

        let eps = (10f64.powf(ripple_db * 0.1) - 1.0).sqrt();
        let v0 = (1.0 / eps).asinh() / order as f64;
        let sinh_v0 = -v0.sinh();
        let cosh_v0 = v0.cosh();
        let n2 = 2.0 * order as f64;

        for i in 0..order / 2 {
            let theta = (2 * i + 1) as f64 - order as f64;
            let theta = theta * PI / n2;
            let pole = Complex64::new(sinh_v0 * theta.cos(), cosh_v0 * theta.sin());
            layout.add_conjugate_pair(pole, infinity());
        }

        if order % 2 == 1 {
            layout.add_single(Complex64::new(sinh_v0, 0.0), infinity());
            layout.set_normal(0.0, 1.0);
        } else {
            // Even orders start the passband at the bottom of the ripple.
            layout.set_normal(0.0, 10f64.powf(-ripple_db / 20.0));
        }
        Ok(Self { layout })
    }

    /// Chebyshev type II lowpass with `ripple_db` of stopband attenuation.
    pub fn chebyshev2(order: usize, ripple_db: f64) -> Result<Self> {
        check_order(order)?;
        check_ripple(ripple_db)?;
        let mut layout = PoleZeroLayout::new();
        layout.set_normal(0.0, 1.0);

        let eps = (10f64.powf(ripple_db * 0.1) - 1.0).sqrt();
        let v0 = eps.asinh() / order as f64;
        let sinh_v0 = -v0.sinh();
        let cosh_v0 = v0.cosh();
        let step = FRAC_PI_2 / order as f64;

        for k in (1..).step_by(2).take(order / 2) {
            let theta = (k as f64 - order as f64) * step;
            let a = sinh_v0 * theta.cos();
            let b = cosh_v0 * theta.sin();
            let d2 = a * a + b * b;
            let im = 1.0 / (k as f64 * step).cos();
            layout.add_conjugate_pair(Complex64::new(a / d2, b / d2), Complex64::new(0.0, im));
        }

        if order % 2 == 1 {
            layout.add_single(Complex64::new(1.0 / sinh_v0, 0.0), infinity());
        }
        Ok(Self { layout })
    }
}

fn check_order(order: usize) -> Result<()> {
    if order == 0 {
        return Err(FilterError::InvalidOrder(order));
    }
    Ok(())
}

fn check_ripple(ripple_db: f64) -> Result<()> {
    if ripple_db.is_nan() || ripple_db <= 0.0 || ripple_db.is_infinite() {
        return Err(FilterError::InvalidRipple(ripple_db));
    }
    Ok(())
}
