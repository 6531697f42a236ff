use num_complex::Complex64;

/// Two poles and two zeros that end up in one second-order section.
///
/// A single real pole/zero is stored in `.0` with `.1` left at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleZeroPair {
    pub poles: (Complex64, Complex64),
    pub zeros: (Complex64, Complex64),
}

impl PoleZeroPair {
    pub fn new(poles: (Complex64, Complex64), zeros: (Complex64, Complex64)) -> Self {
        Self { poles, zeros }
    }

    pub fn single(pole: Complex64, zero: Complex64) -> Self {
        let origin = Complex64::new(0.0, 0.0);
        Self {
            poles: (pole, origin),
            zeros: (zero, origin),
        }
    }

    pub fn conjugate(pole: Complex64, zero: Complex64) -> Self {
        Self {
            poles: (pole, pole.conj()),
            zeros: (zero, zero.conj()),
        }
    }

    pub fn is_single_pole(&self) -> bool {
        self.poles.1 == Complex64::new(0.0, 0.0) && self.zeros.1 == Complex64::new(0.0, 0.0)
    }
}

/// Poles and zeros plus the frequency (radians) and gain the cascade is
/// normalized to.
///
/// Used both for analog prototypes (s-plane, zeros at infinity allowed) and
/// for digital designs (z-plane).
#[derive(Debug, Clone, PartialEq)]
pub struct PoleZeroLayout {
    pairs: Vec<PoleZeroPair>,
    num_poles: usize,
    normal_w: f64,
    normal_gain: f64,
}

impl Default for PoleZeroLayout {
    fn default() -> Self {
        Self {
            pairs: Vec::new(),
            num_poles: 0,
            normal_w: 0.0,
            normal_gain: 1.0,
        }
    }
}

impl PoleZeroLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single real pole and zero. Must come after every pair.
    pub fn add_single(&mut self, pole: Complex64, zero: Complex64) {
        debug_assert!(self.num_poles % 2 == 0, "single pole added after another single");
        self.pairs.push(PoleZeroPair::single(pole, zero));
        self.num_poles += 1;
    }

    pub fn add_conjugate_pair(&mut self, pole: Complex64, zero: Complex64) {
        debug_assert!(self.num_poles % 2 == 0);
        self.pairs.push(PoleZeroPair::conjugate(pole, zero));
        self.num_poles += 2;
    }

    pub fn add_pair(&mut self, poles: (Complex64, Complex64), zeros: (Complex64, Complex64)) {
        debug_assert!(self.num_poles % 2 == 0);
        self.pairs.push(PoleZeroPair::new(poles, zeros));
        self.num_poles += 2;
    }

    pub fn set_normal(&mut self, w: f64, gain: f64) {
        self.normal_w = w;
        self.normal_gain = gain;
    }

    pub fn pairs(&self) -> &[PoleZeroPair] {
        &self.pairs
    }

    pub fn num_poles(&self) -> usize {
        self.num_poles
    }

    /// Second-order sections needed to realize the layout.
    pub fn num_stages(&self) -> usize {
        self.num_poles.div_ceil(2)
    }

    pub fn normal_w(&self) -> f64 {
        self.normal_w
    }

    pub fn normal_gain(&self) -> f64 {
        self.normal_gain
    }
}

/// Analog zero at infinity, as produced by all-pole prototypes.
pub(crate) fn infinity() -> Complex64 {
    Complex64::new(f64::INFINITY, 0.0)
}

pub(crate) fn is_infinite(c: Complex64) -> bool {
    c.re.is_infinite() || c.im.is_infinite()
}
