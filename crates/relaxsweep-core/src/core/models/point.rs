use std::fmt;

/// One unit of sweep work: a pair of grid indices and the coordinates they select.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub i: usize,
    pub j: usize,
    pub a: f64,
    pub b: f64,
}

impl SweepPoint {
    pub fn indices(&self) -> (usize, usize) {
        (self.i, self.j)
    }
}

impl fmt::Display for SweepPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) [a = {:e}, b = {:e}]",
            self.i, self.j, self.a, self.b
        )
    }
}
