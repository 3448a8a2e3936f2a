/// \[Hz\]
pub struct Hz;

/// \[kHz\]
#[allow(non_camel_case_types)]
pub struct kHz;

/// Frequency
#[derive(Clone, Copy, PartialEq, PartialOrd)]
pub struct Freq<T: Copy> {
    pub(crate) freq: T,
}

impl<T: Copy> core::fmt::Debug for Freq<T>
where
    T: core::fmt::Display,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Hz", self.freq)
    }
}

impl<T: Copy> Freq<T> {
    #[inline]
    /// Returns the frequency in Hz.
    pub const fn hz(&self) -> T {
        self.freq
    }
}

impl Freq<f32> {
    /// Returns the period in seconds.
    #[must_use]
    pub fn period_secs(&self) -> f32 {
        1.0 / self.freq
    }
}

impl core::ops::Mul<Hz> for f32 {
    type Output = Freq<f32>;

    fn mul(self, _: Hz) -> Self::Output {
        Freq { freq: self }
    }
}

impl core::ops::Mul<kHz> for f32 {
    type Output = Freq<f32>;

    fn mul(self, _: kHz) -> Self::Output {
        Freq { freq: self * 1e3 }
    }
}

impl<T, U> core::ops::Mul<U> for Freq<T>
where
    T: core::ops::Mul<U, Output = T> + Copy,
{
    type Output = Freq<T>;

    fn mul(self, rhs: U) -> Self::Output {
        Freq {
            freq: self.freq * rhs,
        }
    }
}

impl<T, U> core::ops::Div<U> for Freq<T>
where
    T: core::ops::Div<U, Output = T> + Copy,
{
    type Output = Freq<T>;

    fn div(self, rhs: U) -> Self::Output {
        Freq {
            freq: self.freq / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops() {
        assert_eq!(200. * Hz, 100. * Hz * 2.);
        assert_eq!(50. * Hz, 100. * Hz / 2.);
        assert_eq!(40e3 * Hz, 40. * kHz);
    }

    #[test]
    fn period() {
        approx::assert_abs_diff_eq!(25e-6, (40. * kHz).period_secs());
    }

    #[test]
    fn dbg() {
        assert_eq!(format!("{:?}", 100. * Hz), "100 Hz");
        assert_eq!(format!("{:?}", 40. * kHz), "40000 Hz");
    }
}
