use super::*;

/// Cubic segments `[a, b, c, d]` of the measured response, one per 10°: within a segment starting
/// at `θ0`, the gain is `a + b·x + c·x² + d·x³` with `x = θ - θ0` in degrees.
#[allow(clippy::excessive_precision, clippy::unreadable_literal)]
const SEGMENTS: [[f32; 4]; 9] = [
    [1.0, 0., 0., 0.],
    [1.0, 0., 0., 0.],
    [1.0, -0.00459648054721, -0.000787968093807, 1.60125528528e-05],
    [0.891250938, -0.0155520765675, -0.000307591508224, 2.9747624976e-06],
    [0.707945784, -0.0208114779827, -0.000218348633296, 2.31910931569e-05],
    [0.501187234, -0.0182211227016, 0.00047738416141, -1.1901034125e-05],
    [0.354813389, -0.0122437497109, 0.000120353137658, 6.77743734332e-06],
    [0.251188643, -0.00780345575475, 0.000323676257958, -5.99548024824e-06],
    [0.199526231, -0.00312857467007, 0.000143850511, -4.79372835035e-06],
];

const SEGMENT_DEG: f32 = 10.;

/// The measured response of a 10 mm, 40 kHz open-type air transducer.
///
/// The response is symmetric about the axis and mirrored about 90°, so the back lobe equals the
/// front lobe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct T4010A1;

impl Directivity for T4010A1 {
    fn gain(theta: Angle) -> f32 {
        let deg = theta.degree().abs() % 180.;
        let deg = deg.min(180. - deg);
        // the first segment is closed on the left, every other one on the right
        let seg = ((deg / SEGMENT_DEG).ceil() as usize).saturating_sub(1);
        let [a, b, c, d] = SEGMENTS[seg.min(SEGMENTS.len() - 1)];
        let x = deg - seg as f32 * SEGMENT_DEG;
        a + x * (b + x * (c + x * d))
    }
}

#[cfg(test)]
mod tests {
    use crate::common::deg;

    use super::*;

    #[rstest::rstest]
    #[case(1.0, 0.)]
    #[case(1.0, 20.)]
    #[case(0.891_250_9, 30.)]
    #[case(0.707_945_8, 40.)]
    #[case(0.501_187_2, 50.)]
    #[case(0.354_813_4, 60.)]
    #[case(0.251_188_6, 70.)]
    #[case(0.199_526_2, 80.)]
    fn at_segment_boundaries(#[case] expected: f32, #[case] theta: f32) {
        approx::assert_abs_diff_eq!(expected, T4010A1::gain(theta * deg), epsilon = 1e-3);
    }

    #[rstest::rstest]
    #[case(-35., 35.)]
    #[case(145., 35.)]
    #[case(215., 35.)]
    #[case(395., 35.)]
    fn symmetric(#[case] theta: f32, #[case] reference: f32) {
        approx::assert_abs_diff_eq!(
            T4010A1::gain(reference * deg),
            T4010A1::gain(theta * deg),
            epsilon = 1e-5
        );
    }

    #[test]
    fn decreasing_off_axis() {
        (0..90).for_each(|t| {
            let near = T4010A1::gain(t as f32 * deg);
            let far = T4010A1::gain((t + 1) as f32 * deg);
            assert!(far <= near + 1e-6, "{} deg: {} > {}", t + 1, far, near);
            assert!(far > 0.);
        });
    }
}
