use std::ops;

/// Linear RGB. Channels are nominally in `[0, 1]`, but intermediate sums may
/// exceed that; use [`Color::clamp`] at accumulation points.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    pub const fn new(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    pub fn rgb(self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    pub fn clamp(self) -> Color {
        let [r, g, b] = self.rgb().map(|it| it.clamp(0.0, 1.0));
        Color::new(r, g, b)
    }

    pub fn is_finite(self) -> bool {
        self.rgb().iter().all(|it| it.is_finite())
    }
}

impl ops::Mul for Color {
    type Output = Color;

    fn mul(self, rhs: Color) -> Color {
        Color::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl ops::Mul<f64> for Color {
    type Output = Color;

    fn mul(self, c: f64) -> Color {
        Color::new(self.r * c, self.g * c, self.b * c)
    }
}

impl ops::Div<f64> for Color {
    type Output = Color;

    fn div(self, c: f64) -> Color {
        Color::new(self.r / c, self.g / c, self.b / c)
    }
}

impl ops::Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}

impl ops::AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        *self = *self + rhs
    }
}

#[test]
fn test_clamp() {
    let c = Color::new(-0.5, 0.25, 3.0).clamp();
    assert_eq!(c, Color::new(0.0, 0.25, 1.0));
}
