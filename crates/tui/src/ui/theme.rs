use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub surface: Color,
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub border: Color,
    pub border_focused: Color,
    pub error: Color,
    /// Income.
    pub positive: Color,
    /// Expense.
    pub negative: Color,
    /// Net profit.
    pub net: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: Color::Rgb(20, 26, 32),
            text: Color::Rgb(220, 220, 220),
            dim: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(80, 160, 160),
            border: Color::Rgb(60, 70, 80),
            border_focused: Color::Rgb(80, 160, 160),
            error: Color::Rgb(200, 80, 80),
            positive: Color::Rgb(0x16, 0xa3, 0x4a),
            negative: Color::Rgb(0xef, 0x44, 0x44),
            net: Color::Rgb(0x0f, 0x6f, 0xff),
        }
    }
}
