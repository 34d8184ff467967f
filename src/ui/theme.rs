use ratatui::style::Color;

pub struct Theme {
    pub fg: Color,
    pub primary: Color,   // Blue
    pub secondary: Color, // Orange
    pub comment: Color,   // Grey
    pub success: Color,   // Green
    pub error: Color,     // Red
    pub border_focused: Color,
    pub border_normal: Color,
    pub bar_bg: Color,
    pub frame_bg: Color,
    pub function: Color,
    pub highlight_bg: Color, // Region at the current trace point
    pub value_tag: Color,    // Pink for value tags
    pub variable: Color,     // Cyan for variable boxes
}

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: Color::Rgb(137, 180, 250),   // Blue
    secondary: Color::Rgb(250, 179, 135), // Orange
    comment: Color::Rgb(108, 112, 134),
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    border_focused: Color::Rgb(249, 226, 175), // Yellow border for the top frame
    border_normal: Color::Rgb(108, 112, 134),  // Grey border for frames below it
    bar_bg: Color::Rgb(50, 50, 70),
    frame_bg: Color::Rgb(30, 30, 46),
    function: Color::Rgb(249, 226, 175),     // Yellow for frame titles
    highlight_bg: Color::Rgb(88, 91, 112),   // Lifted grey behind the region
    value_tag: Color::Rgb(245, 194, 231),    // Pink for value tags
    variable: Color::Rgb(148, 226, 213),     // Cyan/teal for variable boxes
};
