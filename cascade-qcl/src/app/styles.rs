use owo_colors::Style;

// Stylesheet used to colorize console output
#[derive(Debug, Default)]
pub(crate) struct Styles {
    pub header_style: Style,
    pub energy_style: Style,
    pub module_style: Style,
    pub warning_style: Style,
}

impl Styles {
    pub(crate) fn colorize(&mut self) {
        self.header_style = Style::new().bold().bright_blue();
        self.energy_style = Style::new().bright_green();
        self.module_style = Style::new().bright_magenta();
        self.warning_style = Style::new().yellow();
    }
}
