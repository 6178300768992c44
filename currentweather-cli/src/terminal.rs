use std::io::Write;

use currentweather_core::{ConditionIcon, DisplayFields, WeatherView};

/// Prints the weather screen to stdout and messages to stderr.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: W,
    json: bool,
}

impl TerminalView<std::io::Stdout> {
    pub fn stdout(json: bool) -> Self {
        Self::new(std::io::stdout(), json)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self { out, json }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_panel(&mut self, f: &DisplayFields) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{} · {}, {}", f.city, f.day_name, f.date)?;
        writeln!(self.out, "  {}  {}  {}", glyph(f.icon), f.temperature, f.condition)?;
        writeln!(self.out, "  {:<12}{}", "Humidity", f.humidity)?;
        writeln!(self.out, "  {:<12}{}", "Visibility", f.visibility)?;
        writeln!(self.out, "  {:<12}{}", "Pressure", f.pressure)?;
        writeln!(self.out, "  {:<12}{}", "Wind", f.wind_speed)?;
        writeln!(self.out, "  {:<12}{} ({})", "Direction", f.wind_direction, f.wind_degree)?;
        self.out.flush()
    }
}

impl<W: Write> WeatherView for TerminalView<W> {
    fn show_loading(&mut self, loading: bool) {
        if loading && !self.json {
            eprintln!("Fetching weather…");
        }
    }

    fn render(&mut self, fields: &DisplayFields) -> anyhow::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, fields)?;
            writeln!(self.out)?;
            return Ok(());
        }

        self.write_panel(fields)?;
        Ok(())
    }

    fn show_message(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn glyph(icon: ConditionIcon) -> &'static str {
    match icon {
        ConditionIcon::Clear | ConditionIcon::Default => "☀",
        ConditionIcon::Cloudy => "☁",
        ConditionIcon::Rainy => "🌧",
        ConditionIcon::Snowy => "❄",
    }
}
