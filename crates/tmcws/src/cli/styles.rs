use console::Style;

pub fn status_open() -> Style {
    Style::new().green()
}

pub fn status_closed() -> Style {
    Style::new().dim()
}

pub fn status_missing() -> Style {
    Style::new().red()
}

pub fn exercise_id() -> Style {
    Style::new().yellow()
}

pub fn deadline_passed() -> Style {
    Style::new().red().italic()
}

pub fn deadline() -> Style {
    Style::new().italic()
}

pub fn path() -> Style {
    Style::new().cyan()
}
