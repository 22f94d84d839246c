use std::{
    fmt::Display,
    io::Write,
    sync::{LazyLock, RwLock},
};

use nu_ansi_term::Color;
use spacerepo_core::{error::ErrorContext, SpaceResult};

pub static COLOR: LazyLock<RwLock<bool>> = LazyLock::new(|| RwLock::new(true));

pub fn interactive_ask(ques: &str) -> SpaceResult<String> {
    print!("{ques}");

    std::io::stdout()
        .flush()
        .with_context(|| "flushing stdout stream".to_string())?;

    let mut response = String::new();
    std::io::stdin()
        .read_line(&mut response)
        .with_context(|| "reading input from stdin".to_string())?;

    Ok(response.trim().to_owned())
}

pub fn confirm_action(message: &str) -> SpaceResult<bool> {
    let response = interactive_ask(&format!("{message} [y/N]: "))?;
    Ok(is_yes(&response))
}

fn is_yes(response: &str) -> bool {
    matches!(response.to_lowercase().as_str(), "y" | "yes")
}

pub struct Colored<T: Display>(pub Color, pub T);

impl<T: Display> Display for Colored<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let color = COLOR.read().unwrap();
        if *color {
            write!(f, "{}", self.0.prefix())?;
            self.1.fmt(f)?;
            write!(f, "{}", self.0.suffix())
        } else {
            self.1.fmt(f)
        }
    }
}
