use colored::*;
use terminal_size::{Width, Height, terminal_size};
use crate::config::Layout;

pub fn print_header(title: &str, layout: &Layout) {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    let width = width.0 as usize;

    let line = "─".repeat(width);
    println!("{}", line.black().bold());

    let name = "Jupiter Tools".yellow().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).black().bold();
    println!("  🪐 {} {}  {}", name, version, title.cyan());

    let root = layout.root.to_string_lossy().black().bold();
    println!("  {}", root);

    println!("{}", line.black().bold());
}

pub fn print_step(msg: &str) {
    println!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "❌".red().bold(), msg.red());
}

pub fn print_thinking(msg: &str) {
    println!("  {} {}...", "∴".magenta(), msg);
}
