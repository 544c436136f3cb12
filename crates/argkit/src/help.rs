use crate::builder::{Command, Opt, Program};

const COLUMN: usize = 20;

fn format_option_row(opt: &Opt) -> String {
    let mut help = if opt.description().trim().is_empty() {
        "No description provided.".to_string()
    } else {
        opt.description().trim().to_string()
    };
    if let Some(default) = opt.get_default() {
        help.push_str(&format!("  (default: {default})"));
    }
    format!("  {:width$} {}\n", opt.raw(), help, width = COLUMN)
}

fn push_options(out: &mut String, title: &str, options: &[Opt]) {
    out.push_str(title);
    out.push('\n');
    for opt in options {
        out.push_str(&format_option_row(opt));
    }
}

fn program_help(out: &mut String, program: &Program) {
    out.push_str("Usage\n");
    out.push_str(&format!("  $ {} [command] [options]\n", program.name()));

    if !program.commands().is_empty() {
        out.push_str("\nCommands\n");
        for cmd in program.commands() {
            let mut summary = cmd.description().trim().to_string();
            if !cmd.aliases().is_empty() {
                if !summary.is_empty() {
                    summary.push(' ');
                }
                summary.push_str(&format!("(aliases: {})", cmd.aliases().join(", ")));
            }
            if summary.is_empty() {
                out.push_str(&format!("  {}\n", cmd.name()));
            } else {
                out.push_str(&format!("  {:width$} {}\n", cmd.name(), summary, width = COLUMN));
            }
        }
    }

    out.push('\n');
    push_options(out, "Options (global)", program.options());

    out.push_str("\nRun '<command> --help' for more information on a command.\n");
}

fn command_help(out: &mut String, program: &Program, cmd: &Command) {
    out.push_str("Usage\n");
    out.push_str(&format!("  $ {} {}\n", program.name(), cmd.usage()));

    if !cmd.description().trim().is_empty() {
        out.push('\n');
        out.push_str(cmd.description().trim_end());
        out.push('\n');
    }
    if !cmd.aliases().is_empty() {
        out.push_str(&format!("\nAliases: {}\n", cmd.aliases().join(", ")));
    }

    out.push('\n');
    push_options(out, "Options (global)", program.options());

    if !cmd.options().is_empty() {
        out.push('\n');
        push_options(out, "Options (scoped)", cmd.options());
    }
}

/// Render help for the whole program, or for one command when `command`
/// names it (by name or alias).
pub fn render_help(program: &Program, command: Option<&str>) -> String {
    let mut out = String::new();
    match command.map(str::trim).filter(|c| !c.is_empty()) {
        None => program_help(&mut out, program),
        Some(token) => match program.find_command(token) {
            Some(cmd) => command_help(&mut out, program, cmd),
            None => out.push_str(&format!("Command {token} not found\n")),
        },
    }
    out
}

/// Render the version line.
pub fn render_version(program: &Program) -> String {
    match program.get_version().map(str::trim).filter(|v| !v.is_empty()) {
        Some(version) => format!("{} {}\n", program.name(), version),
        None => format!("{}\n", program.name()),
    }
}
