use std::{env, env::VarError};

/// The server takes no arguments. Any argument prints the help text and the current configuration.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 7] = [
        "RUST_LOG",
        "ODS_HOST",
        "ODS_PORT",
        "ODS_DATABASE_URL",
        "ODS_MAX_CONNECTIONS",
        "ODS_JWT_EXPIRY_HOURS",
        "ODS_ADMIN_USERNAME",
    ];
    // Only report whether these are set
    const SECRET_ENVS: [&str; 2] = ["ODS_JWT_SECRET", "ODS_ADMIN_PASSWORD"];

    println!("Current environment values (secrets are masked):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    });
    SECRET_ENVS.iter().for_each(|&name| {
        let val = if env::var_os(name).is_some() { "****" } else { "Not set" };
        println!("  {name:<35} {val:<15}");
    });
}
