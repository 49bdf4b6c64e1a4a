use clap::{Arg, Command}; // Import necessary modules from clap for command-line argument parsing
use std::process;

use authkeep::utils::io::{prompt_with_confirmation, read_line};
use authkeep::utils::logging::initialize_logging;
use authkeep::{AuthError, AuthManager, AuthState, FileStore, AUTH_FILE};

/// Prompt for a password without echoing it
fn prompt_password(prompt: &str) -> String {
    println!("{}", prompt);
    match rpassword::read_password() {
        Ok(password) => password,
        Err(err) => {
            eprintln!("Failed to read password: {}", err);
            process::exit(1);
        }
    }
}

/// Prompt for a plain line of input
fn prompt_line(prompt: &str) -> String {
    println!("{}", prompt);
    match read_line() {
        Ok(line) => line,
        Err(err) => {
            eprintln!("Failed to read input: {}", err);
            process::exit(1);
        }
    }
}

fn exit_with(err: AuthError) -> ! {
    eprintln!("Error: {}", err);
    process::exit(1);
}

fn print_backup_codes(codes: &[String]) {
    println!("\nBackup codes (single use, shown only once -- store them safely):");
    for code in codes {
        println!("  {}", code);
    }
}

fn main() {
    if let Err(err) = initialize_logging("authkeep.log") {
        eprintln!("Warning: failed to initialize logging: {}", err);
    }

    // Define the command-line interface using clap
    let matches = Command::new("authkeep")
        .about("File-backed credential manager with TOTP second factor and backup codes")
        .subcommand_required(true)
        .subcommand(
            Command::new("setup")
                .about("Start first-time setup: choose a username and password, enroll an authenticator")
                .arg(
                    Arg::new("username")
                        .help("The account username (at least 3 characters)")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("confirm")
                .about("Finish setup by entering the code shown in the authenticator app")
                .arg(
                    Arg::new("code")
                        .help("The current 6-digit code")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Verify username, password, and a one-time or backup code")
                .arg(Arg::new("username").help("The account username").required(true))
                .arg(
                    Arg::new("code")
                        .help("A 6-digit authenticator code or an unused backup code")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("change-password")
                .about("Change the password (requires the old password and a live code)")
                .arg(
                    Arg::new("code")
                        .help("The current 6-digit authenticator code")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("regenerate-codes")
                .about("Replace all backup codes (requires the password and a live code)")
                .arg(
                    Arg::new("code")
                        .help("The current 6-digit authenticator code")
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("reset")
                .about("Destroy the stored record and start over (irreversible)"),
        )
        .subcommand(Command::new("status").about("Show the current setup state"))
        .get_matches(); // Parse the command-line arguments

    let store = FileStore::new(AUTH_FILE);
    let manager = match AuthManager::new(Box::new(store)) {
        Ok(manager) => manager,
        Err(err) => exit_with(err),
    };

    // Handle the "setup" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("setup") {
        let username = sub_matches.get_one::<String>("username").unwrap();
        let password = prompt_password("Choose a password (at least 8 characters):");

        match manager.begin_setup(username, &password) {
            Ok(bundle) => {
                println!("Setup started for {}.", username);
                println!("\nTOTP secret (for manual entry): {}", bundle.secret);
                println!("Provisioning URI (scan or import): {}", bundle.provisioning_uri);
                print_backup_codes(&bundle.backup_codes);
                println!("\nEnroll the secret in an authenticator app, then run:");
                println!("  authkeep confirm <code>");
            }
            Err(err) => exit_with(err),
        }
    }

    // Handle the "confirm" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("confirm") {
        let code = sub_matches.get_one::<String>("code").unwrap();

        match manager.confirm_setup(code.trim()) {
            Ok(()) => println!("Setup confirmed. Two-factor authentication is active."),
            Err(err) => exit_with(err),
        }
    }

    // Handle the "login" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("login") {
        let username = sub_matches.get_one::<String>("username").unwrap();
        let code = sub_matches.get_one::<String>("code").unwrap();
        let password = prompt_password("Password:");

        match manager.verify_login(username, &password, code.trim()) {
            Ok(()) => println!("Login verified."),
            Err(err) => exit_with(err),
        }
    }

    // Handle the "change-password" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("change-password") {
        let code = sub_matches.get_one::<String>("code").unwrap();
        let old_password = prompt_password("Current password:");
        let new_password = prompt_password("New password (at least 8 characters):");

        match manager.change_password(&old_password, &new_password, code.trim()) {
            Ok(()) => println!("Password changed."),
            Err(err) => exit_with(err),
        }
    }

    // Handle the "regenerate-codes" subcommand
    if let Some(sub_matches) = matches.subcommand_matches("regenerate-codes") {
        let code = sub_matches.get_one::<String>("code").unwrap();
        let password = prompt_password("Password:");

        match manager.regenerate_backup_codes(&password, code.trim()) {
            Ok(codes) => {
                println!("All previous backup codes are now invalid.");
                print_backup_codes(&codes);
            }
            Err(err) => exit_with(err),
        }
    }

    // Handle the "reset" subcommand
    if matches.subcommand_matches("reset").is_some() {
        let confirmed = prompt_with_confirmation(
            "This deletes the username, password, TOTP secret, and every backup code.\n\
             There is no way back in without running setup again.",
            "Really reset authentication?",
        )
        .unwrap_or(false);

        if !confirmed {
            println!("Reset cancelled.");
            return;
        }

        // Second, typed confirmation for a destructive action
        let typed = prompt_line("Type RESET to proceed:");
        if typed != "RESET" {
            println!("Reset cancelled.");
            return;
        }

        match manager.reset_auth() {
            Ok(()) => println!("Authentication reset. Run 'authkeep setup' to start over."),
            Err(err) => exit_with(err),
        }
    }

    // Handle the "status" subcommand
    if matches.subcommand_matches("status").is_some() {
        match manager.state() {
            AuthState::Fresh => println!("Status: not set up"),
            AuthState::PendingVerification => {
                println!("Status: setup started, waiting for confirmation")
            }
            AuthState::Active => println!(
                "Status: active ({} backup codes remaining)",
                manager.backup_codes_remaining()
            ),
        }
    }
}
