pub mod gate;
pub mod logging;
pub mod state;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const CMD_UNLOCK: &str = "unlock";
pub const CMD_DIGEST: &str = "digest";
pub const CMD_FORGET: &str = "forget";
pub const CMD_FINGERPRINT: &str = "fingerprint";

pub const ARG_EXEC: &str = "exec";
pub const ARG_PASSCODE: &str = "passcode";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let unlock = Command::new(CMD_UNLOCK)
        .about("Unlock with a remembered login or a passcode")
        .arg(
            Arg::new(ARG_EXEC)
                .help("Command to run once unlocked")
                .num_args(1..)
                .last(true),
        );

    let command = Command::new("passgate")
        .about("Passcode gate with device-bound remembered logins")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(gate::with_args(unlock))
        .subcommand(
            Command::new(CMD_DIGEST)
                .about("Print the allow-list digest of a passcode")
                .arg(
                    Arg::new(ARG_PASSCODE)
                        .help("Passcode to digest, prompted for when omitted"),
                ),
        )
        .subcommand(
            Command::new(CMD_FORGET).about("Forget the remembered login on this device"),
        )
        .subcommand(
            Command::new(CMD_FINGERPRINT).about("Print the digest of this device's fingerprint"),
        );

    let command = state::with_args(command);
    logging::with_args(command)
}
