use crate::gate::AllowList;
use anyhow::{anyhow, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use regex::Regex;
use std::{fs, path::PathBuf, time::Duration};

pub const ARG_PASSCODES: &str = "passcodes";
pub const ARG_PASSCODES_FILE: &str = "passcodes-file";
pub const ARG_TITLE: &str = "title";
pub const ARG_LOGO: &str = "logo";
pub const ARG_REDIRECT_DELAY_MS: &str = "redirect-delay-ms";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSCODES)
                .long(ARG_PASSCODES)
                .help("Accepted passcode digests (MD5, hex), comma separated")
                .env("PASSGATE_PASSCODES")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .required_unless_present(ARG_PASSCODES_FILE),
        )
        .arg(
            Arg::new(ARG_PASSCODES_FILE)
                .long(ARG_PASSCODES_FILE)
                .help("File with one accepted digest per line, # starts a comment")
                .env("PASSGATE_PASSCODES_FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(ARG_TITLE)
                .long(ARG_TITLE)
                .help("Title shown above the form")
                .env("PASSGATE_TITLE")
                .default_value("Protected"),
        )
        .arg(
            Arg::new(ARG_LOGO)
                .long(ARG_LOGO)
                .help("Logo shown next to the title")
                .env("PASSGATE_LOGO"),
        )
        .arg(
            Arg::new(ARG_REDIRECT_DELAY_MS)
                .long(ARG_REDIRECT_DELAY_MS)
                .help("Milliseconds to wait after a successful login before handing off")
                .env("PASSGATE_REDIRECT_DELAY_MS")
                .default_value("500")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[must_use]
pub fn valid_digest(digest: &str) -> bool {
    // MD5 digest, 32 hex characters
    Regex::new(r"^[0-9a-fA-F]{32}$").map_or(false, |re| re.is_match(digest))
}

/// Digests listed in an allow-list file.
#[must_use]
pub fn parse_digest_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct Options {
    pub passcodes: AllowList,
    pub title: String,
    pub logo: Option<String>,
    pub redirect_delay: Duration,
}

impl Options {
    /// # Errors
    /// Returns an error if the allow-list file cannot be read, a digest is
    /// malformed, or no digest is configured at all.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let mut digests: Vec<String> = matches
            .get_many::<String>(ARG_PASSCODES)
            .map(|values| values.map(|value| value.trim().to_string()).collect())
            .unwrap_or_default();

        if let Some(path) = matches.get_one::<PathBuf>(ARG_PASSCODES_FILE) {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read passcodes file {}", path.display()))?;
            digests.extend(parse_digest_lines(&raw));
        }

        digests.retain(|digest| !digest.is_empty());

        if let Some(invalid) = digests.iter().find(|digest| !valid_digest(digest)) {
            return Err(anyhow!(
                "invalid passcode digest '{invalid}': expected 32 hex characters"
            ));
        }

        let passcodes = AllowList::new(&digests);
        if passcodes.is_empty() {
            return Err(anyhow!(
                "no passcodes configured: use --{ARG_PASSCODES} or --{ARG_PASSCODES_FILE}"
            ));
        }

        Ok(Self {
            passcodes,
            title: matches
                .get_one::<String>(ARG_TITLE)
                .cloned()
                .unwrap_or_default(),
            logo: matches.get_one::<String>(ARG_LOGO).cloned(),
            redirect_delay: Duration::from_millis(
                matches
                    .get_one::<u64>(ARG_REDIRECT_DELAY_MS)
                    .copied()
                    .unwrap_or(500),
            ),
        })
    }
}
