//! Command-line entry points behind the `bloodconnect` binary.

pub mod seeder;
pub mod serve;
pub mod whoami;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bloodconnect")]
#[command(about = "BloodConnect session bootstrap and reference user backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the reference backend REST API over an in-memory user store
    Serve {
        /// Number of fake users to seed before listening
        #[arg(short = 's', long, default_value = "0")]
        seed: usize,

        /// Email to create (or promote) as an administrator
        #[arg(short = 'a', long)]
        admin: Option<String>,
    },
    /// Sign in, resolve the session and print it as JSON
    Whoami {
        /// Email address
        #[arg(short = 'e', long)]
        email: String,

        /// Password
        #[arg(short = 'p', long)]
        password: String,

        /// Use the in-process identity provider instead of Firebase.
        /// Accounts that do not exist yet are signed up.
        #[arg(long)]
        local: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Serve { seed, admin } => serve::run(seed, admin).await,
            Commands::Whoami {
                email,
                password,
                local,
            } => {
                let report = whoami::run(&email, &password, local).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["bloodconnect", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { seed, admin } => {
                assert_eq!(seed, 0);
                assert!(admin.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_whoami_local() {
        let cli = Cli::try_parse_from([
            "bloodconnect",
            "whoami",
            "--email",
            "donor@example.com",
            "--password",
            "secret1",
            "--local",
        ])
        .unwrap();
        match cli.command {
            Commands::Whoami { email, local, .. } => {
                assert_eq!(email, "donor@example.com");
                assert!(local);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_whoami_requires_password() {
        assert!(Cli::try_parse_from(["bloodconnect", "whoami", "--email", "a@b.co"]).is_err());
    }
}
