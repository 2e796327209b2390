//! Command-line front-end: sign the VBA project of an Office document.

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

use vba_signer::{sign_vba_project, SignOptions};

#[derive(Parser)]
#[command(name = "vba-signer")]
#[command(about = "Sign the VBA macro project inside .docm/.xlsm/.pptm documents")]
#[command(version)]
struct Cli {
    /// Office file to sign (.xlsm, .docm, .pptm)
    #[arg(short = 'f', value_name = "OFFICE_FILE")]
    file: PathBuf,

    /// PEM X.509 certificate for signing (.crt)
    #[arg(short = 'c', value_name = "CERT_FILE")]
    cert: PathBuf,

    /// PEM private key for signing (.key), PKCS#1 or PKCS#8
    #[arg(short = 's', value_name = "KEY_FILE")]
    key: PathBuf,

    /// Optional issuing certificate (.pem)
    #[arg(short = 'i', value_name = "CA_FILE")]
    ca: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let options = SignOptions::default();
    let output = sign_vba_project(
        &cli.file,
        &cli.cert,
        &cli.key,
        cli.ca.as_deref(),
        &options,
    )?;
    println!("{}", output.display());
    Ok(())
}
