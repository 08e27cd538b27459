//! Command-line entry point: `encode`, `decode`, and `capacity` subcommands
//! over the `stegcrypt_core` library.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use zeroize::Zeroize;

use stegcrypt_core::{
    analyze_capacity, decode, encode, CarrierKind, DecodeOptions, EncodeOptions, Payload, Platform, StegoError,
};

/// Wraps the library's closed `StegoError` taxonomy with the one failure
/// mode it has no opinion on: the filesystem. Kept separate so a missing or
/// unreadable carrier/payload file exits 5 ("I/O error") per spec.md §6,
/// rather than being reported as `StegoError::CarrierCorrupt` (exit 2) as if
/// the bytes themselves — which were never even read — were malformed.
#[derive(Debug, thiserror::Error)]
enum CliError
{
    #[error(transparent)]
    Stego(#[from] StegoError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError
{
    fn exit_code(&self) -> i32
    {
        match self
        {
            CliError::Stego(err) => err.exit_code(),
            CliError::Io(_) => 5,
        }
    }
}

#[derive(Parser)]
#[command(name = "stegcrypt", about = "Password-based LSB steganography over PNG/BMP/WAV carriers")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PlatformArg
{
    Desktop,
    Mobile,
}

impl From<PlatformArg> for Platform
{
    fn from(p: PlatformArg) -> Self
    {
        match p
        {
            PlatformArg::Desktop => Platform::Desktop,
            PlatformArg::Mobile => Platform::Mobile,
        }
    }
}

#[derive(Subcommand)]
enum Command
{
    /// Encrypt a payload and embed it into a carrier.
    Encode
    {
        #[arg(long = "in")]
        input: PathBuf,

        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,

        #[arg(long = "out")]
        output: PathBuf,

        #[arg(long = "password-env")]
        password_env: String,

        #[arg(long, default_value_t = 1)]
        depth: u8,

        #[arg(long, default_value_t = false)]
        high_security: bool,

        #[arg(long, default_value_t = false)]
        no_compress: bool,

        #[arg(long, value_enum, default_value_t = PlatformArg::Desktop)]
        platform: PlatformArg,

        #[arg(long, default_value_t = false)]
        expert: bool,
    },
    /// Extract and decrypt a payload from a stego carrier.
    Decode
    {
        #[arg(long = "in")]
        input: PathBuf,

        #[arg(long = "out")]
        output: PathBuf,

        #[arg(long = "password-env")]
        password_env: String,

        #[arg(long, default_value_t = 1)]
        depth: u8,

        #[arg(long, value_enum, default_value_t = PlatformArg::Desktop)]
        platform: PlatformArg,

        #[arg(long, default_value_t = false)]
        expert: bool,
    },
    /// Report embedding capacity for a carrier at a given depth.
    Capacity
    {
        #[arg(long = "in")]
        input: PathBuf,

        #[arg(long, default_value_t = 1)]
        depth: u8,
    },
}

fn carrier_kind_for(path: &PathBuf) -> Result<CarrierKind, StegoError>
{
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref()
    {
        Some("png") => Ok(CarrierKind::Png),
        Some("bmp") => Ok(CarrierKind::Bmp),
        Some("wav") => Ok(CarrierKind::Wav),
        other => Err(StegoError::UnsupportedFormat(format!("unrecognized carrier extension: {other:?}"))),
    }
}

fn read_password(var: &str) -> Result<String, StegoError>
{
    std::env::var(var).map_err(|_| StegoError::UnsupportedFormat(format!("environment variable {var} is not set")))
}

fn run() -> Result<(), CliError>
{
    let cli = Cli::parse();

    match cli.command
    {
        Command::Encode { input, text, file, output, password_env, depth, high_security, no_compress, platform, expert } =>
        {
            let kind = carrier_kind_for(&input)?;
            let carrier = fs::read(&input)?;

            let payload = match (text, file)
            {
                (Some(text), None) => Payload::Text(text),
                (None, Some(path)) =>
                {
                    let bytes = fs::read(&path)?;
                    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("payload.bin").to_string();
                    Payload::File { bytes, name, mime: "application/octet-stream".to_string() }
                }
                _ => return Err(StegoError::UnsupportedFormat("exactly one of --text or --file is required".into()).into()),
            };

            let mut password = read_password(&password_env)?;
            let options = EncodeOptions {
                lsb_depth: depth,
                high_security,
                compress: !no_compress,
                platform: platform.into(),
                expert,
            };
            let result = encode(&carrier, kind, payload, &password, &options);
            password.zeroize();
            let (stego_bytes, _) = result?;

            fs::write(&output, stego_bytes)?;
            log::info!("encoded {} -> {}", input.display(), output.display());
            Ok(())
        }
        Command::Decode { input, output, password_env, depth, platform, expert } =>
        {
            let kind = carrier_kind_for(&input)?;
            let stego = fs::read(&input)?;

            let mut password = read_password(&password_env)?;
            let options = DecodeOptions { lsb_depth: depth, platform: platform.into(), expert };
            let result = decode(&stego, kind, &password, &options);
            password.zeroize();
            let decoded = result?;

            fs::write(&output, &decoded.bytes)?;
            log::info!(
                "decoded {} -> {} ({} bytes, type={:?})",
                input.display(),
                output.display(),
                decoded.bytes.len(),
                decoded.metadata.kind
            );
            Ok(())
        }
        Command::Capacity { input, depth } =>
        {
            let kind = carrier_kind_for(&input)?;
            let carrier = fs::read(&input)?;
            let report = analyze_capacity(&carrier, kind, depth)?;
            println!("{} bytes available at depth {}", report.total_bytes, depth);
            Ok(())
        }
    }
}

fn main() -> ExitCode
{
    env_logger::init();

    match run()
    {
        Ok(()) => ExitCode::from(0),
        Err(err) =>
        {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
