//! CLI for verifying Self-protocol proofs and exporting them for gnark.
//!
//! Usage examples:
//!   zkid-bridge --proof captures/proofs/abc.json --decode
//!   zkid-bridge --proof captures/proofs/abc.json --vk self-vkeys/vc_and_disclose_id.json
//!   zkid-bridge --proof-only proof.json --public-signals public.json --vk vkey.json
//!   zkid-bridge --proof captures/proofs/abc.json --export-gnark out/ --check-export

use std::{path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use tracing::error;
use tracing_subscriber::EnvFilter;

use zkid_bridge::{
    attestation_name, pipeline, BridgeError, Groth16Verifier, PipelineOptions, PipelineReport,
    ProofInput,
};

#[derive(Parser, Debug)]
#[command(name = "zkid-bridge")]
#[command(about = "Verify Self-protocol Groth16 proofs and export them in gnark's layout", long_about = None)]
struct Cli {
    /// Captured proof JSON (attestationId, proof, publicSignals)
    #[arg(long)]
    proof: Option<PathBuf>,

    /// Verification key JSON; auto-selected from the attestation id when omitted
    #[arg(long)]
    vk: Option<PathBuf>,

    /// Directory holding the vc_and_disclose*.json keys
    #[arg(long, env = "ZKID_VK_DIR")]
    vk_dir: Option<PathBuf>,

    /// Bare snarkjs proof JSON (requires --public-signals and --vk)
    #[arg(long)]
    proof_only: Option<PathBuf>,

    /// Public signals JSON array, used with --proof-only
    #[arg(long)]
    public_signals: Option<PathBuf>,

    /// Directory to export proof.bin, vk.bin, public_inputs.bin and identity.json
    #[arg(long)]
    export_gnark: Option<PathBuf>,

    /// Decode identity fields from the public signals
    #[arg(long)]
    decode: bool,

    /// Re-read the exported files, decode them and verify again (needs --export-gnark)
    #[arg(long)]
    check_export: bool,
}

impl Cli {
    /// `None` when no input was given. `--proof` wins over `--proof-only`.
    fn into_options(self) -> Result<Option<PipelineOptions>, BridgeError> {
        let input = match (self.proof, self.proof_only) {
            (Some(proof), _) => ProofInput::Captured(proof),
            (None, Some(proof)) => {
                let public_signals = self
                    .public_signals
                    .ok_or(BridgeError::MissingArgument("--public-signals"))?;
                if self.vk.is_none() {
                    return Err(BridgeError::MissingArgument("--vk"));
                }
                ProofInput::Standalone {
                    proof,
                    public_signals,
                }
            }
            (None, None) => return Ok(None),
        };

        if self.check_export && self.export_gnark.is_none() {
            return Err(BridgeError::MissingArgument("--export-gnark"));
        }

        Ok(Some(PipelineOptions {
            input,
            vk_path: self.vk,
            vk_dir: self.vk_dir,
            export_dir: self.export_gnark,
            decode: self.decode,
            check_export: self.check_export,
        }))
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  zkid-bridge --proof <captured.json> [--vk <vkey.json> | --vk-dir <dir>] [--decode] [--export-gnark <dir> [--check-export]]");
    println!("  zkid-bridge --proof-only <proof.json> --public-signals <public.json> --vk <vkey.json> [--export-gnark <dir>]");
    println!();
    println!("Examples:");
    println!("  zkid-bridge --proof captures/proofs/abc.json --decode");
    println!("  zkid-bridge --proof captures/proofs/abc.json --vk self-vkeys/vc_and_disclose_id.json");
    println!("  zkid-bridge --proof-only proof.json --public-signals public.json --vk vkey.json");
}

fn print_report(report: &PipelineReport) {
    if let Some(identity) = &report.identity {
        println!("\n--- Decoded identity fields ---");
        if identity.is_empty() {
            println!("  (not enough revealed data to decode)");
        }
        for (key, value) in identity {
            println!("  {}: {}", key, value);
        }
    }

    if let Some(export) = &report.export {
        println!("\n--- Exported gnark artifacts ---");
        for file in export.files() {
            println!("  {}: {} bytes", file.path.display(), file.bytes);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(true)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                let _ = err.print();
                return ExitCode::FAILURE;
            }
        },
    };

    let options = match cli.into_options() {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage();
            return ExitCode::FAILURE;
        }
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let report = match pipeline::run(&options, &Groth16Verifier) {
        Ok(report) => report,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    if !report.verification.verified {
        println!("PROOF INVALID");
        return ExitCode::FAILURE;
    }

    println!(
        "PROOF VERIFIED in {} ms ({}, attestation {} {})",
        report.verification.elapsed.as_millis(),
        report.proof_format,
        report.attestation_id,
        attestation_name(report.attestation_id)
    );
    print_report(&report);

    ExitCode::SUCCESS
}
