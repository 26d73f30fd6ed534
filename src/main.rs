// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `docsign` command line entry point.

use {
    clap::{Arg, ArgMatches, Command},
    docsign::{config, credentials::SigningCredentials, digest, signer, verifier, DocsignError},
    log::{info, LevelFilter},
    std::path::Path,
};

fn command_serve(_args: &ArgMatches) -> Result<(), DocsignError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(docsign::server::run())
}

/// Run the digest, sign and verify steps in sequence against local files.
///
/// This is the non-HTTP demonstration flow: write the document's SHA-512
/// hex to one file, write its detached CMS signature to another, then
/// verify that signature and log what the verifier extracted. The PKCS#12
/// password comes from `P12_PASSWORD` (a `.env` file in the working
/// directory is honored).
fn command_demo(args: &ArgMatches) -> Result<(), DocsignError> {
    let document = args
        .value_of("document")
        .ok_or(DocsignError::CliBadArgument)?;
    let p12 = args.value_of("p12").ok_or(DocsignError::CliBadArgument)?;
    let digest_output = args
        .value_of("digest-output")
        .ok_or(DocsignError::CliBadArgument)?;
    let signature_output = args
        .value_of("signature-output")
        .ok_or(DocsignError::CliBadArgument)?;

    let password = std::env::var(config::P12_PASSWORD_VAR).unwrap_or_default();

    info!("step 1: computing document digest");
    let document_digest = digest::sha512_hex_path(document)?;
    std::fs::write(digest_output, &document_digest)?;
    info!("digest written to {}", digest_output);

    info!("step 2: creating digital signature");
    let credentials = SigningCredentials::from_pkcs12_path(Path::new(p12), &password)?;
    let content = std::fs::read(document)?;
    let signature = signer::sign_detached(&credentials, &content)?;
    std::fs::write(signature_output, &signature)?;
    info!("signature written to {}", signature_output);

    info!("step 3: verifying signature");
    let outcome = verifier::verify(&signature);
    info!("status: {}", outcome.status());

    if let Some(details) = &outcome.details {
        info!("signer: {}", details.signer_name);
        info!("signing time: {}", details.signing_time);
        info!("digest algorithm: {}", details.digest_algorithm);
        info!("document hash: {}", details.document_hash);
    }

    if outcome.is_valid {
        Ok(())
    } else {
        Err(DocsignError::VerificationFailed)
    }
}

fn main_impl() -> Result<(), DocsignError> {
    let app = Command::new("docsign")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Detached CMS document signing and verification")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .multiple_occurrences(true)
                .help("Increase logging verbosity. Can be specified multiple times."),
        );

    let app = app.subcommand(
        Command::new("serve").about("Run the HTTP signing service on port 8080"),
    );

    let app = app.subcommand(
        Command::new("demo")
            .about("Run the digest, sign and verify steps against local files")
            .arg(
                Arg::new("document")
                    .long("document")
                    .takes_value(true)
                    .required(true)
                    .help("Document to digest and sign"),
            )
            .arg(
                Arg::new("p12")
                    .long("p12")
                    .takes_value(true)
                    .required(true)
                    .help("PKCS#12 bundle holding the signing credential"),
            )
            .arg(
                Arg::new("digest-output")
                    .long("digest-output")
                    .takes_value(true)
                    .default_value("digest.txt")
                    .help("Where to write the document's SHA-512 hex"),
            )
            .arg(
                Arg::new("signature-output")
                    .long("signature-output")
                    .takes_value(true)
                    .default_value("signature.p7s")
                    .help("Where to write the DER CMS signature"),
            ),
    );

    let matches = app.get_matches();

    let log_level = match matches.occurrences_of("verbose") {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_level.as_str()),
    );

    if log_level <= LevelFilter::Info {
        builder
            .format_timestamp(None)
            .format_level(false)
            .format_target(false);
    }

    builder.init();

    config::load_dotenv();

    match matches.subcommand() {
        Some(("serve", args)) => command_serve(args),
        Some(("demo", args)) => command_demo(args),
        _ => Err(DocsignError::CliUnknownCommand),
    }
}

fn main() {
    let exit_code = match main_impl() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {}", err);
            1
        }
    };

    std::process::exit(exit_code)
}
