use std::collections::BTreeMap;
use std::process;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use dscalc::cases::{CaseFile, DsCase, ResolvedCase, reference_case};
use dscalc::config::{DsCalcConfig, parse_digest_types, parse_ttl};
use dscalc::dnssec::{DigestRegistry, DigestType, DnsSecAlgorithm, DnskeyRecord, DsRecord};

fn cli() -> Command {
    Command::new("dscalc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compute DNSSEC DS records from a DNSKEY and check them against references")
        .arg(
            Arg::new("owner")
                .short('o')
                .long("owner")
                .value_name("NAME")
                .help("Owner name of the DNSKEY")
                .default_value("example.com."),
        )
        .arg(
            Arg::new("flags")
                .long("flags")
                .value_name("NUMBER")
                .help("DNSKEY flags")
                .value_parser(clap::value_parser!(i64))
                .default_value("257")
                .conflicts_with("dnskey"),
        )
        .arg(
            Arg::new("protocol")
                .long("protocol")
                .value_name("NUMBER")
                .help("DNSKEY protocol")
                .value_parser(clap::value_parser!(i64))
                .default_value("3")
                .conflicts_with("dnskey"),
        )
        .arg(
            Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .value_name("NUMBER")
                .help("DNSKEY algorithm")
                .value_parser(clap::value_parser!(i64))
                .default_value("13")
                .conflicts_with("dnskey"),
        )
        .arg(
            Arg::new("key")
                .short('k')
                .long("key")
                .value_name("BASE64")
                .help("DNSKEY public key, base64 encoded")
                .conflicts_with_all(["dnskey", "cases"]),
        )
        .arg(
            Arg::new("dnskey")
                .long("dnskey")
                .value_name("RDATA")
                .help("DNSKEY RDATA in presentation form, e.g. \"257 3 13 6a81...\"")
                .conflicts_with("cases"),
        )
        .arg(
            Arg::new("digest-type")
                .short('d')
                .long("digest-type")
                .value_name("TYPES")
                .help("Digest types to compute, comma separated (number or name)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("expect")
                .short('e')
                .long("expect")
                .value_name("RDATA")
                .help("Reference DS RDATA to compare with, e.g. \"20545 13 2 E460...\"")
                .action(ArgAction::Append)
                .conflicts_with("cases"),
        )
        .arg(
            Arg::new("ttl")
                .short('t')
                .long("ttl")
                .value_name("SECONDS")
                .help("TTL printed on DS records"),
        )
        .arg(
            Arg::new("cases")
                .short('c')
                .long("cases")
                .value_name("FILE")
                .help("TOML file with cases to run"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = cli().get_matches();

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(2);
        }
    };

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if config.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cases = match load_cases(&matches, &config) {
        Ok(cases) => cases,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let registry = DigestRegistry::with_defaults();
    debug!("Digest registry: {:?}", registry);
    for digest_type in unsupported_digest_types(&config.digest_types, &registry) {
        warn!("Digest type {} has no registered hash primitive", digest_type);
    }

    let mut total = 0;
    let mut failures = 0;
    let mut checked = 0;
    for case in &cases {
        if let Some(algorithm) = DnsSecAlgorithm::from_u8(case.dnskey.algorithm()) {
            debug!(
                "{} DNSKEY {} ({}{}), key tag {}",
                case.owner,
                case.dnskey.flags(),
                algorithm,
                if algorithm.is_recommended() { "" } else { ", not recommended" },
                case.dnskey.key_tag()
            );
        }

        for outcome in case.run(&config.digest_types, &registry) {
            print!("{}", outcome.report());
            total += 1;
            if outcome.matched.is_some() {
                checked += 1;
            }
            if outcome.is_failure() {
                failures += 1;
            }
        }
    }

    if failures > 0 {
        error!("{} of {} DS records failed", failures, total);
        process::exit(1);
    }
    if checked > 0 {
        info!("All {} DS records match their references", checked);
    }
}

/// Requested digest types the registry cannot compute. Also logs which of
/// the supported ones are recommended.
fn unsupported_digest_types(digest_types: &[u8], registry: &DigestRegistry) -> Vec<u8> {
    let mut unsupported = Vec::new();
    for &digest_type in digest_types {
        if !registry.is_supported(digest_type) {
            unsupported.push(digest_type);
            continue;
        }
        if let Some(known) = DigestType::from_u8(digest_type) {
            debug!(
                "Digest type {} ({}) recommended: {}",
                digest_type,
                known,
                known.is_recommended()
            );
        }
    }
    unsupported
}

fn build_config(matches: &ArgMatches) -> Result<DsCalcConfig, Box<dyn std::error::Error>> {
    let mut config = DsCalcConfig::from_env()?;

    if let Some(ttl) = matches.get_one::<String>("ttl") {
        config.ttl = parse_ttl(ttl)?;
    }

    if let Some(values) = matches.get_many::<String>("digest-type") {
        let mut digest_types = Vec::new();
        for value in values {
            digest_types.extend(parse_digest_types(value)?);
        }
        config.digest_types = digest_types;
    }

    if let Some(cases) = matches.get_one::<String>("cases") {
        config.cases_file = Some(cases.clone());
    }

    if matches.get_flag("verbose") {
        config.verbose = true;
    }

    config.validate()?;
    Ok(config)
}

fn load_cases(
    matches: &ArgMatches,
    config: &DsCalcConfig,
) -> Result<Vec<ResolvedCase>, Box<dyn std::error::Error>> {
    let owner = matches
        .get_one::<String>("owner")
        .map(String::as_str)
        .unwrap_or("example.com.");

    let mut case = if let Some(rdata) = matches.get_one::<String>("dnskey") {
        let dnskey: DnskeyRecord = rdata.parse()?;
        ResolvedCase {
            owner: owner.parse()?,
            dnskey,
            ttl: config.ttl,
            expected: BTreeMap::new(),
        }
    } else if let Some(key) = matches.get_one::<String>("key") {
        DsCase {
            owner: owner.to_string(),
            flags: matches.get_one::<i64>("flags").copied().unwrap_or(257),
            protocol: matches.get_one::<i64>("protocol").copied().unwrap_or(3),
            algorithm: matches.get_one::<i64>("algorithm").copied().unwrap_or(13),
            public_key: key.clone(),
            ttl: None,
            expect: BTreeMap::new(),
        }
        .resolve(config.ttl)?
    } else if let Some(path) = &config.cases_file {
        let file = CaseFile::load(path)?;
        return file
            .cases
            .iter()
            .map(|case| case.resolve(config.ttl).map_err(Into::into))
            .collect();
    } else {
        info!("No DNSKEY given, running the built-in example.com. reference case");
        reference_case(config.ttl)?
    };

    if let Some(values) = matches.get_many::<String>("expect") {
        for value in values {
            let ds: DsRecord = value.parse()?;
            case.expected.insert(ds.digest_type(), ds);
        }
    }

    Ok(vec![case])
}
