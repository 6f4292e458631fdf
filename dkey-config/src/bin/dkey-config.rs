use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use dkey_config::{
    compiler::KeymapConfig,
    keycodes::{self, KeycodeDesc},
    pretty_compile,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process,
};

/// Compile and inspect dkey keymap configurations
#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a keymap configuration for errors
    Validate(ValidateArgs),
    /// Compile a keymap configuration to the binary keymap format
    Compile(CompileArgs),
    /// List the key names that may be used in a keymap configuration
    KeycodesList(KeycodesListArgs),
    /// List the unicode symbols of a keymap configuration
    Symbols(SymbolsArgs),
}

#[derive(Args)]
struct ValidateArgs {
    /// keymap config description file
    file: PathBuf,
    /// Print a summary of the layers and symbols
    #[clap(long, short)]
    verbose: bool,
}

#[derive(Args)]
struct CompileArgs {
    /// keymap config description file
    file: PathBuf,
    /// Where to write the binary keymap (little-endian u16 words)
    #[clap(long, short)]
    output: PathBuf,
}

#[derive(Args)]
struct KeycodesListArgs {
    /// Show every alias of each code, not just the first name
    #[clap(long, short)]
    verbose: bool,
    /// Sort by key code rather than name
    #[clap(long, short)]
    sort_by_keycode: bool,
    /// Only list names containing this text
    pattern: Option<String>,
}

#[derive(Args)]
struct SymbolsArgs {
    /// keymap config description file
    file: PathBuf,
}

fn read_source(file: &Path) -> anyhow::Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read \"{}\"", file.display()))
}

fn compile_file<'s>(file: &Path, src: &'s str) -> anyhow::Result<KeymapConfig<'s>> {
    pretty_compile(file, src).map_err(|err| {
        if err.span.is_none() {
            anyhow!("Failed to compile \"{}\"!\n    {}", file.display(), err.message)
        } else {
            anyhow!("Failed to compile \"{}\"!", file.display())
        }
    })
}

fn validate(args: &ValidateArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let src = read_source(&args.file)?;
    let config = compile_file(&args.file, &src)?;
    log::info!("{} is valid", args.file.display());

    if args.verbose {
        writeln!(
            out,
            "matrix: {}x{}",
            config.row_count, config.col_count
        )?;
        for (i, name) in config.layer_names().into_iter().enumerate() {
            writeln!(out, "layer {i}: {name}")?;
        }
        writeln!(out, "symbols: {}", config.symbols().count())?;
    }
    Ok(())
}

fn compile(args: &CompileArgs) -> anyhow::Result<()> {
    let src = read_source(&args.file)?;
    let config = compile_file(&args.file, &src)?;
    let bin = config.serialize();
    let bytes = bin
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect::<Vec<u8>>();
    fs::write(&args.output, bytes)
        .with_context(|| format!("Failed to write \"{}\"", args.output.display()))?;
    log::info!(
        "wrote {} words to {}",
        bin.len(),
        args.output.display()
    );
    Ok(())
}

fn keycodes_list(args: &KeycodesListArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let pattern = args.pattern.as_deref().map(str::to_lowercase);
    let mut list: Vec<&KeycodeDesc> = keycodes::keycodes_iter()
        .filter(|d| args.verbose || keycodes::code_name(d.code) == Some(d.name))
        .filter(|d| {
            pattern
                .as_deref()
                .is_none_or(|p| d.name.to_lowercase().contains(p))
        })
        .collect();

    if args.sort_by_keycode {
        list.sort_by_key(|d| (d.code, d.name.to_lowercase()));
    } else {
        list.sort_by_key(|d| d.name.to_lowercase());
    }

    for d in list {
        writeln!(out, "{:<20} 0x{:04x}", d.name, d.code)?;
    }
    Ok(())
}

fn symbols(args: &SymbolsArgs, out: &mut impl Write) -> anyhow::Result<()> {
    let src = read_source(&args.file)?;
    let config = compile_file(&args.file, &src)?;
    for s in config.symbols() {
        let c = char::from_u32(s.scalar).unwrap_or(char::REPLACEMENT_CHARACTER);
        writeln!(
            out,
            "0x{:04x} U+{:04X} {} {}",
            s.code,
            s.scalar,
            c,
            s.name.unwrap_or("")
        )?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        process::exit(1);
    };
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut out = std::io::stdout().lock();
    match &cli.command {
        Commands::Validate(args) => validate(args, &mut out),
        Commands::Compile(args) => compile(args),
        Commands::KeycodesList(args) => keycodes_list(args, &mut out),
        Commands::Symbols(args) => symbols(args, &mut out),
    }
}
