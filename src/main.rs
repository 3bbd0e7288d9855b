//! # XBT
//!
//! Command line front end for the extended BASIC transpiler.

use ansi_term::Style;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use structopt::StructOpt;
use xbt::mach::{transpile, Cl65, Options};

#[derive(StructOpt, Debug)]
#[structopt(name = "xbt", about = "Extended BASIC transpiler for the Commander X16")]
struct Opt {
    /// Use the PETSCII character set
    #[structopt(short = "p", long = "petscii")]
    petscii: bool,

    /// Run the program in the X16 emulator
    #[structopt(short = "r", long = "run")]
    run: bool,

    /// Load the program in the X16 emulator
    #[structopt(short = "l", long = "load")]
    load: bool,

    /// Source file; .bas is assumed when no extension is given
    #[structopt(name = "src[.bas]", parse(from_os_str))]
    src: PathBuf,

    /// Destination file; defaults to the source name with .prg
    #[structopt(name = "dst.prg", parse(from_os_str))]
    dst: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    if let Err(error) = run(Opt::from_args()) {
        eprintln!("{}", Style::new().bold().paint(format!("ERROR: {}", error)));
        std::process::exit(1);
    }
}

fn run(opt: Opt) -> Result<()> {
    let src = default_source(&opt.src);
    if has_extension(&src, "prg") {
        bail!("INVALID SOURCE FILE, MUST BE A TEXT BASIC FILE");
    }
    let dst = match opt.dst {
        Some(dst) => dst,
        None => src.with_extension("prg"),
    };
    let text = fs::read_to_string(&src)
        .with_context(|| format!("SOURCE FILE DOES NOT EXIST: {}", src.display()))?;
    let options = Options {
        petscii: opt.petscii,
    };
    let mut assembler = Cl65::new();
    let image = transpile(&text, &options, &mut assembler)?;
    fs::write(&dst, &image).with_context(|| format!("COULD NOT WRITE {}", dst.display()))?;
    info!("wrote {} bytes to {}", image.len(), dst.display());
    if opt.run || opt.load {
        launch_emulator(&dst, opt.run)?;
    }
    Ok(())
}

fn default_source(src: &Path) -> PathBuf {
    if src.extension().is_none() {
        src.with_extension("bas")
    } else {
        src.to_path_buf()
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    match path.extension() {
        Some(e) => e.to_string_lossy().eq_ignore_ascii_case(ext),
        None => false,
    }
}

fn launch_emulator(dst: &Path, run: bool) -> Result<()> {
    let mut command = Command::new("x16emu");
    command.arg("-prg").arg(dst);
    if run {
        command.arg("-run");
    }
    debug!("launching {:?}", command);
    match command.status() {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => bail!("X16 EMULATOR EXITED WITH {}", status),
        Err(_) => bail!(
            "X16 EMULATOR IS REQUIRED TO RUN THIS PROGRAM\n\
             MAKE SURE THE EMULATOR DIRECTORY IS IN YOUR PATH ENVIRONMENT VAR"
        ),
    }
}
