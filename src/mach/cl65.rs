use super::asm::Assembler;
use crate::error;
use crate::lang::Error;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Length of the file header cl65 prepends to its binary output with
/// the default target configuration.
pub const BIN_HEADER_LEN: usize = 14;

/// The cc65 toolchain as the external assembler. Compiles through
/// fixed temporary paths and blocks until the child process exits.
pub struct Cl65 {
    asm_path: PathBuf,
    bin_path: PathBuf,
}

impl Cl65 {
    pub fn new() -> Cl65 {
        let temp = std::env::temp_dir();
        Cl65 {
            asm_path: temp.join("xbt-temp.asm"),
            bin_path: temp.join("xbt-temp.bin"),
        }
    }
}

impl Default for Cl65 {
    fn default() -> Cl65 {
        Cl65::new()
    }
}

impl Assembler for Cl65 {
    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, Error> {
        fs::write(&self.asm_path, source).map_err(
            |e| error!(ToolchainError; format!("COULD NOT WRITE {}: {}", self.asm_path.display(), e)),
        )?;
        let output = Command::new("cl65")
            .arg("-o")
            .arg(&self.bin_path)
            .arg(&self.asm_path)
            .output()
            .map_err(|e| error!(ToolchainError; format!("COULD NOT RUN CL65: {}", e)))?;
        if !output.status.success() || !output.stderr.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(
                error!(ToolchainError; format!("COULD NOT COMPILE ASM: {}", stderr.trim())),
            );
        }
        let bin = fs::read(&self.bin_path).map_err(
            |e| error!(ToolchainError; format!("COULD NOT READ {}: {}", self.bin_path.display(), e)),
        )?;
        let _ = fs::remove_file(&self.asm_path);
        let _ = fs::remove_file(&self.bin_path);
        if bin.len() < BIN_HEADER_LEN {
            return Err(error!(ToolchainError; "ASSEMBLER OUTPUT TOO SHORT"));
        }
        Ok(bin[BIN_HEADER_LEN..].to_vec())
    }
}
