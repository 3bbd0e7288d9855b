use xbt::lang::Error;
use xbt::mach::{transpile, Assembler, Options};

/// Scripted stand-in for the external assembler. Records every source
/// it is handed and answers with a fixed blob.
pub struct FakeAssembler {
    pub sources: Vec<String>,
    blob: Vec<u8>,
}

impl FakeAssembler {
    pub fn new(blob: Vec<u8>) -> FakeAssembler {
        FakeAssembler {
            sources: vec![],
            blob,
        }
    }
}

impl Assembler for FakeAssembler {
    fn assemble(&mut self, source: &str) -> Result<Vec<u8>, Error> {
        self.sources.push(source.to_string());
        Ok(self.blob.clone())
    }
}

pub fn prg(source: &str, petscii: bool) -> Vec<u8> {
    try_prg(source, petscii).unwrap()
}

pub fn try_prg(source: &str, petscii: bool) -> Result<Vec<u8>, Error> {
    let mut assembler = FakeAssembler::new(vec![]);
    transpile(source, &Options { petscii }, &mut assembler)
}

/// The BASIC line numbers of every record in an image, in file order.
pub fn line_numbers(image: &[u8]) -> Vec<u16> {
    let mut numbers = vec![];
    let mut pos = 2;
    while pos + 1 < image.len() && !(image[pos] == 0 && image[pos + 1] == 0) {
        numbers.push(u16::from(image[pos + 2]) | u16::from(image[pos + 3]) << 8);
        pos += 4;
        while image[pos] != 0 {
            pos += 1;
        }
        pos += 1;
    }
    numbers
}

/// True when `needle` appears in `haystack`.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
