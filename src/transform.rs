//! Transformer capability consumed by the rewriters.
//!
//! A transformer maps the bytes of one class to new bytes. Instances are
//! selected once per pass by name from a [`TransformerRegistry`] and invoked
//! serially, so implementations need no internal synchronization.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::classfile::parse_header;
use crate::error::{ConfigError, TransformError};

pub const ASM: &str = "asm";

pub trait ClassTransformer {
    fn transform(&self, class_bytes: &[u8]) -> Result<Vec<u8>, TransformError>;
}

impl<F> ClassTransformer for F
where
    F: Fn(&[u8]) -> Result<Vec<u8>, TransformError>,
{
    fn transform(&self, class_bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        self(class_bytes)
    }
}

/// Settings handed to every transformer factory.
#[derive(Debug, Clone, Default)]
pub struct TransformerOptions {
    /// External program that rewrites one class: class bytes on stdin,
    /// rewritten bytes on stdout.
    pub agent_command: Option<PathBuf>,
}

pub type TransformerFactory = fn(&TransformerOptions) -> Box<dyn ClassTransformer>;

pub struct TransformerRegistry {
    factories: Vec<(String, TransformerFactory)>,
}

impl TransformerRegistry {
    pub fn empty() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// Registers `factory` under `name`, replacing any transformer already
    /// registered under the same case-insensitive name.
    pub fn register(&mut self, name: &str, factory: TransformerFactory) {
        if let Some(slot) = self
            .factories
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            slot.1 = factory;
            return;
        }
        self.factories.push((name.to_string(), factory));
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn select(
        &self,
        name: &str,
        options: &TransformerOptions,
    ) -> Result<Box<dyn ClassTransformer>, ConfigError> {
        let name = name.trim();
        self.factories
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, factory)| factory(options))
            .ok_or_else(|| ConfigError::UnknownTransformer(name.to_string()))
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ASM, asm_factory);
        registry
    }
}

fn asm_factory(options: &TransformerOptions) -> Box<dyn ClassTransformer> {
    Box::new(AsmTransformer::new(options.agent_command.clone()))
}

/// The built-in `asm` transformer.
///
/// Checks the class-file header and, when an agent program is configured,
/// delegates the rewrite to it. Without an agent the payload is returned as is.
#[derive(Debug, Clone, Default)]
pub struct AsmTransformer {
    agent: Option<PathBuf>,
}

impl AsmTransformer {
    pub fn new(agent: Option<PathBuf>) -> Self {
        Self { agent }
    }
}

impl ClassTransformer for AsmTransformer {
    fn transform(&self, class_bytes: &[u8]) -> Result<Vec<u8>, TransformError> {
        parse_header(class_bytes)?;
        let Some(agent) = self.agent.as_deref() else {
            return Ok(class_bytes.to_vec());
        };

        let rewritten = run_agent(agent, class_bytes)?;
        parse_header(&rewritten)?;
        Ok(rewritten)
    }
}

fn run_agent(program: &Path, input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut child = Command::new(program)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| agent_error(program, format!("failed to start: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| agent_error(program, "stdin not captured".to_string()))?;
    let payload = input.to_vec();
    // Fed from a separate thread so a full stdout pipe cannot block the write.
    let feeder = std::thread::spawn(move || stdin.write_all(&payload));

    let output = child
        .wait_with_output()
        .map_err(|e| agent_error(program, format!("failed to wait: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(agent_error(
            program,
            format!("exited with {}: {}", output.status, stderr.trim()),
        ));
    }

    match feeder.join() {
        Ok(Ok(())) => Ok(output.stdout),
        Ok(Err(e)) => Err(agent_error(program, format!("failed to send class bytes: {e}"))),
        Err(_) => Err(agent_error(program, "stdin writer panicked".to_string())),
    }
}

fn agent_error(program: &Path, message: String) -> TransformError {
    TransformError::Agent {
        program: program.display().to_string(),
        message,
    }
}
