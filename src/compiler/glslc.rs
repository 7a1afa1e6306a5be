//! Pre-formatted mode: glslc emits SPIR-V as C-array text

use std::fs;

use super::command::{run, ToolCommand};
use super::{CompileRequest, Payload, ShaderCompiler};
use crate::error::{malformed_output, EmbedResult, ErrorContext};

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Characters glslc wraps around the array body: `{` in front, `}\n` behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramingTrim {
    pub leading: usize,
    pub trailing: usize,
}

impl Default for FramingTrim {
    fn default() -> Self {
        Self {
            leading: 1,
            trailing: 2,
        }
    }
}

/// Runs glslc with `-mfmt=c` into a scratch file and parses the words back
pub struct GlslcCompiler {
    command: ToolCommand,
    trim: FramingTrim,
}

impl GlslcCompiler {
    pub fn new(command: ToolCommand) -> Self {
        Self {
            command,
            trim: FramingTrim::default(),
        }
    }

    pub fn with_trim(mut self, trim: FramingTrim) -> Self {
        self.trim = trim;
        self
    }
}

impl ShaderCompiler for GlslcCompiler {
    fn compile(&self, request: &CompileRequest<'_>) -> EmbedResult<Payload> {
        let shader = request.shader.path();

        // Removed on drop, including when glslc fails
        let scratch_root = std::env::temp_dir();
        let scratch = tempfile::Builder::new()
            .prefix("spv-embed")
            .tempdir_in(&scratch_root)
            .with_path(&scratch_root)?;
        let output_path = scratch.path().join(format!("{}.spv", request.constant_name));

        let mut command = self.command.command();
        command
            .arg(shader)
            .arg("-mfmt=c")
            .arg("-o")
            .arg(&output_path)
            .args(request.defines);
        if request.optimize {
            command.arg("-O");
        }
        run(command, shader)?;

        let text = fs::read_to_string(&output_path).with_path(&output_path)?;
        let words = parse_c_array(&text, self.trim).map_err(|reason| malformed_output(shader, reason))?;

        if words[0] != SPIRV_MAGIC {
            log::warn!(
                "{} does not start with the SPIR-V magic number (got {:#010x})",
                shader.display(),
                words[0]
            );
        }

        Ok(Payload::Words(words))
    }
}

/// Strip the framing and parse the comma-separated words in between.
///
/// The stripped characters must be brackets or whitespace, so output
/// missing its trailing newline is rejected rather than losing a digit.
/// Words may be hex (`0x07230203`) or decimal. An empty body is an error.
pub fn parse_c_array(text: &str, trim: FramingTrim) -> Result<Vec<u32>, String> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    if len < trim.leading + trim.trailing {
        return Err(format!(
            "output is {} characters, shorter than its framing ({} + {})",
            len, trim.leading, trim.trailing
        ));
    }

    let (head, rest) = chars.split_at(trim.leading);
    let (body, tail) = rest.split_at(rest.len() - trim.trailing);
    for (side, framing) in [("leading", head), ("trailing", tail)] {
        if let Some(c) = framing.iter().find(|c| !is_framing(**c)) {
            return Err(format!(
                "unexpected {:?} in {} framing {:?}",
                c,
                side,
                framing.iter().collect::<String>()
            ));
        }
    }

    let body: String = body.iter().collect();
    let words = body
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_word)
        .collect::<Result<Vec<_>, _>>()?;

    if words.is_empty() {
        return Err("no SPIR-V words in compiler output".to_string());
    }
    Ok(words)
}

fn is_framing(c: char) -> bool {
    c.is_whitespace() || matches!(c, '{' | '}' | '[' | ']' | '(' | ')')
}

fn parse_word(token: &str) -> Result<u32, String> {
    let parsed = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => token.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid word '{}': {}", token, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_glslc_output() {
        let text = "{0x07230203,0x00010000,0x000d000a,0x00000006}\n";
        let words = parse_c_array(text, FramingTrim::default()).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 0x0001_0000, 0x000d_000a, 6]);
    }

    #[test]
    fn test_parse_multiline_and_decimal() {
        let text = "{0x07230203, 65536,\n 12}\n";
        let words = parse_c_array(text, FramingTrim::default()).unwrap();
        assert_eq!(words, vec![SPIRV_MAGIC, 65536, 12]);
    }

    #[test]
    fn test_custom_trim() {
        let text = "[[1,2]]";
        let trim = FramingTrim {
            leading: 2,
            trailing: 2,
        };
        assert_eq!(parse_c_array(text, trim).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_rejects_malformed_output() {
        let trim = FramingTrim::default();
        assert!(parse_c_array("", trim).is_err());
        assert!(parse_c_array("{}\n", trim).is_err());
        assert!(parse_c_array("{0x07230203,zz}\n", trim).is_err());
        assert!(parse_c_array("{0x1ffffffff}\n", trim).is_err());
    }

    #[test]
    fn test_missing_trailing_newline_is_rejected() {
        let trim = FramingTrim::default();
        let err = parse_c_array("{0x07230203,0x0000002a}", trim).unwrap_err();
        assert!(err.contains("trailing framing"), "{}", err);

        assert!(parse_c_array("0x07230203,0x2a}\n", trim).is_err());
        assert_eq!(
            parse_c_array("{0x07230203,0x0000002a}\n", trim).unwrap(),
            vec![SPIRV_MAGIC, 0x2a]
        );
    }
}
