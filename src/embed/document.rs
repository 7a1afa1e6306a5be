//! Generated file layout

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};

use crate::compiler::Payload;

/// Compiled output for one (shader, variant) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledUnit {
    pub name: String,
    pub payload: Payload,
}

/// Literal value of a shared scalar constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ScalarValue {
    /// Interpret a command-line literal: bool, then integer, then finite
    /// float, falling back to a string.
    pub fn parse(literal: &str) -> Self {
        if let Ok(value) = literal.parse::<bool>() {
            ScalarValue::Bool(value)
        } else if let Ok(value) = literal.parse::<i64>() {
            ScalarValue::Integer(value)
        } else if let Some(value) = literal.parse::<f64>().ok().filter(|v| v.is_finite()) {
            ScalarValue::Float(value)
        } else {
            ScalarValue::String(literal.to_string())
        }
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Bool(v) => write!(f, "{}", v),
            ScalarValue::Integer(v) => write!(f, "{}", v),
            // TOML admits inf and nan; spell them the way the output language does
            ScalarValue::Float(v) if v.is_nan() => f.write_str("NaN"),
            ScalarValue::Float(v) if v.is_infinite() => {
                f.write_str(if *v > 0.0 { "Infinity" } else { "-Infinity" })
            }
            ScalarValue::Float(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            ScalarValue::Float(v) => write!(f, "{}", v),
            ScalarValue::String(v) => {
                let quoted = serde_json::to_string(v).map_err(|_| fmt::Error)?;
                f.write_str(&quoted)
            }
        }
    }
}

/// A `const <name> = <literal>;` line shared by every unit in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarConstant {
    pub name: String,
    pub value: ScalarValue,
}

impl ScalarConstant {
    pub fn new(name: impl Into<String>, value: ScalarValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Ordered contents of one generated file
#[derive(Debug, Clone, Default)]
pub struct OutputDocument {
    pub constants: Vec<ScalarConstant>,
    pub units: Vec<CompiledUnit>,
    array_type: String,
}

impl OutputDocument {
    pub fn new(array_type: impl Into<String>) -> Self {
        Self {
            constants: Vec::new(),
            units: Vec::new(),
            array_type: array_type.into(),
        }
    }

    pub fn with_constants(mut self, constants: Vec<ScalarConstant>) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_units(mut self, units: Vec<CompiledUnit>) -> Self {
        self.units = units;
        self
    }

    /// Serialize to the final text. Pure; identical input gives identical output.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for constant in &self.constants {
            // Writing into a String cannot fail
            let _ = writeln!(out, "const {} = {};", constant.name, constant.value);
        }

        for unit in &self.units {
            match &unit.payload {
                Payload::Words(words) => {
                    let _ = write!(out, "const {} = new {}([", unit.name, self.array_type);
                    for (i, word) in words.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        let _ = write!(out, "{:#010x}", word);
                    }
                    out.push_str("]);\n");
                }
                Payload::Declaration(text) => out.push_str(text),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_literals() {
        assert_eq!(ScalarValue::Integer(512).to_string(), "512");
        assert_eq!(ScalarValue::Bool(false).to_string(), "false");
        assert_eq!(ScalarValue::Float(0.5).to_string(), "0.5");
        assert_eq!(ScalarValue::Float(2.0).to_string(), "2.0");
        assert_eq!(ScalarValue::String("a\"b".into()).to_string(), "\"a\\\"b\"");
    }

    #[test]
    fn test_scalar_parse() {
        assert_eq!(ScalarValue::parse("false"), ScalarValue::Bool(false));
        assert_eq!(ScalarValue::parse("512"), ScalarValue::Integer(512));
        assert_eq!(ScalarValue::parse("-3"), ScalarValue::Integer(-3));
        assert_eq!(ScalarValue::parse("1.25"), ScalarValue::Float(1.25));
        assert_eq!(ScalarValue::parse("linear"), ScalarValue::String("linear".into()));
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(ScalarValue::parse("inf"), ScalarValue::String("inf".into()));
        assert_eq!(ScalarValue::parse("1e400"), ScalarValue::String("1e400".into()));
        assert_eq!(ScalarValue::parse("NaN"), ScalarValue::String("NaN".into()));
        assert_eq!(ScalarValue::parse("1e300"), ScalarValue::Float(1e300));

        assert_eq!(ScalarValue::Float(f64::INFINITY).to_string(), "Infinity");
        assert_eq!(ScalarValue::Float(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(ScalarValue::Float(f64::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_render_layout() {
        let doc = OutputDocument::new("Uint32Array")
            .with_constants(vec![
                ScalarConstant::new("ScanBlockSize", ScalarValue::Integer(512)),
                ScalarConstant::new("SerialKernels", ScalarValue::Bool(false)),
            ])
            .with_units(vec![
                CompiledUnit {
                    name: "prefix_sum_comp_spv".into(),
                    payload: Payload::Words(vec![0x0723_0203, 0x10000, 7]),
                },
                CompiledUnit {
                    name: "glb_pos_vert_spv".into(),
                    payload: Payload::Declaration("const glb_pos_vert_spv = new Uint32Array([1]);\n".into()),
                },
            ]);

        assert_eq!(
            doc.render(),
            "const ScanBlockSize = 512;\n\
             const SerialKernels = false;\n\
             const prefix_sum_comp_spv = new Uint32Array([0x07230203,0x00010000,0x00000007]);\n\
             const glb_pos_vert_spv = new Uint32Array([1]);\n"
        );
    }

    #[test]
    fn test_render_empty_document() {
        assert_eq!(OutputDocument::new("Uint32Array").render(), "");
    }
}
